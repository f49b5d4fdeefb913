use serde::{Deserialize, Serialize};

use crate::retrieval::ScoredItem;

/// Optional learner profile forwarded by the client with a chat message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
}

/// Renders retrieved items as tagged context blocks. Video entries carry no
/// inline body, so their title and link stand in for the content.
pub fn build_context(items: &[ScoredItem]) -> String {
    let blocks: Vec<String> = items
        .iter()
        .map(|scored| {
            let item = &scored.item;
            let subtopic = item.subtopic.as_deref().unwrap_or("unknown");
            let content = match &item.content {
                Some(text) => text.clone(),
                None => format!(
                    "Video Title: {}\nURL: {}",
                    item.title().unwrap_or(""),
                    item.url().unwrap_or("")
                ),
            };
            format!(
                "[LAYER: {}]\n[SUBTOPIC: {}]\n[DIFFICULTY: {}]\n\n{}",
                item.layer.as_str(),
                subtopic,
                item.difficulty.as_str(),
                content
            )
        })
        .collect();

    blocks.join("\n\n---\n\n")
}

/// Renders retrieved items as a plain bullet list for generation prompts.
pub fn bullet_context(items: &[ScoredItem]) -> String {
    items
        .iter()
        .map(|scored| format!("- {}", scored.item.content.as_deref().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tutor_chat_prompt(
    message: &str,
    context: &str,
    profile: Option<&StudentProfile>,
) -> String {
    let profile_block = profile.map(profile_text).unwrap_or_default();
    format!(
        "You are an expert calculus tutor named ClassMate.\n\
         {profile_block}\n\
         Use the following CONTEXT to answer the user's question.\n\
         If the context has video links, recommend them.\n\
         If the answer is not in the context, use your general knowledge but mention that it's outside the provided materials.\n\n\
         CONTEXT:\n{context}\n\nUser: {message}\n\nAssistant:"
    )
}

fn profile_text(profile: &StudentProfile) -> String {
    format!(
        "Student Profile:\n\
         Grade: {}\n\
         Subject: {}\n\
         Level: {}\n",
        profile.grade.as_deref().unwrap_or("Unknown"),
        profile.subject.as_deref().unwrap_or("Calculus"),
        profile.difficulty_level.as_deref().unwrap_or("Medium"),
    )
}

pub fn chapter_prompt(topic: &str, subtopic: &str, difficulty: &str, context: &str) -> String {
    format!(
        "You are an expert Calculus tutor. Write a comprehensive study chapter for the topic: '{topic} - {subtopic}'.\n\
         Target Audience: {difficulty} level student.\n\n\
         Use the following context if relevant, but ensure the explanation is complete and structured:\n\
         {context}\n\n\
         Format behavior:\n\
         - Use clear headings (##)\n\
         - Write 4-6 detailed paragraphs explaining the concept.\n\
         - Include 2-3 practical solved examples with step-by-step explanations.\n\
         - End with a brief summary.\n\
         - Output strictly in Markdown format."
    )
}

pub fn quiz_prompt(
    topic: &str,
    subtopic: &str,
    num_questions: u32,
    difficulty: &str,
    context: &str,
) -> String {
    format!(
        "Create a {num_questions}-question multiple choice quiz on '{topic} - {subtopic}'.\n\
         Difficulty: {difficulty}.\n\n\
         Context material:\n\
         {context}\n\n\
         Output STRICTLY valid JSON in this format:\n\
         [\n\
             {{\n\
                 \"id\": 1,\n\
                 \"question\": \"Question text here?\",\n\
                 \"options\": [\"A) Option 1\", \"B) Option 2\", \"C) Option 3\", \"D) Option 4\"],\n\
                 \"correctAnswer\": \"Option text matching one of the options\",\n\
                 \"explanation\": \"Brief explanation of why\"\n\
             }}\n\
         ]\n\
         Do not include markdown formatting (like ```json), just the raw JSON string."
    )
}

pub fn diagnostic_prompt(grade: &str) -> String {
    format!(
        "Create a 15-question diagnostic calculus quiz that comprehensively covers these topics:\n\
         - Limits (3 questions)\n\
         - Derivatives (4 questions including chain rule, product rule, implicit differentiation)\n\
         - Integrals (4 questions including substitution, integration by parts)\n\
         - Applications (2 questions: optimization, related rates)\n\
         - Series & Sequences (2 questions)\n\n\
         Target level: {grade}.\n\
         Ensure questions range from basic to advanced within each topic.\n\n\
         Output STRICTLY valid JSON in this format:\n\
         [\n\
             {{\n\
                 \"id\": 1,\n\
                 \"question\": \"Question text?\",\n\
                 \"options\": [\"Op1\", \"Op2\", \"Op3\", \"Op4\"],\n\
                 \"correct\": \"Op2\",\n\
                 \"topic\": \"Derivatives\"\n\
             }}\n\
         ]\n\
         Do not include markdown formatting."
    )
}

pub fn hint_prompt(question_text: &str, user_answer: Option<&str>, context: &str) -> String {
    let answer_line = user_answer
        .filter(|a| !a.trim().is_empty())
        .map(|a| format!("Their answer: {a}\n"))
        .unwrap_or_default();
    format!(
        "You are a helpful tutor. A student is stuck on this question:\n\n\
         Question: {question_text}\n\
         {answer_line}\n\
         Use the following context to provide a helpful hint (NOT the full answer):\n\
         {context}\n\n\
         Provide a gentle hint that guides them toward the solution without giving it away completely.\n\
         Keep it concise (2-3 sentences)."
    )
}

/// Strips a markdown code fence if the model wrapped its JSON in one.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .and_then(|s| s.strip_suffix("```"))
        .or_else(|| {
            trimmed
                .strip_prefix("```")
                .and_then(|s| s.strip_suffix("```"))
        })
        .unwrap_or(trimmed)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusItem;

    fn text_item(layer: &str, subtopic: &str, difficulty: &str, content: &str) -> ScoredItem {
        let value = serde_json::json!({
            "id": "t1",
            "topic": "Limits",
            "subtopic": subtopic,
            "layer": layer,
            "difficulty": difficulty,
            "content": content,
        });
        ScoredItem {
            item: serde_json::from_value::<CorpusItem>(value).unwrap(),
            score: 0.9,
        }
    }

    #[test]
    fn test_build_context_block_format() {
        let items = vec![text_item(
            "conceptual",
            "Definition of Limit",
            "easy",
            "A limit describes the value a function approaches.",
        )];
        let context = build_context(&items);
        assert!(context.starts_with("[LAYER: conceptual]\n[SUBTOPIC: Definition of Limit]\n[DIFFICULTY: easy]\n\n"));
        assert!(context.ends_with("A limit describes the value a function approaches."));
    }

    #[test]
    fn test_build_context_joins_with_separator() {
        let items = vec![
            text_item("conceptual", "a", "easy", "one"),
            text_item("procedural", "b", "medium", "two"),
        ];
        let context = build_context(&items);
        assert_eq!(context.matches("\n\n---\n\n").count(), 1);
    }

    #[test]
    fn test_build_context_video_fallback() {
        let value = serde_json::json!({
            "id": "v1",
            "subtopic": "Chain Rule",
            "layer": "video",
            "difficulty": "easy",
            "content": null,
            "metadata": {"title": "Chain Rule Intro", "url": "https://example.com/v"},
        });
        let items = vec![ScoredItem {
            item: serde_json::from_value::<CorpusItem>(value).unwrap(),
            score: 0.5,
        }];
        let context = build_context(&items);
        assert!(context.contains("Video Title: Chain Rule Intro"));
        assert!(context.contains("URL: https://example.com/v"));
    }

    #[test]
    fn test_tutor_chat_prompt_with_and_without_profile() {
        let bare = tutor_chat_prompt("What is a limit?", "ctx", None);
        assert!(bare.contains("named ClassMate"));
        assert!(bare.contains("User: What is a limit?"));
        assert!(bare.ends_with("Assistant:"));
        assert!(!bare.contains("Student Profile:"));

        let profile = StudentProfile {
            grade: Some("12".to_string()),
            ..Default::default()
        };
        let with_profile = tutor_chat_prompt("What is a limit?", "ctx", Some(&profile));
        assert!(with_profile.contains("Student Profile:"));
        assert!(with_profile.contains("Grade: 12"));
        assert!(with_profile.contains("Subject: Calculus"));
        assert!(with_profile.contains("Level: Medium"));
    }

    #[test]
    fn test_quiz_prompt_embeds_parameters() {
        let prompt = quiz_prompt("Derivatives", "Chain Rule", 5, "medium", "- some context");
        assert!(prompt.contains("Create a 5-question multiple choice quiz on 'Derivatives - Chain Rule'."));
        assert!(prompt.contains("Difficulty: medium."));
        assert!(prompt.contains("\"correctAnswer\""));
    }

    #[test]
    fn test_hint_prompt_answer_line_optional() {
        let without = hint_prompt("What is d/dx of x^2?", None, "ctx");
        assert!(!without.contains("Their answer:"));

        let with = hint_prompt("What is d/dx of x^2?", Some("x"), "ctx");
        assert!(with.contains("Their answer: x"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fences("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fences("  [1,2]  "), "[1,2]");
        assert_eq!(strip_code_fences("plain text"), "plain text");
    }
}
