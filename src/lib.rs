#![allow(dead_code)]

pub mod config;
pub mod corpus;
pub mod logging;
pub mod mastery;
pub mod response;
pub mod retrieval;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;
pub mod workers;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn create_app(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
