pub mod api;
pub mod config;
mod extractors;

use axum::{extract::FromRef, routing::get, Router};
use sea_orm::DatabaseConnection;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
	db: DatabaseConnection,
}

impl AppState {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}
}

impl FromRef<AppState> for DatabaseConnection {
	fn from_ref(input: &AppState) -> Self {
		input.db.clone()
	}
}

/// The whole HTTP surface: `/health` plus the JSON API under `/api`.
pub fn app(state: AppState) -> Router {
	Router::new()
		.route("/health", get(api::health::health_check))
		.nest("/api", api::router())
		.with_state(state)
		.layer(CorsLayer::permissive())
		.layer(CompressionLayer::new())
		.layer(TraceLayer::new_for_http())
}
