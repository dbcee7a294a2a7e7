use crate::AppState;
use axum::{routing::get, routing::post, Router};
use serde::Serialize;

mod content;
mod content_types;
mod error;
pub mod health;

pub use error::ApiError;

/// Success body shared by every endpoint: `{ success: true, data, ..extra }`.
#[derive(Serialize)]
pub(crate) struct Envelope<T, E = NoExtra> {
	success: bool,
	data: T,
	#[serde(flatten)]
	extra: E,
}

#[derive(Serialize)]
pub(crate) struct NoExtra {}

impl<T> Envelope<T> {
	pub fn ok(data: T) -> Self {
		Self {
			success: true,
			data,
			extra: NoExtra {},
		}
	}
}

impl<T, E> Envelope<T, E> {
	pub fn with(data: T, extra: E) -> Self {
		Self {
			success: true,
			data,
			extra,
		}
	}
}

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/search", get(content::search))
		.route("/advanced-search", get(content::advanced_search))
		.route("/popular", get(content::popular))
		.route("/stats", get(content::stats))
		.route("/filter", post(content::filter))
		.route("/filters/available", get(content::available_filters))
		.route("/content/search/quick", get(content::quick_search))
		.route("/content/:id", get(content::get_content))
		.route("/content/:id/similar", get(content::similar))
		.nest("/content-types", content_types::router())
}
