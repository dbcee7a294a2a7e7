use super::{ApiError, Envelope};
use crate::{
	extractors::{ApiPath, ApiQuery},
	AppState,
};
use axum::{response::IntoResponse, routing::get, Json, Router};
use moviedb_entities::content_type;
use moviedb_services::{
	content::MAX_LIMIT,
	content_types::{TypeContentsQuery, TypeSortField},
	ContentTypeService,
};
use serde::{Deserialize, Serialize};

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/", get(list))
		.route("/:slug", get(get_by_slug))
		.route("/:slug/contents", get(contents))
}

async fn list(service: ContentTypeService) -> Result<impl IntoResponse, ApiError> {
	Ok(Json(Envelope::ok(service.list().await?)))
}

async fn get_by_slug(
	service: ContentTypeService,
	ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
	let content_type = service
		.get_by_slug(&slug)
		.await?
		.ok_or(ApiError::NotFound("Content type not found"))?;

	Ok(Json(Envelope::ok(content_type)))
}

#[derive(Deserialize)]
struct ContentsParams {
	limit: Option<u64>,
	offset: Option<u64>,
	year: Option<i32>,
	sort_by: Option<String>,
	sort_order: Option<String>,
}

impl From<ContentsParams> for TypeContentsQuery {
	fn from(params: ContentsParams) -> Self {
		let defaults = TypeContentsQuery::default();
		Self {
			limit: params.limit.unwrap_or(defaults.limit).min(MAX_LIMIT),
			offset: params.offset.unwrap_or(defaults.offset),
			year: params.year,
			sort_by: TypeSortField::parse_lenient(params.sort_by.as_deref()),
			ascending: params
				.sort_order
				.is_some_and(|order| order.eq_ignore_ascii_case("asc")),
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentsExtra {
	total: u64,
	content_type: content_type::Model,
}

async fn contents(
	service: ContentTypeService,
	ApiPath(slug): ApiPath<String>,
	ApiQuery(params): ApiQuery<ContentsParams>,
) -> Result<impl IntoResponse, ApiError> {
	let found = service
		.get_contents(&slug, &params.into())
		.await?
		.ok_or(ApiError::NotFound("Content type not found"))?;

	let extra = ContentsExtra {
		total: found.total,
		content_type: found.content_type,
	};
	Ok(Json(Envelope::with(found.data, extra)))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params(sort_by: Option<&str>, sort_order: Option<&str>, limit: Option<u64>) -> TypeContentsQuery {
		ContentsParams {
			limit,
			offset: None,
			year: None,
			sort_by: sort_by.map(str::to_owned),
			sort_order: sort_order.map(str::to_owned),
		}
		.into()
	}

	#[test]
	fn only_asc_sorts_ascending() {
		assert!(params(None, Some("asc"), None).ascending);
		assert!(params(None, Some("ASC"), None).ascending);
		assert!(!params(None, Some("desc"), None).ascending);
		assert!(!params(None, Some("sideways"), None).ascending);
		assert!(!params(None, None, None).ascending);
	}

	#[test]
	fn defaults_and_caps() {
		let query = params(Some("rating"), None, Some(500));
		assert_eq!(query.sort_by, TypeSortField::Year);
		assert_eq!(query.limit, MAX_LIMIT);
		assert_eq!(params(None, None, None).limit, 20);
	}
}
