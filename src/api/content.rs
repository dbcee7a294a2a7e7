use super::{ApiError, Envelope};
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use axum::{http::StatusCode, response::IntoResponse, Json};
use moviedb_services::{
	content::{AdvancedSearch, ContentFilters, PageMeta, TitleMatch, TitleSearch, MAX_LIMIT},
	ContentService,
};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_SEARCH_LIMIT: u64 = 20;
const DEFAULT_SIMILAR_LIMIT: u64 = 10;
const DEFAULT_POPULAR_LIMIT: u64 = 10;
const DEFAULT_QUICK_LIMIT: u64 = 10;

#[derive(Serialize)]
struct Count {
	count: usize,
}

#[derive(Serialize)]
struct NoMatches {
	success: bool,
	message: &'static str,
	data: [TitleMatch; 0],
}

#[derive(Deserialize)]
pub(super) struct SearchParams {
	title: Option<String>,
	limit: Option<u64>,
	offset: Option<u64>,
	#[serde(default)]
	exact: bool,
}

pub(super) async fn search(
	service: ContentService,
	ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<axum::response::Response, ApiError> {
	let title = match params.title.as_deref().map(str::trim) {
		Some(title) if !title.is_empty() => title.to_owned(),
		_ => return Err(ApiError::BadRequest("Title parameter is required".into())),
	};

	let found = service
		.search_by_title(&TitleSearch {
			title,
			exact: params.exact,
			limit: params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_LIMIT),
			offset: params.offset.unwrap_or(0),
		})
		.await?;

	if found.is_empty() {
		let body = NoMatches {
			success: false,
			message: "No content found",
			data: [],
		};
		return Ok((StatusCode::NOT_FOUND, Json(body)).into_response());
	}

	let count = Count { count: found.len() };
	Ok(Json(Envelope::with(found, count)).into_response())
}

#[derive(Deserialize)]
pub(super) struct AdvancedSearchParams {
	title: Option<String>,
	year: Option<i32>,
	min_year: Option<i32>,
	max_year: Option<i32>,
	content_type_id: Option<i64>,
	has_poster: Option<String>,
	limit: Option<u64>,
	offset: Option<u64>,
}

pub(super) async fn advanced_search(
	service: ContentService,
	ApiQuery(params): ApiQuery<AdvancedSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
	let found = service
		.advanced_search(&AdvancedSearch {
			title: params.title,
			year: params.year,
			min_year: params.min_year,
			max_year: params.max_year,
			content_type_id: params.content_type_id,
			has_poster: params.has_poster.as_deref() == Some("true"),
			limit: params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_LIMIT),
			offset: params.offset.unwrap_or(0),
		})
		.await?;

	let count = Count { count: found.len() };
	Ok(Json(Envelope::with(found, count)))
}

pub(super) async fn get_content(
	service: ContentService,
	ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
	let details = service
		.get_content_by_id(id)
		.await?
		.ok_or(ApiError::NotFound("Content not found"))?;

	Ok(Json(Envelope::ok(details)))
}

#[derive(Deserialize)]
pub(super) struct LimitParams {
	limit: Option<u64>,
}

#[derive(Serialize)]
struct Total {
	total: usize,
}

#[derive(Serialize)]
struct TotalMeta {
	meta: Total,
}

pub(super) async fn similar(
	service: ContentService,
	ApiPath(id): ApiPath<i64>,
	ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<impl IntoResponse, ApiError> {
	let limit = params.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT).min(MAX_LIMIT);
	let similar = service.get_similar_content(id, limit).await?;

	let meta = TotalMeta {
		meta: Total {
			total: similar.len(),
		},
	};
	Ok(Json(Envelope::with(similar, meta)))
}

#[derive(Deserialize)]
pub(super) struct QuickSearchParams {
	#[serde(default)]
	query: String,
	limit: Option<u64>,
}

pub(super) async fn quick_search(
	service: ContentService,
	ApiQuery(params): ApiQuery<QuickSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
	let limit = params.limit.unwrap_or(DEFAULT_QUICK_LIMIT).min(MAX_LIMIT);
	let found = service.quick_search(&params.query, limit).await?;

	let meta = TotalMeta {
		meta: Total { total: found.len() },
	};
	Ok(Json(Envelope::with(found, meta)))
}

pub(super) async fn popular(
	service: ContentService,
	ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<impl IntoResponse, ApiError> {
	let limit = params.limit.unwrap_or(DEFAULT_POPULAR_LIMIT).min(MAX_LIMIT);
	let popular = service.get_popular(limit).await?;

	let count = Count {
		count: popular.len(),
	};
	Ok(Json(Envelope::with(popular, count)))
}

#[derive(Serialize)]
struct FilterMeta {
	meta: PageMeta,
}

pub(super) async fn filter(
	service: ContentService,
	ApiJson(filters): ApiJson<ContentFilters>,
) -> Result<impl IntoResponse, ApiError> {
	filters.validate()?;

	let result = service.get_filtered_content(&filters).await?;
	info!(
		total = result.meta.total,
		page = result.meta.page,
		"filtered content"
	);

	Ok(Json(Envelope::with(result.data, FilterMeta { meta: result.meta })))
}

pub(super) async fn available_filters(service: ContentService) -> Result<impl IntoResponse, ApiError> {
	Ok(Json(Envelope::ok(service.get_available_filters().await?)))
}

pub(super) async fn stats(service: ContentService) -> Result<impl IntoResponse, ApiError> {
	Ok(Json(Envelope::ok(service.get_stats().await?)))
}
