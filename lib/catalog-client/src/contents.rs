use crate::{
	de::{nullable_default, nullable_vec, opt_flag, opt_float, opt_int, opt_names, opt_text},
	CatalogClient, CatalogError, CatalogUrl,
};
use async_trait::async_trait;
use reqwest::{header, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{error, info, instrument, warn};

/// One catalog entry as the upstream sends it.
///
/// Nothing is required at this level; deciding what makes an entry usable is
/// up to the consumer.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogContent {
	#[serde(default, deserialize_with = "opt_int")]
	pub id: Option<i64>,
	#[serde(default, deserialize_with = "opt_text")]
	pub title: Option<String>,
	#[serde(default, deserialize_with = "opt_text")]
	pub original_title: Option<String>,
	#[serde(default, deserialize_with = "opt_text")]
	pub description: Option<String>,
	#[serde(default, deserialize_with = "opt_text")]
	pub poster_url: Option<String>,
	#[serde(default, deserialize_with = "opt_int")]
	pub year: Option<i32>,
	#[serde(default, deserialize_with = "opt_int")]
	pub end_year: Option<i32>,
	#[serde(default, deserialize_with = "opt_int")]
	pub duration: Option<i32>,
	#[serde(default)]
	pub content_type: Option<CatalogContentType>,
	#[serde(default, deserialize_with = "opt_text")]
	pub age_restriction: Option<String>,
	#[serde(default, deserialize_with = "opt_int")]
	pub kinopoisk_id: Option<i64>,
	#[serde(default, deserialize_with = "opt_text")]
	pub imdb_id: Option<String>,

	#[serde(default, deserialize_with = "opt_names")]
	pub cast: Option<String>,
	#[serde(default, deserialize_with = "opt_names")]
	pub directors: Option<String>,
	#[serde(default, deserialize_with = "opt_names")]
	pub screenwriters: Option<String>,
	#[serde(default, deserialize_with = "opt_names")]
	pub producers: Option<String>,
	#[serde(default, deserialize_with = "opt_names")]
	pub operators: Option<String>,
	#[serde(default, deserialize_with = "opt_names")]
	pub composers: Option<String>,
	#[serde(default, deserialize_with = "opt_names")]
	pub artists: Option<String>,
	#[serde(default, deserialize_with = "opt_names")]
	pub editors: Option<String>,

	#[serde(default, deserialize_with = "opt_text")]
	pub video_quality: Option<String>,
	#[serde(default, deserialize_with = "opt_int")]
	pub seasons_count: Option<i32>,
	#[serde(default, deserialize_with = "opt_int")]
	pub episodes_count: Option<i32>,
	#[serde(default, deserialize_with = "opt_text")]
	pub created_at: Option<String>,
	#[serde(default, deserialize_with = "opt_text")]
	pub updated_at: Option<String>,
	#[serde(default, deserialize_with = "opt_flag")]
	pub is_lgbt: Option<bool>,
	#[serde(default, deserialize_with = "opt_text")]
	pub player_url: Option<String>,

	#[serde(default, deserialize_with = "nullable_vec")]
	pub genres: Vec<CatalogTag>,
	#[serde(default, deserialize_with = "nullable_vec")]
	pub countries: Vec<CatalogTag>,
	#[serde(
		default,
		rename = "voiceAuthorsV2",
		alias = "voiceAuthors",
		deserialize_with = "nullable_vec"
	)]
	pub voice_authors: Vec<CatalogPerson>,
	#[serde(default, deserialize_with = "nullable_default")]
	pub ratings: BTreeMap<String, CatalogRating>,
	#[serde(default, deserialize_with = "nullable_default")]
	pub episodes_by_season: BTreeMap<String, Option<i32>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogContentType {
	#[serde(default, deserialize_with = "opt_int")]
	pub id: Option<i64>,
	#[serde(default, deserialize_with = "opt_text")]
	pub name: Option<String>,
	#[serde(default, deserialize_with = "opt_text")]
	pub slug: Option<String>,
}

/// Genre or country reference.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogTag {
	#[serde(default, deserialize_with = "opt_int")]
	pub id: Option<i64>,
	#[serde(default, deserialize_with = "opt_text")]
	pub name: Option<String>,
	#[serde(default, deserialize_with = "opt_text")]
	pub slug: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogPerson {
	#[serde(default, deserialize_with = "opt_int")]
	pub id: Option<i64>,
	#[serde(default, deserialize_with = "opt_text")]
	pub name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogRating {
	#[serde(default, deserialize_with = "opt_float")]
	pub rating: Option<f64>,
	#[serde(default, deserialize_with = "opt_int")]
	pub votes: Option<i64>,
}

/// An entry that did not decode. Only the id is salvaged, if it can be.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedContent {
	pub id: Option<i64>,
	pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
	Content(Box<CatalogContent>),
	Malformed(MalformedContent),
}

impl PageItem {
	fn decode(value: Value) -> Self {
		let id = value.get("id").and_then(|id| match id {
			Value::Number(n) => n.as_i64(),
			Value::String(s) => s.trim().parse().ok(),
			_ => None,
		});

		match serde_json::from_value::<CatalogContent>(value) {
			Ok(content) => Self::Content(Box::new(content)),
			Err(e) => Self::Malformed(MalformedContent {
				id,
				reason: e.to_string(),
			}),
		}
	}
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
	pub pages: u32,
	#[serde(default)]
	pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentPage {
	pub items: Vec<PageItem>,
	pub meta: PageMeta,
}

#[derive(Deserialize)]
struct PageDto {
	#[serde(default, deserialize_with = "nullable_vec")]
	data: Vec<Value>,
	meta: PageMeta,
}

#[derive(Serialize)]
struct ContentsRequest {
	pagination: PaginationDto,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationDto {
	#[serde(rename = "type")]
	kind: &'static str,
	order: &'static str,
	sort_by: &'static str,
	page_size: u32,
	page: u32,
}

impl ContentPage {
	/// Decodes a page envelope. A broken envelope is an error, a broken entry is not.
	pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
		let page = serde_json::from_str::<PageDto>(body)?;
		Ok(Self {
			items: page.data.into_iter().map(PageItem::decode).collect(),
			meta: page.meta,
		})
	}
}

async fn check_response_status(response: Response) -> Result<Response, CatalogError> {
	match response.error_for_status_ref() {
		Ok(_) => Ok(response),
		Err(e) => {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			error!(status = %status, "error response: {body}");
			Err(e.into())
		}
	}
}

#[async_trait]
trait ResponseExt {
	async fn if_ok(self) -> Result<Response, CatalogError>;
}

#[async_trait]
impl ResponseExt for Response {
	async fn if_ok(self) -> Result<Response, CatalogError> {
		check_response_status(self).await
	}
}

#[instrument(skip(client))]
pub(crate) async fn fetch_page(page: u32, client: &CatalogClient) -> Result<ContentPage, CatalogError> {
	let url = CatalogUrl::Contents.into_url(&client.base_url)?;
	info!(url = %url, page, page_size = client.page_size, "fetching catalog page");

	let body = serde_json::to_vec(&ContentsRequest {
		pagination: PaginationDto {
			kind: "page",
			order: "DESC",
			sort_by: "year",
			page_size: client.page_size,
			page,
		},
	})?;

	let response = client
		.client
		.post(url)
		.header(header::CONTENT_TYPE, "application/json")
		.body(body)
		.send()
		.await?
		.if_ok()
		.await?;

	let body_str = response.text().await?;
	let contents = ContentPage::from_json(&body_str).map_err(|e| {
		error!(error = %e, page, "failed to parse catalog page");
		e
	})?;

	let malformed = contents
		.items
		.iter()
		.filter(|item| matches!(item, PageItem::Malformed(_)))
		.count();
	if malformed > 0 {
		warn!(page, malformed, "page contains entries that could not be decoded");
	}

	Ok(contents)
}
