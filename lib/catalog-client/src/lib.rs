use async_trait::async_trait;
use reqwest::{
	header::{self, HeaderMap, HeaderValue},
	Client, Request, Response,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use std::time::{Duration, Instant};
use task_local_extensions::Extensions;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

mod auth;
mod contents;
mod de;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

pub const DEFAULT_BASE_URL: &str = "https://catalog-sync-api.rstprgapipt.com/v1/";

pub use contents::{
	CatalogContent, CatalogContentType, CatalogPerson, CatalogRating, CatalogTag, ContentPage,
	MalformedContent, PageItem, PageMeta,
};

#[derive(Error, Debug)]
pub enum CatalogError {
	#[error("Request error: {0}")]
	RequestError(#[from] reqwest_middleware::Error),

	#[error("Failed to decode response: {0}")]
	DecodeError(#[from] serde_json::Error),

	#[error("Invalid base url: {0}")]
	InvalidUrl(#[from] url::ParseError),

	#[error("API token contains characters not allowed in a header")]
	InvalidToken,
}

impl From<reqwest::Error> for CatalogError {
	fn from(value: reqwest::Error) -> Self {
		Self::RequestError(value.into())
	}
}

/// Everything needed to talk to the upstream catalog.
#[derive(Clone)]
pub struct CatalogConfig {
	pub base_url: Url,
	pub token: String,
	pub page_size: u32,
	pub timeout: Duration,
}

impl std::fmt::Debug for CatalogConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CatalogConfig")
			.field("base_url", &self.base_url.as_str())
			.field("token", &"<redacted>")
			.field("page_size", &self.page_size)
			.field("timeout", &self.timeout)
			.finish()
	}
}

impl CatalogConfig {
	pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, CatalogError> {
		// Url::join drops the last path segment unless the base ends in a slash
		let base_url = if base_url.ends_with('/') {
			Url::parse(base_url)?
		} else {
			Url::parse(&format!("{base_url}/"))?
		};

		Ok(Self {
			base_url,
			token: token.into(),
			page_size: 100,
			timeout: Duration::from_secs(30),
		})
	}

	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}
}

enum CatalogUrl {
	Contents,
}

impl CatalogUrl {
	fn into_url(self, base: &Url) -> Result<Url, CatalogError> {
		let path = match self {
			Self::Contents => "contents",
		};

		Ok(base.join(path)?)
	}
}

pub struct CatalogClient {
	client: ClientWithMiddleware,
	base_url: Url,
	page_size: u32,
}

impl CatalogClient {
	pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
		let mut headers = HeaderMap::new();
		headers.insert(
			header::ACCEPT,
			HeaderValue::from_static("application/json"),
		);

		let auth = auth::BearerAuthMiddleware::new(&config.token)?;

		Ok(Self {
			client: ClientBuilder::new(
				Client::builder()
					.user_agent(APP_USER_AGENT)
					.timeout(config.timeout)
					.pool_idle_timeout(Duration::from_secs(5))
					.pool_max_idle_per_host(2)
					.default_headers(headers)
					.build()?,
			)
			.with(auth)
			.with(TracingMiddleware)
			.build(),
			base_url: config.base_url,
			page_size: config.page_size,
		})
	}

	pub fn page_size(&self) -> u32 {
		self.page_size
	}

	/// Fetches one page of the catalog, newest year first.
	pub async fn fetch_page(&self, page: u32) -> Result<ContentPage, CatalogError> {
		contents::fetch_page(page, self).await
	}
}

struct TracingMiddleware;

#[async_trait]
impl Middleware for TracingMiddleware {
	async fn handle(
		&self,
		req: Request,
		extensions: &mut Extensions,
		next: Next<'_>,
	) -> reqwest_middleware::Result<Response> {
		let span = info_span!(
			"catalog_request",
			method = %req.method(),
			path = req.url().path()
		);

		async move {
			debug!("sending catalog request");
			let start = Instant::now();
			let result = next.run(req, extensions).await;
			let elapsed_ms = start.elapsed().as_millis() as u64;

			match &result {
				Ok(response) if response.status().is_success() => {
					info!(status = response.status().as_u16(), elapsed_ms, "catalog responded");
				}
				Ok(response) => {
					warn!(status = response.status().as_u16(), elapsed_ms, "catalog returned an error status");
				}
				Err(e) => {
					warn!(error = %e, elapsed_ms, "catalog request failed");
				}
			}

			result
		}
		.instrument(span)
		.await
	}
}
