use async_trait::async_trait;
use reqwest::{
	header::{self, HeaderValue},
	Request, Response,
};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

use crate::CatalogError;

/// Attaches the static catalog API token to every request.
pub(crate) struct BearerAuthMiddleware {
	token: HeaderValue,
}

impl BearerAuthMiddleware {
	pub(crate) fn new(token: &str) -> Result<Self, CatalogError> {
		let mut token = HeaderValue::from_str(&format!("Bearer {token}"))
			.map_err(|_| CatalogError::InvalidToken)?;
		token.set_sensitive(true);

		Ok(Self { token })
	}
}

#[async_trait]
impl Middleware for BearerAuthMiddleware {
	async fn handle(
		&self,
		mut req: Request,
		extensions: &mut Extensions,
		next: Next<'_>,
	) -> reqwest_middleware::Result<Response> {
		req
			.headers_mut()
			.insert(header::AUTHORIZATION, self.token.clone());
		next.run(req, extensions).await
	}
}
