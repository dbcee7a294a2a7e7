//! Extractors that reject malformed input with the API's JSON error body
//! instead of axum's plain-text rejections.

use crate::api::ApiError;
use axum::{
	async_trait,
	extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query},
	http::{request::Parts, Request},
	Json,
};
use serde::de::DeserializeOwned;

pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Query(value) = Query::<T>::from_request_parts(parts, state)
			.await
			.map_err(|e| ApiError::BadRequest(e.body_text()))?;

		Ok(Self(value))
	}
}

pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
	T: DeserializeOwned + Send,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		let Path(value) = Path::<T>::from_request_parts(parts, state)
			.await
			.map_err(|e| ApiError::BadRequest(e.body_text()))?;

		Ok(Self(value))
	}
}

pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ApiJson<T>
where
	Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
	S: Send + Sync,
	B: Send + 'static,
{
	type Rejection = ApiError;

	async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = Json::<T>::from_request(req, state)
			.await
			.map_err(|e| ApiError::BadRequest(e.body_text()))?;

		Ok(Self(value))
	}
}
