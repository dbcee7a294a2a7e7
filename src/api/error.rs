use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use moviedb_services::{content::InvalidFilters, ContentServiceError};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
	#[error("{0}")]
	BadRequest(String),

	#[error("{0}")]
	NotFound(&'static str),

	#[error("Database error: {0}")]
	DbErr(#[from] DbErr),
}

impl From<ContentServiceError> for ApiError {
	fn from(value: ContentServiceError) -> Self {
		match value {
			ContentServiceError::DbErr(e) => e.into(),
		}
	}
}

impl From<InvalidFilters> for ApiError {
	fn from(value: InvalidFilters) -> Self {
		Self::BadRequest(value.to_string())
	}
}

#[derive(Serialize)]
struct ErrorBody {
	success: bool,
	error: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	message: Option<String>,
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::DbErr(DbErr::Conn(_) | DbErr::ConnectionAcquire(_)) => StatusCode::SERVICE_UNAVAILABLE,
			Self::DbErr(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let body = match &self {
			Self::BadRequest(_) | Self::NotFound(_) => ErrorBody {
				success: false,
				error: self.to_string(),
				message: None,
			},
			Self::DbErr(e) => {
				error!(error = %e, status = status.as_u16(), "request failed");
				let error = if status == StatusCode::SERVICE_UNAVAILABLE {
					"Database unavailable"
				} else {
					"Internal server error"
				};

				ErrorBody {
					success: false,
					error: error.into(),
					message: cfg!(debug_assertions).then(|| e.to_string()),
				}
			}
		};

		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sea_orm::RuntimeErr;

	#[test]
	fn status_mapping() {
		assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
		assert_eq!(ApiError::NotFound("Content not found").status(), StatusCode::NOT_FOUND);
		assert_eq!(
			ApiError::DbErr(DbErr::Conn(RuntimeErr::Internal("refused".into()))).status(),
			StatusCode::SERVICE_UNAVAILABLE
		);
		assert_eq!(
			ApiError::DbErr(DbErr::Custom("boom".into())).status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}
