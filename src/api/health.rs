use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use indexmap::IndexMap;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Unhealthy,
}

#[derive(Debug, Serialize)]
struct Check {
	status: HealthStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	message: Option<String>,
}

/// Named checks; the overall status is the worst of them.
#[derive(Debug, Default, Serialize)]
pub struct HealthReport {
	checks: IndexMap<&'static str, Check>,
}

impl HealthReport {
	pub fn add<T, E: std::fmt::Display>(&mut self, name: &'static str, result: Result<T, E>) -> &mut Self {
		let check = match result {
			Ok(_) => Check {
				status: HealthStatus::Healthy,
				message: None,
			},
			Err(e) => {
				warn!(check = name, error = %e, "health check failed");
				Check {
					status: HealthStatus::Unhealthy,
					message: Some(failure_message(&e)),
				}
			}
		};

		self.checks.insert(name, check);
		self
	}

	pub fn status(&self) -> HealthStatus {
		self.checks
			.values()
			.map(|c| c.status)
			.max()
			.unwrap_or(HealthStatus::Healthy)
	}
}

fn failure_message(e: &impl std::fmt::Display) -> String {
	if cfg!(debug_assertions) {
		e.to_string()
	} else {
		"check failed".to_owned()
	}
}

#[derive(Serialize)]
struct HealthBody<'a> {
	status: HealthStatus,
	checks: &'a IndexMap<&'static str, Check>,
}

impl IntoResponse for HealthReport {
	fn into_response(self) -> axum::response::Response {
		let status = self.status();
		let code = match status {
			HealthStatus::Healthy => StatusCode::OK,
			HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
		};

		let body = HealthBody {
			status,
			checks: &self.checks,
		};
		(code, Json(body)).into_response()
	}
}

pub async fn health_check(State(db): State<DatabaseConnection>) -> HealthReport {
	let mut report = HealthReport::default();
	report.add("db", db.ping().await);
	report
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn worst_check_wins() {
		let mut report = HealthReport::default();
		assert_eq!(report.status(), HealthStatus::Healthy);

		report.add("a", Ok::<_, String>(()));
		assert_eq!(report.status(), HealthStatus::Healthy);

		report.add("b", Err::<(), _>("down"));
		assert_eq!(report.status(), HealthStatus::Unhealthy);
	}

	#[test]
	fn failure_detail_is_debug_only() {
		let mut report = HealthReport::default();
		report.add("db", Err::<(), _>("connection refused by 10.0.0.5:3306"));

		let message = report.checks["db"].message.as_deref();
		if cfg!(debug_assertions) {
			assert_eq!(message, Some("connection refused by 10.0.0.5:3306"));
		} else {
			assert_eq!(message, Some("check failed"));
		}
	}
}
