#![allow(dead_code)]

use catalog_client::{CatalogError, ContentPage};
use migration::{Migrator, MigratorTrait};
use moviedb_services::{CatalogSync, ContentSource, SyncOptions, SyncReport};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use std::{sync::Mutex, time::Duration};

pub async fn database() -> DatabaseConnection {
	let db = Database::connect("sqlite::memory:")
		.await
		.expect("failed to open sqlite database");
	Migrator::up(&db, None)
		.await
		.expect("failed to run migrations");
	db
}

/// Upstream item with the required fields filled in.
pub fn movie(id: i64, title: &str, year: i32) -> Value {
	json!({
		"id": id,
		"title": title,
		"year": year,
		"duration": 120,
		"contentType": { "id": 1, "name": "Movie", "slug": "movie" },
	})
}

pub fn series(id: i64, title: &str, year: i32) -> Value {
	json!({
		"id": id,
		"title": title,
		"year": year,
		"duration": 45,
		"contentType": { "id": 2, "name": "Series", "slug": "series" },
	})
}

pub fn with(mut item: Value, key: &str, value: Value) -> Value {
	item[key] = value;
	item
}

pub fn genres(item: Value, ids: &[i64]) -> Value {
	let tags = ids
		.iter()
		.map(|id| json!({ "id": id, "name": format!("genre {id}"), "slug": format!("genre-{id}") }))
		.collect::<Vec<_>>();
	with(item, "genres", Value::Array(tags))
}

pub fn countries(item: Value, ids: &[i64]) -> Value {
	let tags = ids
		.iter()
		.map(|id| json!({ "id": id, "name": format!("country {id}") }))
		.collect::<Vec<_>>();
	with(item, "countries", Value::Array(tags))
}

/// Serves fixed pages and records which pages were asked for.
pub struct StaticSource {
	pages: Vec<Vec<Value>>,
	fail_on: Option<u32>,
	calls: Mutex<Vec<u32>>,
}

impl StaticSource {
	pub fn new(pages: Vec<Vec<Value>>) -> Self {
		Self {
			pages,
			fail_on: None,
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn failing_on(mut self, page: u32) -> Self {
		self.fail_on = Some(page);
		self
	}

	pub fn calls(&self) -> Vec<u32> {
		self.calls.lock().unwrap().clone()
	}
}

#[async_trait::async_trait]
impl ContentSource for StaticSource {
	async fn fetch_page(&self, page: u32) -> Result<ContentPage, CatalogError> {
		self.calls.lock().unwrap().push(page);
		if self.fail_on == Some(page) {
			return Err(CatalogError::InvalidToken);
		}

		let items = self
			.pages
			.get(page as usize - 1)
			.cloned()
			.unwrap_or_default();
		let total = self.pages.iter().map(Vec::len).sum::<usize>();
		let body = json!({
			"data": items,
			"meta": { "pages": self.pages.len(), "total": total },
		});

		Ok(ContentPage::from_json(&body.to_string())?)
	}
}

pub fn no_delay() -> SyncOptions {
	SyncOptions {
		page_delay: Duration::ZERO,
	}
}

/// Runs a sync over `pages` and returns the report.
pub async fn seed(db: &DatabaseConnection, pages: Vec<Vec<Value>>) -> SyncReport {
	CatalogSync::new(db.clone(), StaticSource::new(pages))
		.with_options(no_delay())
		.run()
		.await
		.expect("sync failed")
}
