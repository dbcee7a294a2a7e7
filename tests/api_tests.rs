use axum::{
	body::Body,
	http::{header, Method, Request, StatusCode},
	Router,
};
use migration::{Migrator, MigratorTrait};
use moviedb::{app, AppState};
use moviedb_entities::{content, content_type};
use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, EntityTrait};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn database() -> DatabaseConnection {
	let db = Database::connect("sqlite::memory:")
		.await
		.expect("failed to open sqlite database");
	Migrator::up(&db, None)
		.await
		.expect("failed to run migrations");
	db
}

async fn insert(db: &DatabaseConnection, id: i64, title: &str, year: i32, poster: bool) {
	content::Entity::insert(content::ActiveModel {
		id: Set(id),
		content_type_id: Set(Some(1)),
		title: Set(title.to_owned()),
		year: Set(Some(year)),
		duration: Set(Some(100)),
		poster_url: Set(poster.then(|| format!("https://img/{id}.jpg"))),
		is_lgbt: Set(false),
		..Default::default()
	})
	.exec_without_returning(db)
	.await
	.unwrap();
}

/// Router over a small catalog: eight 2020 titles (seven with a poster) and
/// one title per year from 1998 through 2012.
async fn spawn_app() -> Router {
	let db = database().await;

	content_type::Entity::insert(content_type::ActiveModel {
		id: Set(1),
		name: Set("Movie".into()),
		slug: Set("movie".into()),
	})
	.exec_without_returning(&db)
	.await
	.unwrap();

	for id in 1..=8 {
		insert(&db, id, &format!("Twenty {id}"), 2020, id != 8).await;
	}
	for (offset, year) in (1998..=2012).enumerate() {
		insert(&db, 100 + offset as i64, &format!("Year {year}"), year, false).await;
	}

	app(AppState::new(db))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
	let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
	(status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
	send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
	let request = Request::builder()
		.method(Method::POST)
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body))
		.unwrap();
	send(app, request).await
}

#[tokio::test]
async fn missing_content_is_404() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/content/999999999").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn content_details() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/content/3").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], json!(true));
	assert_eq!(body["data"]["title"], json!("Twenty 3"));
	assert_eq!(body["data"]["content_type_slug"], json!("movie"));
	assert_eq!(body["data"]["genres"], json!([]));
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/content/abc").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn advanced_search_by_year_with_poster() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/advanced-search?year=2020&has_poster=true&limit=5").await;
	assert_eq!(status, StatusCode::OK);

	let data = body["data"].as_array().unwrap();
	assert!(!data.is_empty());
	assert!(data.len() <= 5);
	for item in data {
		assert_eq!(item["year"], json!(2020));
		assert!(item["poster_url"].is_string());
	}
	assert_eq!(body["count"], json!(data.len()));
}

#[tokio::test]
async fn filter_by_year_range() {
	let app = spawn_app().await;
	let request = json!({
		"filters": { "years": { "min": 2000, "max": 2010 } },
		"pagination": { "page": 1, "per_page": 4 }
	});

	let (status, body) = post(&app, "/api/filter", request.to_string()).await;
	assert_eq!(status, StatusCode::OK);

	for item in body["data"].as_array().unwrap() {
		let year = item["year"].as_i64().unwrap();
		assert!((2000..=2010).contains(&year), "year {year} out of range");
	}

	let total = body["meta"]["total"].as_u64().unwrap();
	let per_page = body["meta"]["per_page"].as_u64().unwrap();
	assert_eq!(total, 11);
	assert_eq!(body["meta"]["total_pages"].as_u64().unwrap(), (total + per_page - 1) / per_page);
}

#[tokio::test]
async fn filter_past_the_last_page() {
	let app = spawn_app().await;
	let request = json!({ "pagination": { "page": u64::MAX, "per_page": 20 } });

	let (status, body) = post(&app, "/api/filter", request.to_string()).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"], json!([]));
	assert_eq!(body["meta"]["total"], json!(23));
	assert_eq!(body["meta"]["has_next_page"], json!(false));
}

#[tokio::test]
async fn filter_rejects_invalid_bodies() {
	let app = spawn_app().await;

	let out_of_range = json!({ "filters": { "years": { "min": 1800 } } });
	let (status, body) = post(&app, "/api/filter", out_of_range.to_string()).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["success"], json!(false));

	let unknown_source = json!({ "filters": { "rating": { "source": "letterboxd", "min": 5 } } });
	let (status, _) = post(&app, "/api/filter", unknown_source.to_string()).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, body) = post(&app, "/api/filter", "{not json".into()).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn has_poster_only_when_true() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/advanced-search?year=2020&has_poster=1").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["count"], json!(8));

	let (_, body) = get(&app, "/api/advanced-search?year=2020&has_poster=true").await;
	assert_eq!(body["count"], json!(7));
}

#[tokio::test]
async fn quick_search() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/content/search/quick?query=a").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "success": true, "data": [], "meta": { "total": 0 } }));

	let (status, body) = get(&app, "/api/content/search/quick?query=twenty&limit=3").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["meta"]["total"], json!(3));
	for item in body["data"].as_array().unwrap() {
		assert!(item["title"].as_str().unwrap().starts_with("Twenty"));
		assert_eq!(item["relevance"], json!(4));
	}
}

#[tokio::test]
async fn title_search() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/search").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["success"], json!(false));

	let (status, body) = get(&app, "/api/search?title=nothing-like-this").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["data"], json!([]));

	let (status, body) = get(&app, "/api/search?title=Year%202005").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["count"], json!(1));
	assert_eq!(body["data"][0]["year"], json!(2005));
}

#[tokio::test]
async fn content_types() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/content-types").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"][0]["slug"], json!("movie"));

	let (status, body) = get(&app, "/api/content-types/movie/contents?year=2020&limit=3").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["total"], json!(8));
	assert_eq!(body["data"].as_array().unwrap().len(), 3);
	assert_eq!(body["contentType"]["name"], json!("Movie"));

	let (status, body) = get(&app, "/api/content-types/cartoon").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn stats_and_available_filters() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/api/stats").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["total"], json!(23));

	let (status, body) = get(&app, "/api/filters/available").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["years"], json!({ "min": 1998, "max": 2020 }));
	assert_eq!(body["data"]["rating_sources"], json!(["imdb", "kinopoisk", "tmdb"]));
}

#[tokio::test]
async fn health() {
	let app = spawn_app().await;

	let (status, body) = get(&app, "/health").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], json!("healthy"));
}
