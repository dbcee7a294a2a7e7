use crate::{
	macros::define_service,
	query::{Bounds, ContentQuery, Page, RatingSource, SearchField, SortField, SortOrder},
};
use moviedb_entities::{content, content_type, country, genre, rating, season, voice_author};
use sea_orm::{
	sea_query::Expr, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
	EntityTrait, FromQueryResult, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QueryResult,
	QuerySelect, Statement, Value,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, instrument};

/// Upper bound for every caller-supplied row limit.
pub const MAX_LIMIT: u64 = 100;

pub const DEFAULT_PAGE: Page = Page {
	page: 1,
	per_page: 20,
};

const DESCRIPTION_PREVIEW_CHARS: usize = 200;
const QUICK_SEARCH_MIN_CHARS: usize = 2;
const POPULAR_YEARS: i32 = 5;

define_service! {
	#[derive(Clone)]
	pub struct ContentService {
		pub db: DatabaseConnection,
	}
}

#[derive(Debug, Error)]
pub enum ContentServiceError {
	#[error(transparent)]
	DbErr(#[from] DbErr),
}

/// Request body of the filter endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentFilters {
	pub filters: FacetFilters,
	pub search: Option<SearchFilter>,
	pub sort: Option<SortFilter>,
	pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FacetFilters {
	pub genres: Vec<i64>,
	pub countries: Vec<i64>,
	pub voice_authors: Vec<i64>,
	pub content_types: Vec<i64>,
	pub years: Option<Bounds<i32>>,
	pub duration: Option<Bounds<i32>>,
	pub rating: Option<RatingFilter>,
	pub is_lgbt: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingFilter {
	pub source: RatingSource,
	#[serde(default)]
	pub min: Option<f64>,
	#[serde(default)]
	pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
	pub query: String,
	pub fields: Option<Vec<SearchField>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SortFilter {
	pub field: SortField,
	#[serde(default = "SortFilter::default_order")]
	pub order: SortOrder,
}

impl SortFilter {
	fn default_order() -> SortOrder {
		SortOrder::Desc
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pagination {
	pub page: Option<u64>,
	pub per_page: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFilters(pub Vec<String>);

impl fmt::Display for InvalidFilters {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0.join("; "))
	}
}

impl std::error::Error for InvalidFilters {}

fn check_bounds<T>(problems: &mut Vec<String>, name: &str, bounds: &Bounds<T>, min: T, max: Option<T>)
where
	T: PartialOrd + Copy + fmt::Display,
{
	for (end, value) in [("min", bounds.min), ("max", bounds.max)] {
		let Some(value) = value else { continue };
		let too_big = max.map_or(false, |max| value > max);
		if value < min || too_big {
			match max {
				Some(max) => problems.push(format!("{name}.{end} must be between {min} and {max}")),
				None => problems.push(format!("{name}.{end} must be at least {min}")),
			}
		}
	}
}

impl ContentFilters {
	pub fn validate(&self) -> Result<(), InvalidFilters> {
		let mut problems = Vec::new();

		if let Some(years) = &self.filters.years {
			check_bounds(&mut problems, "filters.years", years, 1900, Some(2100));
		}

		if let Some(duration) = &self.filters.duration {
			check_bounds(&mut problems, "filters.duration", duration, 1, None);
		}

		if let Some(rating) = &self.filters.rating {
			let bounds = Bounds::new(rating.min, rating.max);
			check_bounds(&mut problems, "filters.rating", &bounds, 0.0, Some(10.0));
		}

		if let Some(pagination) = &self.pagination {
			if pagination.page == Some(0) {
				problems.push("pagination.page must be at least 1".to_owned());
			}

			if let Some(per_page) = pagination.per_page {
				if !(1..=MAX_LIMIT).contains(&per_page) {
					problems.push(format!("pagination.per_page must be between 1 and {MAX_LIMIT}"));
				}
			}
		}

		if problems.is_empty() {
			Ok(())
		} else {
			Err(InvalidFilters(problems))
		}
	}

	/// Builds the query, newest year first and 20 per page unless told otherwise.
	pub fn to_query(&self) -> ContentQuery {
		let facets = &self.filters;
		let mut query = ContentQuery::new()
			.filter_by_genres(facets.genres.iter().copied())
			.filter_by_countries(facets.countries.iter().copied())
			.filter_by_voice_authors(facets.voice_authors.iter().copied())
			.filter_by_content_types(facets.content_types.iter().copied())
			.filter_by_lgbt(facets.is_lgbt);

		if let Some(years) = facets.years {
			query = query.filter_by_years(years.min, years.max);
		}

		if let Some(duration) = facets.duration {
			query = query.filter_by_duration(duration.min, duration.max);
		}

		if let Some(rating) = &facets.rating {
			query = query.filter_by_rating(rating.source, rating.min, rating.max);
		}

		if let Some(search) = &self.search {
			let fields = search.fields.as_deref().unwrap_or(&SearchField::ALL);
			query = query.search(&search.query, fields);
		}

		query = match &self.sort {
			Some(sort) => query.sort(sort.field, sort.order),
			None => query.sort(SortField::Year, SortOrder::Desc),
		};

		let pagination = self.pagination.clone().unwrap_or_default();
		query.paginate(
			pagination.page.unwrap_or(DEFAULT_PAGE.page),
			pagination.per_page.unwrap_or(DEFAULT_PAGE.per_page),
		)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
	pub page: u64,
	pub per_page: u64,
	pub total: u64,
	pub total_pages: u64,
	pub has_next_page: bool,
	pub has_prev_page: bool,
}

impl PageMeta {
	pub fn new(page: Page, total: u64) -> Self {
		let total_pages = (total + page.per_page - 1) / page.per_page;
		Self {
			page: page.page,
			per_page: page.per_page,
			total,
			total_pages,
			has_next_page: page.page < total_pages,
			has_prev_page: page.page > 1,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct FilteredContent {
	pub data: Vec<content::Model>,
	pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingValue {
	pub rating: Option<f64>,
	pub votes: Option<i64>,
}

/// A content row with everything it references, flattened for display.
#[derive(Debug, Clone, Serialize)]
pub struct ContentDetails {
	#[serde(flatten)]
	pub content: content::Model,
	pub content_type_name: Option<String>,
	pub content_type_slug: Option<String>,
	pub genres: Vec<String>,
	pub countries: Vec<String>,
	pub voice_authors: Vec<String>,
	pub ratings: BTreeMap<String, RatingValue>,
	pub seasons: Vec<season::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredContent {
	#[serde(flatten)]
	pub content: content::Model,
	pub genre_matches: i64,
	pub country_matches: i64,
}

impl ScoredContent {
	pub fn score(&self) -> i64 {
		self.genre_matches * 2 + self.country_matches
	}
}

impl FromQueryResult for ScoredContent {
	fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
		Ok(Self {
			content: content::Model::from_query_result(res, pre)?,
			genre_matches: res.try_get(pre, "genre_matches")?,
			country_matches: res.try_get(pre, "country_matches")?,
		})
	}
}

const SIMILAR_CONTENT_SQL: &str = r#"
SELECT * FROM (
	SELECT
		c.*,
		(
			SELECT COUNT(*)
			FROM content_genres cg1
			INNER JOIN content_genres cg2 ON cg1.genre_id = cg2.genre_id
			WHERE cg1.content_id = c.id AND cg2.content_id = ?
		) AS genre_matches,
		(
			SELECT COUNT(*)
			FROM content_countries cc1
			INNER JOIN content_countries cc2 ON cc1.country_id = cc2.country_id
			WHERE cc1.content_id = c.id AND cc2.content_id = ?
		) AS country_matches
	FROM contents c
	WHERE c.id <> ?
) scored
WHERE genre_matches > 0 OR country_matches > 0
ORDER BY genre_matches * 2 + country_matches DESC, year DESC
LIMIT ?
"#;

#[derive(Debug, Clone, Default)]
pub struct TitleSearch {
	pub title: String,
	pub exact: bool,
	pub limit: u64,
	pub offset: u64,
}

/// Short form of a content row returned by title search.
#[derive(Debug, Clone, Serialize)]
pub struct TitleMatch {
	pub id: i64,
	pub title: String,
	pub original_title: Option<String>,
	pub year: Option<i32>,
	pub poster_url: Option<String>,
	pub description: Option<String>,
	pub duration: Option<i32>,
	pub age_restriction: Option<String>,
	pub video_quality: Option<String>,
	pub player_url: Option<String>,
}

fn preview(description: String) -> String {
	match description.char_indices().nth(DESCRIPTION_PREVIEW_CHARS) {
		None => description,
		Some((cut, _)) => format!("{}...", &description[..cut]),
	}
}

impl From<content::Model> for TitleMatch {
	fn from(model: content::Model) -> Self {
		Self {
			id: model.id,
			title: model.title,
			original_title: model.original_title,
			year: model.year,
			poster_url: model.poster_url,
			description: model.description.map(preview),
			duration: model.duration,
			age_restriction: model.age_restriction,
			video_quality: model.video_quality,
			player_url: model.player_url,
		}
	}
}

// Title prefix beats title substring, which beats original title, which beats
// a description-only hit.
const QUICK_SEARCH_SQL: &str = r#"
SELECT * FROM (
	SELECT
		c.id,
		c.title,
		c.original_title,
		c.poster_url,
		c.year,
		c.description,
		CASE
			WHEN c.title LIKE ? THEN 4
			WHEN c.title LIKE ? THEN 3
			WHEN c.original_title LIKE ? THEN 2
			ELSE 1
		END AS relevance
	FROM contents c
	WHERE c.title LIKE ? OR c.original_title LIKE ? OR c.description LIKE ?
) ranked
ORDER BY relevance DESC, year DESC, id ASC
LIMIT ?
"#;

/// Quick search hit, best matches first.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct QuickMatch {
	pub id: i64,
	pub title: String,
	pub original_title: Option<String>,
	pub poster_url: Option<String>,
	pub year: Option<i32>,
	pub description: Option<String>,
	pub relevance: i64,
}

#[derive(Debug, Clone, Default)]
pub struct AdvancedSearch {
	pub title: Option<String>,
	pub year: Option<i32>,
	pub min_year: Option<i32>,
	pub max_year: Option<i32>,
	pub content_type_id: Option<i64>,
	pub has_poster: bool,
	pub limit: u64,
	pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct YearCount {
	pub year: i32,
	pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct TypeCount {
	pub id: i64,
	pub name: String,
	pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentStats {
	pub total: u64,
	pub by_year: Vec<YearCount>,
	pub by_type: Vec<TypeCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
	pub min: Option<i32>,
	pub max: Option<i32>,
}

/// Everything a client needs to render the filter form.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableFilters {
	pub genres: Vec<genre::Model>,
	pub countries: Vec<country::Model>,
	pub voice_authors: Vec<voice_author::Model>,
	pub content_types: Vec<content_type::Model>,
	pub years: YearRange,
	pub rating_sources: Vec<RatingSource>,
}

impl ContentService {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}

	async fn count(&self, stmt: Statement) -> Result<i64, DbErr> {
		match self.db.query_one(stmt).await? {
			None => Ok(0),
			Some(row) => row.try_get("", "total"),
		}
	}

	/// Runs the filter query and its count side by side.
	#[instrument(skip_all)]
	pub async fn get_filtered_content(
		&self,
		filters: &ContentFilters,
	) -> Result<FilteredContent, ContentServiceError> {
		let query = filters.to_query();
		let page = query.page().unwrap_or(DEFAULT_PAGE);
		let backend = self.db.get_database_backend();
		let select = backend.build(&query.select_statement());
		let count = backend.build(&query.count_statement());
		debug!(sql = %select.sql, "filtering content");

		let (data, total) = futures::try_join!(
			content::Model::find_by_statement(select).all(&self.db),
			self.count(count),
		)?;

		let total = u64::try_from(total).unwrap_or_default();
		Ok(FilteredContent {
			data,
			meta: PageMeta::new(page, total),
		})
	}

	#[instrument(skip(self))]
	pub async fn get_content_by_id(&self, id: i64) -> Result<Option<ContentDetails>, ContentServiceError> {
		let content = match content::Entity::find_by_id(id).one(&self.db).await? {
			None => return Ok(None),
			Some(content) => content,
		};

		let (content_type, genres, countries, voice_authors, ratings, seasons) = futures::try_join!(
			content.find_related(content_type::Entity).one(&self.db),
			content
				.find_related(genre::Entity)
				.order_by_asc(genre::Column::Name)
				.all(&self.db),
			content
				.find_related(country::Entity)
				.order_by_asc(country::Column::Name)
				.all(&self.db),
			content
				.find_related(voice_author::Entity)
				.order_by_asc(voice_author::Column::Name)
				.all(&self.db),
			content.find_related(rating::Entity).all(&self.db),
			content
				.find_related(season::Entity)
				.order_by_asc(season::Column::SeasonNumber)
				.all(&self.db),
		)?;

		let (content_type_name, content_type_slug) = match content_type {
			None => (None, None),
			Some(ct) => (Some(ct.name), Some(ct.slug)),
		};

		let ratings = ratings
			.into_iter()
			.map(|r| {
				(
					r.source,
					RatingValue {
						rating: r.rating,
						votes: r.votes,
					},
				)
			})
			.collect();

		Ok(Some(ContentDetails {
			content,
			content_type_name,
			content_type_slug,
			genres: genres.into_iter().map(|g| g.name).collect(),
			countries: countries.into_iter().map(|c| c.name).collect(),
			voice_authors: voice_authors.into_iter().map(|v| v.name).collect(),
			ratings,
			seasons,
		}))
	}

	/// Content sharing genres or countries with `id`, a shared genre weighing twice
	/// as much as a shared country.
	#[instrument(skip(self))]
	pub async fn get_similar_content(
		&self,
		id: i64,
		limit: u64,
	) -> Result<Vec<ScoredContent>, ContentServiceError> {
		let limit = limit.min(MAX_LIMIT);
		let stmt = Statement::from_sql_and_values(
			self.db.get_database_backend(),
			SIMILAR_CONTENT_SQL,
			[Value::from(id), Value::from(id), Value::from(id), Value::from(limit)],
		);

		Ok(ScoredContent::find_by_statement(stmt).all(&self.db).await?)
	}

	/// Substring (or exact) match on title or original title.
	#[instrument(skip(self))]
	pub async fn search_by_title(&self, search: &TitleSearch) -> Result<Vec<TitleMatch>, ContentServiceError> {
		let term = search.title.trim();
		let matches = if search.exact {
			Condition::any()
				.add(content::Column::Title.eq(term))
				.add(content::Column::OriginalTitle.eq(term))
		} else {
			Condition::any()
				.add(content::Column::Title.contains(term))
				.add(content::Column::OriginalTitle.contains(term))
		};

		let found = content::Entity::find()
			.filter(matches)
			.order_by_desc(content::Column::Year)
			.order_by_asc(content::Column::Title)
			.limit(search.limit.min(MAX_LIMIT))
			.offset(search.offset)
			.all(&self.db)
			.await?;

		Ok(found.into_iter().map(TitleMatch::from).collect())
	}

	/// Ranked lookup over title, original title and description. Queries
	/// shorter than two characters match nothing.
	#[instrument(skip(self))]
	pub async fn quick_search(&self, query: &str, limit: u64) -> Result<Vec<QuickMatch>, ContentServiceError> {
		let query = query.trim();
		if query.chars().count() < QUICK_SEARCH_MIN_CHARS {
			return Ok(Vec::new());
		}

		let prefix = Value::from(format!("{query}%"));
		let anywhere = Value::from(format!("%{query}%"));
		let stmt = Statement::from_sql_and_values(
			self.db.get_database_backend(),
			QUICK_SEARCH_SQL,
			[
				prefix,
				anywhere.clone(),
				anywhere.clone(),
				anywhere.clone(),
				anywhere.clone(),
				anywhere,
				Value::from(limit.min(MAX_LIMIT)),
			],
		);

		let found = QuickMatch::find_by_statement(stmt).all(&self.db).await?;
		Ok(found
			.into_iter()
			.map(|hit| QuickMatch {
				description: hit.description.map(preview),
				..hit
			})
			.collect())
	}

	/// An exact `year` takes precedence over the `min_year`/`max_year` range.
	#[instrument(skip(self))]
	pub async fn advanced_search(
		&self,
		search: &AdvancedSearch,
	) -> Result<Vec<content::Model>, ContentServiceError> {
		let mut condition = Condition::all();

		if let Some(title) = search.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
			condition = condition.add(
				Condition::any()
					.add(content::Column::Title.contains(title))
					.add(content::Column::OriginalTitle.contains(title)),
			);
		}

		match search.year {
			Some(year) => condition = condition.add(content::Column::Year.eq(year)),
			None => {
				if let Some(min) = search.min_year {
					condition = condition.add(content::Column::Year.gte(min));
				}
				if let Some(max) = search.max_year {
					condition = condition.add(content::Column::Year.lte(max));
				}
			}
		}

		if let Some(content_type_id) = search.content_type_id {
			condition = condition.add(content::Column::ContentTypeId.eq(content_type_id));
		}

		if search.has_poster {
			condition = condition.add(content::Column::PosterUrl.is_not_null());
		}

		Ok(content::Entity::find()
			.filter(condition)
			.order_by_desc(content::Column::Year)
			.limit(search.limit.min(MAX_LIMIT))
			.offset(search.offset)
			.all(&self.db)
			.await?)
	}

	/// Recent content, newest first.
	#[instrument(skip(self))]
	pub async fn get_popular(&self, limit: u64) -> Result<Vec<content::Model>, ContentServiceError> {
		let since = OffsetDateTime::now_utc().year() - POPULAR_YEARS;

		Ok(content::Entity::find()
			.filter(content::Column::Year.gte(since))
			.order_by_desc(content::Column::Year)
			.order_by_desc(content::Column::CreatedAt)
			.limit(limit.min(MAX_LIMIT))
			.all(&self.db)
			.await?)
	}

	#[instrument(skip(self))]
	pub async fn get_stats(&self) -> Result<ContentStats, ContentServiceError> {
		let total = content::Entity::find().count(&self.db).await?;

		let by_year = content::Entity::find()
			.select_only()
			.column(content::Column::Year)
			.column_as(Expr::col(content::Column::Id).count(), "count")
			.filter(content::Column::Year.gt(0))
			.group_by(content::Column::Year)
			.order_by_desc(content::Column::Year)
			.into_model::<YearCount>()
			.all(&self.db)
			.await?;

		let by_type = content::Entity::find()
			.select_only()
			.column_as(content_type::Column::Id, "id")
			.column_as(content_type::Column::Name, "name")
			.column_as(Expr::col((content::Entity, content::Column::Id)).count(), "count")
			.inner_join(content_type::Entity)
			.group_by(content_type::Column::Id)
			.group_by(content_type::Column::Name)
			.order_by_asc(content_type::Column::Id)
			.into_model::<TypeCount>()
			.all(&self.db)
			.await?;

		Ok(ContentStats {
			total,
			by_year,
			by_type,
		})
	}

	#[instrument(skip(self))]
	pub async fn get_available_filters(&self) -> Result<AvailableFilters, ContentServiceError> {
		let (genres, countries, voice_authors, content_types, years) = futures::try_join!(
			genre::Entity::find()
				.order_by_asc(genre::Column::Name)
				.all(&self.db),
			country::Entity::find()
				.order_by_asc(country::Column::Name)
				.all(&self.db),
			voice_author::Entity::find()
				.order_by_asc(voice_author::Column::Name)
				.all(&self.db),
			content_type::Entity::find()
				.order_by_asc(content_type::Column::Name)
				.all(&self.db),
			content::Entity::find()
				.select_only()
				.column_as(Expr::col(content::Column::Year).min(), "min_year")
				.column_as(Expr::col(content::Column::Year).max(), "max_year")
				.filter(content::Column::Year.gt(0))
				.into_tuple::<(Option<i32>, Option<i32>)>()
				.one(&self.db),
		)?;

		let (min, max) = years.unwrap_or((None, None));
		Ok(AvailableFilters {
			genres,
			countries,
			voice_authors,
			content_types,
			years: YearRange { min, max },
			rating_sources: RatingSource::ALL.to_vec(),
		})
	}
}
