//! Dynamic filter query over the catalog.
//!
//! [`ContentQuery`] records one slot per facet and renders all of them in a
//! fixed order when a statement is requested. Joins are always emitted before
//! predicates, and predicates before ordering and paging, so bound values come
//! out in the same order as their placeholders no matter in which order the
//! facets were applied.

use indexmap::IndexSet;
use moviedb_entities::{content, content_country, content_genre, content_voice_author, rating};
use sea_query::{
	Alias, Asterisk, Cond, Expr, JoinType, MysqlQueryBuilder, Order, Query, SelectStatement, Values,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const CONTENT: &str = "c";
const GENRE_JOIN: &str = "cg";
const GENRE_FILTER: &str = "genres_filter";
const COUNTRY_JOIN: &str = "cc";
const VOICE_AUTHOR_JOIN: &str = "cva";

fn c() -> Alias {
	Alias::new(CONTENT)
}

/// Rating providers the catalog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSource {
	Imdb,
	Kinopoisk,
	Tmdb,
}

impl RatingSource {
	pub const ALL: [RatingSource; 3] = [Self::Imdb, Self::Kinopoisk, Self::Tmdb];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Imdb => "imdb",
			Self::Kinopoisk => "kinopoisk",
			Self::Tmdb => "tmdb",
		}
	}

	fn join_alias(&self) -> Alias {
		Alias::new(format!("r_{}", self.as_str()))
	}
}

impl fmt::Display for RatingSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

impl fmt::Display for UnknownValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown value {:?}", self.0)
	}
}

impl std::error::Error for UnknownValue {}

impl FromStr for RatingSource {
	type Err = UnknownValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|source| source.as_str() == s)
			.ok_or_else(|| UnknownValue(s.to_owned()))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
	Title,
	OriginalTitle,
	Description,
}

impl SearchField {
	pub const ALL: [SearchField; 3] = [Self::Title, Self::OriginalTitle, Self::Description];

	fn column(&self) -> content::Column {
		match self {
			Self::Title => content::Column::Title,
			Self::OriginalTitle => content::Column::OriginalTitle,
			Self::Description => content::Column::Description,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
	Year,
	CreatedAt,
	UpdatedAt,
	Title,
}

impl SortField {
	fn column(&self) -> content::Column {
		match self {
			Self::Year => content::Column::Year,
			Self::CreatedAt => content::Column::CreatedAt,
			Self::UpdatedAt => content::Column::UpdatedAt,
			Self::Title => content::Column::Title,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
	#[serde(rename = "ASC", alias = "asc")]
	Asc,
	#[serde(rename = "DESC", alias = "desc")]
	Desc,
}

impl From<SortOrder> for Order {
	fn from(value: SortOrder) -> Self {
		match value {
			SortOrder::Asc => Order::Asc,
			SortOrder::Desc => Order::Desc,
		}
	}
}

/// Inclusive range where either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds<T> {
	#[serde(default)]
	pub min: Option<T>,
	#[serde(default)]
	pub max: Option<T>,
}

impl<T> Bounds<T> {
	pub fn new(min: Option<T>, max: Option<T>) -> Self {
		Self { min, max }
	}

	pub fn is_open(&self) -> bool {
		self.min.is_none() && self.max.is_none()
	}
}

#[derive(Debug, Clone, PartialEq)]
struct RatingFacet {
	source: RatingSource,
	bounds: Bounds<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct SearchFacet {
	pattern: String,
	fields: Vec<SearchField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
	pub page: u64,
	pub per_page: u64,
}

impl Page {
	/// Rows skipped before this page. Capped at `i64::MAX` so that every
	/// backend can bind it.
	pub fn offset(&self) -> u64 {
		self.page
			.saturating_sub(1)
			.saturating_mul(self.per_page)
			.min(i64::MAX as u64)
	}
}

/// Structured description of a catalog query. Every facet is optional;
/// applying a facet again replaces its previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentQuery {
	genres: Vec<i64>,
	countries: Vec<i64>,
	voice_authors: Vec<i64>,
	content_types: Vec<i64>,
	years: Bounds<i32>,
	duration: Bounds<i32>,
	rating: Option<RatingFacet>,
	lgbt: Option<bool>,
	search: Option<SearchFacet>,
	sort: Option<(SortField, SortOrder)>,
	page: Option<Page>,
}

fn distinct_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
	ids.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

impl ContentQuery {
	pub fn new() -> Self {
		Self::default()
	}

	/// Content carrying every one of the given genres.
	pub fn filter_by_genres(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
		let ids = distinct_ids(ids);
		if !ids.is_empty() {
			self.genres = ids;
		}
		self
	}

	/// Content produced in any of the given countries.
	pub fn filter_by_countries(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
		let ids = distinct_ids(ids);
		if !ids.is_empty() {
			self.countries = ids;
		}
		self
	}

	/// Content voiced by any of the given authors.
	pub fn filter_by_voice_authors(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
		let ids = distinct_ids(ids);
		if !ids.is_empty() {
			self.voice_authors = ids;
		}
		self
	}

	pub fn filter_by_content_types(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
		let ids = distinct_ids(ids);
		if !ids.is_empty() {
			self.content_types = ids;
		}
		self
	}

	pub fn filter_by_years(mut self, min: Option<i32>, max: Option<i32>) -> Self {
		let bounds = Bounds::new(min, max);
		if !bounds.is_open() {
			self.years = bounds;
		}
		self
	}

	/// Duration bounds in minutes.
	pub fn filter_by_duration(mut self, min: Option<i32>, max: Option<i32>) -> Self {
		let bounds = Bounds::new(min, max);
		if !bounds.is_open() {
			self.duration = bounds;
		}
		self
	}

	/// Joins the ratings of `source`. Without bounds the join does not filter anything.
	pub fn filter_by_rating(mut self, source: RatingSource, min: Option<f64>, max: Option<f64>) -> Self {
		self.rating = Some(RatingFacet {
			source,
			bounds: Bounds::new(min, max),
		});
		self
	}

	pub fn filter_by_lgbt(mut self, flag: Option<bool>) -> Self {
		if flag.is_some() {
			self.lgbt = flag;
		}
		self
	}

	/// Substring match of `text` against any of `fields`.
	pub fn search(mut self, text: &str, fields: &[SearchField]) -> Self {
		let text = text.trim();
		let fields = fields.iter().copied().collect::<IndexSet<_>>();
		if !text.is_empty() && !fields.is_empty() {
			self.search = Some(SearchFacet {
				pattern: format!("%{text}%"),
				fields: fields.into_iter().collect(),
			});
		}
		self
	}

	pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
		self.sort = Some((field, order));
		self
	}

	/// One-based page. Zero values are raised to one.
	pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
		self.page = Some(Page {
			page: page.max(1),
			per_page: per_page.max(1),
		});
		self
	}

	pub fn sort_order(&self) -> Option<(SortField, SortOrder)> {
		self.sort
	}

	pub fn page(&self) -> Option<Page> {
		self.page
	}

	fn apply_joins(&self, stmt: &mut SelectStatement) {
		match self.genres.as_slice() {
			[] => {}
			[genre] => {
				let cg = Alias::new(GENRE_JOIN);
				stmt.join_as(
					JoinType::InnerJoin,
					content_genre::Entity,
					cg.clone(),
					Cond::all()
						.add(
							Expr::col((c(), content::Column::Id))
								.equals((cg.clone(), content_genre::Column::ContentId)),
						)
						.add(Expr::col((cg, content_genre::Column::GenreId)).eq(*genre)),
				);
			}
			genres => {
				let matching = Query::select()
					.column(content_genre::Column::ContentId)
					.from(content_genre::Entity)
					.and_where(Expr::col(content_genre::Column::GenreId).is_in(genres.iter().copied()))
					.group_by_col(content_genre::Column::ContentId)
					.and_having(Expr::cust_with_values(
						"COUNT(DISTINCT genre_id) = ?",
						[genres.len() as i64],
					))
					.to_owned();

				stmt.join_subquery(
					JoinType::InnerJoin,
					matching,
					Alias::new(GENRE_FILTER),
					Expr::col((c(), content::Column::Id))
						.equals((Alias::new(GENRE_FILTER), content_genre::Column::ContentId)),
				);
			}
		}

		if !self.countries.is_empty() {
			stmt.join_as(
				JoinType::InnerJoin,
				content_country::Entity,
				Alias::new(COUNTRY_JOIN),
				Expr::col((c(), content::Column::Id))
					.equals((Alias::new(COUNTRY_JOIN), content_country::Column::ContentId)),
			);
		}

		if !self.voice_authors.is_empty() {
			stmt.join_as(
				JoinType::InnerJoin,
				content_voice_author::Entity,
				Alias::new(VOICE_AUTHOR_JOIN),
				Expr::col((c(), content::Column::Id)).equals((
					Alias::new(VOICE_AUTHOR_JOIN),
					content_voice_author::Column::ContentId,
				)),
			);
		}

		if let Some(rating) = &self.rating {
			let alias = rating.source.join_alias();
			stmt.join_as(
				JoinType::LeftJoin,
				rating::Entity,
				alias.clone(),
				Cond::all()
					.add(
						Expr::col((c(), content::Column::Id))
							.equals((alias.clone(), rating::Column::ContentId)),
					)
					.add(Expr::col((alias, rating::Column::Source)).eq(rating.source.as_str())),
			);
		}
	}

	fn apply_predicates(&self, stmt: &mut SelectStatement) {
		if !self.countries.is_empty() {
			stmt.and_where(
				Expr::col((Alias::new(COUNTRY_JOIN), content_country::Column::CountryId))
					.is_in(self.countries.iter().copied()),
			);
		}

		if !self.voice_authors.is_empty() {
			stmt.and_where(
				Expr::col((
					Alias::new(VOICE_AUTHOR_JOIN),
					content_voice_author::Column::VoiceAuthorId,
				))
				.is_in(self.voice_authors.iter().copied()),
			);
		}

		if !self.content_types.is_empty() {
			stmt.and_where(
				Expr::col((c(), content::Column::ContentTypeId)).is_in(self.content_types.iter().copied()),
			);
		}

		apply_bounds(stmt, (c(), content::Column::Year), self.years);
		apply_bounds(stmt, (c(), content::Column::Duration), self.duration);

		if let Some(rating) = &self.rating {
			apply_bounds(
				stmt,
				(rating.source.join_alias(), rating::Column::Rating),
				rating.bounds,
			);
		}

		if let Some(lgbt) = self.lgbt {
			stmt.and_where(Expr::col((c(), content::Column::IsLgbt)).eq(lgbt));
		}

		if let Some(search) = &self.search {
			let any = search.fields.iter().fold(Cond::any(), |cond, field| {
				cond.add(Expr::col((c(), field.column())).like(search.pattern.as_str()))
			});
			stmt.cond_where(any);
		}
	}

	fn filtered(&self) -> SelectStatement {
		let mut stmt = Query::select();
		stmt.from_as(content::Entity, c());
		self.apply_joins(&mut stmt);
		self.apply_predicates(&mut stmt);
		stmt
	}

	/// The data query: distinct content rows, ordered and paged.
	pub fn select_statement(&self) -> SelectStatement {
		let mut stmt = self.filtered();
		stmt.distinct().column((c(), Asterisk));

		if let Some((field, order)) = self.sort {
			stmt.order_by((c(), field.column()), order.into());
		}

		if let Some(page) = self.page {
			stmt.limit(page.per_page).offset(page.offset());
		}

		stmt
	}

	/// Number of distinct content rows matched, ignoring order and paging.
	pub fn count_statement(&self) -> SelectStatement {
		let mut stmt = self.filtered();
		stmt.expr_as(Expr::cust("COUNT(DISTINCT c.id)"), Alias::new("total"));
		stmt
	}

	pub fn build(&self) -> (String, Values) {
		self.select_statement().build(MysqlQueryBuilder)
	}

	pub fn build_count(&self) -> (String, Values) {
		self.count_statement().build(MysqlQueryBuilder)
	}
}

fn apply_bounds<C, T>(stmt: &mut SelectStatement, col: C, bounds: Bounds<T>)
where
	C: sea_query::IntoColumnRef + Clone,
	T: Into<sea_query::Value>,
{
	if let Some(min) = bounds.min {
		stmt.and_where(Expr::col(col.clone()).gte(min));
	}

	if let Some(max) = bounds.max {
		stmt.and_where(Expr::col(col).lte(max));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sea_query::Value;

	fn placeholders(sql: &str) -> usize {
		sql.matches('?').count()
	}

	type Facet = (&'static str, fn(ContentQuery) -> ContentQuery);

	fn facets() -> [Facet; 12] {
		[
			("one genre", |q| q.filter_by_genres([4])),
			("genres", |q| q.filter_by_genres([1, 2, 2, 3])),
			("countries", |q| q.filter_by_countries([7, 8])),
			("voice authors", |q| q.filter_by_voice_authors([11])),
			("content types", |q| q.filter_by_content_types([1, 2])),
			("years", |q| q.filter_by_years(Some(2000), Some(2010))),
			("duration", |q| q.filter_by_duration(Some(60), None)),
			("rating", |q| {
				q.filter_by_rating(RatingSource::Kinopoisk, Some(6.5), Some(9.0))
			}),
			("lgbt", |q| q.filter_by_lgbt(Some(false))),
			("search", |q| {
				q.search("matrix", &[SearchField::Title, SearchField::Description])
			}),
			("sort", |q| q.sort(SortField::CreatedAt, SortOrder::Asc)),
			("page", |q| q.paginate(3, 25)),
		]
	}

	#[test]
	fn placeholders_match_values_for_every_combination() {
		let facets = facets();
		for mask in 0u32..(1 << facets.len()) {
			let mut query = ContentQuery::new();
			let mut applied = Vec::new();
			for (i, (name, apply)) in facets.iter().enumerate() {
				if mask & (1 << i) != 0 {
					query = apply(query);
					applied.push(*name);
				}
			}

			let (sql, values) = query.build();
			assert_eq!(placeholders(&sql), values.0.len(), "select for {applied:?}: {sql}");

			let (count_sql, count_values) = query.build_count();
			assert_eq!(
				placeholders(&count_sql),
				count_values.0.len(),
				"count for {applied:?}: {count_sql}"
			);
			assert_eq!(
				&values.0[..count_values.0.len()],
				count_values.0.as_slice(),
				"count values must prefix select values for {applied:?}"
			);

			let select_tail = sql.split_once(" FROM ").map(|(_, tail)| tail).unwrap_or_default();
			let select_tail = select_tail
				.split(" ORDER BY ")
				.next()
				.unwrap_or_default()
				.split(" LIMIT ")
				.next()
				.unwrap_or_default();
			let count_tail = count_sql.split_once(" FROM ").map(|(_, tail)| tail).unwrap_or_default();
			assert_eq!(select_tail, count_tail, "shared joins for {applied:?}");
		}
	}

	#[test]
	fn order_of_application_does_not_change_the_statement() {
		let a = ContentQuery::new()
			.paginate(2, 10)
			.search("x", &[SearchField::Title])
			.filter_by_years(Some(1990), None)
			.filter_by_genres([1, 2]);
		let b = ContentQuery::new()
			.filter_by_genres([1, 2])
			.filter_by_years(Some(1990), None)
			.search("x", &[SearchField::Title])
			.paginate(2, 10);

		assert_eq!(a.build(), b.build());
	}

	#[test]
	fn empty_query_selects_everything() {
		let (sql, values) = ContentQuery::new().build();
		assert_eq!(sql, "SELECT DISTINCT `c`.* FROM `contents` AS `c`");
		assert!(values.0.is_empty());

		let (sql, _) = ContentQuery::new().build_count();
		assert_eq!(sql, "SELECT COUNT(DISTINCT c.id) AS `total` FROM `contents` AS `c`");
	}

	#[test]
	fn single_genre_joins_directly() {
		let (sql, values) = ContentQuery::new().filter_by_genres([5]).build();
		assert_eq!(
			sql,
			"SELECT DISTINCT `c`.* FROM `contents` AS `c` INNER JOIN `content_genres` AS `cg` ON `c`.`id` = `cg`.`content_id` AND `cg`.`genre_id` = ?"
		);
		assert_eq!(values.0, vec![Value::BigInt(Some(5))]);
	}

	#[test]
	fn huge_page_numbers_saturate_the_offset() {
		let (sql, values) = ContentQuery::new().paginate(u64::MAX, 20).build();
		assert!(sql.ends_with("LIMIT ? OFFSET ?"));
		assert_eq!(
			values.0,
			vec![Value::BigUnsigned(Some(20)), Value::BigUnsigned(Some(i64::MAX as u64))]
		);
	}

	#[test]
	fn several_genres_require_all_of_them() {
		let (sql, values) = ContentQuery::new().filter_by_genres([3, 1, 3]).build();
		assert_eq!(
			sql,
			"SELECT DISTINCT `c`.* FROM `contents` AS `c` INNER JOIN (SELECT `content_id` FROM `content_genres` WHERE `genre_id` IN (?, ?) GROUP BY `content_id` HAVING COUNT(DISTINCT genre_id) = ?) AS `genres_filter` ON `c`.`id` = `genres_filter`.`content_id`"
		);
		assert_eq!(
			values.0,
			vec![
				Value::BigInt(Some(3)),
				Value::BigInt(Some(1)),
				Value::BigInt(Some(2)),
			]
		);
	}

	#[test]
	fn countries_match_any() {
		let (sql, values) = ContentQuery::new().filter_by_countries([1, 2]).build();
		assert_eq!(
			sql,
			"SELECT DISTINCT `c`.* FROM `contents` AS `c` INNER JOIN `content_countries` AS `cc` ON `c`.`id` = `cc`.`content_id` WHERE `cc`.`country_id` IN (?, ?)"
		);
		assert_eq!(values.0.len(), 2);
	}

	#[test]
	fn rating_without_bounds_only_joins() {
		let (sql, values) = ContentQuery::new()
			.filter_by_rating(RatingSource::Imdb, None, None)
			.build();
		assert_eq!(
			sql,
			"SELECT DISTINCT `c`.* FROM `contents` AS `c` LEFT JOIN `ratings` AS `r_imdb` ON `c`.`id` = `r_imdb`.`content_id` AND `r_imdb`.`source` = ?"
		);
		assert_eq!(values.0, vec![Value::String(Some(Box::new("imdb".to_owned())))]);
	}

	#[test]
	fn rating_bounds_filter_the_joined_source() {
		let (sql, _) = ContentQuery::new()
			.filter_by_rating(RatingSource::Tmdb, Some(7.0), None)
			.build();
		assert!(sql.ends_with("WHERE `r_tmdb`.`rating` >= ?"), "{sql}");
	}

	#[test]
	fn search_ors_the_fields() {
		let (sql, values) = ContentQuery::new()
			.search("  dune ", &SearchField::ALL)
			.build();
		assert!(
			sql.contains(
				"`c`.`title` LIKE ? OR `c`.`original_title` LIKE ? OR `c`.`description` LIKE ?"
			),
			"{sql}"
		);
		assert_eq!(values.0.len(), 3);
		assert_eq!(values.0[0], Value::String(Some(Box::new("%dune%".to_owned()))));
	}

	#[test]
	fn paging_is_bound() {
		let (sql, values) = ContentQuery::new()
			.sort(SortField::Year, SortOrder::Desc)
			.paginate(3, 20)
			.build();
		assert!(sql.ends_with("ORDER BY `c`.`year` DESC LIMIT ? OFFSET ?"), "{sql}");
		assert_eq!(
			values.0,
			vec![Value::BigUnsigned(Some(20)), Value::BigUnsigned(Some(40))]
		);
	}

	#[test]
	fn empty_inputs_are_ignored() {
		let query = ContentQuery::new()
			.filter_by_genres([])
			.filter_by_countries(Vec::new())
			.filter_by_years(None, None)
			.filter_by_lgbt(None)
			.search("   ", &SearchField::ALL)
			.search("x", &[]);
		assert_eq!(query, ContentQuery::new());
	}

	#[test]
	fn reapplying_a_facet_replaces_it() {
		let twice = ContentQuery::new()
			.filter_by_years(Some(1980), None)
			.filter_by_years(Some(2000), Some(2010));
		let once = ContentQuery::new().filter_by_years(Some(2000), Some(2010));
		assert_eq!(twice.build(), once.build());

		let same = ContentQuery::new()
			.filter_by_countries([1, 2])
			.filter_by_countries([1, 2]);
		assert_eq!(same.build().1.0.len(), 2);
	}

	#[test]
	fn zero_page_is_first_page() {
		let page = ContentQuery::new().paginate(0, 0).page();
		assert_eq!(page, Some(Page { page: 1, per_page: 1 }));
	}

	#[test]
	fn rating_source_round_trip() {
		for source in RatingSource::ALL {
			assert_eq!(source.as_str().parse::<RatingSource>(), Ok(source));
		}
		assert!("rotten".parse::<RatingSource>().is_err());
	}
}
