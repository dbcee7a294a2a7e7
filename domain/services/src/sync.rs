use async_trait::async_trait;
use catalog_client::{
	CatalogClient, CatalogContent, CatalogError, CatalogPerson, CatalogTag, ContentPage, PageItem,
};
use indexmap::IndexMap;
use moviedb_entities::{
	content, content_country, content_genre, content_type, content_voice_author, country, genre,
	rating, season, voice_author,
};
use moviedb_utils::parse_catalog_timestamp;
use sea_orm::{
	sea_query::OnConflict, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
	EntityTrait, Iterable, QueryFilter, TransactionError, TransactionTrait,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Anything that can hand out catalog pages, numbered from 1.
#[async_trait]
pub trait ContentSource: Send + Sync {
	async fn fetch_page(&self, page: u32) -> Result<ContentPage, CatalogError>;
}

#[async_trait]
impl ContentSource for CatalogClient {
	async fn fetch_page(&self, page: u32) -> Result<ContentPage, CatalogError> {
		CatalogClient::fetch_page(self, page).await
	}
}

#[derive(Debug, Error)]
pub enum SyncError {
	#[error("failed to fetch catalog page: {0}")]
	Fetch(#[from] CatalogError),

	#[error(transparent)]
	DbErr(#[from] DbErr),
}

impl From<TransactionError<SyncError>> for SyncError {
	fn from(value: TransactionError<SyncError>) -> Self {
		match value {
			TransactionError::Connection(db) => db.into(),
			TransactionError::Transaction(inner) => inner,
		}
	}
}

/// Why an upstream item was not stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
	#[error("missing id")]
	MissingId,
	#[error("missing title")]
	MissingTitle,
	#[error("missing year")]
	MissingYear,
	#[error("missing duration")]
	MissingDuration,
	#[error("missing content type")]
	MissingContentType,
	#[error("could not decode entry: {0}")]
	Malformed(String),
}

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
	/// Pause before fetching every page after the first.
	pub page_delay: Duration,
}

impl Default for SyncOptions {
	fn default() -> Self {
		Self {
			page_delay: Duration::from_millis(2000),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
	pub pages: u32,
	pub synced: usize,
	pub skipped: usize,
	pub failed: usize,
}

pub struct CatalogSync<S> {
	db: DatabaseConnection,
	source: S,
	options: SyncOptions,
}

impl<S: ContentSource> CatalogSync<S> {
	pub fn new(db: DatabaseConnection, source: S) -> Self {
		Self {
			db,
			source,
			options: SyncOptions::default(),
		}
	}

	pub fn with_options(mut self, options: SyncOptions) -> Self {
		self.options = options;
		self
	}

	/// Pulls every page of the catalog into the database.
	///
	/// Items are stored one transaction each; an item that fails is logged and
	/// counted and the run moves on. Failing to fetch a page ends the run.
	pub async fn run(&self) -> Result<SyncReport, SyncError> {
		let mut report = SyncReport::default();

		let first = self.source.fetch_page(1).await?;
		let pages = first.meta.pages;
		info!(pages, total = first.meta.total, "starting catalog sync");

		if pages == 0 {
			info!("catalog is empty");
			return Ok(report);
		}

		self.sync_page(1, first, &mut report).await;
		for page in 2..=pages {
			tokio::time::sleep(self.options.page_delay).await;
			let items = self.source.fetch_page(page).await?;
			self.sync_page(page, items, &mut report).await;
		}

		info!(
			pages = report.pages,
			synced = report.synced,
			skipped = report.skipped,
			failed = report.failed,
			"catalog sync finished"
		);

		Ok(report)
	}

	async fn sync_page(&self, page: u32, contents: ContentPage, report: &mut SyncReport) {
		info!(page, items = contents.items.len(), "syncing page");

		for item in contents.items {
			let valid = match item {
				PageItem::Malformed(malformed) => {
					Err((malformed.id, InvalidReason::Malformed(malformed.reason)))
				}
				PageItem::Content(content) => {
					let id = content.id;
					ValidContent::try_from(*content).map_err(|reason| (id, reason))
				}
			};

			let content = match valid {
				Ok(content) => content,
				Err((id, reason)) => {
					warn!(page, content_id = ?id, %reason, "skipping catalog item");
					report.skipped += 1;
					continue;
				}
			};

			let id = content.id;
			let result = self
				.db
				.transaction::<_, (), SyncError>(move |tx| Box::pin(store_content(tx, content)))
				.await
				.map_err(SyncError::from);

			match result {
				Ok(()) => report.synced += 1,
				Err(e) => {
					error!(page, content_id = id, error = %e, "failed to store catalog item");
					report.failed += 1;
				}
			}
		}

		report.pages += 1;
	}
}

/// An upstream item with every required field present.
struct ValidContent {
	id: i64,
	title: String,
	year: i32,
	duration: i32,
	type_id: i64,
	content_type: content_type::ActiveModel,
	item: CatalogContent,
}

impl TryFrom<CatalogContent> for ValidContent {
	type Error = InvalidReason;

	fn try_from(mut item: CatalogContent) -> Result<Self, Self::Error> {
		use sea_orm::ActiveValue::Set;

		let id = item.id.filter(|id| *id != 0).ok_or(InvalidReason::MissingId)?;
		let title = item.title.take().ok_or(InvalidReason::MissingTitle)?;
		let year = item.year.filter(|y| *y != 0).ok_or(InvalidReason::MissingYear)?;
		let duration = item.duration.ok_or(InvalidReason::MissingDuration)?;
		let content_type = item.content_type.take().unwrap_or_default();
		let type_id = content_type
			.id
			.filter(|id| *id != 0)
			.ok_or(InvalidReason::MissingContentType)?;

		Ok(Self {
			id,
			title,
			year,
			duration,
			type_id,
			content_type: content_type::ActiveModel {
				id: Set(type_id),
				name: Set(content_type.name.unwrap_or_default()),
				slug: Set(content_type.slug.unwrap_or_else(|| type_id.to_string())),
			},
			item,
		})
	}
}

fn dedup_tags(tags: Vec<CatalogTag>) -> IndexMap<i64, CatalogTag> {
	tags.into_iter()
		.filter_map(|tag| tag.id.map(|id| (id, tag)))
		.collect()
}

fn dedup_people(people: Vec<CatalogPerson>) -> IndexMap<i64, CatalogPerson> {
	people
		.into_iter()
		.filter_map(|person| person.id.map(|id| (id, person)))
		.collect()
}

#[instrument(skip_all, fields(content_id = content.id))]
async fn store_content(tx: &DatabaseTransaction, content: ValidContent) -> Result<(), SyncError> {
	use sea_orm::ActiveValue::{NotSet, Set};

	let ValidContent {
		id,
		title,
		year,
		duration,
		type_id,
		content_type,
		item,
	} = content;

	content_type::Entity::insert(content_type)
		.on_conflict(
			OnConflict::column(content_type::Column::Id)
				.update_columns([content_type::Column::Name, content_type::Column::Slug])
				.to_owned(),
		)
		.exec_without_returning(tx)
		.await?;

	let row = content::ActiveModel {
		id: Set(id),
		content_type_id: Set(Some(type_id)),
		title: Set(title),
		original_title: Set(item.original_title),
		description: Set(item.description),
		poster_url: Set(item.poster_url),
		year: Set(Some(year)),
		end_year: Set(item.end_year),
		duration: Set(Some(duration)),
		age_restriction: Set(item.age_restriction),
		kinopoisk_id: Set(item.kinopoisk_id),
		imdb_id: Set(item.imdb_id),
		cast: Set(item.cast),
		directors: Set(item.directors),
		screenwriters: Set(item.screenwriters),
		producers: Set(item.producers),
		operators: Set(item.operators),
		composers: Set(item.composers),
		artists: Set(item.artists),
		editors: Set(item.editors),
		video_quality: Set(item.video_quality),
		seasons_count: Set(item.seasons_count),
		episodes_count: Set(item.episodes_count),
		is_lgbt: Set(item.is_lgbt.unwrap_or(false)),
		player_url: Set(item.player_url),
		created_at: Set(item.created_at.as_deref().and_then(parse_catalog_timestamp)),
		updated_at: Set(item.updated_at.as_deref().and_then(parse_catalog_timestamp)),
	};

	content::Entity::insert(row)
		.on_conflict(
			OnConflict::column(content::Column::Id)
				.update_columns(content::Column::iter().filter(|c| !matches!(c, content::Column::Id)))
				.to_owned(),
		)
		.exec_without_returning(tx)
		.await?;

	let genres = dedup_tags(item.genres);
	if !genres.is_empty() {
		genre::Entity::insert_many(genres.iter().map(|(id, tag)| genre::ActiveModel {
			id: Set(*id),
			name: Set(tag.name.clone().unwrap_or_default()),
			slug: Set(tag.slug.clone()),
		}))
		.on_conflict(
			OnConflict::column(genre::Column::Id)
				.update_columns([genre::Column::Name, genre::Column::Slug])
				.to_owned(),
		)
		.exec_without_returning(tx)
		.await?;
	}

	let countries = dedup_tags(item.countries);
	if !countries.is_empty() {
		country::Entity::insert_many(countries.iter().map(|(id, tag)| country::ActiveModel {
			id: Set(*id),
			name: Set(tag.name.clone().unwrap_or_default()),
			slug: Set(tag.slug.clone()),
		}))
		.on_conflict(
			OnConflict::column(country::Column::Id)
				.update_columns([country::Column::Name, country::Column::Slug])
				.to_owned(),
		)
		.exec_without_returning(tx)
		.await?;
	}

	let voice_authors = dedup_people(item.voice_authors);
	if !voice_authors.is_empty() {
		voice_author::Entity::insert_many(voice_authors.iter().map(|(id, person)| {
			voice_author::ActiveModel {
				id: Set(*id),
				name: Set(person.name.clone().unwrap_or_default()),
			}
		}))
		.on_conflict(
			OnConflict::column(voice_author::Column::Id)
				.update_column(voice_author::Column::Name)
				.to_owned(),
		)
		.exec_without_returning(tx)
		.await?;
	}

	content_genre::Entity::delete_many()
		.filter(content_genre::Column::ContentId.eq(id))
		.exec(tx)
		.await?;
	if !genres.is_empty() {
		content_genre::Entity::insert_many(genres.keys().map(|genre_id| content_genre::ActiveModel {
			content_id: Set(id),
			genre_id: Set(*genre_id),
		}))
		.exec_without_returning(tx)
		.await?;
	}

	content_country::Entity::delete_many()
		.filter(content_country::Column::ContentId.eq(id))
		.exec(tx)
		.await?;
	if !countries.is_empty() {
		content_country::Entity::insert_many(countries.keys().map(|country_id| {
			content_country::ActiveModel {
				content_id: Set(id),
				country_id: Set(*country_id),
			}
		}))
		.exec_without_returning(tx)
		.await?;
	}

	content_voice_author::Entity::delete_many()
		.filter(content_voice_author::Column::ContentId.eq(id))
		.exec(tx)
		.await?;
	if !voice_authors.is_empty() {
		content_voice_author::Entity::insert_many(voice_authors.keys().map(|author_id| {
			content_voice_author::ActiveModel {
				content_id: Set(id),
				voice_author_id: Set(*author_id),
			}
		}))
		.exec_without_returning(tx)
		.await?;
	}

	let ratings = item
		.ratings
		.into_iter()
		.filter(|(_, r)| r.rating.is_some() || r.votes.is_some())
		.map(|(source, r)| rating::ActiveModel {
			id: NotSet,
			content_id: Set(id),
			source: Set(source),
			rating: Set(r.rating),
			votes: Set(r.votes),
		})
		.collect::<Vec<_>>();
	if !ratings.is_empty() {
		rating::Entity::insert_many(ratings)
			.on_conflict(
				OnConflict::columns([rating::Column::ContentId, rating::Column::Source])
					.update_columns([rating::Column::Rating, rating::Column::Votes])
					.to_owned(),
			)
			.exec_without_returning(tx)
			.await?;
	}

	let seasons = item
		.episodes_by_season
		.into_iter()
		.filter_map(|(number, episodes)| {
			let number = number.trim().parse::<i32>().ok()?;
			Some(season::ActiveModel {
				content_id: Set(id),
				season_number: Set(number),
				episodes_count: Set(episodes?),
			})
		})
		.collect::<Vec<_>>();
	if !seasons.is_empty() {
		season::Entity::insert_many(seasons)
			.on_conflict(
				OnConflict::columns([season::Column::ContentId, season::Column::SeasonNumber])
					.update_column(season::Column::EpisodesCount)
					.to_owned(),
			)
			.exec_without_returning(tx)
			.await?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use catalog_client::CatalogContentType;

	fn item() -> CatalogContent {
		CatalogContent {
			id: Some(1),
			title: Some("Heat".into()),
			year: Some(1995),
			duration: Some(170),
			content_type: Some(CatalogContentType {
				id: Some(1),
				name: Some("Movie".into()),
				slug: None,
			}),
			..Default::default()
		}
	}

	fn reason(item: CatalogContent) -> Option<InvalidReason> {
		ValidContent::try_from(item).err()
	}

	#[test]
	fn complete_item_is_valid() {
		let valid = ValidContent::try_from(item()).unwrap();
		assert_eq!(valid.id, 1);
		assert_eq!(valid.title, "Heat");
		assert_eq!(valid.content_type.slug.unwrap(), "1");
	}

	#[test]
	fn required_fields() {
		assert_eq!(
			reason(CatalogContent { id: None, ..item() }),
			Some(InvalidReason::MissingId)
		);
		assert_eq!(
			reason(CatalogContent { id: Some(0), ..item() }),
			Some(InvalidReason::MissingId)
		);
		assert_eq!(
			reason(CatalogContent { title: None, ..item() }),
			Some(InvalidReason::MissingTitle)
		);
		assert_eq!(
			reason(CatalogContent { year: Some(0), ..item() }),
			Some(InvalidReason::MissingYear)
		);
		assert_eq!(
			reason(CatalogContent { duration: None, ..item() }),
			Some(InvalidReason::MissingDuration)
		);
		assert_eq!(
			reason(CatalogContent {
				content_type: Some(CatalogContentType::default()),
				..item()
			}),
			Some(InvalidReason::MissingContentType)
		);
	}

	#[test]
	fn zero_duration_is_accepted() {
		assert!(reason(CatalogContent { duration: Some(0), ..item() }).is_none());
	}

	#[test]
	fn duplicate_relation_ids_collapse() {
		let tags = vec![
			CatalogTag { id: Some(3), name: Some("Crime".into()), slug: None },
			CatalogTag { id: None, name: Some("Orphan".into()), slug: None },
			CatalogTag { id: Some(3), name: Some("Crime".into()), slug: None },
			CatalogTag { id: Some(5), name: None, slug: None },
		];

		let deduped = dedup_tags(tags);
		assert_eq!(deduped.keys().copied().collect::<Vec<_>>(), vec![3, 5]);
	}
}
