use crate::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CONTENTS_YEAR: &str = "ix-contents_year";
const CONTENTS_TITLE: &str = "ix-contents_title";
const CONTENTS_CREATED_AT: &str = "ix-contents_created_at";
const CONTENTS_CONTENT_TYPE_YEAR: &str = "ix-contents_content_type_id_year";
const CONTENT_GENRES_GENRE: &str = "ix-content_genres_genre_id";
const CONTENT_COUNTRIES_COUNTRY: &str = "ix-content_countries_country_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_index(
				Index::create()
					.name(CONTENTS_YEAR)
					.table(Contents::Table)
					.col(Contents::Year)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name(CONTENTS_TITLE)
					.table(Contents::Table)
					.col(Contents::Title)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name(CONTENTS_CREATED_AT)
					.table(Contents::Table)
					.col(Contents::CreatedAt)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name(CONTENTS_CONTENT_TYPE_YEAR)
					.table(Contents::Table)
					.col(Contents::ContentTypeId)
					.col(Contents::Year)
					.to_owned(),
			)
			.await?;

		// the composite primary keys lead with content_id, lookups by facet id need their own index
		manager
			.create_index(
				Index::create()
					.name(CONTENT_GENRES_GENRE)
					.table(ContentGenres::Table)
					.col(ContentGenres::GenreId)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name(CONTENT_COUNTRIES_COUNTRY)
					.table(ContentCountries::Table)
					.col(ContentCountries::CountryId)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_index(Index::drop().name(CONTENT_COUNTRIES_COUNTRY).table(ContentCountries::Table).to_owned())
			.await?;

		manager
			.drop_index(Index::drop().name(CONTENT_GENRES_GENRE).table(ContentGenres::Table).to_owned())
			.await?;

		manager
			.drop_index(Index::drop().name(CONTENTS_CONTENT_TYPE_YEAR).table(Contents::Table).to_owned())
			.await?;

		manager
			.drop_index(Index::drop().name(CONTENTS_CREATED_AT).table(Contents::Table).to_owned())
			.await?;

		manager
			.drop_index(Index::drop().name(CONTENTS_TITLE).table(Contents::Table).to_owned())
			.await?;

		manager
			.drop_index(Index::drop().name(CONTENTS_YEAR).table(Contents::Table).to_owned())
			.await?;

		Ok(())
	}
}
