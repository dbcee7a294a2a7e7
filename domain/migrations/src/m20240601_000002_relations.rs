use crate::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const RATINGS_CONTENT_SOURCE: &str = "ux-ratings_content_id_source";

fn cascade_to_content<T>(name: &str, table: T, column: T) -> ForeignKeyCreateStatement
where
	T: IntoIden + 'static,
{
	ForeignKey::create()
		.name(name)
		.from(table, column)
		.to(Contents::Table, Contents::Id)
		.on_update(ForeignKeyAction::Cascade)
		.on_delete(ForeignKeyAction::Cascade)
		.to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(ContentGenres::Table)
					.col(ColumnDef::new(ContentGenres::ContentId).big_integer().not_null())
					.col(ColumnDef::new(ContentGenres::GenreId).big_integer().not_null())
					.primary_key(
						Index::create()
							.col(ContentGenres::ContentId)
							.col(ContentGenres::GenreId),
					)
					.foreign_key(&mut cascade_to_content(
						"fk-content_genres_content_id",
						ContentGenres::Table,
						ContentGenres::ContentId,
					))
					.foreign_key(
						ForeignKey::create()
							.name("fk-content_genres_genre_id")
							.from(ContentGenres::Table, ContentGenres::GenreId)
							.to(Genres::Table, Genres::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(ContentCountries::Table)
					.col(
						ColumnDef::new(ContentCountries::ContentId)
							.big_integer()
							.not_null(),
					)
					.col(
						ColumnDef::new(ContentCountries::CountryId)
							.big_integer()
							.not_null(),
					)
					.primary_key(
						Index::create()
							.col(ContentCountries::ContentId)
							.col(ContentCountries::CountryId),
					)
					.foreign_key(&mut cascade_to_content(
						"fk-content_countries_content_id",
						ContentCountries::Table,
						ContentCountries::ContentId,
					))
					.foreign_key(
						ForeignKey::create()
							.name("fk-content_countries_country_id")
							.from(ContentCountries::Table, ContentCountries::CountryId)
							.to(Countries::Table, Countries::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(ContentVoiceAuthors::Table)
					.col(
						ColumnDef::new(ContentVoiceAuthors::ContentId)
							.big_integer()
							.not_null(),
					)
					.col(
						ColumnDef::new(ContentVoiceAuthors::VoiceAuthorId)
							.big_integer()
							.not_null(),
					)
					.primary_key(
						Index::create()
							.col(ContentVoiceAuthors::ContentId)
							.col(ContentVoiceAuthors::VoiceAuthorId),
					)
					.foreign_key(&mut cascade_to_content(
						"fk-content_voice_authors_content_id",
						ContentVoiceAuthors::Table,
						ContentVoiceAuthors::ContentId,
					))
					.foreign_key(
						ForeignKey::create()
							.name("fk-content_voice_authors_voice_author_id")
							.from(ContentVoiceAuthors::Table, ContentVoiceAuthors::VoiceAuthorId)
							.to(VoiceAuthors::Table, VoiceAuthors::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Ratings::Table)
					.col(
						ColumnDef::new(Ratings::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Ratings::ContentId).big_integer().not_null())
					.col(ColumnDef::new(Ratings::Source).string_len(50).not_null())
					.col(ColumnDef::new(Ratings::Rating).double().null())
					.col(ColumnDef::new(Ratings::Votes).big_integer().null())
					.foreign_key(&mut cascade_to_content(
						"fk-ratings_content_id",
						Ratings::Table,
						Ratings::ContentId,
					))
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name(RATINGS_CONTENT_SOURCE)
					.table(Ratings::Table)
					.col(Ratings::ContentId)
					.col(Ratings::Source)
					.unique()
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(ContentSeasons::Table)
					.col(ColumnDef::new(ContentSeasons::ContentId).big_integer().not_null())
					.col(ColumnDef::new(ContentSeasons::SeasonNumber).integer().not_null())
					.col(ColumnDef::new(ContentSeasons::EpisodesCount).integer().not_null())
					.primary_key(
						Index::create()
							.col(ContentSeasons::ContentId)
							.col(ContentSeasons::SeasonNumber),
					)
					.foreign_key(&mut cascade_to_content(
						"fk-content_seasons_content_id",
						ContentSeasons::Table,
						ContentSeasons::ContentId,
					))
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(ContentSeasons::Table).to_owned())
			.await?;

		manager
			.drop_index(
				Index::drop()
					.name(RATINGS_CONTENT_SOURCE)
					.table(Ratings::Table)
					.to_owned(),
			)
			.await?;

		manager
			.drop_table(Table::drop().table(Ratings::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(ContentVoiceAuthors::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(ContentCountries::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(ContentGenres::Table).to_owned())
			.await?;

		Ok(())
	}
}
