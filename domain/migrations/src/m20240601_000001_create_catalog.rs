use crate::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(ContentTypes::Table)
					.col(
						ColumnDef::new(ContentTypes::Id)
							.big_integer()
							.not_null()
							.primary_key(),
					)
					.col(ColumnDef::new(ContentTypes::Name).string_len(255).not_null())
					.col(ColumnDef::new(ContentTypes::Slug).string_len(255).not_null())
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name(Indices::ContentTypeSlug)
					.table(ContentTypes::Table)
					.col(ContentTypes::Slug)
					.unique()
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Genres::Table)
					.col(ColumnDef::new(Genres::Id).big_integer().not_null().primary_key())
					.col(ColumnDef::new(Genres::Name).string_len(255).not_null())
					.col(ColumnDef::new(Genres::Slug).string_len(255).null())
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Countries::Table)
					.col(
						ColumnDef::new(Countries::Id)
							.big_integer()
							.not_null()
							.primary_key(),
					)
					.col(ColumnDef::new(Countries::Name).string_len(255).not_null())
					.col(ColumnDef::new(Countries::Slug).string_len(255).null())
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(VoiceAuthors::Table)
					.col(
						ColumnDef::new(VoiceAuthors::Id)
							.big_integer()
							.not_null()
							.primary_key(),
					)
					.col(ColumnDef::new(VoiceAuthors::Name).string_len(255).not_null())
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(Contents::Table)
					.col(ColumnDef::new(Contents::Id).big_integer().not_null().primary_key())
					.col(ColumnDef::new(Contents::ContentTypeId).big_integer().null())
					.col(ColumnDef::new(Contents::Title).string_len(255).not_null())
					.col(ColumnDef::new(Contents::OriginalTitle).string_len(255).null())
					.col(ColumnDef::new(Contents::Description).text().null())
					.col(ColumnDef::new(Contents::PosterUrl).string_len(500).null())
					.col(ColumnDef::new(Contents::Year).integer().null())
					.col(ColumnDef::new(Contents::EndYear).integer().null())
					.col(ColumnDef::new(Contents::Duration).integer().null())
					.col(ColumnDef::new(Contents::AgeRestriction).string_len(20).null())
					.col(ColumnDef::new(Contents::KinopoiskId).big_integer().null())
					.col(ColumnDef::new(Contents::ImdbId).string_len(50).null())
					.col(ColumnDef::new(Contents::Cast).text().null())
					.col(ColumnDef::new(Contents::Directors).text().null())
					.col(ColumnDef::new(Contents::Screenwriters).text().null())
					.col(ColumnDef::new(Contents::Producers).text().null())
					.col(ColumnDef::new(Contents::Operators).text().null())
					.col(ColumnDef::new(Contents::Composers).text().null())
					.col(ColumnDef::new(Contents::Artists).text().null())
					.col(ColumnDef::new(Contents::Editors).text().null())
					.col(ColumnDef::new(Contents::VideoQuality).string_len(50).null())
					.col(ColumnDef::new(Contents::SeasonsCount).integer().null())
					.col(ColumnDef::new(Contents::EpisodesCount).integer().null())
					.col(
						ColumnDef::new(Contents::IsLgbt)
							.boolean()
							.not_null()
							.default(false),
					)
					.col(ColumnDef::new(Contents::PlayerUrl).string_len(500).null())
					.col(ColumnDef::new(Contents::CreatedAt).date_time().null())
					.col(ColumnDef::new(Contents::UpdatedAt).date_time().null())
					.foreign_key(
						ForeignKey::create()
							.name(ForeignKeys::ContentContentTypeId)
							.from(Contents::Table, Contents::ContentTypeId)
							.to(ContentTypes::Table, ContentTypes::Id)
							.on_update(ForeignKeyAction::Cascade)
							.on_delete(ForeignKeyAction::SetNull),
					)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(Contents::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(VoiceAuthors::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Countries::Table).to_owned())
			.await?;

		manager
			.drop_table(Table::drop().table(Genres::Table).to_owned())
			.await?;

		manager
			.drop_index(
				Index::drop()
					.name(Indices::ContentTypeSlug)
					.table(ContentTypes::Table)
					.to_owned(),
			)
			.await?;

		manager
			.drop_table(Table::drop().table(ContentTypes::Table).to_owned())
			.await?;

		Ok(())
	}
}

enum Indices {
	ContentTypeSlug,
}

impl From<Indices> for String {
	fn from(val: Indices) -> Self {
		match val {
			Indices::ContentTypeSlug => "ux-content_types_slug".to_owned(),
		}
	}
}

enum ForeignKeys {
	ContentContentTypeId,
}

impl From<ForeignKeys> for String {
	fn from(val: ForeignKeys) -> Self {
		match val {
			ForeignKeys::ContentContentTypeId => "fk-contents_content_type_id".to_owned(),
		}
	}
}
