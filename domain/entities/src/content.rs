use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A catalog entry (movie, series, anime, ...). The primary key is the id
/// assigned by the upstream catalog.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "contents")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub id: i64,
	pub content_type_id: Option<i64>,
	pub title: String,
	pub original_title: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub description: Option<String>,
	pub poster_url: Option<String>,
	pub year: Option<i32>,
	pub end_year: Option<i32>,
	pub duration: Option<i32>,
	pub age_restriction: Option<String>,
	pub kinopoisk_id: Option<i64>,
	pub imdb_id: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub cast: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub directors: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub screenwriters: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub producers: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub operators: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub composers: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub artists: Option<String>,
	#[sea_orm(column_type = "Text", nullable)]
	pub editors: Option<String>,
	pub video_quality: Option<String>,
	pub seasons_count: Option<i32>,
	pub episodes_count: Option<i32>,
	pub is_lgbt: bool,
	pub player_url: Option<String>,
	pub created_at: Option<TimeDateTime>,
	pub updated_at: Option<TimeDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::content_type::Entity",
		from = "Column::ContentTypeId",
		to = "super::content_type::Column::Id"
	)]
	ContentType,
	#[sea_orm(has_many = "super::content_genre::Entity")]
	ContentGenre,
	#[sea_orm(has_many = "super::content_country::Entity")]
	ContentCountry,
	#[sea_orm(has_many = "super::content_voice_author::Entity")]
	ContentVoiceAuthor,
	#[sea_orm(has_many = "super::rating::Entity")]
	Rating,
	#[sea_orm(has_many = "super::season::Entity")]
	Season,
}

impl Related<super::content_type::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::ContentType.def()
	}
}

impl Related<super::rating::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Rating.def()
	}
}

impl Related<super::season::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Season.def()
	}
}

impl Related<super::genre::Entity> for Entity {
	fn to() -> RelationDef {
		super::content_genre::Relation::Genre.def()
	}

	fn via() -> Option<RelationDef> {
		Some(super::content_genre::Relation::Content.def().rev())
	}
}

impl Related<super::country::Entity> for Entity {
	fn to() -> RelationDef {
		super::content_country::Relation::Country.def()
	}

	fn via() -> Option<RelationDef> {
		Some(super::content_country::Relation::Content.def().rev())
	}
}

impl Related<super::voice_author::Entity> for Entity {
	fn to() -> RelationDef {
		super::content_voice_author::Relation::VoiceAuthor.def()
	}

	fn via() -> Option<RelationDef> {
		Some(super::content_voice_author::Relation::Content.def().rev())
	}
}

impl ActiveModelBehavior for ActiveModel {}
