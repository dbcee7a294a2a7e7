use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Rating of a content item from one source (imdb, kinopoisk, ...). Unique
/// per `(content_id, source)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
	#[sea_orm(primary_key)]
	#[serde(skip)]
	pub id: i32,
	pub content_id: i64,
	pub source: String,
	pub rating: Option<f64>,
	pub votes: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::content::Entity",
		from = "Column::ContentId",
		to = "super::content::Column::Id",
		on_delete = "Cascade"
	)]
	Content,
}

impl Related<super::content::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Content.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
