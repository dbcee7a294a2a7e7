use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "content_seasons")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	#[serde(skip)]
	pub content_id: i64,
	#[sea_orm(primary_key, auto_increment = false)]
	pub season_number: i32,
	pub episodes_count: i32,
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
