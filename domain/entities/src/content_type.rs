use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "content_types")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub id: i64,
	pub name: String,
	#[sea_orm(unique)]
	pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::content::Entity")]
	Content,
}

impl Related<super::content::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Content.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
