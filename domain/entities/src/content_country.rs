use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content_countries")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub content_id: i64,
	#[sea_orm(primary_key, auto_increment = false)]
	pub country_id: i64,
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
	#[sea_orm(
		belongs_to = "super::country::Entity",
		from = "Column::CountryId",
		to = "super::country::Column::Id",
		on_delete = "Cascade"
	)]
	Country,
}

impl Related<super::content::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Content.def()
	}
}

impl Related<super::country::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Country.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
