use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content_genres")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub content_id: i64,
	#[sea_orm(primary_key, auto_increment = false)]
	pub genre_id: i64,
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
		belongs_to = "super::genre::Entity",
		from = "Column::GenreId",
		to = "super::genre::Column::Id",
		on_delete = "Cascade"
	)]
	Genre,
}

impl Related<super::content::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Content.def()
	}
}

impl Related<super::genre::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Genre.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
