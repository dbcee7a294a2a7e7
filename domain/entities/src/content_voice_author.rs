use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content_voice_authors")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub content_id: i64,
	#[sea_orm(primary_key, auto_increment = false)]
	pub voice_author_id: i64,
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
		belongs_to = "super::voice_author::Entity",
		from = "Column::VoiceAuthorId",
		to = "super::voice_author::Column::Id",
		on_delete = "Cascade"
	)]
	VoiceAuthor,
}

impl Related<super::content::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Content.def()
	}
}

impl Related<super::voice_author::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::VoiceAuthor.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
