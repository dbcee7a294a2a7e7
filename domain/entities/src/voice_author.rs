use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "voice_authors")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = false)]
	pub id: i64,
	pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::content_voice_author::Entity")]
	ContentVoiceAuthor,
}

impl Related<super::content::Entity> for Entity {
	fn to() -> RelationDef {
		super::content_voice_author::Relation::Content.def()
	}

	fn via() -> Option<RelationDef> {
		Some(super::content_voice_author::Relation::VoiceAuthor.def().rev())
	}
}

impl ActiveModelBehavior for ActiveModel {}
