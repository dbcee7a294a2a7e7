use crate::{content::ContentServiceError, macros::define_service};
use moviedb_entities::{content, content_type};
use sea_orm::{
	ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
	QuerySelect, Select,
};
use serde::Serialize;
use tracing::instrument;

define_service! {
	#[derive(Clone)]
	pub struct ContentTypeService {
		pub db: DatabaseConnection,
	}
}

/// Sort keys accepted when browsing one content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeSortField {
	#[default]
	Year,
	Title,
	CreatedAt,
}

impl TypeSortField {
	/// Unknown names fall back to year.
	pub fn parse_lenient(value: Option<&str>) -> Self {
		match value {
			Some("title") => Self::Title,
			Some("created_at") => Self::CreatedAt,
			_ => Self::Year,
		}
	}

	fn column(&self) -> content::Column {
		match self {
			Self::Year => content::Column::Year,
			Self::Title => content::Column::Title,
			Self::CreatedAt => content::Column::CreatedAt,
		}
	}
}

#[derive(Debug, Clone)]
pub struct TypeContentsQuery {
	pub limit: u64,
	pub offset: u64,
	pub year: Option<i32>,
	pub sort_by: TypeSortField,
	pub ascending: bool,
}

impl Default for TypeContentsQuery {
	fn default() -> Self {
		Self {
			limit: 20,
			offset: 0,
			year: None,
			sort_by: TypeSortField::Year,
			ascending: false,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeContents {
	pub content_type: content_type::Model,
	pub data: Vec<content::Model>,
	pub total: u64,
}

impl ContentTypeService {
	pub fn new(db: DatabaseConnection) -> Self {
		Self { db }
	}

	pub async fn list(&self) -> Result<Vec<content_type::Model>, ContentServiceError> {
		Ok(content_type::Entity::find()
			.order_by_asc(content_type::Column::Id)
			.all(&self.db)
			.await?)
	}

	pub async fn get_by_slug(&self, slug: &str) -> Result<Option<content_type::Model>, ContentServiceError> {
		Ok(content_type::Entity::find()
			.filter(content_type::Column::Slug.eq(slug))
			.one(&self.db)
			.await?)
	}

	/// Content of the type identified by `slug`, or `None` if there is no such type.
	#[instrument(skip(self))]
	pub async fn get_contents(
		&self,
		slug: &str,
		query: &TypeContentsQuery,
	) -> Result<Option<TypeContents>, ContentServiceError> {
		let content_type = match self.get_by_slug(slug).await? {
			None => return Ok(None),
			Some(content_type) => content_type,
		};

		let filtered = || -> Select<content::Entity> {
			let mut select =
				content::Entity::find().filter(content::Column::ContentTypeId.eq(content_type.id));
			if let Some(year) = query.year {
				select = select.filter(content::Column::Year.eq(year));
			}
			select
		};

		let column = query.sort_by.column();
		let ordered = if query.ascending {
			filtered().order_by_asc(column)
		} else {
			filtered().order_by_desc(column)
		};

		let (data, total) = futures::try_join!(
			ordered.limit(query.limit).offset(query.offset).all(&self.db),
			filtered().count(&self.db),
		)?;

		Ok(Some(TypeContents {
			content_type,
			data,
			total,
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_sort_falls_back_to_year() {
		assert_eq!(TypeSortField::parse_lenient(None), TypeSortField::Year);
		assert_eq!(TypeSortField::parse_lenient(Some("rating")), TypeSortField::Year);
		assert_eq!(TypeSortField::parse_lenient(Some("title")), TypeSortField::Title);
		assert_eq!(
			TypeSortField::parse_lenient(Some("created_at")),
			TypeSortField::CreatedAt
		);
	}
}
