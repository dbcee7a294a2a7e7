pub use sea_orm_migration::prelude::*;
pub mod prelude;

mod tables;

mod m20240601_000001_create_catalog;
mod m20240601_000002_relations;
mod m20240612_000001_filter_indices;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
	fn migrations() -> Vec<Box<dyn MigrationTrait>> {
		vec![
			Box::new(m20240601_000001_create_catalog::Migration),
			Box::new(m20240601_000002_relations::Migration),
			Box::new(m20240612_000001_filter_indices::Migration),
		]
	}
}
