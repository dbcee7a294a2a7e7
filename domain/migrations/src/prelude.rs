pub use crate::tables::*;
pub use sea_orm_migration::prelude::*;
