//! `SeaORM` Entity for column_mappings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "column_mappings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Lowercased `;`-joined source list the mapping applies to.
    pub sources_key: String,
    /// Table the label is scoped to; `None` for table-agnostic labels.
    pub table_name: Option<String>,
    pub column_name: String,
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
