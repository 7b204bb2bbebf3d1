//! `SeaORM` Entity for lookup_months table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lookup_months")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub month: i16,
    pub name: String,
    pub period_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
