//! Lookup repository backing display-parameter derivation.

use folio_core::enrichment::{LookupError, LookupService};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

use crate::entities::{charge_types, lookup_months, organization_profile, settlements};

/// Resolves codes to display names from the lookup tables.
#[derive(Debug, Clone)]
pub struct LookupRepository {
    db: DatabaseConnection,
}

impl LookupRepository {
    /// Creates a new lookup repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn month(&self, month: u32) -> Result<lookup_months::Model, LookupError> {
        let id = i16::try_from(month).map_err(|_| LookupError::not_found("month", month))?;
        lookup_months::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| LookupError::not_found("month", month))
    }
}

impl LookupService for LookupRepository {
    async fn month_name(&self, month: u32) -> Result<String, LookupError> {
        Ok(self.month(month).await?.name)
    }

    async fn period_name(&self, month: u32) -> Result<String, LookupError> {
        Ok(self.month(month).await?.period_name)
    }

    async fn charge_type_name(&self, code: &str) -> Result<String, LookupError> {
        charge_types::Entity::find_by_id(code.trim().to_string())
            .one(&self.db)
            .await
            .map_err(unavailable)?
            .map(|row| row.name)
            .ok_or_else(|| LookupError::not_found("charge type", code))
    }

    async fn settlement_name(&self, code: &str) -> Result<String, LookupError> {
        settlements::Entity::find_by_id(code.trim().to_string())
            .one(&self.db)
            .await
            .map_err(unavailable)?
            .map(|row| row.name)
            .ok_or_else(|| LookupError::not_found("settlement", code))
    }

    async fn organization_name(&self) -> Result<String, LookupError> {
        organization_profile::Entity::find_by_id(1_i16)
            .one(&self.db)
            .await
            .map_err(unavailable)?
            .map(|row| row.name)
            .ok_or_else(|| LookupError::Unavailable("No organization profile configured".into()))
    }
}

fn unavailable(error: DbErr) -> LookupError {
    LookupError::Unavailable(error.to_string())
}
