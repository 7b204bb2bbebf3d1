//! Lookup collaborator port.

use super::error::LookupError;

/// Resolves codes to display names.
///
/// Each call is independently failable.
pub trait LookupService: Send + Sync {
    /// Display name of a month (1-12).
    fn month_name(
        &self,
        month: u32,
    ) -> impl std::future::Future<Output = Result<String, LookupError>> + Send;

    /// Display name of the period containing a month (1-12).
    fn period_name(
        &self,
        month: u32,
    ) -> impl std::future::Future<Output = Result<String, LookupError>> + Send;

    /// Display name of a charge type.
    fn charge_type_name(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<String, LookupError>> + Send;

    /// Display name of a settlement.
    fn settlement_name(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<String, LookupError>> + Send;

    /// Display name of the issuing organization.
    fn organization_name(
        &self,
    ) -> impl std::future::Future<Output = Result<String, LookupError>> + Send;
}
