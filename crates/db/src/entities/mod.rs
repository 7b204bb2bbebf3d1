//! `SeaORM` entities for the report catalog, lookup tables and issue log.

pub mod charge_types;
pub mod column_mappings;
pub mod lookup_months;
pub mod organization_profile;
pub mod report_definitions;
pub mod report_issues;
pub mod report_templates;
pub mod settlements;
