//! Application configuration management.

use serde::Deserialize;

use crate::types::Severity;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Error arbitration thresholds.
    #[serde(default)]
    pub arbitration: ArbitrationConfig,
    /// Parameter names and labels used by enrichment.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// Rendering and output backend settings.
    #[serde(default)]
    pub rendering: RenderingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Upper bound for a single data-source call, in seconds.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_query_timeout() -> u64 {
    120
}

/// Thresholds deciding persistence and continuation of reported issues.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ArbitrationConfig {
    /// Issues at or above this severity are persisted.
    #[serde(default = "default_log_threshold")]
    pub log_threshold: Severity,
    /// Issues at or above this severity stop the current report.
    #[serde(default = "default_break_threshold")]
    pub break_threshold: Severity,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            log_threshold: default_log_threshold(),
            break_threshold: default_break_threshold(),
        }
    }
}

const fn default_log_threshold() -> Severity {
    Severity::Warning
}

const fn default_break_threshold() -> Severity {
    Severity::Error
}

/// Names of the parameters read and written by enrichment, and fixed labels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Month number parameter (1-12).
    pub month_param: String,
    /// Derived month display name.
    pub month_name_param: String,
    /// Derived containing-period display name.
    pub period_name_param: String,
    /// Single charge-type code parameter.
    pub charge_type_param: String,
    /// Comma-separated charge-type list parameter.
    pub charge_type_list_param: String,
    /// Derived charge-type display name.
    pub charge_type_name_param: String,
    /// Label used when several charge types are selected.
    pub multiple_charge_types_label: String,
    /// Label used when no charge type is selected.
    pub all_charge_types_label: String,
    /// Single settlement code parameter.
    pub settlement_param: String,
    /// Comma-separated settlement list parameter.
    pub settlement_list_param: String,
    /// Derived settlement display name.
    pub settlement_name_param: String,
    /// Label used when several settlements are selected.
    pub multiple_settlements_label: String,
    /// Label used when no settlement is selected.
    pub all_settlements_label: String,
    /// Derived organization display name.
    pub organization_name_param: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            month_param: "Month".to_string(),
            month_name_param: "MonthName".to_string(),
            period_name_param: "PeriodName".to_string(),
            charge_type_param: "ChargeType".to_string(),
            charge_type_list_param: "ChargeTypes".to_string(),
            charge_type_name_param: "ChargeTypeName".to_string(),
            multiple_charge_types_label: "Multiple charge types".to_string(),
            all_charge_types_label: "All charge types".to_string(),
            settlement_param: "Settlement".to_string(),
            settlement_list_param: "Settlements".to_string(),
            settlement_name_param: "SettlementName".to_string(),
            multiple_settlements_label: "Multiple settlements".to_string(),
            all_settlements_label: "All settlements".to_string(),
            organization_name_param: "OrganizationName".to_string(),
        }
    }
}

/// Rendering and output backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// IANA time zone used for the current date/time tokens.
    pub time_zone: String,
    /// Text of the placeholder row for an empty dataset.
    pub no_data_text: String,
    /// Text of the placeholder row for a dataset that was never produced.
    pub missing_data_text: String,
    /// Endpoint of the HTML-to-PDF rendering service.
    pub pdf_service_url: String,
    /// Request timeout for the PDF service, in seconds.
    pub pdf_timeout_secs: u64,
    /// Time-to-live of cached templates and column mappings, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            no_data_text: "No data".to_string(),
            missing_data_text: "Data not available".to_string(),
            pdf_service_url: "http://localhost:3000/render/pdf".to_string(),
            pdf_timeout_secs: 60,
            cache_ttl_secs: 300,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
