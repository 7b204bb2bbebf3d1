//! Parameter enrichment.

use folio_shared::config::EnrichmentConfig;
use serde_json::Value as Json;

use super::error::{DerivationError, EnrichmentError};
use super::gap_fill::{DeclaredKind, default_for};
use super::lookup::LookupService;
use crate::aggregation::DataSource;
use crate::arbitration::{Diagnostics, codes};
use crate::params::{Parameter, ParameterMap, normalize_triples};

const MODULE: &str = "enrichment";

/// Which coded lookup a single/list/all derivation targets.
#[derive(Debug, Clone, Copy)]
enum CodedKind {
    ChargeType,
    Settlement,
}

/// Parameter names and labels of one coded derivation.
struct CodedNames<'c> {
    kind: CodedKind,
    single: &'c str,
    list: &'c str,
    target: &'c str,
    multiple_label: &'c str,
    all_label: &'c str,
}

/// Normalizes caller parameters, fills gaps and derives display parameters.
///
/// Enrichment is additive: an existing key is never overwritten, and running
/// it again on its own output changes nothing.
pub struct EnrichmentEngine<'a, D: DataSource, L: LookupService> {
    data_source: &'a D,
    lookup: &'a L,
    config: &'a EnrichmentConfig,
}

impl<'a, D: DataSource, L: LookupService> EnrichmentEngine<'a, D, L> {
    /// Creates an engine over its collaborators.
    #[must_use]
    pub const fn new(data_source: &'a D, lookup: &'a L, config: &'a EnrichmentConfig) -> Self {
        Self {
            data_source,
            lookup,
            config,
        }
    }

    /// Normalizes a flat `(name, value, type)` list and enriches it.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentError::Parameters`] for structurally invalid input
    /// and [`EnrichmentError::Halted`] if arbitration stops the report.
    pub async fn enrich(
        &self,
        report_name: &str,
        primary_source: &str,
        raw: &[Json],
        diag: &mut Diagnostics<'_>,
    ) -> Result<ParameterMap, EnrichmentError> {
        let params = normalize_triples(raw)?;
        self.enrich_map(report_name, primary_source, params, diag).await
    }

    /// Enriches an already validated parameter map.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentError::Halted`] if arbitration stops the report.
    pub async fn enrich_map(
        &self,
        report_name: &str,
        primary_source: &str,
        mut params: ParameterMap,
        diag: &mut Diagnostics<'_>,
    ) -> Result<ParameterMap, EnrichmentError> {
        let supplied = params.len();

        self.gap_fill(primary_source, &mut params, diag).await?;
        let filled = params.len() - supplied;

        let month = self.derive_month(&mut params).await;
        Self::settle(month, "derive_month", diag)?;

        let charge = self.derive_coded(&mut params, &self.charge_type_names()).await;
        Self::settle(charge, "derive_charge_type", diag)?;

        let settlement = self.derive_coded(&mut params, &self.settlement_names()).await;
        Self::settle(settlement, "derive_settlement", diag)?;

        let organization = self.derive_organization(&mut params).await;
        Self::settle(organization, "derive_organization", diag)?;

        tracing::debug!(
            report = report_name,
            supplied,
            filled,
            derived = params.len() - supplied - filled,
            "Parameters enriched"
        );
        Ok(params)
    }

    async fn gap_fill(
        &self,
        primary_source: &str,
        params: &mut ParameterMap,
        diag: &mut Diagnostics<'_>,
    ) -> Result<(), EnrichmentError> {
        let declared = match self.data_source.declared_parameters(primary_source).await {
            Ok(declared) => declared,
            Err(e) => {
                let can_continue = diag.warn(
                    codes::DECLARED_PARAMETERS_UNAVAILABLE,
                    (MODULE, "gap_fill"),
                    format!("Declared parameters of {primary_source} unavailable"),
                    Some(&e),
                );
                return if can_continue {
                    Ok(())
                } else {
                    Err(EnrichmentError::Halted { stage: "gap_fill" })
                };
            }
        };

        for declaration in &declared {
            if params.contains(&declaration.name) {
                continue;
            }
            let (parameter, kind) = default_for(declaration);
            if kind == DeclaredKind::Unknown {
                let can_continue = diag.warn(
                    codes::UNKNOWN_DECLARED_TYPE,
                    (MODULE, "gap_fill"),
                    format!(
                        "Parameter {} has unknown type {}, defaulting to null",
                        declaration.name, declaration.type_name
                    ),
                    None,
                );
                if !can_continue {
                    return Err(EnrichmentError::Halted { stage: "gap_fill" });
                }
            }
            params.insert_if_absent(parameter);
        }
        Ok(())
    }

    async fn derive_month(&self, params: &mut ParameterMap) -> Result<(), DerivationError> {
        let cfg = self.config;
        if params.contains(&cfg.month_name_param) && params.contains(&cfg.period_name_param) {
            return Ok(());
        }
        let Some(value) = params.value(&cfg.month_param).filter(|v| !v.is_blank()) else {
            return Ok(());
        };

        let month = value
            .as_i64()
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| DerivationError::InvalidMonth(value.to_string()))?;

        if !params.contains(&cfg.month_name_param) {
            let name = self.lookup.month_name(month).await?;
            params.insert_if_absent(Parameter::text(&cfg.month_name_param, name));
        }
        if !params.contains(&cfg.period_name_param) {
            let name = self.lookup.period_name(month).await?;
            params.insert_if_absent(Parameter::text(&cfg.period_name_param, name));
        }
        Ok(())
    }

    async fn derive_coded(
        &self,
        params: &mut ParameterMap,
        names: &CodedNames<'_>,
    ) -> Result<(), DerivationError> {
        if params.contains(names.target) {
            return Ok(());
        }

        let single = params
            .value(names.single)
            .filter(|v| !v.is_blank())
            .map(|v| v.to_string().trim().to_string());
        let list: Vec<String> = params
            .value(names.list)
            .map(ToString::to_string)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();

        let code = single.or_else(|| match list.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        });
        let label = match code {
            Some(code) => self.lookup_code(names.kind, &code).await?,
            None if list.is_empty() => names.all_label.to_string(),
            None => names.multiple_label.to_string(),
        };

        params.insert_if_absent(Parameter::text(names.target, label));
        Ok(())
    }

    async fn lookup_code(&self, kind: CodedKind, code: &str) -> Result<String, DerivationError> {
        let name = match kind {
            CodedKind::ChargeType => self.lookup.charge_type_name(code).await?,
            CodedKind::Settlement => self.lookup.settlement_name(code).await?,
        };
        Ok(name)
    }

    async fn derive_organization(&self, params: &mut ParameterMap) -> Result<(), DerivationError> {
        let target = &self.config.organization_name_param;
        if params.contains(target) {
            return Ok(());
        }
        let name = self.lookup.organization_name().await?;
        params.insert_if_absent(Parameter::text(target, name));
        Ok(())
    }

    fn charge_type_names(&self) -> CodedNames<'_> {
        let cfg = self.config;
        CodedNames {
            kind: CodedKind::ChargeType,
            single: &cfg.charge_type_param,
            list: &cfg.charge_type_list_param,
            target: &cfg.charge_type_name_param,
            multiple_label: &cfg.multiple_charge_types_label,
            all_label: &cfg.all_charge_types_label,
        }
    }

    fn settlement_names(&self) -> CodedNames<'_> {
        let cfg = self.config;
        CodedNames {
            kind: CodedKind::Settlement,
            single: &cfg.settlement_param,
            list: &cfg.settlement_list_param,
            target: &cfg.settlement_name_param,
            multiple_label: &cfg.multiple_settlements_label,
            all_label: &cfg.all_settlements_label,
        }
    }

    /// Downgrades a derivation failure to a warning.
    fn settle(
        result: Result<(), DerivationError>,
        method: &'static str,
        diag: &mut Diagnostics<'_>,
    ) -> Result<(), EnrichmentError> {
        let Err(e) = result else {
            return Ok(());
        };
        let can_continue = diag.warn(
            codes::DERIVATION_FAILED,
            (MODULE, method),
            format!("Could not derive parameter: {e}"),
            Some(&e),
        );
        if can_continue {
            Ok(())
        } else {
            Err(EnrichmentError::Halted { stage: method })
        }
    }
}
