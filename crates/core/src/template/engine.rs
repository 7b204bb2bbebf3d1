//! Template rendering.

use chrono::NaiveDateTime;
use folio_shared::config::RenderingConfig;
use folio_shared::types::{format_date, format_date_time, format_time, format_value};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::error::TemplateError;
use super::mapping::ColumnMapping;
use super::rows::FallbackText;
use super::{conditional, escape, rows};
use crate::aggregation::NamedTables;
use crate::arbitration::{Diagnostics, codes};
use crate::params::ParameterMap;

const MODULE: &str = "template";

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\{\s*@title\s*\}\}").expect("title pattern"));

static CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{\{\s*@(datetime|date|time)\s*\}\}").expect("date/time pattern")
});

static PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\{\s*param:\s*([^{}]*?)\s*\}\}").expect("parameter pattern"));

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\{\s*header:([^{}]*)\}\}").expect("header pattern"));

/// Texts of the placeholder rows emitted for missing or empty datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLabels {
    /// Text shown when a dataset is present but empty.
    pub no_data_text: String,
    /// Text shown when a dataset was never produced.
    pub missing_data_text: String,
}

impl Default for RenderLabels {
    fn default() -> Self {
        Self::from(&RenderingConfig::default())
    }
}

impl From<&RenderingConfig> for RenderLabels {
    fn from(config: &RenderingConfig) -> Self {
        Self {
            no_data_text: config.no_data_text.clone(),
            missing_data_text: config.missing_data_text.clone(),
        }
    }
}

/// Placeholder substitution engine.
///
/// Rendering runs six phases in a fixed order, each over the previous
/// phase's output:
///
/// 1. `{{@title}}`
/// 2. `{{@date}}`, `{{@time}}`, `{{@datetime}}`
/// 3. `{{param:Name}}`
/// 4. `{{header:Column}}`
/// 5. row blocks (`<tr data-table-row="dataset">`)
/// 6. `{{if field == value}} ... {{else}} ... {{endif}}`
///
/// Phases 4 to 6 never fail the render: a failure is reported as a warning
/// and the phase's input is kept unchanged.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    mapping: ColumnMapping,
    now: NaiveDateTime,
    labels: RenderLabels,
}

impl TemplateEngine {
    /// Creates an engine for one execution.
    #[must_use]
    pub fn new(mapping: ColumnMapping, now: NaiveDateTime) -> Self {
        Self {
            mapping,
            now,
            labels: RenderLabels::default(),
        }
    }

    /// Overrides the placeholder row texts.
    #[must_use]
    pub fn with_labels(mut self, labels: RenderLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Renders a template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidTemplate`] for an empty template and
    /// [`TemplateError::Halted`] if arbitration stops the report after a
    /// phase failure.
    pub fn render(
        &self,
        template: &str,
        title: &str,
        params: &ParameterMap,
        tables: &NamedTables,
        diag: &mut Diagnostics<'_>,
    ) -> Result<String, TemplateError> {
        if template.trim().is_empty() {
            return Err(TemplateError::InvalidTemplate);
        }

        let text = TITLE
            .replace_all(template, regex::NoExpand(&escape(title)))
            .into_owned();
        let text = self.substitute_clock(&text);
        let text = Self::substitute_params(&text, params);
        let text = self.substitute_headers(text, diag)?;

        let fallback = FallbackText {
            no_data: &self.labels.no_data_text,
            missing_data: &self.labels.missing_data_text,
        };
        let text = Self::guarded("rows", text, diag, |t| rows::expand(t, tables, &fallback))?;
        Self::guarded("conditionals", text, diag, conditional::evaluate)
    }

    fn substitute_clock(&self, text: &str) -> String {
        CLOCK
            .replace_all(text, |caps: &Captures<'_>| {
                match caps[1].to_lowercase().as_str() {
                    "date" => format_date(self.now.date()),
                    "time" => format_time(self.now.time()),
                    _ => format_date_time(self.now),
                }
            })
            .into_owned()
    }

    fn substitute_params(text: &str, params: &ParameterMap) -> String {
        PARAM
            .replace_all(text, |caps: &Captures<'_>| match params.value(&caps[1]) {
                Some(value) => escape(&format_value(value)),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Resolves header tokens. Empty references stay in place and are
    /// reported one by one.
    fn substitute_headers(
        &self,
        text: String,
        diag: &mut Diagnostics<'_>,
    ) -> Result<String, TemplateError> {
        let mut empty = 0usize;
        let resolved = HEADER
            .replace_all(&text, |caps: &Captures<'_>| {
                let reference = caps[1].trim();
                if reference.is_empty() {
                    empty += 1;
                    caps[0].to_string()
                } else {
                    escape(self.mapping.resolve(reference))
                }
            })
            .into_owned();

        for _ in 0..empty {
            let error = TemplateError::EmptyHeaderReference;
            let can_continue = diag.warn(
                codes::EMPTY_HEADER_REFERENCE,
                (MODULE, "headers"),
                "Header token left unresolved",
                Some(&error),
            );
            if !can_continue {
                return Err(TemplateError::Halted { phase: "headers" });
            }
        }
        Ok(resolved)
    }

    /// Runs a phase, keeping its input if it fails.
    fn guarded<F>(
        phase: &'static str,
        text: String,
        diag: &mut Diagnostics<'_>,
        run: F,
    ) -> Result<String, TemplateError>
    where
        F: FnOnce(&str) -> Result<String, TemplateError>,
    {
        match run(&text) {
            Ok(out) => Ok(out),
            Err(error) => {
                let can_continue = diag.warn(
                    codes::TEMPLATE_PHASE_SKIPPED,
                    (MODULE, phase),
                    format!("Template phase {phase} skipped: {error}"),
                    Some(&error),
                );
                if can_continue {
                    Ok(text)
                } else {
                    Err(TemplateError::Halted { phase })
                }
            }
        }
    }
}
