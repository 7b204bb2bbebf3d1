//! Conditional blocks: `{{if field == value}} ... {{else}} ... {{endif}}`.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::error::TemplateError;

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{\{\s*(?:if\s+([^{}]*?)|(else)|(endif))\s*\}\}").expect("conditional pattern")
});

/// Field whose value `-1` flags a synthetic summary condition.
pub const SUMMARY_FLAG_FIELD: &str = "hesder";

/// Parsed `field == value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Left-hand field name.
    pub field: String,
    /// Right-hand value, quotes removed.
    pub value: String,
}

impl Condition {
    /// Parses a condition.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidCondition`] if there is no `==` or
    /// the field is empty.
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let (field, value) = raw
            .split_once("==")
            .ok_or_else(|| TemplateError::InvalidCondition(raw.trim().to_string()))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(TemplateError::InvalidCondition(raw.trim().to_string()));
        }
        Ok(Self {
            field: field.to_string(),
            value: unquote(value.trim()).to_string(),
        })
    }

    /// Evaluates the condition.
    ///
    /// Only the summary flag compared numerically to `-1` is true; every
    /// other condition is false.
    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.field.eq_ignore_ascii_case(SUMMARY_FLAG_FIELD)
            && Decimal::from_str(self.value.trim()).is_ok_and(|v| v == Decimal::NEGATIVE_ONE)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

enum State {
    Outside,
    InIf {
        open: usize,
        body: usize,
        taken: bool,
    },
    InElse {
        open: usize,
        body: usize,
        taken: bool,
    },
}

/// Replaces every conditional block with the branch its condition selects.
pub fn evaluate(text: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut state = State::Outside;

    for caps in MARKER.captures_iter(text) {
        let Some(marker) = caps.get(0) else {
            continue;
        };
        let (start, end) = (marker.start(), marker.end());

        state = match (state, caps.get(1), caps.get(2).is_some()) {
            (State::Outside, Some(condition), _) => {
                out.push_str(&text[cursor..start]);
                State::InIf {
                    open: start,
                    body: end,
                    taken: Condition::parse(condition.as_str())?.evaluate(),
                }
            }
            (State::Outside, None, is_else) => {
                return Err(TemplateError::StrayMarker {
                    marker: if is_else { "else" } else { "endif" },
                    offset: start,
                });
            }
            (State::InIf { .. } | State::InElse { .. }, Some(_), _) => {
                return Err(TemplateError::NestedConditional { offset: start });
            }
            (State::InIf { open, body, taken }, None, true) => {
                if taken {
                    out.push_str(&text[body..start]);
                }
                State::InElse {
                    open,
                    body: end,
                    taken: !taken,
                }
            }
            (State::InElse { .. }, None, true) => {
                return Err(TemplateError::StrayMarker {
                    marker: "else",
                    offset: start,
                });
            }
            (State::InIf { body, taken, .. } | State::InElse { body, taken, .. }, None, false) => {
                if taken {
                    out.push_str(&text[body..start]);
                }
                State::Outside
            }
        };
        cursor = end;
    }

    match state {
        State::Outside => {
            out.push_str(&text[cursor..]);
            Ok(out)
        }
        State::InIf { open, .. } | State::InElse { open, .. } => {
            Err(TemplateError::UnterminatedConditional { offset: open })
        }
    }
}
