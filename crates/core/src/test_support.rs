//! In-memory collaborators shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::aggregation::{DataSource, DataSourceError, DeclaredParameter, ResultSet};
use crate::enrichment::{LookupError, LookupService};
use crate::params::ParameterMap;

/// Data source answering from fixed result sets, recording every call.
#[derive(Default)]
pub struct InMemorySource {
    results: HashMap<String, Vec<ResultSet>>,
    failing: HashSet<String>,
    declared: HashMap<String, Vec<DeclaredParameter>>,
    declared_unavailable: bool,
    calls: Mutex<Vec<String>>,
    seen_params: Mutex<Vec<ParameterMap>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, source: &str, results: Vec<ResultSet>) -> Self {
        self.results.insert(source.to_lowercase(), results);
        self
    }

    pub fn failing(mut self, source: &str) -> Self {
        self.failing.insert(source.to_lowercase());
        self
    }

    pub fn with_declared(mut self, source: &str, declared: Vec<DeclaredParameter>) -> Self {
        self.declared.insert(source.to_lowercase(), declared);
        self
    }

    pub fn declared_unavailable(mut self) -> Self {
        self.declared_unavailable = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn seen_params(&self) -> Vec<ParameterMap> {
        self.seen_params.lock().unwrap().clone()
    }
}

impl DataSource for InMemorySource {
    async fn execute(
        &self,
        source: &str,
        params: &ParameterMap,
    ) -> Result<Vec<ResultSet>, DataSourceError> {
        self.calls.lock().unwrap().push(source.to_string());
        self.seen_params.lock().unwrap().push(params.clone());

        let key = source.to_lowercase();
        if self.failing.contains(&key) {
            return Err(DataSourceError::Execution(format!("{source} exploded")));
        }
        self.results
            .get(&key)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(source.to_string()))
    }

    async fn declared_parameters(
        &self,
        source: &str,
    ) -> Result<Vec<DeclaredParameter>, DataSourceError> {
        if self.declared_unavailable {
            return Err(DataSourceError::Timeout { secs: 5 });
        }
        Ok(self
            .declared
            .get(&source.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Lookup answering from fixed tables, counting calls.
pub struct StaticLookup {
    pub charge_types: HashMap<String, String>,
    pub settlements: HashMap<String, String>,
    pub organization: Option<String>,
    pub months_available: bool,
    pub call_count: Mutex<usize>,
}

impl Default for StaticLookup {
    fn default() -> Self {
        Self {
            charge_types: HashMap::from([
                ("10".to_string(), "Water".to_string()),
                ("20".to_string(), "Sewerage".to_string()),
            ]),
            settlements: HashMap::from([("7".to_string(), "Northbank".to_string())]),
            organization: Some("Riverside Council".to_string()),
            months_available: true,
            call_count: Mutex::new(0),
        }
    }
}

impl StaticLookup {
    pub fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn tick(&self) {
        *self.call_count.lock().unwrap() += 1;
    }
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl LookupService for StaticLookup {
    async fn month_name(&self, month: u32) -> Result<String, LookupError> {
        self.tick();
        if !self.months_available {
            return Err(LookupError::Unavailable("months table offline".into()));
        }
        MONTHS
            .get(month as usize - 1)
            .map(ToString::to_string)
            .ok_or_else(|| LookupError::not_found("month", month))
    }

    async fn period_name(&self, month: u32) -> Result<String, LookupError> {
        self.tick();
        if !self.months_available {
            return Err(LookupError::Unavailable("months table offline".into()));
        }
        Ok(format!("Q{}", (month - 1) / 3 + 1))
    }

    async fn charge_type_name(&self, code: &str) -> Result<String, LookupError> {
        self.tick();
        self.charge_types
            .get(code)
            .cloned()
            .ok_or_else(|| LookupError::not_found("charge type", code))
    }

    async fn settlement_name(&self, code: &str) -> Result<String, LookupError> {
        self.tick();
        self.settlements
            .get(code)
            .cloned()
            .ok_or_else(|| LookupError::not_found("settlement", code))
    }

    async fn organization_name(&self) -> Result<String, LookupError> {
        self.tick();
        self.organization
            .clone()
            .ok_or_else(|| LookupError::Unavailable("no organization profile".into()))
    }
}
