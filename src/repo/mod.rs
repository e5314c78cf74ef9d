//! Persistence boundary: one trait every store implements, keyed by model definition.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::config::ModelDef;
use crate::error::AppError;
use crate::value::NativeValue;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Parsed write payload: field name (companion `{fk}_id` for relations) to native value.
pub type Assignments = BTreeMap<String, NativeValue>;

/// One persisted row. `values` is keyed by field name and holds every column of the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub pk: i64,
    pub values: HashMap<String, NativeValue>,
}

static NULL: NativeValue = NativeValue::Null;

impl Record {
    pub fn get(&self, field: &str) -> &NativeValue {
        self.values.get(field).unwrap_or(&NULL)
    }

    /// Raw mapping of every column, ISO-8601 dates.
    pub fn to_json(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    /// Case-insensitive substring matched against the model's search fields. Ignored when it declares none.
    pub search: Option<String>,
}

impl ListFilter {
    /// The search term when it applies to `model`.
    pub fn search_for<'a>(&'a self, model: &ModelDef) -> Option<&'a str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !model.search_fields.is_empty())
    }
}

#[async_trait]
pub trait Repository: Send + Sync {
    /// A page ordered by the model's ordering field, descending, plus the total number of matching rows.
    async fn list(
        &self,
        model: &ModelDef,
        filter: &ListFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Record>, u64), AppError>;

    async fn get(&self, model: &ModelDef, pk: i64) -> Result<Option<Record>, AppError>;

    /// Rows whose primary key is in `pks`; missing keys are skipped.
    async fn get_many(&self, model: &ModelDef, pks: &[i64]) -> Result<Vec<Record>, AppError>;

    /// Every row, ordered by primary key. Full scan.
    async fn all(&self, model: &ModelDef) -> Result<Vec<Record>, AppError>;

    /// Insert one row and return its generated primary key. Declared defaults are filled in for absent fields.
    async fn create(&self, model: &ModelDef, values: &Assignments) -> Result<i64, AppError>;

    /// Assign `values` onto an existing row and save it. None when the row does not exist.
    async fn update(
        &self,
        model: &ModelDef,
        pk: i64,
        values: &Assignments,
    ) -> Result<Option<Record>, AppError>;

    /// Whether a row was deleted.
    async fn delete(&self, model: &ModelDef, pk: i64) -> Result<bool, AppError>;
}
