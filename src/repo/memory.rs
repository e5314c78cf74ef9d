//! In-process repository. Each model is a table of rows keyed by generated primary key.

use super::{Assignments, ListFilter, Record, Repository};
use crate::config::{FieldDef, ModelDef, ScalarType};
use crate::error::AppError;
use crate::value::NativeValue;
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_pk: i64,
    rows: BTreeMap<i64, HashMap<String, NativeValue>>,
}

/// Keeps all rows in memory; a single lock guards every table, so each call is atomic.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn record(model: &ModelDef, pk: i64, row: &HashMap<String, NativeValue>) -> Record {
    let values = model
        .columns()
        .map(|f| (f.name.clone(), row.get(&f.name).cloned().unwrap_or(NativeValue::Null)))
        .collect();
    Record { pk, values }
}

/// Value written by storage on create (`auto_now_add`, `auto_now`) or on every save (`auto_now`).
fn timestamp_for(f: &FieldDef) -> NativeValue {
    let now = Utc::now().naive_utc();
    match f.scalar_type() {
        Some(ScalarType::Date) => NativeValue::Date(now.date()),
        _ => NativeValue::DateTime(now),
    }
}

fn compare(a: &NativeValue, b: &NativeValue) -> Ordering {
    use NativeValue::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Less,
        (_, Null) => Ordering::Greater,
        (Bool(x), Bool(y)) => x.cmp(y),
        (Int(x), Int(y)) => x.cmp(y),
        (Text(x), Text(y)) => x.cmp(y),
        (Date(x), Date(y)) => x.cmp(y),
        (DateTime(x), DateTime(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn matches_search(model: &ModelDef, row: &HashMap<String, NativeValue>, needle: &str) -> bool {
    model.search_fields.iter().any(|f| {
        row.get(f)
            .and_then(NativeValue::as_text)
            .map(|s| s.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list(
        &self,
        model: &ModelDef,
        filter: &ListFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Record>, u64), AppError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&model.name) else {
            return Ok((Vec::new(), 0));
        };
        let needle = filter.search_for(model).map(str::to_lowercase);
        let mut rows: Vec<(&i64, &HashMap<String, NativeValue>)> = table
            .rows
            .iter()
            .filter(|(_, row)| needle.as_deref().map_or(true, |n| matches_search(model, row, n)))
            .collect();
        let count = rows.len() as u64;
        let ordering = &model.ordering;
        rows.sort_by(|(pa, a), (pb, b)| {
            let key = |row: &HashMap<String, NativeValue>, pk: i64| {
                if *ordering == model.pk_field {
                    NativeValue::Int(pk)
                } else {
                    row.get(ordering).cloned().unwrap_or(NativeValue::Null)
                }
            };
            compare(&key(b, **pb), &key(a, **pa)).then(pb.cmp(pa))
        });
        let page = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(pk, row)| record(model, *pk, row))
            .collect();
        Ok((page, count))
    }

    async fn get(&self, model: &ModelDef, pk: i64) -> Result<Option<Record>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&model.name)
            .and_then(|t| t.rows.get(&pk))
            .map(|row| record(model, pk, row)))
    }

    async fn get_many(&self, model: &ModelDef, pks: &[i64]) -> Result<Vec<Record>, AppError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&model.name) else {
            return Ok(Vec::new());
        };
        let mut pks = pks.to_vec();
        pks.sort_unstable();
        pks.dedup();
        Ok(pks
            .into_iter()
            .filter_map(|pk| table.rows.get(&pk).map(|row| record(model, pk, row)))
            .collect())
    }

    async fn all(&self, model: &ModelDef) -> Result<Vec<Record>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&model.name)
            .map(|t| t.rows.iter().map(|(pk, row)| record(model, *pk, row)).collect())
            .unwrap_or_default())
    }

    async fn create(&self, model: &ModelDef, values: &Assignments) -> Result<i64, AppError> {
        let values = model.with_defaults(values);
        let mut tables = self.tables.write().await;
        let table = tables.entry(model.name.clone()).or_default();
        table.last_pk += 1;
        let pk = table.last_pk;
        let mut row = HashMap::new();
        for f in model.columns() {
            let v = if f.name == model.pk_field {
                NativeValue::Int(pk)
            } else if f.auto_now_add || f.auto_now {
                timestamp_for(f)
            } else {
                values.get(&f.name).cloned().unwrap_or(NativeValue::Null)
            };
            row.insert(f.name.clone(), v);
        }
        table.rows.insert(pk, row);
        tracing::debug!(model = %model.name, pk, "memory insert");
        Ok(pk)
    }

    async fn update(
        &self,
        model: &ModelDef,
        pk: i64,
        values: &Assignments,
    ) -> Result<Option<Record>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.get_mut(&model.name).and_then(|t| t.rows.get_mut(&pk)) else {
            return Ok(None);
        };
        for f in model.columns() {
            if f.name == model.pk_field {
                continue;
            }
            if f.auto_now {
                row.insert(f.name.clone(), timestamp_for(f));
            } else if let Some(v) = values.get(&f.name) {
                row.insert(f.name.clone(), v.clone());
            }
        }
        tracing::debug!(model = %model.name, pk, "memory update");
        Ok(Some(record(model, pk, row)))
    }

    async fn delete(&self, model: &ModelDef, pk: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(&model.name)
            .map(|t| t.rows.remove(&pk).is_some())
            .unwrap_or(false);
        tracing::debug!(model = %model.name, pk, removed, "memory delete");
        Ok(removed)
    }
}
