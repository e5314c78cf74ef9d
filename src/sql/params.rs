//! Bind native values to sqlx queries and decode rows back into records.

use crate::config::{ModelDef, ScalarType};
use crate::repo::Record;
use crate::value::NativeValue;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use std::collections::HashMap;

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Bind one value. Placeholders carry an explicit cast, so nulls are sent untyped as text.
pub fn bind_native<'q>(query: PgQuery<'q>, value: &NativeValue) -> PgQuery<'q> {
    match value {
        NativeValue::Null => query.bind(None::<String>),
        NativeValue::Bool(b) => query.bind(*b),
        NativeValue::Int(n) => query.bind(*n),
        NativeValue::Text(s) => query.bind(s.clone()),
        NativeValue::Date(d) => query.bind(*d),
        NativeValue::DateTime(dt) => query.bind(*dt),
    }
}

pub fn bind_all<'q>(sql: &'q str, params: &[NativeValue]) -> PgQuery<'q> {
    params
        .iter()
        .fold(sqlx::query(sql), |q, p| bind_native(q, p))
}

/// Decode a row selected with the model's column list (every column aliased to its field name).
pub fn row_to_record(model: &ModelDef, row: &PgRow) -> Result<Record, sqlx::Error> {
    let mut values = HashMap::new();
    for f in model.columns() {
        let name = f.name.as_str();
        let v: NativeValue = match f.scalar_type().unwrap_or(ScalarType::String) {
            ScalarType::String => row.try_get::<Option<String>, _>(name)?.into(),
            ScalarType::Int => row.try_get::<Option<i64>, _>(name)?.into(),
            ScalarType::Bool => row.try_get::<Option<bool>, _>(name)?.into(),
            ScalarType::Date => row.try_get::<Option<NaiveDate>, _>(name)?.into(),
            ScalarType::Datetime => row.try_get::<Option<NaiveDateTime>, _>(name)?.into(),
        };
        values.insert(f.name.clone(), v);
    }
    let pk = values
        .get(&model.pk_field)
        .and_then(NativeValue::as_int)
        .ok_or_else(|| sqlx::Error::ColumnNotFound(model.pk_field.clone()))?;
    Ok(Record { pk, values })
}
