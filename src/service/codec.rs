//! Representation codec: records to JSON-safe maps for list pages, JSON payloads to native assignments for writes.
//!
//! Dates travel as `DD.MM.YYYY`. Datetimes travel as `DD.MM.YYYY HH:SS`: hour and seconds, no minutes.
//! Existing clients depend on that exact shape, so parsing reads the same pattern back and sets minutes to zero.

use crate::config::{FieldDef, FieldKind, LogicalType, ModelDef, ScalarType};
use crate::error::AppError;
use crate::registry::ModelRegistry;
use crate::repo::{Assignments, Record, Repository};
use crate::service::fields::{write_field, FieldMeta};
use crate::service::validation::RequestValidator;
use crate::value::NativeValue;
use chrono::format::{parse as parse_with, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, ParseResult};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%S";

pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

/// Inverse of `format_datetime`. The pattern has no minutes, so they come back as zero.
pub fn parse_datetime(s: &str) -> ParseResult<NaiveDateTime> {
    let mut parsed = Parsed::new();
    parse_with(&mut parsed, s, StrftimeItems::new(DATETIME_FORMAT))?;
    parsed.set_minute(0)?;
    parsed.to_naive_datetime_with_offset(0)
}

/// External form of one scalar value under a logical type. Nulls stay null.
fn render_scalar(t: LogicalType, v: &NativeValue) -> Value {
    match (t, v) {
        (_, NativeValue::Null) => Value::Null,
        (LogicalType::Datetime, NativeValue::DateTime(dt)) => Value::String(format_datetime(dt)),
        (LogicalType::Date, NativeValue::Date(d)) => Value::String(format_date(d)),
        _ => v.to_json(),
    }
}

/// Display strings of the related rows referenced by `records` through one foreign key, fetched in one batch.
async fn related_displays(
    registry: &ModelRegistry,
    model: &ModelDef,
    field: &str,
    records: &[Record],
    repo: &dyn Repository,
) -> Result<(String, HashMap<i64, String>), AppError> {
    let Some(FieldDef {
        kind: FieldKind::ForeignKey { related_model, id_field },
        ..
    }) = model.field(field)
    else {
        return Err(AppError::UnknownField(field.to_string()));
    };
    let related = registry
        .get(related_model)
        .ok_or_else(|| AppError::NotFound(related_model.clone()))?;
    let ids: Vec<i64> = records.iter().filter_map(|r| r.get(id_field).as_int()).collect();
    let rows = repo.get_many(related, &ids).await?;
    let displays = rows.iter().map(|r| (r.pk, related.display(r))).collect();
    Ok((id_field.clone(), displays))
}

/// Read transform: one JSON map per record with a key per descriptor.
/// Related fields render as the related row's display string, null when unset or gone.
pub async fn render(
    registry: &ModelRegistry,
    model: &ModelDef,
    fields: &[FieldMeta],
    records: &[Record],
    repo: &dyn Repository,
) -> Result<Vec<Map<String, Value>>, AppError> {
    let mut related: HashMap<&str, (String, HashMap<i64, String>)> = HashMap::new();
    for meta in fields.iter().filter(|m| m.logical_type == LogicalType::Related) {
        let lookup = related_displays(registry, model, &meta.name, records, repo).await?;
        related.insert(meta.name.as_str(), lookup);
    }

    let items = records
        .iter()
        .map(|record| {
            fields
                .iter()
                .map(|meta| {
                    let value = match meta.logical_type {
                        LogicalType::Related => related
                            .get(meta.name.as_str())
                            .and_then(|(id_field, displays)| {
                                record.get(id_field).as_int().and_then(|pk| displays.get(&pk))
                            })
                            .map(|s| Value::String(s.clone()))
                            .unwrap_or(Value::Null),
                        LogicalType::String
                        | LogicalType::Int
                        | LogicalType::Bool
                        | LogicalType::Date
                        | LogicalType::Datetime
                        | LogicalType::RelatedId => {
                            render_scalar(meta.logical_type, record.get(&meta.name))
                        }
                    };
                    (meta.name.clone(), value)
                })
                .collect()
        })
        .collect();
    Ok(items)
}

/// Python-style falsiness of a JSON input: null, empty string, zero, false.
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn parse_int(name: &str, v: &Value) -> Result<i64, AppError> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| AppError::invalid(name, format!("{} is not an integer", n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::invalid(name, format!("'{}' is not an integer", s))),
        Value::Bool(b) => Ok(i64::from(*b)),
        other => Err(AppError::invalid(name, format!("{} is not an integer", other))),
    }
}

fn convert_scalar(field: &FieldDef, t: ScalarType, v: &Value) -> Result<NativeValue, AppError> {
    let name = field.name.as_str();
    match t {
        ScalarType::String => match v {
            Value::Null => Ok(NativeValue::Null),
            Value::String(s) => Ok(NativeValue::Text(s.clone())),
            other => Err(AppError::invalid(name, format!("expected a string, got {}", other))),
        },
        ScalarType::Int => {
            if is_falsy(v) {
                return Ok(match (&field.default, v) {
                    (Some(d), _) => d.clone(),
                    (None, Value::Null | Value::String(_)) => NativeValue::Null,
                    (None, _) => NativeValue::Int(0),
                });
            }
            parse_int(name, v).map(NativeValue::Int)
        }
        ScalarType::Bool => match v {
            Value::Null => Ok(field.default.clone().unwrap_or(NativeValue::Null)),
            Value::Bool(b) => Ok(NativeValue::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(NativeValue::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(NativeValue::Bool(false)),
            other => Err(AppError::invalid(name, format!("expected a boolean, got {}", other))),
        },
        ScalarType::Date => match v {
            Value::Null => Ok(NativeValue::Null),
            Value::String(s) if s.is_empty() => Ok(NativeValue::Null),
            Value::String(s) => parse_date(s)
                .map(NativeValue::Date)
                .map_err(|e| AppError::invalid(name, format!("'{}' is not a DD.MM.YYYY date: {}", s, e))),
            other => Err(AppError::invalid(name, format!("expected a date string, got {}", other))),
        },
        ScalarType::Datetime => match v {
            Value::Null => Ok(NativeValue::Null),
            Value::String(s) if s.is_empty() => Ok(NativeValue::Null),
            Value::String(s) => parse_datetime(s)
                .map(NativeValue::DateTime)
                .map_err(|e| AppError::invalid(name, format!("'{}' is not a DD.MM.YYYY HH:SS datetime: {}", s, e))),
            other => Err(AppError::invalid(name, format!("expected a datetime string, got {}", other))),
        },
    }
}

/// Write transform. Every key must name a write-view field. Relations are keyed by their `{name}_id` column.
pub fn parse(model: &ModelDef, payload: &Map<String, Value>) -> Result<Assignments, AppError> {
    let mut out = Assignments::new();
    for (key, value) in payload {
        let field = write_field(model, key).ok_or_else(|| AppError::UnknownField(key.clone()))?;
        let (column_key, native) = match &field.kind {
            FieldKind::ForeignKey { id_field, .. } => {
                let native = match value {
                    Value::Null => NativeValue::Null,
                    Value::String(s) if s.trim().is_empty() => NativeValue::Null,
                    other => NativeValue::Int(parse_int(key, other)?),
                };
                (id_field.clone(), native)
            }
            FieldKind::Scalar(t) => (key.clone(), convert_scalar(field, *t, value)?),
            FieldKind::ForeignKeyColumn { .. } | FieldKind::BackwardRelation { .. } => {
                return Err(AppError::UnknownField(key.clone()));
            }
        };
        RequestValidator::validate_field(field, &native)?;
        out.insert(column_key, native);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, ModelsConfig};
    use serde_json::json;

    fn registry() -> ModelRegistry {
        let config: ModelsConfig = serde_json::from_value(json!({"models": [
            {"name": "Event", "fields": [
                {"name": "id", "type": "int", "generated": true},
                {"name": "title", "type": "string", "max_length": 20},
                {"name": "day", "type": "date", "null": true},
                {"name": "starts_at", "type": "datetime", "null": true},
                {"name": "public", "type": "bool", "default": false},
                {"name": "seats", "type": "int", "default": 0},
                {"name": "rank", "type": "int", "null": true},
                {"name": "created_at", "type": "datetime", "auto_now_add": true}
            ]}
        ]}))
        .unwrap();
        resolve(&config, &[]).unwrap()
    }

    fn payload(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn datetime_renders_hour_and_seconds_only() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap().and_hms_opt(14, 30, 7).unwrap();
        assert_eq!(format_datetime(&dt), "14.03.2024 14:07");
        assert_eq!(
            render_scalar(LogicalType::Datetime, &NativeValue::DateTime(dt)),
            json!("14.03.2024 14:07")
        );
    }

    #[test]
    fn datetime_parses_same_pattern_with_zero_minutes() {
        let dt = parse_datetime("14.03.2024 14:07").unwrap();
        assert_eq!(dt, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap().and_hms_opt(14, 0, 7).unwrap());
        assert!(parse_datetime("2024-03-14T14:30:07").is_err());
    }

    #[test]
    fn date_round_trips() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let rendered = render_scalar(LogicalType::Date, &NativeValue::Date(d));
        assert_eq!(rendered, json!("05.03.2024"));
        let r = registry();
        let parsed = parse(r.get("Event").unwrap(), &payload(json!({"day": rendered}))).unwrap();
        assert_eq!(parsed["day"], NativeValue::Date(d));
    }

    #[test]
    fn nulls_pass_through_render() {
        assert_eq!(render_scalar(LogicalType::Datetime, &NativeValue::Null), Value::Null);
        assert_eq!(render_scalar(LogicalType::Date, &NativeValue::Null), Value::Null);
    }

    #[test]
    fn bool_null_takes_default() {
        let r = registry();
        let parsed = parse(r.get("Event").unwrap(), &payload(json!({"public": null}))).unwrap();
        assert_eq!(parsed["public"], NativeValue::Bool(false));
    }

    #[test]
    fn int_falsy_takes_default() {
        let r = registry();
        let event = r.get("Event").unwrap();
        let parsed = parse(event, &payload(json!({"seats": "", "rank": ""}))).unwrap();
        assert_eq!(parsed["seats"], NativeValue::Int(0));
        assert_eq!(parsed["rank"], NativeValue::Null);
        let parsed = parse(event, &payload(json!({"seats": "12", "rank": 3}))).unwrap();
        assert_eq!(parsed["seats"], NativeValue::Int(12));
        assert_eq!(parsed["rank"], NativeValue::Int(3));
    }

    #[test]
    fn non_numeric_int_is_invalid() {
        let r = registry();
        let err = parse(r.get("Event").unwrap(), &payload(json!({"seats": "many"}))).unwrap_err();
        assert!(matches!(err, AppError::InvalidValue { ref field, .. } if field == "seats"));
    }

    #[test]
    fn out_of_range_int_is_invalid() {
        let r = registry();
        let event = r.get("Event").unwrap();
        let err = parse(event, &payload(json!({"seats": 1e30}))).unwrap_err();
        assert!(matches!(err, AppError::InvalidValue { ref field, .. } if field == "seats"));
        assert!(parse(event, &payload(json!({"seats": -1e19}))).is_err());
        let parsed = parse(event, &payload(json!({"seats": 12.0}))).unwrap();
        assert_eq!(parsed["seats"], NativeValue::Int(12));
    }

    #[test]
    fn bad_date_is_invalid() {
        let r = registry();
        let err = parse(r.get("Event").unwrap(), &payload(json!({"day": "2024-03-05"}))).unwrap_err();
        assert!(matches!(err, AppError::InvalidValue { .. }));
    }

    #[test]
    fn unknown_and_read_only_keys_are_rejected() {
        let r = registry();
        let event = r.get("Event").unwrap();
        assert!(matches!(
            parse(event, &payload(json!({"nope": 1}))),
            Err(AppError::UnknownField(_))
        ));
        assert!(matches!(
            parse(event, &payload(json!({"id": 1}))),
            Err(AppError::UnknownField(_))
        ));
        assert!(matches!(
            parse(event, &payload(json!({"created_at": "01.01.2024 10:00"}))),
            Err(AppError::UnknownField(_))
        ));
    }

    #[test]
    fn declared_rules_apply_after_conversion() {
        let r = registry();
        let err = parse(
            r.get("Event").unwrap(),
            &payload(json!({"title": "a title well past twenty characters"})),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidValue { .. }));
    }
}
