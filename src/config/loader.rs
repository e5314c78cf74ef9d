//! Build the model registry from declarations, in memory or from a JSON file.

use crate::case::{to_kebab_case, to_snake_case};
use crate::config::resolved::{FieldDef, FieldKind, ModelDef, ScalarType};
use crate::config::types::*;
use crate::config::{primary_key_of, validate};
use crate::error::ConfigError;
use crate::registry::ModelRegistry;
use crate::value::NativeValue;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Build the registry from declarations (validates first). `exclude` lists model names hidden from the admin.
pub fn resolve(config: &ModelsConfig, exclude: &[String]) -> Result<ModelRegistry, ConfigError> {
    validate(config)?;

    let mut models: Vec<ModelDef> = config
        .models
        .iter()
        .map(resolve_model)
        .collect::<Result<_, _>>()?;

    let position: HashMap<String, usize> = models
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.clone(), i))
        .collect();
    for declaring in &config.models {
        for f in declaring.fields.iter().filter(|f| f.type_ == FieldTypeConfig::ForeignKey) {
            let Some(target) = f.related_model.as_deref() else { continue };
            let name = f
                .related_name
                .clone()
                .unwrap_or_else(|| format!("{}s", to_snake_case(&declaring.name)));
            let target_model = &mut models[position[target]];
            if target_model.field_index.contains_key(&name) {
                return Err(ConfigError::DuplicateField {
                    model: target.to_string(),
                    field: name,
                });
            }
            target_model.field_index.insert(name.clone(), target_model.fields.len());
            target_model.fields.push(FieldDef {
                label: name.clone(),
                name,
                kind: FieldKind::BackwardRelation {
                    related_model: declaring.name.clone(),
                },
                column: None,
                required: false,
                nullable: true,
                generated: false,
                auto_now_add: false,
                auto_now: false,
                default: None,
                pattern: None,
                validation: ValidationRule::default(),
            });
        }
    }

    let exclude: HashSet<String> = exclude.iter().cloned().collect();
    for name in &exclude {
        if !position.contains_key(name) {
            tracing::warn!("excluded model {} is not declared, ignoring", name);
        }
    }
    Ok(ModelRegistry::new(models, exclude))
}

fn resolve_model(m: &ModelConfig) -> Result<ModelDef, ConfigError> {
    let pk = primary_key_of(m).to_string();
    let mut fields = Vec::with_capacity(m.fields.len() + 1);
    for f in &m.fields {
        // The primary key is always filled by storage.
        let generated = f.generated || f.name == pk;
        let read_only = generated || f.auto_now_add || f.auto_now;
        let required = !read_only && f.required.unwrap_or(!f.null && f.default.is_none());
        let label = f.description.clone().unwrap_or_else(|| f.name.clone());
        match scalar_of(f.type_) {
            None => {
                let related_model = f.related_model.clone().unwrap_or_default();
                let id_field = format!("{}_id", f.name);
                let default = default_value(m, f, ScalarType::Int)?;
                fields.push(FieldDef {
                    name: f.name.clone(),
                    label: label.clone(),
                    kind: FieldKind::ForeignKey {
                        related_model,
                        id_field: id_field.clone(),
                    },
                    column: None,
                    required,
                    nullable: f.null,
                    generated: false,
                    auto_now_add: false,
                    auto_now: false,
                    default: default.clone(),
                    pattern: None,
                validation: ValidationRule::default(),
                });
                fields.push(FieldDef {
                    column: Some(f.column.clone().unwrap_or_else(|| id_field.clone())),
                    label: id_field.clone(),
                    name: id_field,
                    kind: FieldKind::ForeignKeyColumn {
                        relation: f.name.clone(),
                    },
                    required: false,
                    nullable: f.null,
                    generated: false,
                    auto_now_add: false,
                    auto_now: false,
                    default,
                    pattern: None,
                validation: ValidationRule::default(),
                });
            }
            Some(scalar) => {
                fields.push(FieldDef {
                    name: f.name.clone(),
                    label,
                    kind: FieldKind::Scalar(scalar),
                    column: Some(f.column.clone().unwrap_or_else(|| f.name.clone())),
                    required,
                    nullable: f.null,
                    generated,
                    auto_now_add: f.auto_now_add,
                    auto_now: f.auto_now,
                    default: default_value(m, f, scalar)?,
                    pattern: compile_pattern(m, f)?,
                    validation: f.validation.clone(),
                });
            }
        }
    }

    let field_index = fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.clone(), i))
        .collect();
    Ok(ModelDef {
        code: to_kebab_case(&m.name),
        label: m.verbose_name_plural.clone().unwrap_or_else(|| m.name.clone()),
        schema_name: m.schema.clone(),
        table_name: m.table.clone().unwrap_or_else(|| to_snake_case(&m.name)),
        ordering: m.ordering.clone().unwrap_or_else(|| pk.clone()),
        pk_field: pk,
        display_field: m.display_field.clone(),
        search_fields: m.search_fields.clone(),
        name: m.name.clone(),
        fields,
        field_index,
    })
}

fn compile_pattern(m: &ModelConfig, f: &FieldConfig) -> Result<Option<Regex>, ConfigError> {
    f.validation
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|_| ConfigError::Validation(format!("invalid pattern for {}.{}", m.name, f.name)))
}

fn scalar_of(t: FieldTypeConfig) -> Option<ScalarType> {
    match t {
        FieldTypeConfig::String => Some(ScalarType::String),
        FieldTypeConfig::Int => Some(ScalarType::Int),
        FieldTypeConfig::Bool => Some(ScalarType::Bool),
        FieldTypeConfig::Date => Some(ScalarType::Date),
        FieldTypeConfig::Datetime => Some(ScalarType::Datetime),
        FieldTypeConfig::ForeignKey => None,
    }
}

/// Declared defaults are plain JSON: ISO-8601 strings for dates and datetimes.
fn default_value(
    m: &ModelConfig,
    f: &FieldConfig,
    scalar: ScalarType,
) -> Result<Option<NativeValue>, ConfigError> {
    let Some(v) = &f.default else { return Ok(None) };
    let invalid = || ConfigError::Validation(format!("invalid default for {}.{}: {}", m.name, f.name, v));
    let native = match (scalar, v) {
        (_, Value::Null) => NativeValue::Null,
        (ScalarType::String, Value::String(s)) => NativeValue::Text(s.clone()),
        (ScalarType::Int, Value::Number(n)) => NativeValue::Int(n.as_i64().ok_or_else(invalid)?),
        (ScalarType::Bool, Value::Bool(b)) => NativeValue::Bool(*b),
        (ScalarType::Date, Value::String(s)) => {
            NativeValue::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?)
        }
        (ScalarType::Datetime, Value::String(s)) => NativeValue::DateTime(
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map_err(|_| invalid())?,
        ),
        _ => return Err(invalid()),
    };
    Ok(Some(native))
}

/// Load declarations from a JSON file of the form `{"models": [...]}`.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<ModelsConfig, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading model declarations");
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}
