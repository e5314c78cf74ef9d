//! Declaration validation: referential integrity and naming consistency.

use crate::case::to_kebab_case;
use crate::config::{FieldTypeConfig, ModelConfig, ModelsConfig};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

/// Primary key field name when a model does not declare one.
pub const DEFAULT_PK: &str = "id";

pub fn primary_key_of(model: &ModelConfig) -> &str {
    model.primary_key.as_deref().unwrap_or(DEFAULT_PK)
}

pub fn validate(config: &ModelsConfig) -> Result<(), ConfigError> {
    let model_name = Regex::new(r"^[A-Z][A-Za-z0-9]*$").map_err(|e| ConfigError::Validation(e.to_string()))?;
    let field_name = Regex::new(r"^[a-z_][a-z0-9_]*$").map_err(|e| ConfigError::Validation(e.to_string()))?;

    let mut model_names = HashSet::new();
    let mut codes = HashSet::new();
    for m in &config.models {
        if !model_name.is_match(&m.name) {
            return Err(ConfigError::Validation(format!(
                "model name '{}' must be PascalCase",
                m.name
            )));
        }
        if !model_names.insert(m.name.as_str()) {
            return Err(ConfigError::DuplicateModel(m.name.clone()));
        }
        let code = to_kebab_case(&m.name);
        if !codes.insert(code.clone()) {
            return Err(ConfigError::DuplicateModel(format!(
                "{} (resource code '{}' already taken)",
                m.name, code
            )));
        }
    }

    for m in &config.models {
        let mut names: HashSet<String> = HashSet::new();
        for f in &m.fields {
            if !field_name.is_match(&f.name) {
                return Err(ConfigError::Validation(format!(
                    "field name '{}.{}' must be snake_case",
                    m.name, f.name
                )));
            }
            if !names.insert(f.name.clone()) {
                return Err(ConfigError::DuplicateField {
                    model: m.name.clone(),
                    field: f.name.clone(),
                });
            }
            match (f.type_, f.related_model.as_deref()) {
                (FieldTypeConfig::ForeignKey, Some(target)) => {
                    if !model_names.contains(target) {
                        return Err(ConfigError::MissingReference {
                            kind: "model",
                            id: target.to_string(),
                        });
                    }
                }
                (FieldTypeConfig::ForeignKey, None) => {
                    return Err(ConfigError::Validation(format!(
                        "foreign key '{}.{}' needs related_model",
                        m.name, f.name
                    )));
                }
                (_, Some(_)) => {
                    return Err(ConfigError::Validation(format!(
                        "'{}.{}' sets related_model but is not a foreign key",
                        m.name, f.name
                    )));
                }
                (_, None) => {}
            }
            if let Some(pattern) = &f.validation.pattern {
                Regex::new(pattern).map_err(|_| {
                    ConfigError::Validation(format!("invalid pattern for {}.{}", m.name, f.name))
                })?;
            }
        }
        let declared: HashSet<&str> = m.fields.iter().map(|f| f.name.as_str()).collect();
        for f in m.fields.iter().filter(|f| f.type_ == FieldTypeConfig::ForeignKey) {
            let id_field = format!("{}_id", f.name);
            if declared.contains(id_field.as_str()) {
                return Err(ConfigError::DuplicateField {
                    model: m.name.clone(),
                    field: id_field,
                });
            }
        }

        let pk = primary_key_of(m);
        match m.fields.iter().find(|f| f.name == pk) {
            Some(f) if f.type_ == FieldTypeConfig::Int => {}
            _ => {
                return Err(ConfigError::InvalidPrimaryKey {
                    model: m.name.clone(),
                    field: pk.to_string(),
                })
            }
        }

        let scalar = |name: &str| {
            m.fields
                .iter()
                .any(|f| f.name == name && f.type_ != FieldTypeConfig::ForeignKey)
        };
        for (kind, name) in [("display_field", m.display_field.as_deref()), ("ordering", m.ordering.as_deref())] {
            if let Some(name) = name {
                if !scalar(name) {
                    return Err(ConfigError::MissingReference {
                        kind,
                        id: format!("{}.{}", m.name, name),
                    });
                }
            }
        }
        for name in &m.search_fields {
            let is_string = m
                .fields
                .iter()
                .any(|f| f.name == *name && f.type_ == FieldTypeConfig::String);
            if !is_string {
                return Err(ConfigError::Validation(format!(
                    "search field '{}.{}' must be a string field",
                    m.name, name
                )));
            }
        }
    }

    Ok(())
}
