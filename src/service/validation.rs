//! Value rules from field declarations, applied after the write payload is converted.

use crate::config::{FieldDef, FieldKind, ModelDef, ValidationRule};
use crate::error::AppError;
use crate::repo::Assignments;
use crate::service::fields::write_fields;
use crate::value::NativeValue;
use regex::Regex;

pub struct RequestValidator;

impl RequestValidator {
    /// Check one converted value against its field's rule. Nulls are checked against nullability only.
    pub fn validate_field(field: &FieldDef, v: &NativeValue) -> Result<(), AppError> {
        if v.is_null() {
            if !field.nullable && field.default.is_none() {
                return Err(AppError::invalid(&field.name, "may not be null"));
            }
            return Ok(());
        }
        validate_rule(&field.name, v, &field.validation, field.pattern.as_ref())
    }

    /// On create every required field must end up with a value, either sent or declared as default.
    pub fn validate_required(model: &ModelDef, values: &Assignments) -> Result<(), AppError> {
        for f in write_fields(model).filter(|f| f.required) {
            let key = match &f.kind {
                FieldKind::ForeignKey { id_field, .. } => id_field.as_str(),
                _ => f.name.as_str(),
            };
            let present = values.get(key).map(|v| !v.is_null()).unwrap_or(false);
            if !present && f.default.is_none() {
                return Err(AppError::invalid(&f.name, "is required"));
            }
        }
        Ok(())
    }
}

fn validate_rule(
    col: &str,
    v: &NativeValue,
    rule: &ValidationRule,
    pattern: Option<&Regex>,
) -> Result<(), AppError> {
    if rule.is_empty() {
        return Ok(());
    }
    if let NativeValue::Text(s) = v {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                return Err(AppError::invalid(col, format!("must be at most {} characters", max)));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                return Err(AppError::invalid(col, format!("must be at least {} characters", min)));
            }
        }
        if let Some(re) = pattern {
            if !re.is_match(s) {
                return Err(AppError::invalid(col, "does not match required pattern"));
            }
        }
    }
    if let NativeValue::Int(n) = v {
        if let Some(min) = rule.minimum {
            if *n < min {
                return Err(AppError::invalid(col, format!("must be at least {}", min)));
            }
        }
        if let Some(max) = rule.maximum {
            if *n > max {
                return Err(AppError::invalid(col, format!("must be at most {}", max)));
            }
        }
    }
    Ok(())
}
