//! Raw declaration types matching the models JSON file.

use serde::{Deserialize, Serialize};

/// Declared column type. `foreign_key` points at another declared model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTypeConfig {
    String,
    Int,
    Bool,
    Date,
    Datetime,
    ForeignKey,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub minimum: Option<i64>,
    #[serde(default)]
    pub maximum: Option<i64>,
}

impl ValidationRule {
    pub fn is_empty(&self) -> bool {
        self.max_length.is_none()
            && self.min_length.is_none()
            && self.pattern.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldTypeConfig,
    /// Human label; the field name is used when absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Column name when it differs from the field name. For foreign keys this is the id column (default `{name}_id`).
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub null: bool,
    /// Defaults to `!null && default.is_none() && !read_only`.
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub auto_now_add: bool,
    #[serde(default)]
    pub auto_now: bool,
    #[serde(default)]
    pub related_model: Option<String>,
    /// Name of the backward relation materialized on the related model.
    #[serde(default)]
    pub related_name: Option<String>,
    #[serde(flatten)]
    pub validation: ValidationRule,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    /// PascalCase model name; the resource code is its kebab-case form.
    pub name: String,
    /// Table name; snake_case of the model name when absent.
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    /// Generated integer primary key field; `id` when absent.
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub verbose_name_plural: Option<String>,
    /// Field whose value is the record's display string (choices, related columns).
    #[serde(default)]
    pub display_field: Option<String>,
    /// Column used to order list pages, descending. Primary key when absent.
    #[serde(default)]
    pub ordering: Option<String>,
    /// String fields matched by the list `search` parameter.
    #[serde(default)]
    pub search_fields: Vec<String>,
    pub fields: Vec<FieldConfig>,
}

/// All declarations in one struct for in-memory loading.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}
