//! Resolved model definitions: declarations validated and flattened into per-model field tables for runtime use.

use crate::config::ValidationRule;
use crate::repo::{Assignments, Record};
use crate::value::NativeValue;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Base type of a concrete column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Int,
    Bool,
    Date,
    Datetime,
}

/// Semantic category of a field as reported to clients and used to drive conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    String,
    Int,
    Bool,
    Date,
    Datetime,
    Related,
    RelatedId,
}

impl From<ScalarType> for LogicalType {
    fn from(t: ScalarType) -> Self {
        match t {
            ScalarType::String => LogicalType::String,
            ScalarType::Int => LogicalType::Int,
            ScalarType::Bool => LogicalType::Bool,
            ScalarType::Date => LogicalType::Date,
            ScalarType::Datetime => LogicalType::Datetime,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain column.
    Scalar(ScalarType),
    /// Forward foreign key. Holds no column itself; its id lives in `id_field`.
    ForeignKey { related_model: String, id_field: String },
    /// The `{relation}_id` column materialized for a foreign key.
    ForeignKeyColumn { relation: String },
    /// Reverse side of another model's foreign key. No column.
    BackwardRelation { related_model: String },
}

#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// Storage column. None for foreign keys and backward relations.
    pub column: Option<String>,
    pub required: bool,
    pub nullable: bool,
    pub generated: bool,
    pub auto_now_add: bool,
    pub auto_now: bool,
    pub default: Option<NativeValue>,
    /// `validation.pattern`, compiled once at resolve time.
    pub pattern: Option<Regex>,
    pub validation: ValidationRule,
}

impl FieldDef {
    /// Filled by storage, never by clients.
    pub fn read_only(&self) -> bool {
        self.generated || self.auto_now_add || self.auto_now
    }

    pub fn is_backward(&self) -> bool {
        matches!(self.kind, FieldKind::BackwardRelation { .. })
    }

    /// Type of the stored value, if the field has a column.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match &self.kind {
            FieldKind::Scalar(t) => Some(*t),
            FieldKind::ForeignKeyColumn { .. } => Some(ScalarType::Int),
            FieldKind::ForeignKey { .. } | FieldKind::BackwardRelation { .. } => None,
        }
    }

    pub fn related_model(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::ForeignKey { related_model, .. } => Some(related_model),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ModelDef {
    /// PascalCase name as declared.
    pub name: String,
    /// kebab-case resource code.
    pub code: String,
    pub label: String,
    pub schema_name: Option<String>,
    pub table_name: String,
    /// Name of the generated integer primary key field.
    pub pk_field: String,
    pub display_field: Option<String>,
    /// Field ordering list pages, descending.
    pub ordering: String,
    pub search_fields: Vec<String>,
    /// Declaration order, companion id columns right after their foreign key, backward relations last.
    pub fields: Vec<FieldDef>,
    pub(crate) field_index: HashMap<String, usize>,
}

impl ModelDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Fields backed by a storage column, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.column.is_some())
    }

    pub fn pk_column(&self) -> &str {
        self.field(&self.pk_field)
            .and_then(|f| f.column.as_deref())
            .unwrap_or(&self.pk_field)
    }

    /// Display string of a record: the display field's value, or "Name (pk)".
    pub fn display(&self, record: &Record) -> String {
        self.display_field
            .as_deref()
            .and_then(|f| record.get(f).to_display())
            .unwrap_or_else(|| format!("{} ({})", self.name, record.pk))
    }

    /// Add declared defaults for writable columns absent from `values`.
    pub fn with_defaults(&self, values: &Assignments) -> Assignments {
        let mut out = values.clone();
        for f in self.columns() {
            if f.read_only() || out.contains_key(&f.name) {
                continue;
            }
            if let Some(d) = &f.default {
                out.insert(f.name.clone(), d.clone());
            }
        }
        out
    }
}
