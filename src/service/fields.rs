//! Field classification: which fields a view exposes and what logical type each one reports.

use crate::config::{FieldDef, FieldKind, LogicalType, ModelDef};
use crate::error::AppError;
use crate::registry::ModelRegistry;
use crate::repo::Repository;
use serde::Serialize;
use serde_json::Value;

/// Field descriptor sent to clients. `required`, `allow_null`, `default` and `choices` are write-view only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldMeta {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub logical_type: LogicalType,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_null: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// `(primary key, display string)` of every row of the related model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<(i64, String)>>,
}

/// Logical type of a forward field. Relation-ness is decided after the base type and wins over it.
fn logical_type(f: &FieldDef) -> Option<LogicalType> {
    let base = f.scalar_type().map(LogicalType::from);
    match &f.kind {
        FieldKind::ForeignKey { .. } => Some(LogicalType::Related),
        FieldKind::ForeignKeyColumn { .. } => Some(LogicalType::RelatedId),
        FieldKind::Scalar(_) => base,
        FieldKind::BackwardRelation { .. } => None,
    }
}

fn base_meta(f: &FieldDef, logical_type: LogicalType) -> FieldMeta {
    FieldMeta {
        name: f.name.clone(),
        label: f.label.clone(),
        logical_type,
        read_only: f.read_only(),
        related_model: f.related_model().map(String::from),
        required: None,
        allow_null: None,
        default: None,
        choices: None,
    }
}

/// List-view descriptor: every forward field. Backward relations carry no column and are skipped.
pub fn describe_for_read(model: &ModelDef) -> Vec<FieldMeta> {
    model
        .fields
        .iter()
        .filter_map(|f| logical_type(f).map(|t| base_meta(f, t)))
        .collect()
}

/// A client may send it: not a backward relation, not a companion id column, not read-only.
fn is_writable(f: &FieldDef) -> bool {
    !f.read_only() && matches!(f.kind, FieldKind::Scalar(_) | FieldKind::ForeignKey { .. })
}

pub fn write_fields(model: &ModelDef) -> impl Iterator<Item = &FieldDef> {
    model.fields.iter().filter(|f| is_writable(f))
}

/// The write-view field accepting `name`, if any.
pub fn write_field<'a>(model: &'a ModelDef, name: &str) -> Option<&'a FieldDef> {
    model.field(name).filter(|f| is_writable(f))
}

/// Write-view descriptor without relation choices.
pub fn write_metas(model: &ModelDef) -> Vec<FieldMeta> {
    write_fields(model)
        .filter_map(|f| {
            let t = logical_type(f)?;
            let mut meta = base_meta(f, t);
            meta.required = Some(f.required);
            meta.allow_null = Some(f.nullable);
            meta.default = f.default.as_ref().map(|d| d.to_json());
            Some(meta)
        })
        .collect()
}

/// Write-view descriptor. Each foreign key lists every row of its related model as choices, a full scan per relation.
pub async fn describe_for_write(
    registry: &ModelRegistry,
    model: &ModelDef,
    repo: &dyn Repository,
) -> Result<Vec<FieldMeta>, AppError> {
    let mut metas = write_metas(model);
    for meta in metas.iter_mut() {
        let Some(target) = meta.related_model.as_deref() else { continue };
        let related = registry.get(target).ok_or_else(|| AppError::NotFound(target.to_string()))?;
        let rows = repo.all(related).await?;
        tracing::debug!(model = %model.name, field = %meta.name, choices = rows.len(), "loaded relation choices");
        meta.choices = Some(rows.iter().map(|r| (r.pk, related.display(r))).collect());
    }
    Ok(metas)
}
