//! AdminService: the resource operations behind the admin HTTP surface.

use crate::error::AppError;
use crate::registry::{MenuItem, ModelRegistry};
use crate::repo::{ListFilter, Repository};
use crate::response::{CreatedResponse, ListMeta, ListResponse, MetaResponse, Paginator};
use crate::service::codec;
use crate::service::fields::{describe_for_read, describe_for_write};
use crate::service::validation::RequestValidator;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const PAGE_SIZE: u64 = 10;

/// Row offset of a 1-based page. Saturates at `i64::MAX`, the largest offset storage accepts.
fn page_offset(page: i64) -> u64 {
    (page.max(1) as u64 - 1)
        .saturating_mul(PAGE_SIZE)
        .min(i64::MAX as u64)
}

#[derive(Clone)]
pub struct AdminService {
    registry: Arc<ModelRegistry>,
    repo: Arc<dyn Repository>,
}

impl AdminService {
    pub fn new(registry: Arc<ModelRegistry>, repo: Arc<dyn Repository>) -> Self {
        AdminService { registry, repo }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        self.registry.menu()
    }

    /// One page of `PAGE_SIZE` records, newest first. Pages below 1 read as page 1.
    pub async fn list(
        &self,
        code: &str,
        page: i64,
        search: Option<String>,
    ) -> Result<ListResponse, AppError> {
        let model = self.registry.resolve(code)?;
        let offset = page_offset(page);
        let filter = ListFilter { search };
        let (records, count) = self.repo.list(model, &filter, offset, PAGE_SIZE).await?;
        tracing::debug!(model = %model.name, offset, rows = records.len(), count, "list");
        let fields = describe_for_read(model);
        let data = codec::render(&self.registry, model, &fields, &records, self.repo.as_ref()).await?;
        Ok(ListResponse {
            data,
            meta: ListMeta {
                fields,
                paginator: Paginator { count },
            },
        })
    }

    pub async fn meta(&self, code: &str) -> Result<MetaResponse, AppError> {
        let model = self.registry.resolve(code)?;
        let fields = describe_for_write(&self.registry, model, self.repo.as_ref()).await?;
        Ok(MetaResponse { fields })
    }

    pub async fn create(
        &self,
        code: &str,
        payload: &Map<String, Value>,
    ) -> Result<CreatedResponse, AppError> {
        let model = self.registry.resolve(code)?;
        let values = codec::parse(model, payload)?;
        RequestValidator::validate_required(model, &model.with_defaults(&values))?;
        let pk = self.repo.create(model, &values).await?;
        tracing::debug!(model = %model.name, pk, "created");
        Ok(CreatedResponse { pk })
    }

    pub async fn retrieve(&self, code: &str, pk: i64) -> Result<Map<String, Value>, AppError> {
        let model = self.registry.resolve(code)?;
        let record = self
            .repo
            .get(model, pk)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", model.name, pk)))?;
        Ok(record.to_json())
    }

    pub async fn update(
        &self,
        code: &str,
        pk: i64,
        payload: &Map<String, Value>,
    ) -> Result<Map<String, Value>, AppError> {
        let model = self.registry.resolve(code)?;
        let not_found = || AppError::NotFound(format!("{} {}", model.name, pk));
        self.repo.get(model, pk).await?.ok_or_else(not_found)?;
        let values = codec::parse(model, payload)?;
        let record = self
            .repo
            .update(model, pk, &values)
            .await?
            .ok_or_else(not_found)?;
        tracing::debug!(model = %model.name, pk, fields = values.len(), "updated");
        Ok(record.to_json())
    }

    pub async fn delete(&self, code: &str, pk: i64) -> Result<(), AppError> {
        let model = self.registry.resolve(code)?;
        if !self.repo.delete(model, pk).await? {
            return Err(AppError::NotFound(format!("{} {}", model.name, pk)));
        }
        tracing::debug!(model = %model.name, pk, "deleted");
        Ok(())
    }
}
