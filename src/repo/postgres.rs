//! Repository over PostgreSQL using the parameterized SQL builder.

use super::{Assignments, ListFilter, Record, Repository};
use crate::config::ModelDef;
use crate::error::AppError;
use crate::sql::{self, bind_all, row_to_record, QueryBuf};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        PgRepository { pool }
    }

    async fn query_many(&self, model: &ModelDef, q: &QueryBuf) -> Result<Vec<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(&q.sql, &q.params).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|r| row_to_record(model, r))
            .collect::<Result<_, _>>()?)
    }

    async fn query_one(&self, model: &ModelDef, q: &QueryBuf) -> Result<Option<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(&q.sql, &q.params).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_record(model, &r)).transpose()?)
    }

    /// First column of the first row as an integer (returned key, count).
    async fn query_pk(&self, q: &QueryBuf) -> Result<Option<i64>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(&q.sql, &q.params).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| r.try_get::<i64, _>(0)).transpose()?)
    }
}

/// `INSERT ... RETURNING` always yields a row; a missing one is a storage fault, not a missing resource.
fn inserted_pk(model: &ModelDef, pk: Option<i64>) -> Result<i64, AppError> {
    pk.ok_or_else(|| {
        AppError::Db(sqlx::Error::Protocol(format!(
            "insert into {} returned no key",
            model.table_name
        )))
    })
}

#[async_trait]
impl Repository for PgRepository {
    async fn list(
        &self,
        model: &ModelDef,
        filter: &ListFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Record>, u64), AppError> {
        let search = filter.search_for(model);
        let page = self
            .query_many(model, &sql::select_page(model, search, limit, offset))
            .await?;
        let count = self
            .query_pk(&sql::count(model, search))
            .await?
            .unwrap_or(0);
        Ok((page, count.max(0) as u64))
    }

    async fn get(&self, model: &ModelDef, pk: i64) -> Result<Option<Record>, AppError> {
        self.query_one(model, &sql::select_by_id(model, pk)).await
    }

    async fn get_many(&self, model: &ModelDef, pks: &[i64]) -> Result<Vec<Record>, AppError> {
        if pks.is_empty() {
            return Ok(Vec::new());
        }
        let mut pks = pks.to_vec();
        pks.sort_unstable();
        pks.dedup();
        self.query_many(model, &sql::select_by_ids(model, &pks)).await
    }

    async fn all(&self, model: &ModelDef) -> Result<Vec<Record>, AppError> {
        self.query_many(model, &sql::select_all(model)).await
    }

    async fn create(&self, model: &ModelDef, values: &Assignments) -> Result<i64, AppError> {
        let values = model.with_defaults(values);
        inserted_pk(model, self.query_pk(&sql::insert(model, &values)).await?)
    }

    async fn update(
        &self,
        model: &ModelDef,
        pk: i64,
        values: &Assignments,
    ) -> Result<Option<Record>, AppError> {
        self.query_one(model, &sql::update(model, pk, values)).await
    }

    async fn delete(&self, model: &ModelDef, pk: i64) -> Result<bool, AppError> {
        Ok(self.query_pk(&sql::delete(model, pk)).await?.is_some())
    }
}
