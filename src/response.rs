//! Response bodies of the admin resource operations.

use crate::service::fields::FieldMeta;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct Paginator {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub fields: Vec<FieldMeta>,
    pub paginator: Paginator,
}

/// One list page: rendered records plus the read-view descriptor and total count.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<Map<String, Value>>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub fields: Vec<FieldMeta>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CreatedResponse {
    pub pk: i64,
}
