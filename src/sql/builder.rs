//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from a model definition.

use crate::config::{FieldDef, ModelDef, ScalarType};
use crate::repo::Assignments;
use crate::value::NativeValue;

/// Quote identifier for PostgreSQL (safe: only from declarations).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(model: &ModelDef) -> String {
    match &model.schema_name {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&model.table_name)),
        None => quoted(&model.table_name),
    }
}

/// SQL type every value of a scalar is cast to, so rows decode to one Rust type per field.
pub(crate) fn pg_type(t: ScalarType) -> &'static str {
    match t {
        ScalarType::String => "text",
        ScalarType::Int => "bigint",
        ScalarType::Bool => "boolean",
        ScalarType::Date => "date",
        ScalarType::Datetime => "timestamp",
    }
}

fn column_of(f: &FieldDef) -> &str {
    f.column.as_deref().unwrap_or(&f.name)
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<NativeValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a parameter and return its cast placeholder.
    fn push_param(&mut self, v: NativeValue, t: ScalarType) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), pg_type(t))
    }
}

/// SELECT list: every column cast to its field type and aliased to the field name.
fn select_column_list(model: &ModelDef) -> String {
    model
        .columns()
        .map(|f| {
            let t = f.scalar_type().unwrap_or(ScalarType::String);
            format!("{}::{} AS {}", quoted(column_of(f)), pg_type(t), quoted(&f.name))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn pk_column(model: &ModelDef) -> String {
    quoted(model.pk_column())
}

fn pk_param(q: &mut QueryBuf, pk: i64) -> String {
    q.push_param(NativeValue::Int(pk), ScalarType::Int)
}

/// Escape LIKE wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn search_clause(q: &mut QueryBuf, model: &ModelDef, search: Option<&str>) -> String {
    let Some(term) = search else { return String::new() };
    let ph = q.push_param(NativeValue::Text(like_pattern(term)), ScalarType::String);
    let parts: Vec<String> = model
        .search_fields
        .iter()
        .filter_map(|name| model.field(name))
        .map(|f| format!("{} ILIKE {}", quoted(column_of(f)), ph))
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    format!(" WHERE ({})", parts.join(" OR "))
}

fn ordering_column(model: &ModelDef) -> String {
    model
        .field(&model.ordering)
        .map(|f| quoted(column_of(f)))
        .unwrap_or_else(|| pk_column(model))
}

/// One page, ordered by the model's ordering column then primary key, both descending.
pub fn select_page(model: &ModelDef, search: Option<&str>, limit: u64, offset: u64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(&mut q, model, search);
    let order = ordering_column(model);
    let pk = pk_column(model);
    let order_clause = if order == pk {
        format!(" ORDER BY {} DESC", pk)
    } else {
        format!(" ORDER BY {} DESC, {} DESC", order, pk)
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(model),
        qualified_table(model),
        where_clause,
        order_clause,
        limit,
        offset
    );
    q
}

/// COUNT of rows matching the same search as `select_page`.
pub fn count(model: &ModelDef, search: Option<&str>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = search_clause(&mut q, model, search);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", qualified_table(model), where_clause);
    q
}

/// SELECT by primary key.
pub fn select_by_id(model: &ModelDef, pk: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = pk_param(&mut q, pk);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(model),
        qualified_table(model),
        pk_column(model),
        ph
    );
    q
}

/// SELECT rows whose primary key is in `pks`. Used for batch-loading related rows.
pub fn select_by_ids(model: &ModelDef, pks: &[i64]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols = select_column_list(model);
    let table = qualified_table(model);
    if pks.is_empty() {
        q.sql = format!("SELECT {} FROM {} WHERE 1 = 0", cols, table);
        return q;
    }
    let placeholders: Vec<String> = pks.iter().map(|pk| pk_param(&mut q, *pk)).collect();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {}",
        cols,
        table,
        pk_column(model),
        placeholders.join(", "),
        pk_column(model)
    );
    q
}

/// Every row ordered by primary key.
pub fn select_all(model: &ModelDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(model),
        qualified_table(model),
        pk_column(model)
    );
    q
}

fn now_expr(f: &FieldDef) -> &'static str {
    match f.scalar_type() {
        Some(ScalarType::Date) => "CURRENT_DATE",
        _ => "LOCALTIMESTAMP",
    }
}

/// INSERT: generated primary key omitted, auto timestamps from the database clock, absent columns left to DB defaults.
pub fn insert(model: &ModelDef, values: &Assignments) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut exprs = Vec::new();
    for f in model.columns() {
        if f.name == model.pk_field || f.generated {
            continue;
        }
        if f.auto_now_add || f.auto_now {
            cols.push(quoted(column_of(f)));
            exprs.push(now_expr(f).to_string());
            continue;
        }
        let Some(v) = values.get(&f.name) else { continue };
        let t = f.scalar_type().unwrap_or(ScalarType::String);
        cols.push(quoted(column_of(f)));
        exprs.push(q.push_param(v.clone(), t));
    }
    let returning = format!("{}::bigint", pk_column(model));
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", qualified_table(model), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            qualified_table(model),
            cols.join(", "),
            exprs.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by primary key: SET the writable columns present in `values`, refresh `auto_now` columns.
pub fn update(model: &ModelDef, pk: i64, values: &Assignments) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in model.columns() {
        if f.name == model.pk_field || f.generated || f.auto_now_add {
            continue;
        }
        if f.auto_now {
            sets.push(format!("{} = {}", quoted(column_of(f)), now_expr(f)));
            continue;
        }
        let Some(v) = values.get(&f.name) else { continue };
        let t = f.scalar_type().unwrap_or(ScalarType::String);
        let rhs = q.push_param(v.clone(), t);
        sets.push(format!("{} = {}", quoted(column_of(f)), rhs));
    }
    if sets.is_empty() {
        return select_by_id(model, pk);
    }
    let id_ph = pk_param(&mut q, pk);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified_table(model),
        sets.join(", "),
        pk_column(model),
        id_ph,
        select_column_list(model)
    );
    q
}

/// DELETE by primary key.
pub fn delete(model: &ModelDef, pk: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = pk_param(&mut q, pk);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}::bigint",
        qualified_table(model),
        pk_column(model),
        ph,
        pk_column(model)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, ModelsConfig};
    use crate::registry::ModelRegistry;
    use serde_json::json;

    fn registry() -> ModelRegistry {
        let config: ModelsConfig = serde_json::from_value(json!({"models": [
            {"name": "Author", "schema": "blog", "search_fields": ["name"], "fields": [
                {"name": "id", "type": "int", "generated": true},
                {"name": "name", "type": "string"}
            ]},
            {"name": "Post", "ordering": "created_at", "fields": [
                {"name": "id", "type": "int", "generated": true},
                {"name": "title", "type": "string", "column": "headline"},
                {"name": "author", "type": "foreign_key", "related_model": "Author"},
                {"name": "created_at", "type": "datetime", "auto_now_add": true},
                {"name": "updated_at", "type": "datetime", "auto_now": true}
            ]}
        ]}))
        .unwrap();
        resolve(&config, &[]).unwrap()
    }

    #[test]
    fn page_orders_descending_and_offsets() {
        let r = registry();
        let q = select_page(r.get("Post").unwrap(), None, 10, 10);
        assert_eq!(
            q.sql,
            "SELECT \"id\"::bigint AS \"id\", \"headline\"::text AS \"title\", \"author_id\"::bigint AS \"author_id\", \
             \"created_at\"::timestamp AS \"created_at\", \"updated_at\"::timestamp AS \"updated_at\" \
             FROM \"post\" ORDER BY \"created_at\" DESC, \"id\" DESC LIMIT 10 OFFSET 10"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn search_binds_escaped_pattern() {
        let r = registry();
        let author = r.get("Author").unwrap();
        let q = count(author, Some("50%_off"));
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM \"blog\".\"author\" WHERE (\"name\" ILIKE $1::text)"
        );
        assert_eq!(q.params, vec![NativeValue::Text("%50\\%\\_off%".into())]);
    }

    #[test]
    fn insert_skips_generated_and_stamps_auto_fields() {
        let r = registry();
        let mut values = Assignments::new();
        values.insert("title".into(), "Hello".into());
        values.insert("author_id".into(), NativeValue::Int(3));
        let q = insert(r.get("Post").unwrap(), &values);
        assert_eq!(
            q.sql,
            "INSERT INTO \"post\" (\"headline\", \"author_id\", \"created_at\", \"updated_at\") \
             VALUES ($1::text, $2::bigint, LOCALTIMESTAMP, LOCALTIMESTAMP) RETURNING \"id\"::bigint"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_refreshes_auto_now_only() {
        let r = registry();
        let mut values = Assignments::new();
        values.insert("title".into(), "Edited".into());
        let q = update(r.get("Post").unwrap(), 7, &values);
        assert!(q.sql.starts_with(
            "UPDATE \"post\" SET \"headline\" = $1::text, \"updated_at\" = LOCALTIMESTAMP WHERE \"id\" = $2::bigint RETURNING "
        ));
        assert_eq!(q.params, vec![NativeValue::Text("Edited".into()), NativeValue::Int(7)]);
    }

    #[test]
    fn empty_id_list_selects_nothing() {
        let r = registry();
        let q = select_by_ids(r.get("Author").unwrap(), &[]);
        assert!(q.sql.ends_with("WHERE 1 = 0"));
        let q = select_by_ids(r.get("Author").unwrap(), &[1, 2]);
        assert!(q.sql.contains("IN ($1::bigint, $2::bigint)"));
    }
}
