//! Generic SQL helpers shared by every repository.
//!
//! Each helper is configured once with a table, its column list and (for tenant scoped
//! tables) the tenant column. Repositories only describe *what* to read or write; the
//! statements are assembled here with `sqlx::QueryBuilder` and always bind values.

use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Postgres, QueryBuilder, Row};

use crate::apperrors::{AppError, ResourceType};
use crate::context::RequestContext;
use crate::model::pagination::{self, Page, PageInfo};
use crate::store::persistence;

/// A bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(Option<String>),
    Bool(Option<bool>),
    Int(Option<i32>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<serde_json::Value>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(Some(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Some(value))
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(Some(value))
    }
}

impl From<Option<i32>> for Value {
    fn from(value: Option<i32>) -> Self {
        Value::Int(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(Some(value))
    }
}

impl From<Option<DateTime<Utc>>> for Value {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(Some(value))
    }
}

impl From<Option<serde_json::Value>> for Value {
    fn from(value: Option<serde_json::Value>) -> Self {
        Value::Json(value)
    }
}

/// Row type scanned and written by the generic helpers.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Column name and value pairs of this row
    fn column_values(&self) -> Vec<(&'static str, Value)>;
}

fn value_for(values: &[(&'static str, Value)], column: &str) -> Result<Value> {
    values
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, value)| value.clone())
        .ok_or_else(|| {
            AppError::Internal(format!("missing value for column {}", column)).into()
        })
}

/// WHERE clause fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equal(&'static str, Value),
    NotEqual(&'static str, Value),
    Null(&'static str),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Condition::Equal(column, value.into())
    }

    pub fn not_eq(column: &'static str, value: impl Into<Value>) -> Self {
        Condition::NotEqual(column, value.into())
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: Value) {
    match value {
        Value::Text(v) => builder.push_bind(v),
        Value::Bool(v) => builder.push_bind(v),
        Value::Int(v) => builder.push_bind(v),
        Value::Timestamp(v) => builder.push_bind(v),
        Value::Json(v) => builder.push_bind(v),
    };
}

fn push_condition(builder: &mut QueryBuilder<'_, Postgres>, condition: Condition) {
    match condition {
        Condition::Equal(column, value) => {
            builder.push(column).push(" = ");
            push_value(builder, value);
        }
        Condition::NotEqual(column, value) => {
            builder.push(column).push(" != ");
            push_value(builder, value);
        }
        Condition::Null(column) => {
            builder.push(column).push(" IS NULL");
        }
        Condition::Or(conditions) => {
            builder.push("(");
            for (i, condition) in conditions.into_iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                push_condition(builder, condition);
            }
            builder.push(")");
        }
    }
}

fn push_where(builder: &mut QueryBuilder<'_, Postgres>, conditions: Vec<Condition>) {
    for (i, condition) in conditions.into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_condition(builder, condition);
    }
}

fn scoped(tenant: Option<(&'static str, &str)>, conditions: Vec<Condition>) -> Vec<Condition> {
    match tenant {
        Some((column, tenant)) => std::iter::once(Condition::eq(column, tenant))
            .chain(conditions)
            .collect(),
        None => conditions,
    }
}

/// Maps driver errors to application errors; anything unexpected is logged and masked.
pub fn map_sql_error(err: sqlx::Error, resource: ResourceType, operation: &str) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return AppError::NotUnique { resource }.into(),
            Some("23503") => {
                return AppError::InvalidOperation(format!(
                    "{} {} violates a foreign key constraint",
                    operation, resource
                ))
                .into()
            }
            _ => {}
        }
    }
    log::error!("Unexpected error while {} {}: {}", operation, resource, err);
    AppError::Internal("Unexpected error while executing SQL query".to_string()).into()
}

fn select_from(columns: &[&'static str], table: &'static str) -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {} FROM {}", columns.join(", "), table))
}

fn select_query(
    columns: &[&'static str],
    table: &'static str,
    conditions: Vec<Condition>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = select_from(columns, table);
    push_where(&mut builder, conditions);
    builder
}

fn insert_query(
    table: &'static str,
    columns: &[&'static str],
    values: &[(&'static str, Value)],
) -> Result<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        table,
        columns.join(", ")
    ));
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, value_for(values, column)?);
    }
    builder.push(")");
    Ok(builder)
}

/// Inserts whole rows.
#[derive(Debug, Clone)]
pub struct Creator {
    resource: ResourceType,
    table: &'static str,
    columns: &'static [&'static str],
}

impl Creator {
    pub fn new(resource: ResourceType, table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            resource,
            table,
            columns,
        }
    }

    fn query(&self, values: &[(&'static str, Value)]) -> Result<QueryBuilder<'static, Postgres>> {
        insert_query(self.table, self.columns, values)
    }

    pub async fn create<E: Entity>(&self, ctx: &RequestContext, entity: &E) -> Result<()> {
        let mut builder = self.query(&entity.column_values())?;

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|err| map_sql_error(err, self.resource, "inserting"))?;
        Ok(())
    }
}

/// Reads exactly one row; an absent row is a typed not-found error.
#[derive(Debug, Clone)]
pub struct SingleGetter {
    resource: ResourceType,
    table: &'static str,
    tenant_column: &'static str,
    columns: &'static [&'static str],
}

impl SingleGetter {
    /// For tables without a tenant column; only the `*_global` methods apply.
    pub fn new_global(resource: ResourceType, table: &'static str, columns: &'static [&'static str]) -> Self {
        Self::new(resource, table, "", columns)
    }

    pub fn new(
        resource: ResourceType,
        table: &'static str,
        tenant_column: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            resource,
            table,
            tenant_column,
            columns,
        }
    }

    pub async fn get<E: Entity>(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        conditions: Vec<Condition>,
    ) -> Result<E> {
        self.fetch(ctx, scoped(Some((self.tenant_column, tenant)), conditions))
            .await
    }

    pub async fn get_global<E: Entity>(
        &self,
        ctx: &RequestContext,
        conditions: Vec<Condition>,
    ) -> Result<E> {
        self.fetch(ctx, conditions).await
    }

    async fn fetch<E: Entity>(&self, ctx: &RequestContext, conditions: Vec<Condition>) -> Result<E> {
        let id = conditions.iter().find_map(|c| match c {
            Condition::Equal("id", Value::Text(Some(id))) => Some(id.clone()),
            _ => None,
        });
        let mut builder = select_query(self.columns, self.table, conditions);

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        let row = builder
            .build_query_as::<E>()
            .fetch_optional(&mut **tx)
            .await
            .map_err(|err| map_sql_error(err, self.resource, "getting"))?;

        row.ok_or_else(|| {
            AppError::NotFound {
                resource: self.resource,
                id,
            }
            .into()
        })
    }
}

/// Lists rows without pagination.
#[derive(Debug, Clone)]
pub struct Lister {
    resource: ResourceType,
    table: &'static str,
    tenant_column: &'static str,
    columns: &'static [&'static str],
}

impl Lister {
    /// For tables without a tenant column; only the `*_global` methods apply.
    pub fn new_global(resource: ResourceType, table: &'static str, columns: &'static [&'static str]) -> Self {
        Self::new(resource, table, "", columns)
    }

    pub fn new(
        resource: ResourceType,
        table: &'static str,
        tenant_column: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            resource,
            table,
            tenant_column,
            columns,
        }
    }

    pub async fn list<E: Entity>(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        conditions: Vec<Condition>,
        order_by: &str,
    ) -> Result<Vec<E>> {
        self.fetch(
            ctx,
            scoped(Some((self.tenant_column, tenant)), conditions),
            order_by,
        )
        .await
    }

    pub async fn list_global<E: Entity>(
        &self,
        ctx: &RequestContext,
        conditions: Vec<Condition>,
        order_by: &str,
    ) -> Result<Vec<E>> {
        self.fetch(ctx, conditions, order_by).await
    }

    fn query(&self, conditions: Vec<Condition>, order_by: &str) -> QueryBuilder<'static, Postgres> {
        let mut builder = select_query(self.columns, self.table, conditions);
        builder.push(" ORDER BY ").push(order_by);
        builder
    }

    async fn fetch<E: Entity>(
        &self,
        ctx: &RequestContext,
        conditions: Vec<Condition>,
        order_by: &str,
    ) -> Result<Vec<E>> {
        let mut builder = self.query(conditions, order_by);

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        builder
            .build_query_as::<E>()
            .fetch_all(&mut **tx)
            .await
            .map_err(|err| map_sql_error(err, self.resource, "listing"))
    }
}

/// One page of rows plus paging metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPage<E> {
    pub data: Vec<E>,
    pub page_info: PageInfo,
    pub total_count: i32,
}

impl<E> EntityPage<E> {
    /// Converts every row into its model
    pub fn into_models<T>(self, f: impl FnMut(E) -> Result<T>) -> Result<Page<T>> {
        Page {
            data: self.data,
            page_info: self.page_info,
            total_count: self.total_count,
        }
        .try_map(f)
    }
}

/// COUNT and page SELECT for one page request.
struct PageQueries {
    count: QueryBuilder<'static, Postgres>,
    select: QueryBuilder<'static, Postgres>,
    offset: i32,
}

/// Lists rows page by page using offset cursors.
#[derive(Debug, Clone)]
pub struct PageableQuerier {
    resource: ResourceType,
    table: &'static str,
    tenant_column: &'static str,
    columns: &'static [&'static str],
}

impl PageableQuerier {
    pub fn new(
        resource: ResourceType,
        table: &'static str,
        tenant_column: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            resource,
            table,
            tenant_column,
            columns,
        }
    }

    fn queries(
        &self,
        tenant: &str,
        page_size: i32,
        cursor: &str,
        order_by: &str,
        conditions: Vec<Condition>,
    ) -> Result<PageQueries> {
        pagination::validate_page_size(page_size)?;
        let offset = pagination::decode_offset_cursor(cursor)?;
        let conditions = scoped(Some((self.tenant_column, tenant)), conditions);

        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", self.table));
        push_where(&mut count, conditions.clone());

        let mut select = select_query(self.columns, self.table, conditions);
        select
            .push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(i64::from(page_size))
            .push(" OFFSET ")
            .push_bind(i64::from(offset));

        Ok(PageQueries {
            count,
            select,
            offset,
        })
    }

    pub async fn list<E: Entity>(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
        order_by: &str,
        conditions: Vec<Condition>,
    ) -> Result<EntityPage<E>> {
        let PageQueries {
            mut count,
            mut select,
            offset,
        } = self.queries(tenant, page_size, cursor, order_by, conditions)?;

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        let total: i64 = count
            .build()
            .fetch_one(&mut **tx)
            .await
            .and_then(|row| row.try_get::<i64, _>(0))
            .map_err(|err| map_sql_error(err, self.resource, "counting"))?;
        let data = select
            .build_query_as::<E>()
            .fetch_all(&mut **tx)
            .await
            .map_err(|err| map_sql_error(err, self.resource, "listing"))?;

        let total_count = i32::try_from(total).unwrap_or(i32::MAX);
        let page_info = pagination::page_info(cursor, offset, page_size, total_count);
        Ok(EntityPage {
            data,
            page_info,
            total_count,
        })
    }
}

/// Updates a single row identified by `id` (and tenant, unless global).
#[derive(Debug, Clone)]
pub struct Updater {
    resource: ResourceType,
    table: &'static str,
    tenant_column: &'static str,
    updatable_columns: &'static [&'static str],
}

impl Updater {
    /// For tables without a tenant column; only the `*_global` methods apply.
    pub fn new_global(resource: ResourceType, table: &'static str, updatable_columns: &'static [&'static str]) -> Self {
        Self::new(resource, table, "", updatable_columns)
    }

    pub fn new(
        resource: ResourceType,
        table: &'static str,
        tenant_column: &'static str,
        updatable_columns: &'static [&'static str],
    ) -> Self {
        Self {
            resource,
            table,
            tenant_column,
            updatable_columns,
        }
    }

    pub async fn update_single<E: Entity>(&self, ctx: &RequestContext, tenant: &str, entity: &E) -> Result<()> {
        self.update(ctx, Some(tenant), entity).await
    }

    pub async fn update_single_global<E: Entity>(&self, ctx: &RequestContext, entity: &E) -> Result<()> {
        self.update(ctx, None, entity).await
    }

    fn query(&self, tenant: Option<&str>, values: &[(&'static str, Value)]) -> Result<QueryBuilder<'static, Postgres>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", self.table));
        for (i, column) in self.updatable_columns.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column).push(" = ");
            push_value(&mut builder, value_for(values, column)?);
        }
        let conditions = scoped(
            tenant.map(|t| (self.tenant_column, t)),
            vec![Condition::Equal("id", value_for(values, "id")?)],
        );
        push_where(&mut builder, conditions);
        Ok(builder)
    }

    async fn update<E: Entity>(&self, ctx: &RequestContext, tenant: Option<&str>, entity: &E) -> Result<()> {
        let mut builder = self.query(tenant, &entity.column_values())?;

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        let affected = builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|err| map_sql_error(err, self.resource, "updating"))?
            .rows_affected();
        if affected != 1 {
            return Err(AppError::Internal(format!(
                "update should modify single row, but modified {} rows",
                affected
            ))
            .into());
        }
        Ok(())
    }
}

/// Deletes rows.
#[derive(Debug, Clone)]
pub struct Deleter {
    resource: ResourceType,
    table: &'static str,
    tenant_column: &'static str,
}

impl Deleter {
    pub fn new(resource: ResourceType, table: &'static str, tenant_column: &'static str) -> Self {
        Self {
            resource,
            table,
            tenant_column,
        }
    }

    pub async fn delete_one(&self, ctx: &RequestContext, tenant: &str, conditions: Vec<Condition>) -> Result<()> {
        let affected = self
            .delete(ctx, scoped(Some((self.tenant_column, tenant)), conditions))
            .await?;
        ensure_single_deleted(affected)
    }

    pub async fn delete_one_global(&self, ctx: &RequestContext, conditions: Vec<Condition>) -> Result<()> {
        let affected = self.delete(ctx, conditions).await?;
        ensure_single_deleted(affected)
    }

    pub async fn delete_many(&self, ctx: &RequestContext, tenant: &str, conditions: Vec<Condition>) -> Result<u64> {
        self.delete(ctx, scoped(Some((self.tenant_column, tenant)), conditions))
            .await
    }

    fn query(&self, conditions: Vec<Condition>) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", self.table));
        push_where(&mut builder, conditions);
        builder
    }

    async fn delete(&self, ctx: &RequestContext, conditions: Vec<Condition>) -> Result<u64> {
        let mut builder = self.query(conditions);

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        let result = builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|err| map_sql_error(err, self.resource, "deleting"))?;
        Ok(result.rows_affected())
    }
}

fn ensure_single_deleted(affected: u64) -> Result<()> {
    if affected != 1 {
        return Err(AppError::Internal(format!(
            "delete should remove single row, but removed {} rows",
            affected
        ))
        .into());
    }
    Ok(())
}

/// Checks whether any row matches.
#[derive(Debug, Clone)]
pub struct ExistQuerier {
    resource: ResourceType,
    table: &'static str,
    tenant_column: &'static str,
}

impl ExistQuerier {
    pub fn new(resource: ResourceType, table: &'static str, tenant_column: &'static str) -> Self {
        Self {
            resource,
            table,
            tenant_column,
        }
    }

    fn query(&self, tenant: &str, conditions: Vec<Condition>) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT 1 FROM {}", self.table));
        push_where(&mut builder, scoped(Some((self.tenant_column, tenant)), conditions));
        builder.push(" LIMIT 1");
        builder
    }

    pub async fn exists(&self, ctx: &RequestContext, tenant: &str, conditions: Vec<Condition>) -> Result<bool> {
        let mut builder = self.query(tenant, conditions);

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        let row = builder
            .build()
            .fetch_optional(&mut **tx)
            .await
            .map_err(|err| map_sql_error(err, self.resource, "checking existence of"))?;
        Ok(row.is_some())
    }
}

/// Insert-or-update keyed by a conflict column set; returns the id of the stored row.
#[derive(Debug, Clone)]
pub struct Upserter {
    resource: ResourceType,
    table: &'static str,
    columns: &'static [&'static str],
    conflicting_columns: &'static [&'static str],
    updatable_columns: &'static [&'static str],
}

impl Upserter {
    pub fn new(
        resource: ResourceType,
        table: &'static str,
        columns: &'static [&'static str],
        conflicting_columns: &'static [&'static str],
        updatable_columns: &'static [&'static str],
    ) -> Self {
        Self {
            resource,
            table,
            columns,
            conflicting_columns,
            updatable_columns,
        }
    }

    fn query(&self, values: &[(&'static str, Value)]) -> Result<QueryBuilder<'static, Postgres>> {
        let mut builder = insert_query(self.table, self.columns, values)?;
        let updates = self
            .updatable_columns
            .iter()
            .map(|column| format!("{column} = EXCLUDED.{column}"))
            .join(", ");
        builder.push(format!(
            " ON CONFLICT ({}) DO UPDATE SET {} RETURNING id",
            self.conflicting_columns.join(", "),
            updates
        ));
        Ok(builder)
    }

    pub async fn upsert<E: Entity>(&self, ctx: &RequestContext, entity: &E) -> Result<String> {
        let mut builder = self.query(&entity.column_values())?;

        let mut slot = ctx.persistence()?.lock().await;
        let tx = persistence::active(&mut slot)?;
        builder
            .build()
            .fetch_one(&mut **tx)
            .await
            .and_then(|row| row.try_get::<String, _>("id"))
            .map_err(|err| map_sql_error(err, self.resource, "upserting"))
    }
}
