//! GraphQL boundary: schema, resolvers and conversions to and from the model.

/// Declares a GraphQL enum mirroring a `crate::model` enum, with conversions both ways.
macro_rules! mirror_enum {
    ($name:ident => $model:ident { $($variant:ident),+ $(,)? }) => {
        #[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl From<crate::model::$model> for $name {
            fn from(value: crate::model::$model) -> Self {
                match value {
                    $(crate::model::$model::$variant => $name::$variant),+
                }
            }
        }

        impl From<$name> for crate::model::$model {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => crate::model::$model::$variant),+
                }
            }
        }
    };
}

mod application;
mod auth;
mod errors;
mod formation;
mod label;
mod package;
mod runtime;
pub mod scalars;
mod tenant;
mod webhook;

use std::future::Future;
use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, MergedObject, OutputType, Schema, SimpleObject};

use crate::apperrors::is_not_found_error;
use crate::context::RequestContext;
use crate::logic::Services;
use crate::model::{self, pagination};
use crate::store::{with_transaction, Transactioner};

pub use errors::gql_error;

use application::{Application, ApplicationMutation, ApplicationQuery};
use formation::{Formation, FormationAssignment, FormationMutation, FormationQuery};
use label::{LabelDefinitionMutation, LabelDefinitionQuery};
use package::{PackageInstanceAuthMutation, PackageMutation, PackageQuery};
use runtime::{Runtime, RuntimeMutation, RuntimeQuery};
use scalars::PageCursor;
use tenant::{TenantMutation, TenantQuery};
use webhook::WebhookMutation;

pub type DirectorSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    ApplicationQuery,
    RuntimeQuery,
    PackageQuery,
    FormationQuery,
    LabelDefinitionQuery,
    TenantQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    ApplicationMutation,
    RuntimeMutation,
    PackageMutation,
    PackageInstanceAuthMutation,
    WebhookMutation,
    LabelDefinitionMutation,
    FormationMutation,
    TenantMutation,
);

/// Builds the schema over the given services.
///
/// Requests must carry a [`RequestContext`] as request data to resolve a tenant.
pub fn build_schema(services: Services, transact: Arc<dyn Transactioner>) -> DirectorSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(services)
        .data(transact)
        .finish()
}

fn services<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Services> {
    ctx.data::<Services>()
}

/// Runs `op` in a transaction of its own: commit on success, roll back on error.
async fn transact<T, F, Fut>(ctx: &Context<'_>, op: F) -> async_graphql::Result<T>
where
    F: FnOnce(RequestContext) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let transact = ctx.data::<Arc<dyn Transactioner>>()?;
    let request = ctx.data_opt::<RequestContext>().cloned().unwrap_or_default();
    with_transaction(transact.as_ref(), &request, op)
        .await
        .map_err(gql_error)
}

/// Like [`transact`], but a missing object commits and resolves to `null`.
async fn transact_optional<T, F, Fut>(ctx: &Context<'_>, op: F) -> async_graphql::Result<Option<T>>
where
    F: FnOnce(RequestContext) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    transact(ctx, |tx_ctx| async move {
        match op(tx_ctx).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if is_not_found_error(&err) => Ok(None),
            Err(err) => Err(err),
        }
    })
    .await
}

#[derive(SimpleObject, Debug, Clone)]
pub struct PageInfo {
    pub start_cursor: PageCursor,
    pub end_cursor: PageCursor,
    pub has_next_page: bool,
}

impl From<model::PageInfo> for PageInfo {
    fn from(info: model::PageInfo) -> Self {
        Self {
            start_cursor: PageCursor(info.start_cursor),
            end_cursor: PageCursor(info.end_cursor),
            has_next_page: info.has_next_page,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(
    concrete(name = "ApplicationPage", params(Application)),
    concrete(name = "RuntimePage", params(Runtime)),
    concrete(name = "FormationPage", params(Formation)),
    concrete(name = "FormationAssignmentPage", params(FormationAssignment))
)]
pub struct Page<T: OutputType> {
    pub data: Vec<T>,
    pub page_info: PageInfo,
    pub total_count: i32,
}

impl<T: OutputType> Page<T> {
    fn from_model<M>(page: model::Page<M>) -> Self
    where
        T: From<M>,
    {
        Self {
            data: page.data.into_iter().map(T::from).collect(),
            page_info: page.page_info.into(),
            total_count: page.total_count,
        }
    }
}

fn page_args(first: Option<i32>, after: Option<PageCursor>) -> (i32, String) {
    (
        first.unwrap_or(pagination::DEFAULT_PAGE_SIZE),
        after.map(|cursor| cursor.0).unwrap_or_default(),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::logic::uid::{fixed_timestamp_generator, SequenceUidService};
    use crate::store::mocks::{tenant_context, InMemoryRepositories, StubTransactioner};
    use chrono::{TimeZone, Utc};

    pub struct Harness {
        pub schema: DirectorSchema,
        pub repos: InMemoryRepositories,
        pub tx: StubTransactioner,
    }

    impl Harness {
        pub fn new() -> Self {
            let repos = InMemoryRepositories::default();
            let tx = StubTransactioner::default();
            let services = Services::new(
                &repos.repositories(),
                Arc::new(SequenceUidService::default()),
                fixed_timestamp_generator(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            );
            let schema = build_schema(services, Arc::new(tx.clone()));
            Self { schema, repos, tx }
        }

        /// Executes `query` as the test tenant and returns the response as JSON.
        pub async fn execute(&self, query: &str) -> (serde_json::Value, Vec<async_graphql::ServerError>) {
            let request = async_graphql::Request::new(query).data(tenant_context());
            let response = self.schema.execute(request).await;
            let data = response.data.into_json().unwrap();
            (data, response.errors)
        }

        pub async fn execute_ok(&self, query: &str) -> serde_json::Value {
            let (data, errors) = self.execute(query).await;
            assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
            data
        }
    }
}
