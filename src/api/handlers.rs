use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{extract::State, response::Html, Json};
use serde::Serialize;

use crate::api::graphql::DirectorSchema;
use crate::api::tenant_extractor::TenantHeader;
use crate::context::RequestContext;

/// State shared by the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub schema: DirectorSchema,
    /// Path the playground sends its queries to
    pub api_endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Executes one GraphQL request on behalf of the tenant in the request headers.
pub async fn graphql_handler(
    State(state): State<ApiState>,
    TenantHeader(tenant): TenantHeader,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut ctx = RequestContext::new();
    if let Some(tenant) = tenant {
        ctx = ctx.with_tenant(tenant);
    }
    state.schema.execute(req.into_inner().data(ctx)).await.into()
}

pub async fn playground(State(state): State<ApiState>) -> Html<String> {
    Html(playground_source(GraphQLPlaygroundConfig::new(&state.api_endpoint)))
}
