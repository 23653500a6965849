use axum::{
    routing::{get, post},
    Router,
};

use crate::api::graphql::DirectorSchema;
use crate::api::handlers::{self, ApiState};

/// Routes of the director: health check, GraphQL endpoint and playground.
///
/// The GraphQL endpoint and the playground may share a path; POST then goes to the API and
/// GET to the playground.
pub fn create_router(schema: DirectorSchema, api_endpoint: &str, playground_endpoint: &str) -> Router {
    let state = ApiState {
        schema,
        api_endpoint: api_endpoint.to_string(),
    };

    let router = Router::new().route("/healthz", get(handlers::health_check));
    let router = if api_endpoint == playground_endpoint {
        router.route(
            api_endpoint,
            get(handlers::playground).post(handlers::graphql_handler),
        )
    } else {
        router
            .route(api_endpoint, post(handlers::graphql_handler))
            .route(playground_endpoint, get(handlers::playground))
    };

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::graphql::testing::Harness;
    use crate::store::mocks::TEST_TENANT;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn graphql_request(query: &str, tenant: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json");
        if let Some(tenant) = tenant {
            builder = builder.header("tenant", tenant);
        }
        let body = serde_json::json!({ "query": query }).to_string();
        builder.body(Body::from(body)).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(Harness::new().schema, "/graphql", "/graphql");

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_graphql_uses_tenant_header() {
        let h = Harness::new();
        let app = create_router(h.schema.clone(), "/graphql", "/graphql");

        let response = app
            .oneshot(graphql_request(
                r#"mutation { registerApplication(in: {name: "orders"}) { name } }"#,
                Some(TEST_TENANT),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["registerApplication"]["name"], "orders");
        assert_eq!(h.repos.applications.table.all()[0].tenant, TEST_TENANT);
    }

    #[tokio::test]
    async fn test_graphql_without_tenant_header() {
        let app = create_router(Harness::new().schema, "/graphql", "/graphql");

        let response = app
            .oneshot(graphql_request(r#"{ applications { totalCount } }"#, None))
            .await
            .unwrap();

        let body = json_body(response).await;
        let message = body["errors"][0]["message"].as_str().unwrap();
        assert!(message.contains("cannot read tenant from context"));
        assert_eq!(body["errors"][0]["extensions"]["error_code"], 30);
    }

    #[tokio::test]
    async fn test_playground_on_separate_path() {
        let app = create_router(Harness::new().schema, "/graphql", "/playground");

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/playground").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
