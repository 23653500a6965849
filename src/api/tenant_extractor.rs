use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};

use crate::tenant::TenantCtx;

pub const TENANT_HEADER: &str = "tenant";
pub const EXTERNAL_TENANT_HEADER: &str = "external-tenant";

/// Tenant of the caller, read from request headers.
///
/// - `tenant`: internal tenant id
/// - `external-tenant`: optional id the caller knows the tenant by, defaults to `tenant`
///
/// A request without `tenant` header still reaches the resolvers; operations that need a
/// tenant fail there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantHeader(pub Option<TenantCtx>);

impl<S> FromRequestParts<S> for TenantHeader
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(TenantHeader(tenant_from_headers(&parts.headers)))
    }
}

fn tenant_from_headers(headers: &HeaderMap) -> Option<TenantCtx> {
    let internal = extract_header_value(headers, TENANT_HEADER)?;
    let external = extract_header_value(headers, EXTERNAL_TENANT_HEADER).unwrap_or_else(|| internal.clone());
    Some(TenantCtx::new(internal, external))
}

fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_tenant_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("tenant"), HeaderValue::from_static("internal-1"));
        headers.insert(
            HeaderName::from_static("external-tenant"),
            HeaderValue::from_static("external-1"),
        );

        assert_eq!(
            tenant_from_headers(&headers),
            Some(TenantCtx::new("internal-1", "external-1"))
        );
    }

    #[test]
    fn test_external_tenant_defaults_to_internal() {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("tenant"), HeaderValue::from_static("internal-1"));

        assert_eq!(
            tenant_from_headers(&headers),
            Some(TenantCtx::new("internal-1", "internal-1"))
        );
    }

    #[test]
    fn test_missing_tenant_header() {
        assert_eq!(tenant_from_headers(&HeaderMap::new()), None);
    }
}
