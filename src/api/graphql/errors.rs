use async_graphql::ErrorExtensions;

use crate::apperrors::{error_code, ErrorCode};

/// Converts a service error into a GraphQL error carrying the whole context chain.
pub fn gql_error(err: anyhow::Error) -> async_graphql::Error {
    let code = error_code(&err);
    if code == ErrorCode::InternalError {
        log::error!("{:#}", err);
    }
    async_graphql::Error::new(format!("{:#}", err))
        .extend_with(|_, ext| ext.set("error_code", code.as_i32()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apperrors::{AppError, ResourceType};
    use anyhow::Context;

    #[test]
    fn test_gql_error_keeps_chain_and_code() {
        let err: anyhow::Result<()> = Err(AppError::not_found(ResourceType::Package, "p1").into());
        let err = gql_error(err.context("while getting package").unwrap_err());

        assert_eq!(
            err.message,
            "while getting package: Object not found [object=package; id=p1]"
        );
        let ext = err.extensions.unwrap();
        assert_eq!(ext.get("error_code"), Some(&async_graphql::Value::from(20)));
    }

    #[test]
    fn test_untyped_errors_are_internal() {
        let err = gql_error(anyhow::anyhow!("boom"));
        let ext = err.extensions.unwrap();
        assert_eq!(ext.get("error_code"), Some(&async_graphql::Value::from(10)));
    }
}
