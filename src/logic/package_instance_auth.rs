use std::sync::Arc;

use anyhow::{Context, Result};

use crate::apperrors::AppError;
use crate::context::RequestContext;
use crate::logic::uid::{TimestampGenerator, UidService};
use crate::model::{
    json_schema, Auth, AuthInput, Id, PackageInstanceAuth, PackageInstanceAuthRequestInput,
    PackageInstanceAuthSetInput, PackageInstanceAuthStatusCondition,
};
use crate::store::traits::PackageInstanceAuthRepository;
use crate::tenant;

pub struct PackageInstanceAuthService {
    repo: Arc<dyn PackageInstanceAuthRepository>,
    uid: Arc<dyn UidService>,
    timestamp: TimestampGenerator,
}

/// Checks the request input params against the schema of the package, if it has one.
fn validate_input_params(input_params: Option<&str>, input_schema: Option<&str>) -> Result<()> {
    let Some(schema) = input_schema else {
        return Ok(());
    };
    let Some(params) = input_params else {
        return Err(AppError::InvalidData(
            "json schema for input parameters was defined for the package but no input parameters were provided"
                .to_string(),
        )
        .into());
    };

    let validator = json_schema::compile_str(schema)?;
    let value: serde_json::Value = serde_json::from_str(params)
        .map_err(|err| AppError::InvalidData(format!("input parameters are not a valid JSON: {}", err)))?;
    json_schema::validate(&validator, &value)
        .with_context(|| format!("while validating value {} against JSON Schema: {}", params, schema))?;
    Ok(())
}

impl PackageInstanceAuthService {
    pub fn new(
        repo: Arc<dyn PackageInstanceAuthRepository>,
        uid: Arc<dyn UidService>,
        timestamp: TimestampGenerator,
    ) -> Self {
        Self {
            repo,
            uid,
            timestamp,
        }
    }

    /// Creates an instance auth for the package.
    ///
    /// With a default auth the record is SUCCEEDED right away, otherwise it waits in PENDING
    /// for credentials.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        package_id: &str,
        input: &PackageInstanceAuthRequestInput,
        default_auth: Option<&Auth>,
        input_schema: Option<&str>,
    ) -> Result<Id> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;
        validate_input_params(input.input_params.as_deref(), input_schema)?;

        let id = input.id.clone().unwrap_or_else(|| self.uid.generate());
        let condition = match default_auth {
            Some(_) => PackageInstanceAuthStatusCondition::Succeeded,
            None => PackageInstanceAuthStatusCondition::Pending,
        };
        let mut item = input.to_package_instance_auth(
            id.clone(),
            package_id.to_string(),
            tenant,
            default_auth.cloned(),
            None,
        );
        item.set_default_status(condition, (self.timestamp)())?;

        self.repo
            .create(ctx, &item)
            .await
            .with_context(|| format!("while creating Package Instance Auth with ID {}", id))?;
        log::info!("created package instance auth {} for package {} in state {}", id, package_id, condition);
        Ok(id)
    }

    /// Without a default auth the record is marked UNUSED and kept for the provider to clean
    /// up; otherwise it is deleted. Returns whether it was deleted.
    pub async fn request_deletion(
        &self,
        ctx: &RequestContext,
        instance_auth: &PackageInstanceAuth,
        default_auth: Option<&Auth>,
    ) -> Result<bool> {
        if default_auth.is_some() {
            self.delete(ctx, &instance_auth.id).await?;
            return Ok(true);
        }

        let mut item = instance_auth.clone();
        item.set_default_status(PackageInstanceAuthStatusCondition::Unused, (self.timestamp)())?;
        self.update(ctx, &item).await?;
        Ok(false)
    }

    /// Sets the credentials of a PENDING instance auth.
    pub async fn set_auth(&self, ctx: &RequestContext, id: &str, input: &PackageInstanceAuthSetInput) -> Result<()> {
        input.validate()?;
        let mut item = self.get(ctx, id).await?;

        if item.status_condition() != Some(PackageInstanceAuthStatusCondition::Pending) {
            return Err(AppError::InvalidOperation(
                "auth can be set only on Package Instance Auths in PENDING state".to_string(),
            )
            .into());
        }

        item.auth = input.auth.as_ref().map(AuthInput::to_auth);
        match &input.status {
            Some(status) => item.status = Some(status.to_status((self.timestamp)())),
            None => item.set_default_status(PackageInstanceAuthStatusCondition::Succeeded, (self.timestamp)())?,
        }

        self.update(ctx, &item).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<PackageInstanceAuth> {
        let tenant = tenant::load_from_context(ctx)?;
        self.repo
            .get_by_id(ctx, &tenant, id)
            .await
            .with_context(|| format!("while getting Package Instance Auth with id {}", id))
    }

    pub async fn get_for_package(&self, ctx: &RequestContext, id: &str, package_id: &str) -> Result<PackageInstanceAuth> {
        let tenant = tenant::load_from_context(ctx)?;
        self.repo
            .get_for_package(ctx, &tenant, id, package_id)
            .await
            .with_context(|| format!("while getting Package Instance Auth {} of package {}", id, package_id))
    }

    pub async fn list(&self, ctx: &RequestContext, package_id: &str) -> Result<Vec<PackageInstanceAuth>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.repo
            .list_by_package_id(ctx, &tenant, package_id)
            .await
            .with_context(|| format!("while listing Package Instance Auths of package {}", package_id))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        let tenant = tenant::load_from_context(ctx)?;
        self.repo
            .delete(ctx, &tenant, id)
            .await
            .with_context(|| format!("while deleting Package Instance Auth with id {}", id))
    }

    /// Stores `item` under the caller's tenant, whatever tenant the item carries.
    pub async fn update(&self, ctx: &RequestContext, item: &PackageInstanceAuth) -> Result<()> {
        let tenant = tenant::load_from_context(ctx)?;
        let item = PackageInstanceAuth {
            tenant,
            ..item.clone()
        };
        self.repo
            .update(ctx, &item)
            .await
            .with_context(|| format!("while updating Package Instance Auth with ID {}", item.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::uid::{fixed_timestamp_generator, SequenceUidService};
    use crate::model::{
        BasicCredentialDataInput, CredentialDataInput, PackageInstanceAuthSetStatusCondition,
        PackageInstanceAuthStatusInput,
    };
    use crate::store::mocks::*;
    use chrono::{TimeZone, Utc};

    fn fixture() -> (Arc<InMemoryPackageInstanceAuthRepository>, PackageInstanceAuthService) {
        let repo = Arc::new(InMemoryPackageInstanceAuthRepository::default());
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let svc = PackageInstanceAuthService::new(
            repo.clone(),
            Arc::new(SequenceUidService::default()),
            fixed_timestamp_generator(ts),
        );
        (repo, svc)
    }

    fn basic_auth_input() -> AuthInput {
        AuthInput {
            credential: Some(CredentialDataInput {
                basic: Some(BasicCredentialDataInput {
                    username: "user".to_string(),
                    password: "secret".to_string(),
                }),
                oauth: None,
            }),
            ..Default::default()
        }
    }

    const SCHEMA: &str = r#"{"type": "object", "required": ["region"], "properties": {"region": {"type": "string"}}}"#;

    #[tokio::test]
    async fn test_create_pending_without_default_auth() {
        let (repo, svc) = fixture();
        let input = PackageInstanceAuthRequestInput {
            input_params: Some(r#"{"region": "eu"}"#.to_string()),
            ..Default::default()
        };

        let id = svc
            .create(&tenant_context(), "pkg", &input, None, Some(SCHEMA))
            .await
            .unwrap();

        let stored = repo.table.all().remove(0);
        assert_eq!(stored.id, id);
        let status = stored.status.unwrap();
        assert_eq!(status.condition, PackageInstanceAuthStatusCondition::Pending);
        assert_eq!(status.reason, "CredentialsNotProvided");
    }

    #[tokio::test]
    async fn test_update_is_scoped_to_caller_tenant() {
        let (repo, svc) = fixture();
        let ctx = tenant_context();
        let id = svc
            .create(&ctx, "pkg", &PackageInstanceAuthRequestInput::default(), None, None)
            .await
            .unwrap();

        let mut item = svc.get(&ctx, &id).await.unwrap();
        item.tenant = "other-tenant".to_string();
        item.auth = Some(basic_auth_input().to_auth());
        svc.update(&ctx, &item).await.unwrap();

        let stored = repo.table.all().remove(0);
        assert_eq!(stored.tenant, TEST_TENANT);
        assert_eq!(stored.auth, Some(basic_auth_input().to_auth()));

        let mut foreign = stored.clone();
        foreign.id = "foreign".to_string();
        foreign.tenant = "other-tenant".to_string();
        repo.table.insert(foreign.clone());
        assert!(svc.update(&ctx, &foreign).await.is_err());
        assert!(repo.table.all().iter().any(|p| p.id == "foreign" && p.auth == foreign.auth));
    }

    #[tokio::test]
    async fn test_create_succeeded_with_default_auth() {
        let (repo, svc) = fixture();
        let default_auth = basic_auth_input().to_auth();

        svc.create(
            &tenant_context(),
            "pkg",
            &PackageInstanceAuthRequestInput::default(),
            Some(&default_auth),
            None,
        )
        .await
        .unwrap();

        let stored = repo.table.all().remove(0);
        assert_eq!(stored.auth, Some(default_auth));
        assert_eq!(stored.status_condition(), Some(PackageInstanceAuthStatusCondition::Succeeded));
    }

    #[tokio::test]
    async fn test_create_with_schema_and_no_params() {
        let (repo, svc) = fixture();

        let err = svc
            .create(
                &tenant_context(),
                "pkg",
                &PackageInstanceAuthRequestInput::default(),
                None,
                Some(SCHEMA),
            )
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains(
            "json schema for input parameters was defined for the package but no input parameters were provided"
        ));
        assert!(!repo.calls.was_called("create"));
    }

    #[tokio::test]
    async fn test_create_with_params_not_matching_schema() {
        let (_, svc) = fixture();
        let input = PackageInstanceAuthRequestInput {
            input_params: Some(r#"{"zone": 1}"#.to_string()),
            ..Default::default()
        };

        let err = svc
            .create(&tenant_context(), "pkg", &input, None, Some(SCHEMA))
            .await
            .unwrap_err();

        let msg = format!("{:#}", err);
        assert!(msg.contains(r#"{"zone": 1}"#));
        assert!(msg.contains(SCHEMA));
    }

    #[tokio::test]
    async fn test_create_without_tenant() {
        let (_, svc) = fixture();
        let err = svc
            .create(
                &RequestContext::new(),
                "pkg",
                &PackageInstanceAuthRequestInput::default(),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(format!("{:#}", err), "cannot read tenant from context");
    }

    #[tokio::test]
    async fn test_request_deletion_without_default_auth_marks_unused() {
        let (repo, svc) = fixture();
        let ctx = tenant_context();
        let id = svc
            .create(&ctx, "pkg", &PackageInstanceAuthRequestInput::default(), None, None)
            .await
            .unwrap();
        let item = svc.get(&ctx, &id).await.unwrap();

        let deleted = svc.request_deletion(&ctx, &item, None).await.unwrap();

        assert!(!deleted);
        assert!(repo.calls.was_called("update"));
        assert!(!repo.calls.was_called("delete"));
        let stored = svc.get(&ctx, &id).await.unwrap();
        assert_eq!(stored.status_condition(), Some(PackageInstanceAuthStatusCondition::Unused));
        assert_eq!(stored.status.unwrap().reason, "PendingDeletion");
    }

    #[tokio::test]
    async fn test_request_deletion_with_default_auth_deletes() {
        let (repo, svc) = fixture();
        let ctx = tenant_context();
        let default_auth = basic_auth_input().to_auth();
        let id = svc
            .create(&ctx, "pkg", &PackageInstanceAuthRequestInput::default(), Some(&default_auth), None)
            .await
            .unwrap();
        let item = svc.get(&ctx, &id).await.unwrap();

        let deleted = svc.request_deletion(&ctx, &item, Some(&default_auth)).await.unwrap();

        assert!(deleted);
        assert!(repo.calls.was_called("delete"));
        assert!(repo.table.all().is_empty());
    }

    #[tokio::test]
    async fn test_set_auth_on_pending() {
        let (repo, svc) = fixture();
        let ctx = tenant_context();
        let id = svc
            .create(&ctx, "pkg", &PackageInstanceAuthRequestInput::default(), None, None)
            .await
            .unwrap();

        let input = PackageInstanceAuthSetInput {
            auth: Some(basic_auth_input()),
            status: None,
        };
        svc.set_auth(&ctx, &id, &input).await.unwrap();

        let stored = repo.table.all().remove(0);
        assert_eq!(stored.auth, Some(basic_auth_input().to_auth()));
        assert_eq!(stored.status.unwrap().reason, "CredentialsProvided");
    }

    #[tokio::test]
    async fn test_set_auth_with_failed_status() {
        let (repo, svc) = fixture();
        let ctx = tenant_context();
        let id = svc
            .create(&ctx, "pkg", &PackageInstanceAuthRequestInput::default(), None, None)
            .await
            .unwrap();

        let input = PackageInstanceAuthSetInput {
            auth: None,
            status: Some(PackageInstanceAuthStatusInput {
                condition: PackageInstanceAuthSetStatusCondition::Failed,
                message: "Provider refused".to_string(),
                reason: "Refused".to_string(),
            }),
        };
        svc.set_auth(&ctx, &id, &input).await.unwrap();

        let stored = repo.table.all().remove(0);
        assert_eq!(stored.status_condition(), Some(PackageInstanceAuthStatusCondition::Failed));
        assert_eq!(stored.status.unwrap().message, "Provider refused");
    }

    #[tokio::test]
    async fn test_set_auth_on_not_pending_does_not_update() {
        let (repo, svc) = fixture();
        let ctx = tenant_context();
        let default_auth = basic_auth_input().to_auth();
        let id = svc
            .create(&ctx, "pkg", &PackageInstanceAuthRequestInput::default(), Some(&default_auth), None)
            .await
            .unwrap();

        let input = PackageInstanceAuthSetInput {
            auth: Some(basic_auth_input()),
            status: None,
        };
        let err = svc.set_auth(&ctx, &id, &input).await.unwrap_err();

        assert!(format!("{:#}", err)
            .contains("auth can be set only on Package Instance Auths in PENDING state"));
        assert!(!repo.calls.was_called("update"));
    }
}
