use async_graphql::{ComplexObject, Context, InputObject, Object, Result, SimpleObject, ID};

use super::auth::{Auth, AuthInput};
use super::scalars::{Clob, Timestamp};
use super::{services, transact, transact_optional};
use crate::model;

mirror_enum!(PackageInstanceAuthStatusCondition => PackageInstanceAuthStatusCondition {
    Pending,
    Succeeded,
    Failed,
    Unused,
});

mirror_enum!(PackageInstanceAuthSetStatusConditionInput => PackageInstanceAuthSetStatusCondition {
    Succeeded,
    Failed,
});

#[derive(SimpleObject, Debug, Clone)]
#[graphql(complex)]
pub struct Package {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub instance_auth_request_input_schema: Option<String>,
    pub default_instance_auth: Option<Auth>,
}

impl From<model::Package> for Package {
    fn from(pkg: model::Package) -> Self {
        Self {
            id: ID(pkg.id),
            name: pkg.name,
            description: pkg.description,
            instance_auth_request_input_schema: pkg.instance_auth_request_input_schema,
            default_instance_auth: pkg.default_instance_auth.map(Auth::from),
        }
    }
}

#[ComplexObject]
impl Package {
    async fn instance_auths(&self, ctx: &Context<'_>) -> Result<Vec<PackageInstanceAuth>> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let auths = svc.package_instance_auths.list(&tx, &self.id).await?;
            Ok(auths.into_iter().map(PackageInstanceAuth::from).collect())
        })
        .await
    }

    async fn instance_auth(&self, ctx: &Context<'_>, id: ID) -> Result<Option<PackageInstanceAuth>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.package_instance_auths
                .get_for_package(&tx, &id, &self.id)
                .await
                .map(PackageInstanceAuth::from)
        })
        .await
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct PackageInstanceAuthStatus {
    pub condition: PackageInstanceAuthStatusCondition,
    pub timestamp: Timestamp,
    pub message: String,
    pub reason: String,
}

#[derive(SimpleObject, Debug, Clone)]
pub struct PackageInstanceAuth {
    pub id: ID,
    pub context: Option<String>,
    pub input_params: Option<String>,
    pub auth: Option<Auth>,
    pub status: Option<PackageInstanceAuthStatus>,
    #[graphql(name = "runtimeID")]
    pub runtime_id: Option<ID>,
    #[graphql(name = "runtimeContextID")]
    pub runtime_context_id: Option<ID>,
}

impl From<model::PackageInstanceAuth> for PackageInstanceAuth {
    fn from(item: model::PackageInstanceAuth) -> Self {
        Self {
            id: ID(item.id),
            context: item.context,
            input_params: item.input_params,
            auth: item.auth.map(Auth::from),
            status: item.status.map(|s| PackageInstanceAuthStatus {
                condition: s.condition.into(),
                timestamp: s.timestamp.into(),
                message: s.message,
                reason: s.reason,
            }),
            runtime_id: item.runtime_id.map(ID),
            runtime_context_id: item.runtime_context_id.map(ID),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct PackageCreateInput {
    pub name: String,
    pub description: Option<String>,
    pub instance_auth_request_input_schema: Option<Clob>,
    pub default_instance_auth: Option<AuthInput>,
}

impl From<PackageCreateInput> for model::PackageCreateInput {
    fn from(input: PackageCreateInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            instance_auth_request_input_schema: input.instance_auth_request_input_schema.map(|s| s.0),
            default_instance_auth: input.default_instance_auth.map(Into::into),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct PackageUpdateInput {
    pub name: String,
    pub description: Option<String>,
    pub instance_auth_request_input_schema: Option<Clob>,
    pub default_instance_auth: Option<AuthInput>,
}

impl From<PackageUpdateInput> for model::PackageUpdateInput {
    fn from(input: PackageUpdateInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            instance_auth_request_input_schema: input.instance_auth_request_input_schema.map(|s| s.0),
            default_instance_auth: input.default_instance_auth.map(Into::into),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct PackageInstanceAuthRequestInput {
    pub id: Option<ID>,
    pub context: Option<Clob>,
    pub input_params: Option<Clob>,
    #[graphql(name = "runtimeID")]
    pub runtime_id: Option<ID>,
    #[graphql(name = "runtimeContextID")]
    pub runtime_context_id: Option<ID>,
}

impl From<PackageInstanceAuthRequestInput> for model::PackageInstanceAuthRequestInput {
    fn from(input: PackageInstanceAuthRequestInput) -> Self {
        Self {
            id: input.id.map(|id| id.0),
            context: input.context.map(|c| c.0),
            input_params: input.input_params.map(|p| p.0),
            runtime_id: input.runtime_id.map(|id| id.0),
            runtime_context_id: input.runtime_context_id.map(|id| id.0),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct PackageInstanceAuthStatusInput {
    pub condition: PackageInstanceAuthSetStatusConditionInput,
    pub message: String,
    pub reason: String,
}

#[derive(InputObject, Debug, Clone)]
pub struct PackageInstanceAuthSetInput {
    pub auth: Option<AuthInput>,
    pub status: Option<PackageInstanceAuthStatusInput>,
}

impl From<PackageInstanceAuthSetInput> for model::PackageInstanceAuthSetInput {
    fn from(input: PackageInstanceAuthSetInput) -> Self {
        Self {
            auth: input.auth.map(Into::into),
            status: input.status.map(|s| model::PackageInstanceAuthStatusInput {
                condition: s.condition.into(),
                message: s.message,
                reason: s.reason,
            }),
        }
    }
}

#[derive(Default)]
pub struct PackageQuery;

#[Object]
impl PackageQuery {
    async fn package(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Package>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move { svc.packages.get(&tx, &id).await.map(Package::from) }).await
    }

    async fn package_instance_auth(&self, ctx: &Context<'_>, id: ID) -> Result<Option<PackageInstanceAuth>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.package_instance_auths
                .get(&tx, &id)
                .await
                .map(PackageInstanceAuth::from)
        })
        .await
    }
}

#[derive(Default)]
pub struct PackageMutation;

#[Object]
impl PackageMutation {
    async fn add_package(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "applicationID")] application_id: ID,
        #[graphql(name = "in")] input: PackageCreateInput,
    ) -> Result<Package> {
        let svc = services(ctx)?;
        let input = model::PackageCreateInput::from(input);
        transact(ctx, |tx| async move {
            let id = svc.packages.create(&tx, &application_id, &input).await?;
            svc.packages.get(&tx, &id).await.map(Package::from)
        })
        .await
    }

    async fn update_package(
        &self,
        ctx: &Context<'_>,
        id: ID,
        #[graphql(name = "in")] input: PackageUpdateInput,
    ) -> Result<Package> {
        let svc = services(ctx)?;
        let input = model::PackageUpdateInput::from(input);
        transact(ctx, |tx| async move {
            svc.packages.update(&tx, &id, &input).await?;
            svc.packages.get(&tx, &id).await.map(Package::from)
        })
        .await
    }

    async fn delete_package(&self, ctx: &Context<'_>, id: ID) -> Result<Package> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let pkg = svc.packages.get(&tx, &id).await?;
            svc.packages.delete(&tx, &id).await?;
            Ok(Package::from(pkg))
        })
        .await
    }
}

#[derive(Default)]
pub struct PackageInstanceAuthMutation;

#[Object]
impl PackageInstanceAuthMutation {
    async fn request_package_instance_auth_creation(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "packageID")] package_id: ID,
        #[graphql(name = "in")] input: PackageInstanceAuthRequestInput,
    ) -> Result<PackageInstanceAuth> {
        let svc = services(ctx)?;
        let input = model::PackageInstanceAuthRequestInput::from(input);
        transact(ctx, |tx| async move {
            let pkg = svc.packages.get(&tx, &package_id).await?;
            let id = svc
                .package_instance_auths
                .create(
                    &tx,
                    &pkg.id,
                    &input,
                    pkg.default_instance_auth.as_ref(),
                    pkg.instance_auth_request_input_schema.as_deref(),
                )
                .await?;
            svc.package_instance_auths
                .get(&tx, &id)
                .await
                .map(PackageInstanceAuth::from)
        })
        .await
    }

    /// Deletes the instance auth right away when the package has a default auth; otherwise
    /// marks it UNUSED for the consumer to clean up.
    async fn request_package_instance_auth_deletion(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "authID")] auth_id: ID,
    ) -> Result<PackageInstanceAuth> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let item = svc.package_instance_auths.get(&tx, &auth_id).await?;
            let pkg = svc.packages.get(&tx, &item.package_id).await?;
            let deleted = svc
                .package_instance_auths
                .request_deletion(&tx, &item, pkg.default_instance_auth.as_ref())
                .await?;
            if deleted {
                return Ok(PackageInstanceAuth::from(item));
            }
            svc.package_instance_auths
                .get(&tx, &auth_id)
                .await
                .map(PackageInstanceAuth::from)
        })
        .await
    }

    async fn set_package_instance_auth(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "packageID")] package_id: ID,
        #[graphql(name = "authID")] auth_id: ID,
        #[graphql(name = "in")] input: PackageInstanceAuthSetInput,
    ) -> Result<PackageInstanceAuth> {
        let svc = services(ctx)?;
        let input = model::PackageInstanceAuthSetInput::from(input);
        transact(ctx, |tx| async move {
            svc.package_instance_auths
                .get_for_package(&tx, &auth_id, &package_id)
                .await?;
            svc.package_instance_auths.set_auth(&tx, &auth_id, &input).await?;
            svc.package_instance_auths
                .get(&tx, &auth_id)
                .await
                .map(PackageInstanceAuth::from)
        })
        .await
    }

    async fn delete_package_instance_auth(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "authID")] auth_id: ID,
    ) -> Result<PackageInstanceAuth> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let item = svc.package_instance_auths.get(&tx, &auth_id).await?;
            svc.package_instance_auths.delete(&tx, &auth_id).await?;
            Ok(PackageInstanceAuth::from(item))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::graphql::testing::Harness;

    async fn harness_with_package(package_input: &str) -> Harness {
        let h = Harness::new();
        h.execute_ok(r#"mutation { registerApplication(in: {name: "app"}) { id } }"#).await;
        h.execute_ok(&format!(
            r#"mutation {{ addPackage(applicationID: "id-1", in: {}) {{ id }} }}"#,
            package_input
        ))
        .await;
        h
    }

    #[tokio::test]
    async fn test_instance_auth_without_default_auth_waits_for_credentials() {
        let h = harness_with_package(r#"{name: "orders"}"#).await;

        let data = h
            .execute_ok(
                r#"mutation { requestPackageInstanceAuthCreation(packageID: "id-2", in: {}) { id status { condition reason } } }"#,
            )
            .await;
        let created = &data["requestPackageInstanceAuthCreation"];
        assert_eq!(created["status"]["condition"], "PENDING");
        assert_eq!(created["status"]["reason"], "CredentialsNotProvided");

        let data = h
            .execute_ok(
                r#"mutation {
                    setPackageInstanceAuth(packageID: "id-2", authID: "id-3", in: {auth: {credential: {basic: {username: "u", password: "p"}}}}) {
                        status { condition }
                        auth { credential { ... on BasicCredentialData { username } } }
                    }
                }"#,
            )
            .await;
        let updated = &data["setPackageInstanceAuth"];
        assert_eq!(updated["status"]["condition"], "SUCCEEDED");
        assert_eq!(updated["auth"]["credential"]["username"], "u");

        let data = h
            .execute_ok(r#"mutation { requestPackageInstanceAuthDeletion(authID: "id-3") { status { condition } } }"#)
            .await;
        assert_eq!(data["requestPackageInstanceAuthDeletion"]["status"]["condition"], "UNUSED");
        assert_eq!(h.repos.package_instance_auths.table.all().len(), 1);
    }

    #[tokio::test]
    async fn test_instance_auth_with_default_auth_is_deleted_on_request() {
        let h = harness_with_package(
            r#"{name: "orders", defaultInstanceAuth: {credential: {basic: {username: "u", password: "p"}}}}"#,
        )
        .await;

        let data = h
            .execute_ok(r#"mutation { requestPackageInstanceAuthCreation(packageID: "id-2", in: {}) { status { condition } } }"#)
            .await;
        assert_eq!(data["requestPackageInstanceAuthCreation"]["status"]["condition"], "SUCCEEDED");

        h.execute_ok(r#"mutation { requestPackageInstanceAuthDeletion(authID: "id-3") { id } }"#)
            .await;
        assert!(h.repos.package_instance_auths.table.all().is_empty());
    }

    #[tokio::test]
    async fn test_instance_auth_params_are_checked_against_package_schema() {
        let h = harness_with_package(
            r#"{name: "orders", instanceAuthRequestInputSchema: "{\"type\": \"object\", \"required\": [\"region\"]}"}"#,
        )
        .await;

        let (_, errors) = h
            .execute(r#"mutation { requestPackageInstanceAuthCreation(packageID: "id-2", in: {}) { id } }"#)
            .await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains(
            "json schema for input parameters was defined for the package but no input parameters were provided"
        ));

        let data = h
            .execute_ok(
                r#"mutation { requestPackageInstanceAuthCreation(packageID: "id-2", in: {inputParams: "{\"region\": \"eu\"}"}) { inputParams } }"#,
            )
            .await;
        assert_eq!(data["requestPackageInstanceAuthCreation"]["inputParams"], r#"{"region": "eu"}"#);
    }

    #[tokio::test]
    async fn test_package_field_resolvers() {
        let h = harness_with_package(r#"{name: "orders"}"#).await;
        h.execute_ok(r#"mutation { requestPackageInstanceAuthCreation(packageID: "id-2", in: {}) { id } }"#)
            .await;

        let data = h
            .execute_ok(r#"{ package(id: "id-2") { name instanceAuths { id } instanceAuth(id: "missing") { id } } }"#)
            .await;

        assert_eq!(data["package"]["name"], "orders");
        assert_eq!(data["package"]["instanceAuths"].as_array().unwrap().len(), 1);
        assert!(data["package"]["instanceAuth"].is_null());
    }
}
