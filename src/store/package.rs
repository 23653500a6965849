use anyhow::Result;

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{Auth, Package};
use crate::store::convert::{marshal, unmarshal};
use crate::store::repo::{Condition, Creator, Deleter, Entity, Lister, SingleGetter, Updater, Value};
use crate::store::traits::PackageRepository;

pub const PACKAGE_TABLE: &str = "public.packages";

const COLUMNS: &[&str] = &[
    "id",
    "tenant_id",
    "app_id",
    "name",
    "description",
    "instance_auth_request_json_schema",
    "default_instance_auth",
];

const UPDATABLE_COLUMNS: &[&str] = &[
    "name",
    "description",
    "instance_auth_request_json_schema",
    "default_instance_auth",
];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PackageEntity {
    pub id: String,
    pub tenant_id: String,
    pub app_id: String,
    pub name: String,
    pub description: Option<String>,
    pub instance_auth_request_json_schema: Option<String>,
    pub default_instance_auth: Option<String>,
}

impl Entity for PackageEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("app_id", self.app_id.clone().into()),
            ("name", self.name.clone().into()),
            ("description", self.description.clone().into()),
            (
                "instance_auth_request_json_schema",
                self.instance_auth_request_json_schema.clone().into(),
            ),
            ("default_instance_auth", self.default_instance_auth.clone().into()),
        ]
    }
}

impl PackageEntity {
    pub fn from_model(pkg: &Package) -> Result<Self> {
        Ok(Self {
            id: pkg.id.clone(),
            tenant_id: pkg.tenant.clone(),
            app_id: pkg.application_id.clone(),
            name: pkg.name.clone(),
            description: pkg.description.clone(),
            instance_auth_request_json_schema: pkg.instance_auth_request_input_schema.clone(),
            default_instance_auth: marshal(pkg.default_instance_auth.as_ref(), "default instance auth")?,
        })
    }

    pub fn into_model(self) -> Result<Package> {
        let default_instance_auth: Option<Auth> =
            unmarshal(self.default_instance_auth.as_deref(), "default instance auth")?;
        Ok(Package {
            id: self.id,
            tenant: self.tenant_id,
            application_id: self.app_id,
            name: self.name,
            description: self.description,
            instance_auth_request_input_schema: self.instance_auth_request_json_schema,
            default_instance_auth,
        })
    }
}

pub struct PgPackageRepository {
    creator: Creator,
    getter: SingleGetter,
    lister: Lister,
    updater: Updater,
    deleter: Deleter,
}

impl PgPackageRepository {
    pub fn new() -> Self {
        let resource = ResourceType::Package;
        Self {
            creator: Creator::new(resource, PACKAGE_TABLE, COLUMNS),
            getter: SingleGetter::new(resource, PACKAGE_TABLE, "tenant_id", COLUMNS),
            lister: Lister::new(resource, PACKAGE_TABLE, "tenant_id", COLUMNS),
            updater: Updater::new(resource, PACKAGE_TABLE, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, PACKAGE_TABLE, "tenant_id"),
        }
    }
}

impl Default for PgPackageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PackageRepository for PgPackageRepository {
    async fn create(&self, ctx: &RequestContext, pkg: &Package) -> Result<()> {
        self.creator.create(ctx, &PackageEntity::from_model(pkg)?).await
    }

    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Package> {
        let entity: PackageEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("id", id)])
            .await?;
        entity.into_model()
    }

    async fn get_for_application(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        id: &str,
        application_id: &str,
    ) -> Result<Package> {
        let entity: PackageEntity = self
            .getter
            .get(
                ctx,
                tenant,
                vec![Condition::eq("id", id), Condition::eq("app_id", application_id)],
            )
            .await?;
        entity.into_model()
    }

    async fn list_for_application(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        application_id: &str,
    ) -> Result<Vec<Package>> {
        let entities: Vec<PackageEntity> = self
            .lister
            .list(ctx, tenant, vec![Condition::eq("app_id", application_id)], "name")
            .await?;
        entities.into_iter().map(PackageEntity::into_model).collect()
    }

    async fn update(&self, ctx: &RequestContext, pkg: &Package) -> Result<()> {
        self.updater
            .update_single(ctx, &pkg.tenant, &PackageEntity::from_model(pkg)?)
            .await
    }

    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.deleter
            .delete_one(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }
}
