use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{PackageInstanceAuth, PackageInstanceAuthStatus};
use crate::store::convert::{marshal, parse_enum, unmarshal};
use crate::store::repo::{Condition, Creator, Deleter, Entity, Lister, SingleGetter, Updater, Value};
use crate::store::traits::PackageInstanceAuthRepository;

pub const PACKAGE_INSTANCE_AUTH_TABLE: &str = "public.package_instance_auths";

const COLUMNS: &[&str] = &[
    "id",
    "tenant_id",
    "package_id",
    "runtime_id",
    "runtime_context_id",
    "context",
    "input_params",
    "auth_value",
    "status_condition",
    "status_timestamp",
    "status_message",
    "status_reason",
];

const UPDATABLE_COLUMNS: &[&str] = &[
    "auth_value",
    "status_condition",
    "status_timestamp",
    "status_message",
    "status_reason",
];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PackageInstanceAuthEntity {
    pub id: String,
    pub tenant_id: String,
    pub package_id: String,
    pub runtime_id: Option<String>,
    pub runtime_context_id: Option<String>,
    pub context: Option<String>,
    pub input_params: Option<String>,
    pub auth_value: Option<String>,
    pub status_condition: Option<String>,
    pub status_timestamp: Option<DateTime<Utc>>,
    pub status_message: Option<String>,
    pub status_reason: Option<String>,
}

impl Entity for PackageInstanceAuthEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("package_id", self.package_id.clone().into()),
            ("runtime_id", self.runtime_id.clone().into()),
            ("runtime_context_id", self.runtime_context_id.clone().into()),
            ("context", self.context.clone().into()),
            ("input_params", self.input_params.clone().into()),
            ("auth_value", self.auth_value.clone().into()),
            ("status_condition", self.status_condition.clone().into()),
            ("status_timestamp", self.status_timestamp.into()),
            ("status_message", self.status_message.clone().into()),
            ("status_reason", self.status_reason.clone().into()),
        ]
    }
}

impl PackageInstanceAuthEntity {
    pub fn from_model(item: &PackageInstanceAuth) -> Result<Self> {
        let status = item.status.as_ref();
        Ok(Self {
            id: item.id.clone(),
            tenant_id: item.tenant.clone(),
            package_id: item.package_id.clone(),
            runtime_id: item.runtime_id.clone(),
            runtime_context_id: item.runtime_context_id.clone(),
            context: item.context.clone(),
            input_params: item.input_params.clone(),
            auth_value: marshal(item.auth.as_ref(), "auth")?,
            status_condition: status.map(|s| s.condition.to_string()),
            status_timestamp: status.map(|s| s.timestamp),
            status_message: status.map(|s| s.message.clone()),
            status_reason: status.map(|s| s.reason.clone()),
        })
    }

    pub fn into_model(self) -> Result<PackageInstanceAuth> {
        let status = match (self.status_condition, self.status_timestamp) {
            (Some(condition), Some(timestamp)) => Some(PackageInstanceAuthStatus {
                condition: parse_enum(&condition)?,
                timestamp,
                message: self.status_message.unwrap_or_default(),
                reason: self.status_reason.unwrap_or_default(),
            }),
            _ => None,
        };
        Ok(PackageInstanceAuth {
            id: self.id,
            package_id: self.package_id,
            runtime_id: self.runtime_id,
            runtime_context_id: self.runtime_context_id,
            tenant: self.tenant_id,
            context: self.context,
            input_params: self.input_params,
            auth: unmarshal(self.auth_value.as_deref(), "auth")?,
            status,
        })
    }
}

pub struct PgPackageInstanceAuthRepository {
    creator: Creator,
    getter: SingleGetter,
    lister: Lister,
    updater: Updater,
    deleter: Deleter,
}

impl PgPackageInstanceAuthRepository {
    pub fn new() -> Self {
        let resource = ResourceType::PackageInstanceAuth;
        let table = PACKAGE_INSTANCE_AUTH_TABLE;
        Self {
            creator: Creator::new(resource, table, COLUMNS),
            getter: SingleGetter::new(resource, table, "tenant_id", COLUMNS),
            lister: Lister::new(resource, table, "tenant_id", COLUMNS),
            updater: Updater::new(resource, table, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, table, "tenant_id"),
        }
    }
}

impl Default for PgPackageInstanceAuthRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PackageInstanceAuthRepository for PgPackageInstanceAuthRepository {
    async fn create(&self, ctx: &RequestContext, item: &PackageInstanceAuth) -> Result<()> {
        self.creator
            .create(ctx, &PackageInstanceAuthEntity::from_model(item)?)
            .await
    }

    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<PackageInstanceAuth> {
        let entity: PackageInstanceAuthEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("id", id)])
            .await?;
        entity.into_model()
    }

    async fn get_for_package(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        id: &str,
        package_id: &str,
    ) -> Result<PackageInstanceAuth> {
        let entity: PackageInstanceAuthEntity = self
            .getter
            .get(
                ctx,
                tenant,
                vec![Condition::eq("id", id), Condition::eq("package_id", package_id)],
            )
            .await?;
        entity.into_model()
    }

    async fn list_by_package_id(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        package_id: &str,
    ) -> Result<Vec<PackageInstanceAuth>> {
        let entities: Vec<PackageInstanceAuthEntity> = self
            .lister
            .list(ctx, tenant, vec![Condition::eq("package_id", package_id)], "id")
            .await?;
        entities
            .into_iter()
            .map(PackageInstanceAuthEntity::into_model)
            .collect()
    }

    async fn update(&self, ctx: &RequestContext, item: &PackageInstanceAuth) -> Result<()> {
        self.updater
            .update_single(ctx, &item.tenant, &PackageInstanceAuthEntity::from_model(item)?)
            .await
    }

    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.deleter
            .delete_one(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }
}
