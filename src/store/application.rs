use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{Application, ApplicationStatus, Page};
use crate::store::convert::parse_enum;
use crate::store::repo::{
    Condition, Creator, Deleter, Entity, ExistQuerier, PageableQuerier, SingleGetter, Updater, Value,
};
use crate::store::traits::ApplicationRepository;

pub const APPLICATION_TABLE: &str = "public.applications";

const COLUMNS: &[&str] = &[
    "id",
    "tenant_id",
    "name",
    "description",
    "provider_name",
    "status_condition",
    "status_timestamp",
    "healthcheck_url",
    "base_url",
];

const UPDATABLE_COLUMNS: &[&str] = &[
    "name",
    "description",
    "provider_name",
    "status_condition",
    "status_timestamp",
    "healthcheck_url",
    "base_url",
];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ApplicationEntity {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub provider_name: Option<String>,
    pub status_condition: String,
    pub status_timestamp: DateTime<Utc>,
    pub healthcheck_url: Option<String>,
    pub base_url: Option<String>,
}

impl Entity for ApplicationEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("name", self.name.clone().into()),
            ("description", self.description.clone().into()),
            ("provider_name", self.provider_name.clone().into()),
            ("status_condition", self.status_condition.clone().into()),
            ("status_timestamp", self.status_timestamp.into()),
            ("healthcheck_url", self.healthcheck_url.clone().into()),
            ("base_url", self.base_url.clone().into()),
        ]
    }
}

impl ApplicationEntity {
    pub fn from_model(app: &Application) -> Self {
        Self {
            id: app.id.clone(),
            tenant_id: app.tenant.clone(),
            name: app.name.clone(),
            description: app.description.clone(),
            provider_name: app.provider_name.clone(),
            status_condition: app.status.condition.to_string(),
            status_timestamp: app.status.timestamp,
            healthcheck_url: app.health_check_url.clone(),
            base_url: app.base_url.clone(),
        }
    }

    pub fn into_model(self) -> Result<Application> {
        Ok(Application {
            id: self.id,
            tenant: self.tenant_id,
            name: self.name,
            description: self.description,
            provider_name: self.provider_name,
            status: ApplicationStatus {
                condition: parse_enum(&self.status_condition)?,
                timestamp: self.status_timestamp,
            },
            health_check_url: self.healthcheck_url,
            base_url: self.base_url,
        })
    }
}

pub struct PgApplicationRepository {
    creator: Creator,
    getter: SingleGetter,
    exist_querier: ExistQuerier,
    page_querier: PageableQuerier,
    updater: Updater,
    deleter: Deleter,
}

impl PgApplicationRepository {
    pub fn new() -> Self {
        let resource = ResourceType::Application;
        Self {
            creator: Creator::new(resource, APPLICATION_TABLE, COLUMNS),
            getter: SingleGetter::new(resource, APPLICATION_TABLE, "tenant_id", COLUMNS),
            exist_querier: ExistQuerier::new(resource, APPLICATION_TABLE, "tenant_id"),
            page_querier: PageableQuerier::new(resource, APPLICATION_TABLE, "tenant_id", COLUMNS),
            updater: Updater::new(resource, APPLICATION_TABLE, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, APPLICATION_TABLE, "tenant_id"),
        }
    }
}

impl Default for PgApplicationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, ctx: &RequestContext, app: &Application) -> Result<()> {
        self.creator
            .create(ctx, &ApplicationEntity::from_model(app))
            .await
    }

    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Application> {
        let entity: ApplicationEntity = self
            .getter
            .get(ctx, tenant, vec![Condition::eq("id", id)])
            .await?;
        entity.into_model()
    }

    async fn exists(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<bool> {
        self.exist_querier
            .exists(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Application>> {
        self.page_querier
            .list::<ApplicationEntity>(ctx, tenant, page_size, cursor, "name", vec![])
            .await?
            .into_models(ApplicationEntity::into_model)
    }

    async fn update(&self, ctx: &RequestContext, app: &Application) -> Result<()> {
        self.updater
            .update_single(ctx, &app.tenant, &ApplicationEntity::from_model(app))
            .await
    }

    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.deleter
            .delete_one(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }

    async fn delete_global(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        self.deleter
            .delete_one_global(ctx, vec![Condition::eq("id", id)])
            .await
    }
}
