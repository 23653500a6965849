use async_graphql::{ComplexObject, Context, InputObject, Json, Object, Result, SimpleObject, ID};
use serde_json::Value;

use super::label::{labels_map, Label};
use super::package::Package;
use super::scalars::{Labels, PageCursor, Timestamp};
use super::webhook::{Webhook, WebhookInput};
use super::{page_args, services, transact, transact_optional, Page};
use crate::model;
use crate::model::{LabelableObject, WebhookReferenceObjectType};

mirror_enum!(ApplicationStatusCondition => ApplicationStatusCondition {
    Initial,
    Unknown,
    Ready,
    Failed,
});

#[derive(SimpleObject, Debug, Clone)]
pub struct ApplicationStatus {
    pub condition: ApplicationStatusCondition,
    pub timestamp: Timestamp,
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(complex)]
pub struct Application {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub provider_name: Option<String>,
    pub status: ApplicationStatus,
    pub health_check_url: Option<String>,
    pub base_url: Option<String>,
}

impl From<model::Application> for Application {
    fn from(app: model::Application) -> Self {
        Self {
            id: ID(app.id),
            name: app.name,
            description: app.description,
            provider_name: app.provider_name,
            status: ApplicationStatus {
                condition: app.status.condition.into(),
                timestamp: app.status.timestamp.into(),
            },
            health_check_url: app.health_check_url,
            base_url: app.base_url,
        }
    }
}

#[ComplexObject]
impl Application {
    async fn packages(&self, ctx: &Context<'_>) -> Result<Vec<Package>> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let packages = svc.packages.list_for_application(&tx, &self.id).await?;
            Ok(packages.into_iter().map(Package::from).collect())
        })
        .await
    }

    async fn package(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Package>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.packages
                .get_for_application(&tx, &id, &self.id)
                .await
                .map(Package::from)
        })
        .await
    }

    async fn webhooks(&self, ctx: &Context<'_>) -> Result<Vec<Webhook>> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let webhooks = svc
                .webhooks
                .list_for_object(&tx, &self.id, WebhookReferenceObjectType::Application)
                .await?;
            Ok(webhooks.into_iter().map(Webhook::from).collect())
        })
        .await
    }

    async fn labels(&self, ctx: &Context<'_>) -> Result<Labels> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let labels = svc
                .labels
                .list_for_object(&tx, LabelableObject::Application, &self.id)
                .await?;
            Ok(labels_map(labels))
        })
        .await
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct ApplicationRegisterInput {
    pub name: String,
    pub provider_name: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub webhooks: Option<Vec<WebhookInput>>,
    pub health_check_url: Option<String>,
    pub base_url: Option<String>,
    pub status_condition: Option<ApplicationStatusCondition>,
}

impl From<ApplicationRegisterInput> for model::ApplicationRegisterInput {
    fn from(input: ApplicationRegisterInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            provider_name: input.provider_name,
            health_check_url: input.health_check_url,
            base_url: input.base_url,
            status_condition: input.status_condition.map(Into::into),
            labels: input.labels.map(|l| l.0).unwrap_or_default(),
            webhooks: input
                .webhooks
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct ApplicationUpdateInput {
    pub provider_name: Option<String>,
    pub description: Option<String>,
    pub health_check_url: Option<String>,
    pub base_url: Option<String>,
    pub status_condition: Option<ApplicationStatusCondition>,
}

impl From<ApplicationUpdateInput> for model::ApplicationUpdateInput {
    fn from(input: ApplicationUpdateInput) -> Self {
        Self {
            description: input.description,
            provider_name: input.provider_name,
            health_check_url: input.health_check_url,
            base_url: input.base_url,
            status_condition: input.status_condition.map(Into::into),
        }
    }
}

#[derive(Default)]
pub struct ApplicationQuery;

#[Object]
impl ApplicationQuery {
    async fn application(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Application>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.applications.get(&tx, &id).await.map(Application::from)
        })
        .await
    }

    async fn applications(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<PageCursor>,
    ) -> Result<Page<Application>> {
        let svc = services(ctx)?;
        let (page_size, cursor) = page_args(first, after);
        transact(ctx, |tx| async move {
            let page = svc.applications.list(&tx, page_size, &cursor).await?;
            Ok(Page::from_model(page))
        })
        .await
    }
}

#[derive(Default)]
pub struct ApplicationMutation;

#[Object]
impl ApplicationMutation {
    async fn register_application(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "in")] input: ApplicationRegisterInput,
    ) -> Result<Application> {
        let svc = services(ctx)?;
        let input = model::ApplicationRegisterInput::from(input);
        transact(ctx, |tx| async move {
            let id = svc.applications.create(&tx, &input).await?;
            svc.applications.get(&tx, &id).await.map(Application::from)
        })
        .await
    }

    async fn update_application(
        &self,
        ctx: &Context<'_>,
        id: ID,
        #[graphql(name = "in")] input: ApplicationUpdateInput,
    ) -> Result<Application> {
        let svc = services(ctx)?;
        let input = model::ApplicationUpdateInput::from(input);
        transact(ctx, |tx| async move {
            svc.applications.update(&tx, &id, &input).await?;
            svc.applications.get(&tx, &id).await.map(Application::from)
        })
        .await
    }

    async fn unregister_application(&self, ctx: &Context<'_>, id: ID) -> Result<Application> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let app = svc.applications.get(&tx, &id).await?;
            svc.applications.delete(&tx, &id).await?;
            Ok(Application::from(app))
        })
        .await
    }

    async fn set_application_label(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "applicationID")] application_id: ID,
        key: String,
        value: Json<Value>,
    ) -> Result<Label> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            svc.applications
                .set_label(&tx, &application_id, &key, value.0)
                .await
                .map(Label::from)
        })
        .await
    }

    async fn delete_application_label(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "applicationID")] application_id: ID,
        key: String,
    ) -> Result<Label> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            svc.applications
                .delete_label(&tx, &application_id, &key)
                .await
                .map(Label::from)
        })
        .await
    }
}
