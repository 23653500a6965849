use async_graphql::{ComplexObject, Context, InputObject, Json, Object, Result, SimpleObject, ID};
use serde_json::Value;

use super::label::{labels_map, Label};
use super::scalars::{Labels, PageCursor, Timestamp};
use super::{page_args, services, transact, transact_optional, Page};
use crate::model;
use crate::model::LabelableObject;

mirror_enum!(RuntimeStatusCondition => RuntimeStatusCondition {
    Initial,
    Provisioning,
    Connected,
    Failed,
});

#[derive(SimpleObject, Debug, Clone)]
pub struct RuntimeStatus {
    pub condition: RuntimeStatusCondition,
    pub timestamp: Timestamp,
}

#[derive(SimpleObject, Debug, Clone)]
pub struct RuntimeMetadata {
    pub creation_timestamp: Timestamp,
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(complex)]
pub struct Runtime {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub status: RuntimeStatus,
    pub metadata: RuntimeMetadata,
}

impl From<model::Runtime> for Runtime {
    fn from(rt: model::Runtime) -> Self {
        Self {
            id: ID(rt.id),
            name: rt.name,
            description: rt.description,
            status: RuntimeStatus {
                condition: rt.status.condition.into(),
                timestamp: rt.status.timestamp.into(),
            },
            metadata: RuntimeMetadata {
                creation_timestamp: rt.creation_timestamp.into(),
            },
        }
    }
}

#[ComplexObject]
impl Runtime {
    async fn labels(&self, ctx: &Context<'_>) -> Result<Labels> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let labels = svc
                .labels
                .list_for_object(&tx, LabelableObject::Runtime, &self.id)
                .await?;
            Ok(labels_map(labels))
        })
        .await
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct RuntimeInput {
    pub name: String,
    pub description: Option<String>,
    pub labels: Option<Labels>,
    pub status_condition: Option<RuntimeStatusCondition>,
}

impl From<RuntimeInput> for model::RuntimeInput {
    fn from(input: RuntimeInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            status_condition: input.status_condition.map(Into::into),
            labels: input.labels.map(|l| l.0).unwrap_or_default(),
        }
    }
}

#[derive(Default)]
pub struct RuntimeQuery;

#[Object]
impl RuntimeQuery {
    async fn runtime(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Runtime>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move { svc.runtimes.get(&tx, &id).await.map(Runtime::from) }).await
    }

    async fn runtimes(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<PageCursor>,
    ) -> Result<Page<Runtime>> {
        let svc = services(ctx)?;
        let (page_size, cursor) = page_args(first, after);
        transact(ctx, |tx| async move {
            let page = svc.runtimes.list(&tx, page_size, &cursor).await?;
            Ok(Page::from_model(page))
        })
        .await
    }
}

#[derive(Default)]
pub struct RuntimeMutation;

#[Object]
impl RuntimeMutation {
    async fn register_runtime(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "in")] input: RuntimeInput,
    ) -> Result<Runtime> {
        let svc = services(ctx)?;
        let input = model::RuntimeInput::from(input);
        transact(ctx, |tx| async move {
            let id = svc.runtimes.create(&tx, &input).await?;
            svc.runtimes.get(&tx, &id).await.map(Runtime::from)
        })
        .await
    }

    async fn update_runtime(
        &self,
        ctx: &Context<'_>,
        id: ID,
        #[graphql(name = "in")] input: RuntimeInput,
    ) -> Result<Runtime> {
        let svc = services(ctx)?;
        let input = model::RuntimeInput::from(input);
        transact(ctx, |tx| async move {
            svc.runtimes.update(&tx, &id, &input).await?;
            svc.runtimes.get(&tx, &id).await.map(Runtime::from)
        })
        .await
    }

    async fn unregister_runtime(&self, ctx: &Context<'_>, id: ID) -> Result<Runtime> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            let rt = svc.runtimes.get(&tx, &id).await?;
            svc.runtimes.delete(&tx, &id).await?;
            Ok(Runtime::from(rt))
        })
        .await
    }

    async fn set_runtime_label(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "runtimeID")] runtime_id: ID,
        key: String,
        value: Json<Value>,
    ) -> Result<Label> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            svc.runtimes
                .set_label(&tx, &runtime_id, &key, value.0)
                .await
                .map(Label::from)
        })
        .await
    }

    async fn delete_runtime_label(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "runtimeID")] runtime_id: ID,
        key: String,
    ) -> Result<Label> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            svc.runtimes
                .delete_label(&tx, &runtime_id, &key)
                .await
                .map(Label::from)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::graphql::testing::Harness;

    #[tokio::test]
    async fn test_register_runtime_with_labels() {
        let h = Harness::new();

        let data = h
            .execute_ok(
                r#"mutation { registerRuntime(in: {name: "rt", labels: {region: "eu"}}) {
                    id name status { condition timestamp } labels
                } }"#,
            )
            .await;

        let rt = &data["registerRuntime"];
        assert_eq!(rt["name"], "rt");
        assert_eq!(rt["status"]["condition"], "INITIAL");
        assert_eq!(rt["status"]["timestamp"], "2024-01-01T00:00:00+00:00");
        assert_eq!(rt["labels"]["region"], "eu");
    }

    #[tokio::test]
    async fn test_runtime_label_mutations() {
        let h = Harness::new();
        h.execute_ok(r#"mutation { registerRuntime(in: {name: "rt"}) { id } }"#).await;

        let data = h
            .execute_ok(r#"mutation { setRuntimeLabel(runtimeID: "id-1", key: "tier", value: 3) { key value } }"#)
            .await;
        assert_eq!(data["setRuntimeLabel"]["value"], 3);

        h.execute_ok(r#"mutation { deleteRuntimeLabel(runtimeID: "id-1", key: "tier") { key } }"#)
            .await;
        let data = h.execute_ok(r#"{ runtime(id: "id-1") { labels } }"#).await;
        assert_eq!(data["runtime"]["labels"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_list_runtimes_pages() {
        let h = Harness::new();
        for name in ["a", "b", "c"] {
            h.execute_ok(&format!(r#"mutation {{ registerRuntime(in: {{name: "{}"}}) {{ id }} }}"#, name))
                .await;
        }

        let data = h
            .execute_ok(r#"{ runtimes(first: 2) { totalCount data { name } pageInfo { hasNextPage endCursor } } }"#)
            .await;
        let page = &data["runtimes"];
        assert_eq!(page["totalCount"], 3);
        assert_eq!(page["data"].as_array().unwrap().len(), 2);
        assert_eq!(page["pageInfo"]["hasNextPage"], true);

        let cursor = page["pageInfo"]["endCursor"].as_str().unwrap();
        let data = h
            .execute_ok(&format!(r#"{{ runtimes(first: 2, after: "{}") {{ data {{ name }} pageInfo {{ hasNextPage }} }} }}"#, cursor))
            .await;
        assert_eq!(data["runtimes"]["data"].as_array().unwrap().len(), 1);
        assert_eq!(data["runtimes"]["pageInfo"]["hasNextPage"], false);
    }
}
