use anyhow::Result;

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::{FormationAssignment, Page};
use crate::store::convert::{marshal, parse_enum, unmarshal};
use crate::store::repo::{
    Condition, Creator, Deleter, Entity, Lister, PageableQuerier, SingleGetter, Updater, Value,
};
use crate::store::traits::FormationAssignmentRepository;

pub const FORMATION_ASSIGNMENT_TABLE: &str = "public.formation_assignments";

const COLUMNS: &[&str] = &[
    "id",
    "formation_id",
    "tenant_id",
    "source",
    "source_type",
    "target",
    "target_type",
    "state",
    "value",
];

const UPDATABLE_COLUMNS: &[&str] = &["state", "value"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FormationAssignmentEntity {
    pub id: String,
    pub formation_id: String,
    pub tenant_id: String,
    pub source: String,
    pub source_type: String,
    pub target: String,
    pub target_type: String,
    pub state: String,
    pub value: Option<String>,
}

impl Entity for FormationAssignmentEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("formation_id", self.formation_id.clone().into()),
            ("tenant_id", self.tenant_id.clone().into()),
            ("source", self.source.clone().into()),
            ("source_type", self.source_type.clone().into()),
            ("target", self.target.clone().into()),
            ("target_type", self.target_type.clone().into()),
            ("state", self.state.clone().into()),
            ("value", self.value.clone().into()),
        ]
    }
}

impl FormationAssignmentEntity {
    pub fn from_model(fa: &FormationAssignment) -> Result<Self> {
        Ok(Self {
            id: fa.id.clone(),
            formation_id: fa.formation_id.clone(),
            tenant_id: fa.tenant.clone(),
            source: fa.source.clone(),
            source_type: fa.source_type.to_string(),
            target: fa.target.clone(),
            target_type: fa.target_type.to_string(),
            state: fa.state.to_string(),
            value: marshal(fa.value.as_ref(), "formation assignment value")?,
        })
    }

    pub fn into_model(self) -> Result<FormationAssignment> {
        Ok(FormationAssignment {
            id: self.id,
            formation_id: self.formation_id,
            tenant: self.tenant_id,
            source: self.source,
            source_type: parse_enum(&self.source_type)?,
            target: self.target,
            target_type: parse_enum(&self.target_type)?,
            state: parse_enum(&self.state)?,
            value: unmarshal(self.value.as_deref(), "formation assignment value")?,
        })
    }
}

pub struct PgFormationAssignmentRepository {
    creator: Creator,
    getter: SingleGetter,
    lister: Lister,
    page_querier: PageableQuerier,
    updater: Updater,
    deleter: Deleter,
}

impl PgFormationAssignmentRepository {
    pub fn new() -> Self {
        let resource = ResourceType::FormationAssignment;
        let table = FORMATION_ASSIGNMENT_TABLE;
        Self {
            creator: Creator::new(resource, table, COLUMNS),
            getter: SingleGetter::new(resource, table, "tenant_id", COLUMNS),
            lister: Lister::new(resource, table, "tenant_id", COLUMNS),
            page_querier: PageableQuerier::new(resource, table, "tenant_id", COLUMNS),
            updater: Updater::new(resource, table, "tenant_id", UPDATABLE_COLUMNS),
            deleter: Deleter::new(resource, table, "tenant_id"),
        }
    }
}

impl Default for PgFormationAssignmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FormationAssignmentRepository for PgFormationAssignmentRepository {
    async fn create(&self, ctx: &RequestContext, assignment: &FormationAssignment) -> Result<()> {
        self.creator
            .create(ctx, &FormationAssignmentEntity::from_model(assignment)?)
            .await
    }

    async fn get_for_formation(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        id: &str,
        formation_id: &str,
    ) -> Result<FormationAssignment> {
        let entity: FormationAssignmentEntity = self
            .getter
            .get(
                ctx,
                tenant,
                vec![Condition::eq("id", id), Condition::eq("formation_id", formation_id)],
            )
            .await?;
        entity.into_model()
    }

    async fn list_by_formation_id(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<FormationAssignment>> {
        self.page_querier
            .list::<FormationAssignmentEntity>(
                ctx,
                tenant,
                page_size,
                cursor,
                "id",
                vec![Condition::eq("formation_id", formation_id)],
            )
            .await?
            .into_models(FormationAssignmentEntity::into_model)
    }

    async fn list_all_for_formation(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
    ) -> Result<Vec<FormationAssignment>> {
        let entities: Vec<FormationAssignmentEntity> = self
            .lister
            .list(ctx, tenant, vec![Condition::eq("formation_id", formation_id)], "id")
            .await?;
        entities
            .into_iter()
            .map(FormationAssignmentEntity::into_model)
            .collect()
    }

    async fn list_for_object(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
        object_id: &str,
    ) -> Result<Vec<FormationAssignment>> {
        let entities: Vec<FormationAssignmentEntity> = self
            .lister
            .list(
                ctx,
                tenant,
                vec![
                    Condition::eq("formation_id", formation_id),
                    Condition::Or(vec![
                        Condition::eq("source", object_id),
                        Condition::eq("target", object_id),
                    ]),
                ],
                "id",
            )
            .await?;
        entities
            .into_iter()
            .map(FormationAssignmentEntity::into_model)
            .collect()
    }

    async fn update(&self, ctx: &RequestContext, assignment: &FormationAssignment) -> Result<()> {
        self.updater
            .update_single(
                ctx,
                &assignment.tenant,
                &FormationAssignmentEntity::from_model(assignment)?,
            )
            .await
    }

    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.deleter
            .delete_one(ctx, tenant, vec![Condition::eq("id", id)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormationAssignmentState, FormationAssignmentType};
    use serde_json::json;

    #[test]
    fn test_entity_conversion_round_trip() {
        let fa = FormationAssignment {
            id: "fa".to_string(),
            formation_id: "f".to_string(),
            tenant: "tenant".to_string(),
            source: "app".to_string(),
            source_type: FormationAssignmentType::Application,
            target: "rt".to_string(),
            target_type: FormationAssignmentType::RuntimeContext,
            state: FormationAssignmentState::ConfigPending,
            value: Some(json!({"key": "value"})),
        };

        let entity = FormationAssignmentEntity::from_model(&fa).unwrap();
        assert_eq!(entity.target_type, "RUNTIME_CONTEXT");
        assert_eq!(entity.state, "CONFIG_PENDING");
        assert_eq!(entity.into_model().unwrap(), fa);
    }
}
