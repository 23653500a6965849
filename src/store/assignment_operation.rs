use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::apperrors::ResourceType;
use crate::context::RequestContext;
use crate::model::AssignmentOperation;
use crate::store::convert::parse_enum;
use crate::store::repo::{Condition, Creator, Entity, Lister, Updater, Value};
use crate::store::traits::AssignmentOperationRepository;

pub const ASSIGNMENT_OPERATION_TABLE: &str = "public.assignment_operations";

const COLUMNS: &[&str] = &[
    "id",
    "type",
    "formation_assignment_id",
    "formation_id",
    "triggered_by",
    "started_at",
    "finished_at",
];

const UPDATABLE_COLUMNS: &[&str] = &["triggered_by", "started_at", "finished_at"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AssignmentOperationEntity {
    pub id: String,
    #[sqlx(rename = "type")]
    pub op_type: String,
    pub formation_assignment_id: String,
    pub formation_id: String,
    pub triggered_by: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Entity for AssignmentOperationEntity {
    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.clone().into()),
            ("type", self.op_type.clone().into()),
            ("formation_assignment_id", self.formation_assignment_id.clone().into()),
            ("formation_id", self.formation_id.clone().into()),
            ("triggered_by", self.triggered_by.clone().into()),
            ("started_at", self.started_at.into()),
            ("finished_at", self.finished_at.into()),
        ]
    }
}

impl AssignmentOperationEntity {
    pub fn from_model(op: &AssignmentOperation) -> Self {
        Self {
            id: op.id.clone(),
            op_type: op.op_type.to_string(),
            formation_assignment_id: op.formation_assignment_id.clone(),
            formation_id: op.formation_id.clone(),
            triggered_by: op.triggered_by.to_string(),
            started_at: op.started_at,
            finished_at: op.finished_at,
        }
    }

    pub fn into_model(self) -> Result<AssignmentOperation> {
        Ok(AssignmentOperation {
            id: self.id,
            op_type: parse_enum(&self.op_type)?,
            formation_assignment_id: self.formation_assignment_id,
            formation_id: self.formation_id,
            triggered_by: parse_enum(&self.triggered_by)?,
            started_at: self.started_at,
            finished_at: self.finished_at,
        })
    }
}

/// Operations are not tenant scoped; every access goes through the global helpers.
pub struct PgAssignmentOperationRepository {
    creator: Creator,
    lister: Lister,
    updater: Updater,
}

impl PgAssignmentOperationRepository {
    pub fn new() -> Self {
        let resource = ResourceType::AssignmentOperation;
        let table = ASSIGNMENT_OPERATION_TABLE;
        Self {
            creator: Creator::new(resource, table, COLUMNS),
            lister: Lister::new_global(resource, table, COLUMNS),
            updater: Updater::new_global(resource, table, UPDATABLE_COLUMNS),
        }
    }
}

impl Default for PgAssignmentOperationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AssignmentOperationRepository for PgAssignmentOperationRepository {
    async fn create(&self, ctx: &RequestContext, op: &AssignmentOperation) -> Result<()> {
        self.creator
            .create(ctx, &AssignmentOperationEntity::from_model(op))
            .await
    }

    async fn list_for_assignment(
        &self,
        ctx: &RequestContext,
        formation_assignment_id: &str,
    ) -> Result<Vec<AssignmentOperation>> {
        let entities: Vec<AssignmentOperationEntity> = self
            .lister
            .list_global(
                ctx,
                vec![Condition::eq("formation_assignment_id", formation_assignment_id)],
                "started_at",
            )
            .await?;
        entities
            .into_iter()
            .map(AssignmentOperationEntity::into_model)
            .collect()
    }

    async fn update(&self, ctx: &RequestContext, op: &AssignmentOperation) -> Result<()> {
        self.updater
            .update_single_global(ctx, &AssignmentOperationEntity::from_model(op))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssignmentOperationType, OperationTrigger};

    #[test]
    fn test_entity_conversion_round_trip() {
        let op = AssignmentOperation {
            id: "op".to_string(),
            op_type: AssignmentOperationType::Unassign,
            formation_assignment_id: "fa".to_string(),
            formation_id: "f".to_string(),
            triggered_by: OperationTrigger::Reset,
            started_at: Utc::now(),
            finished_at: None,
        };

        let entity = AssignmentOperationEntity::from_model(&op);
        assert_eq!(entity.op_type, "UNASSIGN");
        assert_eq!(entity.triggered_by, "RESET");
        assert_eq!(entity.into_model().unwrap(), op);
    }
}
