use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::context::RequestContext;
use crate::logic::uid::TimestampGenerator;
use crate::model::{FormationAssignment, FormationAssignmentState, Page};
use crate::store::traits::{AssignmentOperationRepository, FormationAssignmentRepository};
use crate::tenant;

pub struct FormationAssignmentService {
    assignments: Arc<dyn FormationAssignmentRepository>,
    operations: Arc<dyn AssignmentOperationRepository>,
    timestamp: TimestampGenerator,
}

impl FormationAssignmentService {
    pub fn new(
        assignments: Arc<dyn FormationAssignmentRepository>,
        operations: Arc<dyn AssignmentOperationRepository>,
        timestamp: TimestampGenerator,
    ) -> Self {
        Self {
            assignments,
            operations,
            timestamp,
        }
    }

    pub async fn list_for_formation(
        &self,
        ctx: &RequestContext,
        formation_id: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<FormationAssignment>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.assignments
            .list_by_formation_id(ctx, &tenant, formation_id, page_size, cursor)
            .await
            .with_context(|| format!("while listing assignments of formation {}", formation_id))
    }

    pub async fn get_for_formation(
        &self,
        ctx: &RequestContext,
        id: &str,
        formation_id: &str,
    ) -> Result<FormationAssignment> {
        let tenant = tenant::load_from_context(ctx)?;
        self.assignments
            .get_for_formation(ctx, &tenant, id, formation_id)
            .await
            .with_context(|| format!("while getting assignment {} of formation {}", id, formation_id))
    }

    /// Assignments of the formation with the object as source or target.
    pub async fn list_for_object(
        &self,
        ctx: &RequestContext,
        formation_id: &str,
        object_id: &str,
    ) -> Result<Vec<FormationAssignment>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.assignments
            .list_for_object(ctx, &tenant, formation_id, object_id)
            .await
            .with_context(|| format!("while listing assignments of {} in formation {}", object_id, formation_id))
    }

    /// Moves the assignment to `state`. Reaching READY finishes its latest open operation.
    pub async fn update_state(
        &self,
        ctx: &RequestContext,
        formation_id: &str,
        id: &str,
        state: FormationAssignmentState,
        value: Option<Value>,
    ) -> Result<FormationAssignment> {
        let mut assignment = self.get_for_formation(ctx, id, formation_id).await?;
        assignment.state = state;
        if value.is_some() {
            assignment.value = value;
        }
        self.assignments
            .update(ctx, &assignment)
            .await
            .with_context(|| format!("while updating state of formation assignment {}", id))?;

        if state == FormationAssignmentState::Ready {
            let ops = self
                .operations
                .list_for_assignment(ctx, id)
                .await
                .with_context(|| format!("while listing operations of formation assignment {}", id))?;
            if let Some(mut op) = ops.into_iter().filter(|op| !op.is_finished()).last() {
                op.finished_at = Some((self.timestamp)());
                self.operations
                    .update(ctx, &op)
                    .await
                    .with_context(|| format!("while finishing operation {}", op.id))?;
            }
        }

        log::debug!("formation assignment {} moved to {}", id, state);
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::uid::utc_now_generator;
    use crate::model::{
        AssignmentOperation, AssignmentOperationType, FormationAssignmentType, OperationTrigger,
    };
    use crate::store::mocks::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn assignment(id: &str, source: &str, target: &str) -> FormationAssignment {
        FormationAssignment {
            id: id.to_string(),
            formation_id: "f".to_string(),
            tenant: TEST_TENANT.to_string(),
            source: source.to_string(),
            source_type: FormationAssignmentType::Application,
            target: target.to_string(),
            target_type: FormationAssignmentType::Runtime,
            state: FormationAssignmentState::Initial,
            value: None,
        }
    }

    fn operation(id: &str, started_minutes_ago: i64) -> AssignmentOperation {
        AssignmentOperation {
            id: id.to_string(),
            op_type: AssignmentOperationType::Assign,
            formation_assignment_id: "fa".to_string(),
            formation_id: "f".to_string(),
            triggered_by: OperationTrigger::Assign,
            started_at: Utc::now() - Duration::minutes(started_minutes_ago),
            finished_at: None,
        }
    }

    fn fixture() -> (
        Arc<InMemoryFormationAssignmentRepository>,
        Arc<InMemoryAssignmentOperationRepository>,
        FormationAssignmentService,
    ) {
        let assignments = Arc::new(InMemoryFormationAssignmentRepository::default());
        let operations = Arc::new(InMemoryAssignmentOperationRepository::default());
        let svc = FormationAssignmentService::new(assignments.clone(), operations.clone(), utc_now_generator());
        (assignments, operations, svc)
    }

    #[tokio::test]
    async fn test_update_state_to_ready_finishes_latest_operation() {
        let (assignments, operations, svc) = fixture();
        assignments.table.insert(assignment("fa", "app", "rt"));
        operations.table.insert(operation("older", 10));
        operations.table.insert(operation("latest", 1));

        let updated = svc
            .update_state(&tenant_context(), "f", "fa", FormationAssignmentState::Ready, Some(json!({"ok": true})))
            .await
            .unwrap();

        assert_eq!(updated.state, FormationAssignmentState::Ready);
        assert_eq!(updated.value, Some(json!({"ok": true})));
        let ops = operations.table.all();
        assert!(!ops[0].is_finished());
        assert!(ops[1].is_finished());
    }

    #[tokio::test]
    async fn test_update_state_to_error_keeps_operations_open() {
        let (assignments, operations, svc) = fixture();
        assignments.table.insert(assignment("fa", "app", "rt"));
        operations.table.insert(operation("op", 1));

        svc.update_state(&tenant_context(), "f", "fa", FormationAssignmentState::CreateError, None)
            .await
            .unwrap();

        assert!(!operations.calls.was_called("update"));
    }

    #[tokio::test]
    async fn test_list_for_object() {
        let (assignments, _, svc) = fixture();
        assignments.table.insert(assignment("a", "app", "rt"));
        assignments.table.insert(assignment("b", "rt", "app"));
        assignments.table.insert(assignment("c", "other", "rt"));

        let listed = svc.list_for_object(&tenant_context(), "f", "app").await.unwrap();

        let ids: Vec<&str> = listed.iter().map(|fa| fa.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
