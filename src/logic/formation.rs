use std::sync::Arc;

use anyhow::{Context, Result};

use crate::apperrors::{AppError, ResourceType};
use crate::context::RequestContext;
use crate::logic::label::LabelService;
use crate::logic::label_definition::LabelDefinitionService;
use crate::logic::uid::{TimestampGenerator, UidService};
use crate::model::{
    assignment_inputs_for, AssignmentOperationInput, AssignmentOperationType, Formation,
    FormationAssignment, FormationInput, FormationObjectType, FormationState, OperationTrigger,
    Page, Participant,
};
use crate::store::traits::{
    ApplicationRepository, AssignmentOperationRepository, FormationAssignmentRepository,
    FormationRepository, RuntimeRepository,
};
use crate::tenant;

pub struct FormationService {
    formations: Arc<dyn FormationRepository>,
    assignments: Arc<dyn FormationAssignmentRepository>,
    operations: Arc<dyn AssignmentOperationRepository>,
    applications: Arc<dyn ApplicationRepository>,
    runtimes: Arc<dyn RuntimeRepository>,
    labels: Arc<LabelService>,
    label_definitions: Arc<LabelDefinitionService>,
    uid: Arc<dyn UidService>,
    timestamp: TimestampGenerator,
}

impl FormationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        formations: Arc<dyn FormationRepository>,
        assignments: Arc<dyn FormationAssignmentRepository>,
        operations: Arc<dyn AssignmentOperationRepository>,
        applications: Arc<dyn ApplicationRepository>,
        runtimes: Arc<dyn RuntimeRepository>,
        labels: Arc<LabelService>,
        label_definitions: Arc<LabelDefinitionService>,
        uid: Arc<dyn UidService>,
        timestamp: TimestampGenerator,
    ) -> Self {
        Self {
            formations,
            assignments,
            operations,
            applications,
            runtimes,
            labels,
            label_definitions,
            uid,
            timestamp,
        }
    }

    /// Creates the formation in READY state and allows its name in the `scenarios` label.
    pub async fn create(&self, ctx: &RequestContext, input: &FormationInput) -> Result<Formation> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;

        self.label_definitions
            .add_scenario(ctx, &tenant, &input.name)
            .await
            .with_context(|| format!("while adding formation {} to scenarios", input.name))?;

        let formation = input.to_formation(self.uid.generate(), tenant, FormationState::Ready);
        self.formations
            .create(ctx, &formation)
            .await
            .with_context(|| format!("while creating formation with name {}", input.name))?;
        log::info!("created formation {} with id {}", formation.name, formation.id);
        Ok(formation)
    }

    /// Deletes the formation by name; refused while objects are still assigned to it.
    pub async fn delete(&self, ctx: &RequestContext, input: &FormationInput) -> Result<Formation> {
        let tenant = tenant::load_from_context(ctx)?;
        let formation = self.get_by_name(ctx, &input.name).await?;

        let participants = self
            .assignments
            .list_all_for_formation(ctx, &tenant, &formation.id)
            .await
            .with_context(|| format!("while listing assignments of formation {}", formation.name))?;
        if !participants.is_empty() {
            return Err(AppError::InvalidOperation(format!(
                "formation {} still has assigned objects",
                formation.name
            ))
            .into());
        }

        self.label_definitions
            .remove_scenario(ctx, &tenant, &formation.name)
            .await
            .with_context(|| format!("while removing formation {} from scenarios", formation.name))?;
        self.formations
            .delete(ctx, &tenant, &formation.id)
            .await
            .with_context(|| format!("while deleting formation with name {}", formation.name))?;
        log::info!("deleted formation {} with id {}", formation.name, formation.id);
        Ok(formation)
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Formation> {
        let tenant = tenant::load_from_context(ctx)?;
        self.formations
            .get(ctx, &tenant, id)
            .await
            .with_context(|| format!("while getting formation with id {}", id))
    }

    pub async fn get_by_name(&self, ctx: &RequestContext, name: &str) -> Result<Formation> {
        let tenant = tenant::load_from_context(ctx)?;
        self.formations
            .get_by_name(ctx, &tenant, name)
            .await
            .with_context(|| format!("while getting formation with name {}", name))
    }

    pub async fn list(&self, ctx: &RequestContext, page_size: i32, cursor: &str) -> Result<Page<Formation>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.formations
            .list(ctx, &tenant, page_size, cursor)
            .await
            .context("while listing formations")
    }

    /// Adds the object to the formation.
    ///
    /// The formation name goes into the object's `scenarios` label, and the object gets an
    /// assignment in both directions with every current participant plus one to itself.
    /// Assigning an object twice is a no-op.
    pub async fn assign(
        &self,
        ctx: &RequestContext,
        object_id: &str,
        object_type: FormationObjectType,
        input: &FormationInput,
    ) -> Result<Formation> {
        let tenant = tenant::load_from_context(ctx)?;
        let formation = self.ready_formation(ctx, &input.name).await?;
        self.ensure_object_exists(ctx, &tenant, object_id, object_type).await?;

        let mut scenarios = self
            .labels
            .scenarios_for_object(ctx, &tenant, object_type.into(), object_id)
            .await?;
        if scenarios.contains(&formation.name) {
            return Ok(formation);
        }
        scenarios.push(formation.name.clone());
        self.labels
            .set_scenarios(ctx, &tenant, object_type.into(), object_id, &scenarios)
            .await
            .with_context(|| format!("while assigning {} to formation {}", object_id, formation.name))?;

        let existing = self
            .assignments
            .list_all_for_formation(ctx, &tenant, &formation.id)
            .await
            .with_context(|| format!("while listing assignments of formation {}", formation.name))?;
        let participants: Vec<Participant> = existing
            .iter()
            .filter(|fa| fa.is_self_assignment())
            .map(|fa| Participant::new(fa.source.clone(), fa.source_type))
            .collect();
        let joining = Participant::new(object_id, object_type.into());

        for input in assignment_inputs_for(&formation.id, &joining, &participants) {
            let assignment = input.to_model(self.uid.generate(), tenant.clone());
            self.assignments
                .create(ctx, &assignment)
                .await
                .with_context(|| format!("while creating formation assignment {}", assignment.id))?;
            self.record_operation(ctx, &assignment, AssignmentOperationType::Assign, OperationTrigger::Assign)
                .await?;
        }

        log::info!("assigned {} {} to formation {}", object_type_name(object_type), object_id, formation.name);
        Ok(formation)
    }

    /// Removes the object from the formation together with every assignment it takes part in.
    pub async fn unassign(
        &self,
        ctx: &RequestContext,
        object_id: &str,
        object_type: FormationObjectType,
        input: &FormationInput,
    ) -> Result<Formation> {
        let tenant = tenant::load_from_context(ctx)?;
        let formation = self.ready_formation(ctx, &input.name).await?;

        let scenarios = self
            .labels
            .scenarios_for_object(ctx, &tenant, object_type.into(), object_id)
            .await?;
        if scenarios.contains(&formation.name) {
            let remaining: Vec<String> = scenarios.into_iter().filter(|s| *s != formation.name).collect();
            self.labels
                .set_scenarios(ctx, &tenant, object_type.into(), object_id, &remaining)
                .await
                .with_context(|| format!("while unassigning {} from formation {}", object_id, formation.name))?;
        }

        let assignments = self
            .assignments
            .list_for_object(ctx, &tenant, &formation.id, object_id)
            .await
            .with_context(|| format!("while listing assignments of {} in formation {}", object_id, formation.name))?;
        for assignment in assignments {
            self.record_operation(ctx, &assignment, AssignmentOperationType::Unassign, OperationTrigger::Unassign)
                .await?;
            self.assignments
                .delete(ctx, &tenant, &assignment.id)
                .await
                .with_context(|| format!("while deleting formation assignment {}", assignment.id))?;
        }

        log::info!("unassigned {} {} from formation {}", object_type_name(object_type), object_id, formation.name);
        Ok(formation)
    }

    async fn ready_formation(&self, ctx: &RequestContext, name: &str) -> Result<Formation> {
        let formation = self.get_by_name(ctx, name).await?;
        if !formation.is_ready() {
            return Err(AppError::InvalidOperation(format!(
                "formation {} is in {} state; objects can be (un)assigned only in READY state",
                formation.name, formation.state
            ))
            .into());
        }
        Ok(formation)
    }

    async fn ensure_object_exists(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_id: &str,
        object_type: FormationObjectType,
    ) -> Result<()> {
        let (exists, resource) = match object_type {
            FormationObjectType::Application => (
                self.applications.exists(ctx, tenant, object_id).await?,
                ResourceType::Application,
            ),
            FormationObjectType::Runtime => (
                self.runtimes.exists(ctx, tenant, object_id).await?,
                ResourceType::Runtime,
            ),
        };
        if !exists {
            return Err(AppError::not_found(resource, object_id).into());
        }
        Ok(())
    }

    async fn record_operation(
        &self,
        ctx: &RequestContext,
        assignment: &FormationAssignment,
        op_type: AssignmentOperationType,
        triggered_by: OperationTrigger,
    ) -> Result<()> {
        let op = AssignmentOperationInput {
            op_type,
            formation_assignment_id: assignment.id.clone(),
            formation_id: assignment.formation_id.clone(),
            triggered_by,
        }
        .to_model(self.uid.generate(), (self.timestamp)());
        self.operations
            .create(ctx, &op)
            .await
            .with_context(|| format!("while recording {} operation for assignment {}", op_type, assignment.id))
    }
}

fn object_type_name(object_type: FormationObjectType) -> &'static str {
    match object_type {
        FormationObjectType::Application => "application",
        FormationObjectType::Runtime => "runtime",
    }
}
