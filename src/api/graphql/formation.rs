use async_graphql::{Context, InputObject, Json, Object, Result, SimpleObject, ID};
use serde_json::Value;

use super::scalars::PageCursor;
use super::{page_args, services, transact, transact_optional, Page};
use crate::model;

mirror_enum!(FormationState => FormationState {
    Initial,
    Ready,
    CreateError,
    DeleteError,
    Deleting,
});

mirror_enum!(FormationObjectType => FormationObjectType { Application, Runtime });

mirror_enum!(FormationAssignmentType => FormationAssignmentType {
    Application,
    Runtime,
    RuntimeContext,
});

mirror_enum!(FormationAssignmentState => FormationAssignmentState {
    Initial,
    Ready,
    ConfigPending,
    CreateError,
    DeleteError,
    Deleting,
});

#[derive(SimpleObject, Debug, Clone)]
pub struct FormationError {
    pub message: String,
    pub error_code: i32,
}

#[derive(SimpleObject, Debug, Clone)]
pub struct Formation {
    pub id: ID,
    pub name: String,
    pub state: FormationState,
    pub error: Option<FormationError>,
}

impl From<model::Formation> for Formation {
    fn from(formation: model::Formation) -> Self {
        Self {
            id: ID(formation.id),
            name: formation.name,
            state: formation.state.into(),
            error: formation.error.map(|e| FormationError {
                message: e.message,
                error_code: e.error_code,
            }),
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct FormationAssignment {
    pub id: ID,
    pub source: ID,
    pub source_type: FormationAssignmentType,
    pub target: ID,
    pub target_type: FormationAssignmentType,
    pub state: FormationAssignmentState,
    pub value: Option<Json<Value>>,
}

impl From<model::FormationAssignment> for FormationAssignment {
    fn from(fa: model::FormationAssignment) -> Self {
        Self {
            id: ID(fa.id),
            source: ID(fa.source),
            source_type: fa.source_type.into(),
            target: ID(fa.target),
            target_type: fa.target_type.into(),
            state: fa.state.into(),
            value: fa.value.map(Json),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct FormationInput {
    pub name: String,
}

impl From<FormationInput> for model::FormationInput {
    fn from(input: FormationInput) -> Self {
        Self { name: input.name }
    }
}

#[derive(Default)]
pub struct FormationQuery;

#[Object]
impl FormationQuery {
    async fn formation(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Formation>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move { svc.formations.get(&tx, &id).await.map(Formation::from) })
            .await
    }

    async fn formation_by_name(&self, ctx: &Context<'_>, name: String) -> Result<Option<Formation>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.formations.get_by_name(&tx, &name).await.map(Formation::from)
        })
        .await
    }

    async fn formations(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<PageCursor>,
    ) -> Result<Page<Formation>> {
        let svc = services(ctx)?;
        let (page_size, cursor) = page_args(first, after);
        transact(ctx, |tx| async move {
            let page = svc.formations.list(&tx, page_size, &cursor).await?;
            Ok(Page::from_model(page))
        })
        .await
    }

    async fn formation_assignments(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "formationID")] formation_id: ID,
        first: Option<i32>,
        after: Option<PageCursor>,
    ) -> Result<Page<FormationAssignment>> {
        let svc = services(ctx)?;
        let (page_size, cursor) = page_args(first, after);
        transact(ctx, |tx| async move {
            let page = svc
                .formation_assignments
                .list_for_formation(&tx, &formation_id, page_size, &cursor)
                .await?;
            Ok(Page::from_model(page))
        })
        .await
    }

    async fn formation_assignment(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "formationID")] formation_id: ID,
        id: ID,
    ) -> Result<Option<FormationAssignment>> {
        let svc = services(ctx)?;
        transact_optional(ctx, |tx| async move {
            svc.formation_assignments
                .get_for_formation(&tx, &id, &formation_id)
                .await
                .map(FormationAssignment::from)
        })
        .await
    }
}

#[derive(Default)]
pub struct FormationMutation;

#[Object]
impl FormationMutation {
    async fn create_formation(&self, ctx: &Context<'_>, formation: FormationInput) -> Result<Formation> {
        let svc = services(ctx)?;
        let input = model::FormationInput::from(formation);
        transact(ctx, |tx| async move { svc.formations.create(&tx, &input).await.map(Formation::from) }).await
    }

    async fn delete_formation(&self, ctx: &Context<'_>, formation: FormationInput) -> Result<Formation> {
        let svc = services(ctx)?;
        let input = model::FormationInput::from(formation);
        transact(ctx, |tx| async move { svc.formations.delete(&tx, &input).await.map(Formation::from) }).await
    }

    async fn assign_formation(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "objectID")] object_id: ID,
        object_type: FormationObjectType,
        formation: FormationInput,
    ) -> Result<Formation> {
        let svc = services(ctx)?;
        let input = model::FormationInput::from(formation);
        transact(ctx, |tx| async move {
            svc.formations
                .assign(&tx, &object_id, object_type.into(), &input)
                .await
                .map(Formation::from)
        })
        .await
    }

    async fn unassign_formation(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "objectID")] object_id: ID,
        object_type: FormationObjectType,
        formation: FormationInput,
    ) -> Result<Formation> {
        let svc = services(ctx)?;
        let input = model::FormationInput::from(formation);
        transact(ctx, |tx| async move {
            svc.formations
                .unassign(&tx, &object_id, object_type.into(), &input)
                .await
                .map(Formation::from)
        })
        .await
    }

    async fn set_formation_assignment_state(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "formationID")] formation_id: ID,
        #[graphql(name = "formationAssignmentID")] formation_assignment_id: ID,
        state: FormationAssignmentState,
        value: Option<Json<Value>>,
    ) -> Result<FormationAssignment> {
        let svc = services(ctx)?;
        transact(ctx, |tx| async move {
            svc.formation_assignments
                .update_state(&tx, &formation_id, &formation_assignment_id, state.into(), value.map(|v| v.0))
                .await
                .map(FormationAssignment::from)
        })
        .await
    }
}
