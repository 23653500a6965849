pub mod application;
pub mod assignment_operation;
pub mod convert;
pub mod formation;
pub mod formation_assignment;
pub mod label;
pub mod label_definition;
pub mod package;
pub mod package_instance_auth;
pub mod persistence;
pub mod postgres;
pub mod repo;
pub mod runtime;
pub mod systems_sync;
pub mod tenant_business_type;
pub mod traits;
pub mod webhook;

#[cfg(test)]
pub mod mocks;

use std::sync::Arc;

pub use persistence::{with_transaction, PgTransactioner, Persistence, PersistenceTx, Transactioner};
pub use postgres::PostgresStore;
pub use traits::*;

/// One handle per repository, shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub applications: Arc<dyn ApplicationRepository>,
    pub runtimes: Arc<dyn RuntimeRepository>,
    pub packages: Arc<dyn PackageRepository>,
    pub package_instance_auths: Arc<dyn PackageInstanceAuthRepository>,
    pub webhooks: Arc<dyn WebhookRepository>,
    pub labels: Arc<dyn LabelRepository>,
    pub label_definitions: Arc<dyn LabelDefinitionRepository>,
    pub formations: Arc<dyn FormationRepository>,
    pub formation_assignments: Arc<dyn FormationAssignmentRepository>,
    pub assignment_operations: Arc<dyn AssignmentOperationRepository>,
    pub systems_sync: Arc<dyn SystemsSyncRepository>,
    pub tenant_business_types: Arc<dyn TenantBusinessTypeRepository>,
}

impl Repositories {
    pub fn postgres() -> Self {
        Self {
            applications: Arc::new(application::PgApplicationRepository::new()),
            runtimes: Arc::new(runtime::PgRuntimeRepository::new()),
            packages: Arc::new(package::PgPackageRepository::new()),
            package_instance_auths: Arc::new(
                package_instance_auth::PgPackageInstanceAuthRepository::new(),
            ),
            webhooks: Arc::new(webhook::PgWebhookRepository::new()),
            labels: Arc::new(label::PgLabelRepository::new()),
            label_definitions: Arc::new(label_definition::PgLabelDefinitionRepository::new()),
            formations: Arc::new(formation::PgFormationRepository::new()),
            formation_assignments: Arc::new(
                formation_assignment::PgFormationAssignmentRepository::new(),
            ),
            assignment_operations: Arc::new(
                assignment_operation::PgAssignmentOperationRepository::new(),
            ),
            systems_sync: Arc::new(systems_sync::PgSystemsSyncRepository::new()),
            tenant_business_types: Arc::new(
                tenant_business_type::PgTenantBusinessTypeRepository::new(),
            ),
        }
    }
}
