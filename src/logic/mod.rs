pub mod application;
pub mod formation;
pub mod formation_assignment;
pub mod label;
pub mod label_definition;
pub mod package;
pub mod package_instance_auth;
pub mod runtime;
pub mod systems_sync;
pub mod tenant_business_type;
pub mod uid;
pub mod webhook;

use std::sync::Arc;

pub use application::ApplicationService;
pub use formation::FormationService;
pub use formation_assignment::FormationAssignmentService;
pub use label::LabelService;
pub use label_definition::LabelDefinitionService;
pub use package::PackageService;
pub use package_instance_auth::PackageInstanceAuthService;
pub use runtime::RuntimeService;
pub use systems_sync::SystemsSyncService;
pub use tenant_business_type::TenantBusinessTypeService;
pub use uid::{utc_now_generator, TimestampGenerator, UidService, UuidService};
pub use webhook::WebhookService;

use crate::store::Repositories;

/// Every service of the director, wired over one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub applications: Arc<ApplicationService>,
    pub runtimes: Arc<RuntimeService>,
    pub packages: Arc<PackageService>,
    pub package_instance_auths: Arc<PackageInstanceAuthService>,
    pub webhooks: Arc<WebhookService>,
    pub labels: Arc<LabelService>,
    pub label_definitions: Arc<LabelDefinitionService>,
    pub formations: Arc<FormationService>,
    pub formation_assignments: Arc<FormationAssignmentService>,
    pub systems_sync: Arc<SystemsSyncService>,
    pub tenant_business_types: Arc<TenantBusinessTypeService>,
}

impl Services {
    pub fn new(repos: &Repositories, uid: Arc<dyn UidService>, timestamp: TimestampGenerator) -> Self {
        let labels = Arc::new(LabelService::new(
            repos.labels.clone(),
            repos.label_definitions.clone(),
            uid.clone(),
        ));
        let label_definitions = Arc::new(LabelDefinitionService::new(
            repos.label_definitions.clone(),
            repos.labels.clone(),
            uid.clone(),
        ));
        let webhooks = Arc::new(WebhookService::new(
            repos.webhooks.clone(),
            repos.applications.clone(),
            repos.runtimes.clone(),
            uid.clone(),
        ));

        Self {
            applications: Arc::new(ApplicationService::new(
                repos.applications.clone(),
                webhooks.clone(),
                labels.clone(),
                uid.clone(),
                timestamp.clone(),
            )),
            runtimes: Arc::new(RuntimeService::new(
                repos.runtimes.clone(),
                labels.clone(),
                uid.clone(),
                timestamp.clone(),
            )),
            packages: Arc::new(PackageService::new(
                repos.packages.clone(),
                repos.applications.clone(),
                uid.clone(),
            )),
            package_instance_auths: Arc::new(PackageInstanceAuthService::new(
                repos.package_instance_auths.clone(),
                uid.clone(),
                timestamp.clone(),
            )),
            formations: Arc::new(FormationService::new(
                repos.formations.clone(),
                repos.formation_assignments.clone(),
                repos.assignment_operations.clone(),
                repos.applications.clone(),
                repos.runtimes.clone(),
                labels.clone(),
                label_definitions.clone(),
                uid.clone(),
                timestamp.clone(),
            )),
            formation_assignments: Arc::new(FormationAssignmentService::new(
                repos.formation_assignments.clone(),
                repos.assignment_operations.clone(),
                timestamp,
            )),
            systems_sync: Arc::new(SystemsSyncService::new(repos.systems_sync.clone(), uid.clone())),
            tenant_business_types: Arc::new(TenantBusinessTypeService::new(
                repos.tenant_business_types.clone(),
                uid,
            )),
            webhooks,
            labels,
            label_definitions,
        }
    }
}
