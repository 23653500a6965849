use anyhow::Result;

use crate::context::RequestContext;
use crate::model::{
    Application, AssignmentOperation, Formation, FormationAssignment, Label, LabelDefinition,
    LabelableObject, Package, PackageInstanceAuth, Page, Runtime, SystemSynchronizationTimestamp,
    TenantBusinessType, Webhook, WebhookReferenceObjectType,
};

#[async_trait::async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, app: &Application) -> Result<()>;
    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Application>;
    async fn exists(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<bool>;
    async fn list(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Application>>;
    async fn update(&self, ctx: &RequestContext, app: &Application) -> Result<()>;
    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()>;
    /// Deletes regardless of tenant; used by system-level cleanups
    async fn delete_global(&self, ctx: &RequestContext, id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait RuntimeRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, runtime: &Runtime) -> Result<()>;
    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Runtime>;
    async fn exists(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<bool>;
    async fn list(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Runtime>>;
    async fn update(&self, ctx: &RequestContext, runtime: &Runtime) -> Result<()>;
    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait PackageRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, pkg: &Package) -> Result<()>;
    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Package>;
    async fn get_for_application(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        id: &str,
        application_id: &str,
    ) -> Result<Package>;
    async fn list_for_application(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        application_id: &str,
    ) -> Result<Vec<Package>>;
    async fn update(&self, ctx: &RequestContext, pkg: &Package) -> Result<()>;
    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait PackageInstanceAuthRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, item: &PackageInstanceAuth) -> Result<()>;
    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<PackageInstanceAuth>;
    async fn get_for_package(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        id: &str,
        package_id: &str,
    ) -> Result<PackageInstanceAuth>;
    async fn list_by_package_id(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        package_id: &str,
    ) -> Result<Vec<PackageInstanceAuth>>;
    async fn update(&self, ctx: &RequestContext, item: &PackageInstanceAuth) -> Result<()>;
    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, webhook: &Webhook) -> Result<()>;
    async fn get_by_id(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Webhook>;
    async fn list_by_object(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_id: &str,
        object_type: WebhookReferenceObjectType,
    ) -> Result<Vec<Webhook>>;
    async fn update(&self, ctx: &RequestContext, webhook: &Webhook) -> Result<()>;
    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait LabelRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, label: &Label) -> Result<()>;
    async fn update(&self, ctx: &RequestContext, label: &Label) -> Result<()>;
    async fn get_by_key(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<Label>;
    async fn list_for_object(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
    ) -> Result<Vec<Label>>;
    async fn list_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<Vec<Label>>;
    async fn delete(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<()>;
    /// Returns the number of removed labels
    async fn delete_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait LabelDefinitionRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, def: &LabelDefinition) -> Result<()>;
    async fn get_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<LabelDefinition>;
    async fn exists(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<bool>;
    async fn list(&self, ctx: &RequestContext, tenant: &str) -> Result<Vec<LabelDefinition>>;
    async fn update(&self, ctx: &RequestContext, def: &LabelDefinition) -> Result<()>;
    async fn delete_by_key(&self, ctx: &RequestContext, tenant: &str, key: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait FormationRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, formation: &Formation) -> Result<()>;
    async fn get(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<Formation>;
    async fn get_by_name(&self, ctx: &RequestContext, tenant: &str, name: &str) -> Result<Formation>;
    async fn list(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Formation>>;
    async fn update(&self, ctx: &RequestContext, formation: &Formation) -> Result<()>;
    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait FormationAssignmentRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, assignment: &FormationAssignment) -> Result<()>;
    async fn get_for_formation(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        id: &str,
        formation_id: &str,
    ) -> Result<FormationAssignment>;
    async fn list_by_formation_id(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<FormationAssignment>>;
    async fn list_all_for_formation(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
    ) -> Result<Vec<FormationAssignment>>;
    /// Assignments of the formation where the object is either source or target
    async fn list_for_object(
        &self,
        ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
        object_id: &str,
    ) -> Result<Vec<FormationAssignment>>;
    async fn update(&self, ctx: &RequestContext, assignment: &FormationAssignment) -> Result<()>;
    async fn delete(&self, ctx: &RequestContext, tenant: &str, id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait AssignmentOperationRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, op: &AssignmentOperation) -> Result<()>;
    async fn list_for_assignment(
        &self,
        ctx: &RequestContext,
        formation_assignment_id: &str,
    ) -> Result<Vec<AssignmentOperation>>;
    async fn update(&self, ctx: &RequestContext, op: &AssignmentOperation) -> Result<()>;
}

#[async_trait::async_trait]
pub trait SystemsSyncRepository: Send + Sync {
    async fn list(&self, ctx: &RequestContext, tenant: &str) -> Result<Vec<SystemSynchronizationTimestamp>>;
    async fn upsert(&self, ctx: &RequestContext, item: &SystemSynchronizationTimestamp) -> Result<()>;
}

#[async_trait::async_trait]
pub trait TenantBusinessTypeRepository: Send + Sync {
    async fn create(&self, ctx: &RequestContext, item: &TenantBusinessType) -> Result<()>;
    async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<TenantBusinessType>;
    async fn list_all(&self, ctx: &RequestContext) -> Result<Vec<TenantBusinessType>>;
}
