//! In-memory repositories for service and resolver tests.
//!
//! Every repository records the names of the methods invoked on it so tests can assert
//! which writes happened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use crate::apperrors::{AppError, ResourceType};
use crate::context::RequestContext;
use crate::model::pagination::{decode_offset_cursor, page_info, validate_page_size};
use crate::model::{
    Application, AssignmentOperation, Formation, FormationAssignment, Label, LabelDefinition,
    LabelableObject, Package, PackageInstanceAuth, Page, Runtime, SystemSynchronizationTimestamp,
    TenantBusinessType, Webhook, WebhookReferenceObjectType,
};
use crate::store::traits::*;
use crate::store::{Persistence, PersistenceTx, Transactioner};

#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<&'static str>>,
}

impl CallLog {
    fn record(&self, name: &'static str) {
        self.calls.lock().push(name);
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == name).count()
    }

    pub fn was_called(&self, name: &str) -> bool {
        self.count(name) > 0
    }
}

/// Rows of one table.
#[derive(Debug)]
pub struct Table<T> {
    rows: Mutex<Vec<T>>,
    resource: ResourceType,
}

impl<T: Clone> Table<T> {
    fn new(resource: ResourceType) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            resource,
        }
    }

    pub fn all(&self) -> Vec<T> {
        self.rows.lock().clone()
    }

    pub fn insert(&self, row: T) {
        self.rows.lock().push(row);
    }

    fn find(&self, id: &str, pred: impl Fn(&T) -> bool) -> Result<T> {
        self.rows
            .lock()
            .iter()
            .find(|row| pred(row))
            .cloned()
            .ok_or_else(|| AppError::not_found(self.resource, id).into())
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.lock().iter().filter(|row| pred(row)).cloned().collect()
    }

    fn replace(&self, pred: impl Fn(&T) -> bool, row: T) -> Result<()> {
        let mut rows = self.rows.lock();
        match rows.iter_mut().find(|r| pred(r)) {
            Some(existing) => {
                *existing = row;
                Ok(())
            }
            None => Err(AppError::Internal(
                "update should modify single row, but modified 0 rows".to_string(),
            )
            .into()),
        }
    }

    fn remove(&self, pred: impl Fn(&T) -> bool) -> u64 {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|r| !pred(r));
        (before - rows.len()) as u64
    }

    fn remove_one(&self, pred: impl Fn(&T) -> bool) -> Result<()> {
        match self.remove(pred) {
            1 => Ok(()),
            n => Err(AppError::Internal(format!(
                "delete should remove single row, but removed {} rows",
                n
            ))
            .into()),
        }
    }

    fn page(&self, pred: impl Fn(&T) -> bool, page_size: i32, cursor: &str) -> Result<Page<T>> {
        validate_page_size(page_size)?;
        let offset = decode_offset_cursor(cursor)?;
        let rows = self.filter(pred);
        let total_count = rows.len() as i32;
        Ok(Page {
            data: rows
                .into_iter()
                .skip(offset as usize)
                .take(page_size as usize)
                .collect(),
            page_info: page_info(cursor, offset, page_size, total_count),
            total_count,
        })
    }
}

pub struct InMemoryApplicationRepository {
    pub table: Table<Application>,
    pub calls: CallLog,
}

impl Default for InMemoryApplicationRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::Application),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, _ctx: &RequestContext, app: &Application) -> Result<()> {
        self.calls.record("create");
        self.table.insert(app.clone());
        Ok(())
    }

    async fn get_by_id(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<Application> {
        self.calls.record("get_by_id");
        self.table.find(id, |a| a.tenant == tenant && a.id == id)
    }

    async fn exists(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<bool> {
        self.calls.record("exists");
        Ok(!self.table.filter(|a| a.tenant == tenant && a.id == id).is_empty())
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Application>> {
        self.calls.record("list");
        self.table.page(|a| a.tenant == tenant, page_size, cursor)
    }

    async fn update(&self, _ctx: &RequestContext, app: &Application) -> Result<()> {
        self.calls.record("update");
        self.table
            .replace(|a| a.tenant == app.tenant && a.id == app.id, app.clone())
    }

    async fn delete(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|a| a.tenant == tenant && a.id == id)
    }

    async fn delete_global(&self, _ctx: &RequestContext, id: &str) -> Result<()> {
        self.calls.record("delete_global");
        self.table.remove_one(|a| a.id == id)
    }
}

pub struct InMemoryRuntimeRepository {
    pub table: Table<Runtime>,
    pub calls: CallLog,
}

impl Default for InMemoryRuntimeRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::Runtime),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl RuntimeRepository for InMemoryRuntimeRepository {
    async fn create(&self, _ctx: &RequestContext, runtime: &Runtime) -> Result<()> {
        self.calls.record("create");
        self.table.insert(runtime.clone());
        Ok(())
    }

    async fn get_by_id(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<Runtime> {
        self.calls.record("get_by_id");
        self.table.find(id, |r| r.tenant == tenant && r.id == id)
    }

    async fn exists(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<bool> {
        self.calls.record("exists");
        Ok(!self.table.filter(|r| r.tenant == tenant && r.id == id).is_empty())
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Runtime>> {
        self.calls.record("list");
        self.table.page(|r| r.tenant == tenant, page_size, cursor)
    }

    async fn update(&self, _ctx: &RequestContext, runtime: &Runtime) -> Result<()> {
        self.calls.record("update");
        self.table.replace(
            |r| r.tenant == runtime.tenant && r.id == runtime.id,
            runtime.clone(),
        )
    }

    async fn delete(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|r| r.tenant == tenant && r.id == id)
    }
}

pub struct InMemoryPackageRepository {
    pub table: Table<Package>,
    pub calls: CallLog,
}

impl Default for InMemoryPackageRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::Package),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl PackageRepository for InMemoryPackageRepository {
    async fn create(&self, _ctx: &RequestContext, pkg: &Package) -> Result<()> {
        self.calls.record("create");
        self.table.insert(pkg.clone());
        Ok(())
    }

    async fn get_by_id(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<Package> {
        self.calls.record("get_by_id");
        self.table.find(id, |p| p.tenant == tenant && p.id == id)
    }

    async fn get_for_application(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        id: &str,
        application_id: &str,
    ) -> Result<Package> {
        self.calls.record("get_for_application");
        self.table.find(id, |p| {
            p.tenant == tenant && p.id == id && p.application_id == application_id
        })
    }

    async fn list_for_application(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        application_id: &str,
    ) -> Result<Vec<Package>> {
        self.calls.record("list_for_application");
        Ok(self
            .table
            .filter(|p| p.tenant == tenant && p.application_id == application_id))
    }

    async fn update(&self, _ctx: &RequestContext, pkg: &Package) -> Result<()> {
        self.calls.record("update");
        self.table
            .replace(|p| p.tenant == pkg.tenant && p.id == pkg.id, pkg.clone())
    }

    async fn delete(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|p| p.tenant == tenant && p.id == id)
    }
}

pub struct InMemoryPackageInstanceAuthRepository {
    pub table: Table<PackageInstanceAuth>,
    pub calls: CallLog,
}

impl Default for InMemoryPackageInstanceAuthRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::PackageInstanceAuth),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl PackageInstanceAuthRepository for InMemoryPackageInstanceAuthRepository {
    async fn create(&self, _ctx: &RequestContext, item: &PackageInstanceAuth) -> Result<()> {
        self.calls.record("create");
        self.table.insert(item.clone());
        Ok(())
    }

    async fn get_by_id(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<PackageInstanceAuth> {
        self.calls.record("get_by_id");
        self.table.find(id, |p| p.tenant == tenant && p.id == id)
    }

    async fn get_for_package(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        id: &str,
        package_id: &str,
    ) -> Result<PackageInstanceAuth> {
        self.calls.record("get_for_package");
        self.table
            .find(id, |p| p.tenant == tenant && p.id == id && p.package_id == package_id)
    }

    async fn list_by_package_id(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        package_id: &str,
    ) -> Result<Vec<PackageInstanceAuth>> {
        self.calls.record("list_by_package_id");
        Ok(self
            .table
            .filter(|p| p.tenant == tenant && p.package_id == package_id))
    }

    async fn update(&self, _ctx: &RequestContext, item: &PackageInstanceAuth) -> Result<()> {
        self.calls.record("update");
        self.table
            .replace(|p| p.tenant == item.tenant && p.id == item.id, item.clone())
    }

    async fn delete(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|p| p.tenant == tenant && p.id == id)
    }
}

pub struct InMemoryWebhookRepository {
    pub table: Table<Webhook>,
    pub calls: CallLog,
}

impl Default for InMemoryWebhookRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::Webhook),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl WebhookRepository for InMemoryWebhookRepository {
    async fn create(&self, _ctx: &RequestContext, webhook: &Webhook) -> Result<()> {
        self.calls.record("create");
        self.table.insert(webhook.clone());
        Ok(())
    }

    async fn get_by_id(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<Webhook> {
        self.calls.record("get_by_id");
        self.table.find(id, |w| w.tenant == tenant && w.id == id)
    }

    async fn list_by_object(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        object_id: &str,
        object_type: WebhookReferenceObjectType,
    ) -> Result<Vec<Webhook>> {
        self.calls.record("list_by_object");
        Ok(self.table.filter(|w| {
            w.tenant == tenant && w.object_id == object_id && w.object_type == object_type
        }))
    }

    async fn update(&self, _ctx: &RequestContext, webhook: &Webhook) -> Result<()> {
        self.calls.record("update");
        self.table.replace(
            |w| w.tenant == webhook.tenant && w.id == webhook.id,
            webhook.clone(),
        )
    }

    async fn delete(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|w| w.tenant == tenant && w.id == id)
    }
}

pub struct InMemoryLabelRepository {
    pub table: Table<Label>,
    pub calls: CallLog,
}

impl Default for InMemoryLabelRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::Label),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl LabelRepository for InMemoryLabelRepository {
    async fn create(&self, _ctx: &RequestContext, label: &Label) -> Result<()> {
        self.calls.record("create");
        self.table.insert(label.clone());
        Ok(())
    }

    async fn update(&self, _ctx: &RequestContext, label: &Label) -> Result<()> {
        self.calls.record("update");
        self.table
            .replace(|l| l.tenant == label.tenant && l.id == label.id, label.clone())
    }

    async fn get_by_key(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<Label> {
        self.calls.record("get_by_key");
        self.table.find(key, |l| {
            l.tenant == tenant
                && l.object_type == object_type
                && l.object_id == object_id
                && l.key == key
        })
    }

    async fn list_for_object(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
    ) -> Result<Vec<Label>> {
        self.calls.record("list_for_object");
        Ok(self.table.filter(|l| {
            l.tenant == tenant && l.object_type == object_type && l.object_id == object_id
        }))
    }

    async fn list_by_key(&self, _ctx: &RequestContext, tenant: &str, key: &str) -> Result<Vec<Label>> {
        self.calls.record("list_by_key");
        Ok(self.table.filter(|l| l.tenant == tenant && l.key == key))
    }

    async fn delete(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
    ) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|l| {
            l.tenant == tenant
                && l.object_type == object_type
                && l.object_id == object_id
                && l.key == key
        })
    }

    async fn delete_by_key(&self, _ctx: &RequestContext, tenant: &str, key: &str) -> Result<u64> {
        self.calls.record("delete_by_key");
        Ok(self.table.remove(|l| l.tenant == tenant && l.key == key))
    }
}

pub struct InMemoryLabelDefinitionRepository {
    pub table: Table<LabelDefinition>,
    pub calls: CallLog,
}

impl Default for InMemoryLabelDefinitionRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::LabelDefinition),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl LabelDefinitionRepository for InMemoryLabelDefinitionRepository {
    async fn create(&self, _ctx: &RequestContext, def: &LabelDefinition) -> Result<()> {
        self.calls.record("create");
        if !self
            .table
            .filter(|d| d.tenant == def.tenant && d.key == def.key)
            .is_empty()
        {
            return Err(AppError::NotUnique {
                resource: ResourceType::LabelDefinition,
            }
            .into());
        }
        self.table.insert(def.clone());
        Ok(())
    }

    async fn get_by_key(&self, _ctx: &RequestContext, tenant: &str, key: &str) -> Result<LabelDefinition> {
        self.calls.record("get_by_key");
        self.table.find(key, |d| d.tenant == tenant && d.key == key)
    }

    async fn exists(&self, _ctx: &RequestContext, tenant: &str, key: &str) -> Result<bool> {
        self.calls.record("exists");
        Ok(!self.table.filter(|d| d.tenant == tenant && d.key == key).is_empty())
    }

    async fn list(&self, _ctx: &RequestContext, tenant: &str) -> Result<Vec<LabelDefinition>> {
        self.calls.record("list");
        Ok(self.table.filter(|d| d.tenant == tenant))
    }

    async fn update(&self, _ctx: &RequestContext, def: &LabelDefinition) -> Result<()> {
        self.calls.record("update");
        self.table
            .replace(|d| d.tenant == def.tenant && d.id == def.id, def.clone())
    }

    async fn delete_by_key(&self, _ctx: &RequestContext, tenant: &str, key: &str) -> Result<()> {
        self.calls.record("delete_by_key");
        self.table.remove_one(|d| d.tenant == tenant && d.key == key)
    }
}

pub struct InMemoryFormationRepository {
    pub table: Table<Formation>,
    pub calls: CallLog,
}

impl Default for InMemoryFormationRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::Formation),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl FormationRepository for InMemoryFormationRepository {
    async fn create(&self, _ctx: &RequestContext, formation: &Formation) -> Result<()> {
        self.calls.record("create");
        if !self
            .table
            .filter(|f| f.tenant == formation.tenant && f.name == formation.name)
            .is_empty()
        {
            return Err(AppError::NotUnique {
                resource: ResourceType::Formation,
            }
            .into());
        }
        self.table.insert(formation.clone());
        Ok(())
    }

    async fn get(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<Formation> {
        self.calls.record("get");
        self.table.find(id, |f| f.tenant == tenant && f.id == id)
    }

    async fn get_by_name(&self, _ctx: &RequestContext, tenant: &str, name: &str) -> Result<Formation> {
        self.calls.record("get_by_name");
        self.table.find(name, |f| f.tenant == tenant && f.name == name)
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<Formation>> {
        self.calls.record("list");
        self.table.page(|f| f.tenant == tenant, page_size, cursor)
    }

    async fn update(&self, _ctx: &RequestContext, formation: &Formation) -> Result<()> {
        self.calls.record("update");
        self.table.replace(
            |f| f.tenant == formation.tenant && f.id == formation.id,
            formation.clone(),
        )
    }

    async fn delete(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|f| f.tenant == tenant && f.id == id)
    }
}

pub struct InMemoryFormationAssignmentRepository {
    pub table: Table<FormationAssignment>,
    pub calls: CallLog,
}

impl Default for InMemoryFormationAssignmentRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::FormationAssignment),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl FormationAssignmentRepository for InMemoryFormationAssignmentRepository {
    async fn create(&self, _ctx: &RequestContext, assignment: &FormationAssignment) -> Result<()> {
        self.calls.record("create");
        self.table.insert(assignment.clone());
        Ok(())
    }

    async fn get_for_formation(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        id: &str,
        formation_id: &str,
    ) -> Result<FormationAssignment> {
        self.calls.record("get_for_formation");
        self.table.find(id, |fa| {
            fa.tenant == tenant && fa.id == id && fa.formation_id == formation_id
        })
    }

    async fn list_by_formation_id(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
        page_size: i32,
        cursor: &str,
    ) -> Result<Page<FormationAssignment>> {
        self.calls.record("list_by_formation_id");
        self.table.page(
            |fa| fa.tenant == tenant && fa.formation_id == formation_id,
            page_size,
            cursor,
        )
    }

    async fn list_all_for_formation(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
    ) -> Result<Vec<FormationAssignment>> {
        self.calls.record("list_all_for_formation");
        Ok(self
            .table
            .filter(|fa| fa.tenant == tenant && fa.formation_id == formation_id))
    }

    async fn list_for_object(
        &self,
        _ctx: &RequestContext,
        tenant: &str,
        formation_id: &str,
        object_id: &str,
    ) -> Result<Vec<FormationAssignment>> {
        self.calls.record("list_for_object");
        Ok(self.table.filter(|fa| {
            fa.tenant == tenant && fa.formation_id == formation_id && fa.involves(object_id)
        }))
    }

    async fn update(&self, _ctx: &RequestContext, assignment: &FormationAssignment) -> Result<()> {
        self.calls.record("update");
        self.table.replace(
            |fa| fa.tenant == assignment.tenant && fa.id == assignment.id,
            assignment.clone(),
        )
    }

    async fn delete(&self, _ctx: &RequestContext, tenant: &str, id: &str) -> Result<()> {
        self.calls.record("delete");
        self.table.remove_one(|fa| fa.tenant == tenant && fa.id == id)
    }
}

pub struct InMemoryAssignmentOperationRepository {
    pub table: Table<AssignmentOperation>,
    pub calls: CallLog,
}

impl Default for InMemoryAssignmentOperationRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::AssignmentOperation),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl AssignmentOperationRepository for InMemoryAssignmentOperationRepository {
    async fn create(&self, _ctx: &RequestContext, op: &AssignmentOperation) -> Result<()> {
        self.calls.record("create");
        self.table.insert(op.clone());
        Ok(())
    }

    async fn list_for_assignment(
        &self,
        _ctx: &RequestContext,
        formation_assignment_id: &str,
    ) -> Result<Vec<AssignmentOperation>> {
        self.calls.record("list_for_assignment");
        Ok(self
            .table
            .filter(|op| op.formation_assignment_id == formation_assignment_id))
    }

    async fn update(&self, _ctx: &RequestContext, op: &AssignmentOperation) -> Result<()> {
        self.calls.record("update");
        self.table.replace(|o| o.id == op.id, op.clone())
    }
}

pub struct InMemorySystemsSyncRepository {
    pub table: Table<SystemSynchronizationTimestamp>,
    pub calls: CallLog,
}

impl Default for InMemorySystemsSyncRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::SystemsSyncTimestamp),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl SystemsSyncRepository for InMemorySystemsSyncRepository {
    async fn list(&self, _ctx: &RequestContext, tenant: &str) -> Result<Vec<SystemSynchronizationTimestamp>> {
        self.calls.record("list");
        Ok(self.table.filter(|s| s.tenant_id == tenant))
    }

    async fn upsert(&self, _ctx: &RequestContext, item: &SystemSynchronizationTimestamp) -> Result<()> {
        self.calls.record("upsert");
        let same_key =
            |s: &SystemSynchronizationTimestamp| s.tenant_id == item.tenant_id && s.product_id == item.product_id;
        let existing = self.table.filter(same_key);
        match existing.first() {
            Some(current) => {
                let mut updated = current.clone();
                updated.last_sync_timestamp = item.last_sync_timestamp;
                self.table.replace(same_key, updated)
            }
            None => {
                self.table.insert(item.clone());
                Ok(())
            }
        }
    }
}

pub struct InMemoryTenantBusinessTypeRepository {
    pub table: Table<TenantBusinessType>,
    pub calls: CallLog,
}

impl Default for InMemoryTenantBusinessTypeRepository {
    fn default() -> Self {
        Self {
            table: Table::new(ResourceType::TenantBusinessType),
            calls: CallLog::default(),
        }
    }
}

#[async_trait::async_trait]
impl TenantBusinessTypeRepository for InMemoryTenantBusinessTypeRepository {
    async fn create(&self, _ctx: &RequestContext, item: &TenantBusinessType) -> Result<()> {
        self.calls.record("create");
        self.table.insert(item.clone());
        Ok(())
    }

    async fn get_by_id(&self, _ctx: &RequestContext, id: &str) -> Result<TenantBusinessType> {
        self.calls.record("get_by_id");
        self.table.find(id, |t| t.id == id)
    }

    async fn list_all(&self, _ctx: &RequestContext) -> Result<Vec<TenantBusinessType>> {
        self.calls.record("list_all");
        Ok(self.table.all())
    }
}

pub const TEST_TENANT: &str = "3e64ebae-38b5-46a0-b1ed-9ccee153a0ae";

/// Context carrying the test tenant and no transaction.
pub fn tenant_context() -> RequestContext {
    RequestContext::new().with_tenant(crate::tenant::TenantCtx::new(TEST_TENANT, "external-tenant"))
}

/// One in-memory repository per table, kept typed so tests can inspect them.
#[derive(Default)]
pub struct InMemoryRepositories {
    pub applications: Arc<InMemoryApplicationRepository>,
    pub runtimes: Arc<InMemoryRuntimeRepository>,
    pub packages: Arc<InMemoryPackageRepository>,
    pub package_instance_auths: Arc<InMemoryPackageInstanceAuthRepository>,
    pub webhooks: Arc<InMemoryWebhookRepository>,
    pub labels: Arc<InMemoryLabelRepository>,
    pub label_definitions: Arc<InMemoryLabelDefinitionRepository>,
    pub formations: Arc<InMemoryFormationRepository>,
    pub formation_assignments: Arc<InMemoryFormationAssignmentRepository>,
    pub assignment_operations: Arc<InMemoryAssignmentOperationRepository>,
    pub systems_sync: Arc<InMemorySystemsSyncRepository>,
    pub tenant_business_types: Arc<InMemoryTenantBusinessTypeRepository>,
}

impl InMemoryRepositories {
    pub fn repositories(&self) -> crate::store::Repositories {
        crate::store::Repositories {
            applications: self.applications.clone(),
            runtimes: self.runtimes.clone(),
            packages: self.packages.clone(),
            package_instance_auths: self.package_instance_auths.clone(),
            webhooks: self.webhooks.clone(),
            labels: self.labels.clone(),
            label_definitions: self.label_definitions.clone(),
            formations: self.formations.clone(),
            formation_assignments: self.formation_assignments.clone(),
            assignment_operations: self.assignment_operations.clone(),
            systems_sync: self.systems_sync.clone(),
            tenant_business_types: self.tenant_business_types.clone(),
        }
    }
}

/// Commit and rollback counters shared by a [`StubTransactioner`] and its transactions.
#[derive(Debug, Default)]
pub struct TxCounters {
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

impl TxCounters {
    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

/// Hands out transactions without a database behind them.
#[derive(Debug, Default, Clone)]
pub struct StubTransactioner {
    pub counters: Arc<TxCounters>,
}

struct StubTx {
    counters: Arc<TxCounters>,
    committed: bool,
}

#[async_trait::async_trait]
impl Transactioner for StubTransactioner {
    async fn begin(&self) -> Result<Box<dyn PersistenceTx>> {
        self.counters
            .begins
            .fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubTx {
            counters: self.counters.clone(),
            committed: false,
        }))
    }
}

#[async_trait::async_trait]
impl PersistenceTx for StubTx {
    fn persistence(&self) -> Persistence {
        Persistence::default()
    }

    async fn commit(&mut self) -> Result<()> {
        self.committed = true;
        self.counters
            .commits
            .fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback_unless_committed(&mut self) {
        if !self.committed {
            self.counters
                .rollbacks
                .fetch_add(1, Ordering::SeqCst);
        }
    }
}
