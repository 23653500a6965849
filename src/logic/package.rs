use std::sync::Arc;

use anyhow::{Context, Result};

use crate::apperrors::{AppError, ResourceType};
use crate::context::RequestContext;
use crate::logic::uid::UidService;
use crate::model::{json_schema, Id, Package, PackageCreateInput, PackageUpdateInput};
use crate::store::traits::{ApplicationRepository, PackageRepository};
use crate::tenant;

pub struct PackageService {
    packages: Arc<dyn PackageRepository>,
    applications: Arc<dyn ApplicationRepository>,
    uid: Arc<dyn UidService>,
}

fn validate_input_schema(schema: Option<&str>) -> Result<()> {
    if let Some(schema) = schema {
        json_schema::compile_str(schema).context("while validating instance auth request input schema")?;
    }
    Ok(())
}

impl PackageService {
    pub fn new(
        packages: Arc<dyn PackageRepository>,
        applications: Arc<dyn ApplicationRepository>,
        uid: Arc<dyn UidService>,
    ) -> Self {
        Self {
            packages,
            applications,
            uid,
        }
    }

    pub async fn create(&self, ctx: &RequestContext, application_id: &str, input: &PackageCreateInput) -> Result<Id> {
        let tenant = tenant::load_from_context(ctx)?;
        input.validate()?;
        validate_input_schema(input.instance_auth_request_input_schema.as_deref())?;

        let app_exists = self
            .applications
            .exists(ctx, &tenant, application_id)
            .await
            .with_context(|| format!("while checking if application {} exists", application_id))?;
        if !app_exists {
            return Err(AppError::not_found(ResourceType::Application, application_id).into());
        }

        let id = self.uid.generate();
        let pkg = input.to_package(id.clone(), application_id.to_string(), tenant);
        self.packages
            .create(ctx, &pkg)
            .await
            .with_context(|| format!("while creating package with id {}", id))?;
        log::debug!("created package {} for application {}", id, application_id);
        Ok(id)
    }

    pub async fn update(&self, ctx: &RequestContext, id: &str, input: &PackageUpdateInput) -> Result<()> {
        input.validate()?;
        validate_input_schema(input.instance_auth_request_input_schema.as_deref())?;

        let mut pkg = self.get(ctx, id).await?;
        pkg.set_from_update_input(input);
        self.packages
            .update(ctx, &pkg)
            .await
            .with_context(|| format!("while updating package with id {}", id))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        let tenant = tenant::load_from_context(ctx)?;
        self.packages
            .delete(ctx, &tenant, id)
            .await
            .with_context(|| format!("while deleting package with id {}", id))
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Package> {
        let tenant = tenant::load_from_context(ctx)?;
        self.packages
            .get_by_id(ctx, &tenant, id)
            .await
            .with_context(|| format!("while getting package with id {}", id))
    }

    pub async fn get_for_application(&self, ctx: &RequestContext, id: &str, application_id: &str) -> Result<Package> {
        let tenant = tenant::load_from_context(ctx)?;
        self.packages
            .get_for_application(ctx, &tenant, id, application_id)
            .await
            .with_context(|| format!("while getting package {} of application {}", id, application_id))
    }

    pub async fn list_for_application(&self, ctx: &RequestContext, application_id: &str) -> Result<Vec<Package>> {
        let tenant = tenant::load_from_context(ctx)?;
        self.packages
            .list_for_application(ctx, &tenant, application_id)
            .await
            .with_context(|| format!("while listing packages of application {}", application_id))
    }
}
