use std::sync::Arc;

use uuid::Uuid;

use crate::database::{OrganizationStore, Store};
use crate::error::{Error, Result};
use crate::models::organization::{Organization, RecruiterView};

#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn Store>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, organization_id: Uuid) -> Result<Organization> {
        self.store
            .find_organization(organization_id)
            .await?
            .ok_or_else(|| Error::NotFound("Organization not found".into()))
    }

    pub async fn recruiters(&self, organization_id: Uuid) -> Result<Vec<RecruiterView>> {
        self.store.list_recruiters(organization_id).await
    }
}
