use std::sync::Arc;

use crate::database::{PlatformCounts, ReportStore, Store};
use crate::error::Result;

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
}

impl ReportService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Admin dashboard totals.
    pub async fn dashboard(&self) -> Result<PlatformCounts> {
        self.store.platform_counts().await
    }
}
