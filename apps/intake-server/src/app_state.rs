use std::sync::Arc;

use intake_core::ServiceCatalog;
use intake_events::Bus;
use intake_kernel::Kernel;

use crate::model::ModelClient;

#[derive(Clone)]
pub(crate) struct AppState {
    bus: Bus,
    kernel: Kernel,
    catalog: Arc<ServiceCatalog>,
    model: Arc<dyn ModelClient>,
}

impl AppState {
    pub fn new(
        bus: Bus,
        kernel: Kernel,
        catalog: Arc<ServiceCatalog>,
        model: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            bus,
            kernel,
            catalog,
            model,
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn model(&self) -> &Arc<dyn ModelClient> {
        &self.model
    }
}
