//! In-memory [`ComputeClient`] for translator tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use tritonshim_core::TenantContext;
use tritonshim_triton::model::{Image, Package, Vm};
use tritonshim_triton::{ComputeClient, ImageFilter, PackageFilter, ProviderError, VmFilter};

/// Returns canned records and remembers the filters it was called with.
#[derive(Debug, Default)]
pub(crate) struct FakeCompute {
    pub vms: Vec<Vm>,
    pub images: Vec<Image>,
    pub packages: Vec<Package>,
    pub down: bool,
    pub vm_filters: Mutex<Vec<VmFilter>>,
    pub image_filters: Mutex<Vec<ImageFilter>>,
    pub package_filters: Mutex<Vec<PackageFilter>>,
}

impl FakeCompute {
    pub(crate) fn down() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ProviderError> {
        if self.down {
            return Err(ProviderError::Unavailable("HTTP 503: maintenance".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl ComputeClient for FakeCompute {
    async fn list_instances(
        &self,
        _ctx: &TenantContext,
        filter: &VmFilter,
    ) -> Result<Vec<Vm>, ProviderError> {
        self.vm_filters.lock().push(filter.clone());
        self.check()?;
        Ok(self.vms.clone())
    }

    async fn list_images(
        &self,
        _ctx: &TenantContext,
        filter: &ImageFilter,
    ) -> Result<Vec<Image>, ProviderError> {
        self.image_filters.lock().push(filter.clone());
        self.check()?;
        Ok(self.images.clone())
    }

    async fn list_instance_types(
        &self,
        _ctx: &TenantContext,
        filter: &PackageFilter,
    ) -> Result<Vec<Package>, ProviderError> {
        self.package_filters.lock().push(filter.clone());
        self.check()?;
        Ok(self.packages.clone())
    }
}
