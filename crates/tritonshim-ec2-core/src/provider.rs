//! EC2 provider answering the supported `Describe*` actions from Triton.

use std::sync::Arc;

use tritonshim_core::TenantContext;
use tritonshim_ec2_model::Ec2Error;
use tritonshim_ec2_model::input::{
    DescribeImagesInput, DescribeInstanceTypesInput, DescribeInstancesInput, OWNER_SELF,
};
use tritonshim_ec2_model::output::{
    DescribeImagesOutput, DescribeInstanceTypesOutput, DescribeInstancesOutput, Reservation,
};
use tritonshim_triton::{ComputeClient, ImageFilter, PackageFilter, VmFilter};

use crate::error::provider_error_to_ec2;
use crate::mapping::{
    image_from_manifest, instance_from_vm, instance_type_from_package, reservation_id,
};

/// Translates EC2 actions into [`ComputeClient`] queries.
///
/// Stateless apart from the shared client; every call is scoped to the
/// tenant in its [`TenantContext`].
#[derive(Debug)]
pub struct TritonEc2Provider {
    client: Arc<dyn ComputeClient>,
}

impl TritonEc2Provider {
    /// Create a provider on top of `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ComputeClient>) -> Self {
        Self { client }
    }

    /// `DescribeInstances`: the tenant's VMs, in a single reservation.
    ///
    /// No reservation is emitted when nothing matched.
    pub async fn handle_describe_instances(
        &self,
        ctx: &TenantContext,
        input: DescribeInstancesInput,
    ) -> Result<DescribeInstancesOutput, Ec2Error> {
        let filter = VmFilter {
            uuids: input.instance_ids,
            owner_uuid: Some(ctx.account.to_string()),
        };
        let vms = self
            .client
            .list_instances(ctx, &filter)
            .await
            .map_err(|e| provider_error_to_ec2("VMAPI", e))?;
        tracing::debug!(request_id = %ctx.request_id, count = vms.len(), "loaded VMs");

        let instances: Vec<_> = vms.iter().map(instance_from_vm).collect();
        if instances.is_empty() {
            return Ok(DescribeInstancesOutput::default());
        }
        Ok(DescribeInstancesOutput {
            reservations: vec![Reservation {
                reservation_id: reservation_id(&ctx.request_id),
                owner_id: ctx.account.to_string(),
                instances,
            }],
        })
    }

    /// `DescribeImages`: images visible to the tenant.
    ///
    /// An image is visible when it is public or owned by the tenant. `Owner.N`
    /// (`self` meaning the tenant) and `ImageId.N` narrow that set further.
    pub async fn handle_describe_images(
        &self,
        ctx: &TenantContext,
        input: DescribeImagesInput,
    ) -> Result<DescribeImagesOutput, Ec2Error> {
        let tenant = ctx.account.as_str();
        let owners: Vec<&str> = input
            .owners
            .iter()
            .map(|o| if o == OWNER_SELF { tenant } else { o.as_str() })
            .collect();

        // IMGAPI filters on a single owner only.
        let filter = ImageFilter {
            owner: match owners.as_slice() {
                [single] => Some((*single).to_owned()),
                _ => None,
            },
        };
        let manifests = self
            .client
            .list_images(ctx, &filter)
            .await
            .map_err(|e| provider_error_to_ec2("IMGAPI", e))?;
        tracing::debug!(request_id = %ctx.request_id, count = manifests.len(), "loaded images");

        let images = manifests
            .iter()
            .filter(|img| img.public || img.owner == tenant)
            .filter(|img| owners.is_empty() || owners.contains(&img.owner.as_str()))
            .filter(|img| input.image_ids.is_empty() || input.image_ids.contains(&img.id))
            .map(image_from_manifest)
            .collect();
        Ok(DescribeImagesOutput { images })
    }

    /// `DescribeInstanceTypes`: PAPI packages, optionally by name.
    pub async fn handle_describe_instance_types(
        &self,
        ctx: &TenantContext,
        input: DescribeInstanceTypesInput,
    ) -> Result<DescribeInstanceTypesOutput, Ec2Error> {
        let filter = PackageFilter {
            names: input.instance_types,
        };
        let packages = self
            .client
            .list_instance_types(ctx, &filter)
            .await
            .map_err(|e| provider_error_to_ec2("PAPI", e))?;
        tracing::debug!(request_id = %ctx.request_id, count = packages.len(), "loaded packages");

        Ok(DescribeInstanceTypesOutput {
            instance_types: packages.iter().map(instance_type_from_package).collect(),
        })
    }
}
