//! Field tables from Triton records to EC2 records.
//!
//! Every mapping here is total: unknown states degrade to a sentinel value
//! instead of failing the whole list response.

use std::collections::BTreeMap;

use tritonshim_ec2_model::output::{Image, Instance, InstanceTypeInfo};
use tritonshim_ec2_model::types::{ImageState, InstanceState, Tag};
use tritonshim_triton::model::{self, Package, Vm, tag_value_string};

/// Reported for every instance; Triton does not expose paravirtual guests.
pub const VIRTUALIZATION_TYPE: &str = "hvm";

/// `creationDate` format: ISO-8601 with milliseconds, always UTC.
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Map a VMAPI VM state to an EC2 instance state.
#[must_use]
pub fn instance_state(state: &str) -> InstanceState {
    match state {
        "provisioning" => InstanceState::PENDING,
        "running" => InstanceState::RUNNING,
        "stopping" => InstanceState::STOPPING,
        "stopped" | "down" => InstanceState::STOPPED,
        "destroyed" | "failed" => InstanceState::TERMINATED,
        _ => InstanceState::INVALID,
    }
}

/// Map an IMGAPI image state to an EC2 image state.
#[must_use]
pub fn image_state(state: &str) -> ImageState {
    match state {
        "active" => ImageState::Available,
        "unactivated" | "creating" => ImageState::Pending,
        "disabled" => ImageState::Deregistered,
        "failed" => ImageState::Failed,
        _ => ImageState::Invalid,
    }
}

/// Convert a Triton tag map into a tag set ordered by key.
#[must_use]
pub fn tag_set(tags: &BTreeMap<String, serde_json::Value>) -> Vec<Tag> {
    tags.iter()
        .map(|(key, value)| Tag::new(key.as_str(), tag_value_string(value)))
        .collect()
}

/// Reservation id derived from the gateway request id, e.g. `r-1b4e28ba`.
#[must_use]
pub fn reservation_id(request_id: &str) -> String {
    let head = request_id.split('-').next().unwrap_or(request_id);
    format!("r-{head}")
}

/// Map a VM to an instance.
#[must_use]
pub fn instance_from_vm(vm: &Vm) -> Instance {
    Instance {
        instance_id: vm.uuid.clone(),
        image_id: vm.image.clone(),
        instance_type: vm.package.clone(),
        state: instance_state(&vm.state),
        private_ip_address: vm.primary_ip().map(str::to_owned),
        virtualization_type: VIRTUALIZATION_TYPE,
        tags: tag_set(&vm.tags),
    }
}

/// Map an image manifest to an image.
#[must_use]
pub fn image_from_manifest(image: &model::Image) -> Image {
    Image {
        image_id: image.id.clone(),
        state: image_state(&image.state),
        owner_id: image.owner.clone(),
        is_public: image.public,
        name: image.name.clone(),
        description: image.description.clone(),
        image_type: image.image_type.clone(),
        creation_date: image
            .published_at
            .map(|at| at.format(CREATION_DATE_FORMAT).to_string()),
        tags: tag_set(&image.tags),
    }
}

/// Map a package to an instance type.
#[must_use]
pub fn instance_type_from_package(package: &Package) -> InstanceTypeInfo {
    InstanceTypeInfo {
        instance_type: package.name.clone(),
        memory_size_in_mib: package.memory,
        default_vcpus: (package.vcpus > 0).then_some(package.vcpus),
        total_storage_in_gb: (package.quota > 0).then(|| package.quota.div_ceil(1024)),
    }
}
