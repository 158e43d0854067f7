//! Response records for the supported actions.
//!
//! These are projections built fresh for one response and dropped after
//! serialization.

use crate::types::{ImageState, InstanceState, Tag};

/// Output of `DescribeInstances`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeInstancesOutput {
    /// Reservations; empty when no instance matched.
    pub reservations: Vec<Reservation>,
}

/// A group of instances launched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Reservation id.
    pub reservation_id: String,
    /// Owning account.
    pub owner_id: String,
    /// Instances in the reservation.
    pub instances: Vec<Instance>,
}

/// One instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Instance id (VM UUID).
    pub instance_id: String,
    /// Image the instance was created from.
    pub image_id: String,
    /// Instance type (package id).
    pub instance_type: String,
    /// Lifecycle state.
    pub state: InstanceState,
    /// Address of the primary NIC.
    pub private_ip_address: Option<String>,
    /// Always `hvm`.
    pub virtualization_type: &'static str,
    /// Tags sorted by key.
    pub tags: Vec<Tag>,
}

/// Output of `DescribeImages`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeImagesOutput {
    /// Matching images.
    pub images: Vec<Image>,
}

/// One machine image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image id (UUID).
    pub image_id: String,
    /// State, see [`ImageState`].
    pub state: ImageState,
    /// Owning account.
    pub owner_id: String,
    /// Whether the image is public.
    pub is_public: bool,
    /// Image name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Image type (`zone-dataset`, `zvol`, ...).
    pub image_type: String,
    /// Publication time, ISO 8601 with milliseconds.
    pub creation_date: Option<String>,
    /// Tags sorted by key.
    pub tags: Vec<Tag>,
}

/// Output of `DescribeInstanceTypes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeInstanceTypesOutput {
    /// Matching instance types.
    pub instance_types: Vec<InstanceTypeInfo>,
}

/// One instance type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTypeInfo {
    /// Type name (package name).
    pub instance_type: String,
    /// Memory in MiB.
    pub memory_size_in_mib: u64,
    /// Default vCPU count, when the package caps it.
    pub default_vcpus: Option<u32>,
    /// Local storage in GB, when the package has a quota.
    pub total_storage_in_gb: Option<u64>,
}
