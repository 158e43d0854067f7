//! Wire types returned by the Triton internal APIs.
//!
//! Only the fields the shim reads are modelled; everything else in the JSON
//! is ignored. Most fields default so that sparse records still decode.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A network interface of a VM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Nic {
    /// IPv4 address.
    #[serde(default)]
    pub ip: String,
    /// MAC address.
    #[serde(default)]
    pub mac: String,
    /// Whether this is the primary interface.
    #[serde(default)]
    pub primary: bool,
    /// Network UUID.
    #[serde(default, rename = "network_uuid")]
    pub network: String,
}

/// A VMAPI virtual machine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Vm {
    /// VM UUID.
    pub uuid: String,
    /// Human alias.
    #[serde(default)]
    pub alias: Option<String>,
    /// Zone brand (`joyent`, `kvm`, `bhyve`, ...).
    #[serde(default)]
    pub brand: String,
    /// Lifecycle state.
    #[serde(default)]
    pub state: String,
    /// Image the VM was provisioned from.
    #[serde(default, rename = "image_uuid")]
    pub image: String,
    /// Package the VM was provisioned with.
    #[serde(default, rename = "billing_id")]
    pub package: String,
    /// Memory in MiB.
    #[serde(default)]
    pub ram: u64,
    /// Disk quota in GiB.
    #[serde(default)]
    pub quota: u64,
    /// Owner account UUID.
    #[serde(default, rename = "owner_uuid")]
    pub owner: String,
    /// User tags. Values may be any JSON scalar.
    #[serde(default)]
    pub tags: BTreeMap<String, serde_json::Value>,
    /// Network interfaces.
    #[serde(default)]
    pub nics: Vec<Nic>,
}

impl Vm {
    /// Address of the primary NIC, falling back to the first one.
    #[must_use]
    pub fn primary_ip(&self) -> Option<&str> {
        self.nics
            .iter()
            .find(|nic| nic.primary)
            .or_else(|| self.nics.first())
            .map(|nic| nic.ip.as_str())
            .filter(|ip| !ip.is_empty())
    }
}

/// An IMGAPI image manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Image {
    /// Image UUID.
    pub id: String,
    /// Image name.
    #[serde(default)]
    pub name: String,
    /// Operating system.
    #[serde(default)]
    pub os: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Image version string.
    #[serde(default)]
    pub version: String,
    /// Image type (`zone-dataset`, `zvol`, ...).
    #[serde(default, rename = "type")]
    pub image_type: String,
    /// Publication time.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Owner account UUID.
    #[serde(default)]
    pub owner: String,
    /// Whether the image is public.
    #[serde(default)]
    pub public: bool,
    /// Lifecycle state.
    #[serde(default)]
    pub state: String,
    /// Tags. Values may be any JSON scalar.
    #[serde(default)]
    pub tags: BTreeMap<String, serde_json::Value>,
}

/// A PAPI package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Package {
    /// Package UUID.
    pub uuid: String,
    /// Package name.
    pub name: String,
    /// Memory in MiB.
    #[serde(default, rename = "max_physical_memory")]
    pub memory: u64,
    /// Disk quota in MiB.
    #[serde(default)]
    pub quota: u64,
    /// vCPU count; `0` when the package does not cap it.
    #[serde(default)]
    pub vcpus: u32,
    /// Whether the package can be provisioned.
    #[serde(default)]
    pub active: bool,
}

/// An access key as reported by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessKeyRecord {
    /// Key id.
    #[serde(rename = "accesskeyid")]
    pub access_key_id: String,
    /// Secret.
    #[serde(rename = "accesskeysecret")]
    pub secret: String,
    /// Key status; missing means active.
    #[serde(default)]
    pub status: Option<String>,
}

/// Render a tag value as the string EC2 expects.
#[must_use]
pub fn tag_value_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
