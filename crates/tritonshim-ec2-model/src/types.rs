//! Shared EC2 value types.

/// A key/value tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// `instanceState` of an instance. `code` is absent for unknown states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceState {
    /// Numeric EC2 state code.
    pub code: Option<u16>,
    /// State name.
    pub name: &'static str,
}

impl InstanceState {
    /// `0 pending`.
    pub const PENDING: Self = Self::known(0, "pending");
    /// `16 running`.
    pub const RUNNING: Self = Self::known(16, "running");
    /// `48 terminated`.
    pub const TERMINATED: Self = Self::known(48, "terminated");
    /// `64 stopping`.
    pub const STOPPING: Self = Self::known(64, "stopping");
    /// `80 stopped`.
    pub const STOPPED: Self = Self::known(80, "stopped");
    /// Sentinel for states with no EC2 counterpart.
    pub const INVALID: Self = Self {
        code: None,
        name: "invalid",
    };

    const fn known(code: u16, name: &'static str) -> Self {
        Self {
            code: Some(code),
            name,
        }
    }
}

/// `imageState` of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageState {
    /// Ready for use.
    Available,
    /// Not yet usable.
    Pending,
    /// Withdrawn.
    Deregistered,
    /// Creation failed.
    Failed,
    /// Sentinel for states with no EC2 counterpart.
    Invalid,
}

impl ImageState {
    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Deregistered => "deregistered",
            Self::Failed => "failed",
            Self::Invalid => "invalid",
        }
    }
}
