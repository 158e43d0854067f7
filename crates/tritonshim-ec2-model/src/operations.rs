//! EC2 operation enum.

use std::fmt;

/// All EC2 actions the shim answers. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ec2Operation {
    /// List instances (Triton VMs).
    DescribeInstances,
    /// List machine images (Triton images).
    DescribeImages,
    /// List instance types (Triton packages).
    DescribeInstanceTypes,
}

impl Ec2Operation {
    /// Every supported operation.
    pub const ALL: [Self; 3] = [
        Self::DescribeInstances,
        Self::DescribeImages,
        Self::DescribeInstanceTypes,
    ];

    /// Returns the EC2 action name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DescribeInstances => "DescribeInstances",
            Self::DescribeImages => "DescribeImages",
            Self::DescribeInstanceTypes => "DescribeInstanceTypes",
        }
    }

    /// Parse an action name. Matching is exact and case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DescribeInstances" => Some(Self::DescribeInstances),
            "DescribeImages" => Some(Self::DescribeImages),
            "DescribeInstanceTypes" => Some(Self::DescribeInstanceTypes),
            _ => None,
        }
    }

    /// Root element of the success response, e.g. `DescribeImagesResponse`.
    #[must_use]
    pub fn response_element(&self) -> String {
        format!("{}Response", self.as_str())
    }
}

impl fmt::Display for Ec2Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_every_operation_name() {
        for op in Ec2Operation::ALL {
            assert_eq!(Ec2Operation::from_name(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_should_not_match_unsupported_or_miscased_actions() {
        assert_eq!(Ec2Operation::from_name("DescribeRegions"), None);
        assert_eq!(Ec2Operation::from_name("describeinstances"), None);
        assert_eq!(Ec2Operation::from_name(""), None);
    }

    #[test]
    fn test_should_name_response_element() {
        assert_eq!(
            Ec2Operation::DescribeInstances.response_element(),
            "DescribeInstancesResponse"
        );
    }
}
