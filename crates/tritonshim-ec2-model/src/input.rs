//! Request inputs for the supported actions.

use crate::error::Ec2Error;
use crate::params::{Ec2Params, FromParams};

/// Owner alias meaning "the calling account".
pub const OWNER_SELF: &str = "self";

/// Input for `DescribeInstances`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeInstancesInput {
    /// `InstanceId.N`: restrict to these instances.
    pub instance_ids: Vec<String>,
}

impl FromParams for DescribeInstancesInput {
    fn from_params(params: &Ec2Params) -> Result<Self, Ec2Error> {
        Ok(Self {
            instance_ids: params.list("InstanceId")?,
        })
    }
}

/// Input for `DescribeImages`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeImagesInput {
    /// `ImageId.N`: restrict to these images.
    pub image_ids: Vec<String>,
    /// `Owner.N`: owner account ids, or `self`.
    pub owners: Vec<String>,
}

impl FromParams for DescribeImagesInput {
    fn from_params(params: &Ec2Params) -> Result<Self, Ec2Error> {
        Ok(Self {
            image_ids: params.list("ImageId")?,
            owners: params.list("Owner")?,
        })
    }
}

/// Input for `DescribeInstanceTypes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeInstanceTypesInput {
    /// `InstanceType.N`: restrict to these type (package) names.
    pub instance_types: Vec<String>,
}

impl FromParams for DescribeInstanceTypesInput {
    fn from_params(params: &Ec2Params) -> Result<Self, Ec2Error> {
        Ok(Self {
            instance_types: params.list("InstanceType")?,
        })
    }
}
