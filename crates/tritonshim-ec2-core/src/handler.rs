//! EC2 handler implementation bridging HTTP to the provider.

use std::sync::Arc;

use tritonshim_core::TenantContext;
use tritonshim_ec2_http::body::Ec2ResponseBody;
use tritonshim_ec2_http::dispatch::{Ec2Handler, HandlerFuture};
use tritonshim_ec2_http::response::xml_response;
use tritonshim_ec2_model::input::{
    DescribeImagesInput, DescribeInstanceTypesInput, DescribeInstancesInput,
};
use tritonshim_ec2_model::params::FromParams;
use tritonshim_ec2_model::{Ec2Error, Ec2Operation, Ec2Params};
use tritonshim_ec2_xml::{Ec2Serialize, to_xml};

use crate::error::xml_error_to_ec2;
use crate::provider::TritonEc2Provider;

/// Handler that bridges the HTTP layer to the [`TritonEc2Provider`].
#[derive(Debug)]
pub struct TritonEc2Handler {
    provider: Arc<TritonEc2Provider>,
}

impl TritonEc2Handler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<TritonEc2Provider>) -> Self {
        Self { provider }
    }
}

impl Ec2Handler for TritonEc2Handler {
    fn handle_operation(
        &self,
        op: Ec2Operation,
        params: Ec2Params,
        ctx: TenantContext,
    ) -> HandlerFuture {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), op, &params, &ctx).await })
    }
}

/// Dispatch an EC2 operation to the matching provider method.
async fn dispatch(
    provider: &TritonEc2Provider,
    op: Ec2Operation,
    params: &Ec2Params,
    ctx: &TenantContext,
) -> Result<http::Response<Ec2ResponseBody>, Ec2Error> {
    match op {
        Ec2Operation::DescribeInstances => {
            let input = DescribeInstancesInput::from_params(params)?;
            let output = provider.handle_describe_instances(ctx, input).await?;
            serialize(op, &output, ctx)
        }
        Ec2Operation::DescribeImages => {
            let input = DescribeImagesInput::from_params(params)?;
            let output = provider.handle_describe_images(ctx, input).await?;
            serialize(op, &output, ctx)
        }
        Ec2Operation::DescribeInstanceTypes => {
            let input = DescribeInstanceTypesInput::from_params(params)?;
            let output = provider.handle_describe_instance_types(ctx, input).await?;
            serialize(op, &output, ctx)
        }
    }
}

/// Serialize an output record into an XML HTTP response.
fn serialize<T: Ec2Serialize>(
    op: Ec2Operation,
    output: &T,
    ctx: &TenantContext,
) -> Result<http::Response<Ec2ResponseBody>, Ec2Error> {
    let xml = to_xml(&op.response_element(), &ctx.request_id, output).map_err(xml_error_to_ec2)?;
    Ok(xml_response(xml, &ctx.request_id))
}
