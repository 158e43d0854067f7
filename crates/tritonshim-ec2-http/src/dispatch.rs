//! EC2 handler trait and operation dispatch.

use std::future::Future;
use std::pin::Pin;

use tritonshim_core::TenantContext;
use tritonshim_ec2_model::{Ec2Error, Ec2Operation, Ec2Params};

use crate::body::Ec2ResponseBody;

/// Future returned by [`Ec2Handler::handle_operation`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<Ec2ResponseBody>, Ec2Error>> + Send>>;

/// Trait that the resource translator must implement.
///
/// The handler receives an authenticated request: the resolved operation, its
/// decoded parameters and the tenant it is served for. It returns a complete
/// HTTP response.
pub trait Ec2Handler: Send + Sync + 'static {
    /// Handle an EC2 operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: Ec2Operation,
        params: Ec2Params,
        ctx: TenantContext,
    ) -> HandlerFuture;
}

/// Dispatch an EC2 operation to the handler.
pub async fn dispatch_operation<H: Ec2Handler + ?Sized>(
    handler: &H,
    op: Ec2Operation,
    params: Ec2Params,
    ctx: TenantContext,
) -> Result<http::Response<Ec2ResponseBody>, Ec2Error> {
    tracing::debug!(operation = %op, request_id = %ctx.request_id, "dispatching EC2 operation");
    handler.handle_operation(op, params, ctx).await
}
