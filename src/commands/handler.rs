//! Command handler capability.

use async_trait::async_trait;
use command_proto::Origin;

use super::context::RequestContext;
use super::entry::CommandEntry;
use crate::error::HandlerResult;

/// Handler invoked when a registered command executes.
///
/// Receives the entry it was registered under, the origin mask of the caller
/// and the transport's request context. The result is returned verbatim to
/// whoever called [`Registry::exec`](super::Registry::exec).
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        entry: &CommandEntry,
        origin: Origin,
        request: &mut dyn RequestContext,
    ) -> HandlerResult;
}

/// Adapter turning a synchronous closure into a [`CommandHandler`].
pub struct FnHandler<F>(F);

/// Wrap a closure as a command handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&CommandEntry, Origin, &mut dyn RequestContext) -> HandlerResult + Send + Sync,
{
    FnHandler(f)
}

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&CommandEntry, Origin, &mut dyn RequestContext) -> HandlerResult + Send + Sync,
{
    async fn handle(
        &self,
        entry: &CommandEntry,
        origin: Origin,
        request: &mut dyn RequestContext,
    ) -> HandlerResult {
        (self.0)(entry, origin, request)
    }
}
