//! Command registry and handler plumbing.
//!
//! - [`CommandEntry`]: name, origin mask, parameter pattern, docs and handler
//! - [`CommandHandler`]: the async handler capability (plus [`handler_fn`])
//! - [`RequestContext`]: what a handler may ask of the inbound request
//! - [`Registry`]: concurrent name → entry map with dispatch

mod context;
mod entry;
mod handler;
mod registry;

pub use context::{AsAny, DefaultRequest, RequestContext};
pub use entry::CommandEntry;
pub use handler::{CommandHandler, FnHandler, handler_fn};
pub use registry::{ParsedCommand, Registry, RegistryReadGuard};
