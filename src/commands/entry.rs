//! Registered command metadata.

use std::fmt;
use std::sync::Arc;

use command_proto::{Origin, Pattern};

use super::handler::CommandHandler;

/// A registered command.
///
/// Built with [`CommandEntry::new`] and the `with_*` methods, then handed to
/// [`Registry::add`](super::Registry::add). The registry owns the entry from
/// then on; a later add under the same name replaces it wholesale.
#[derive(Clone)]
pub struct CommandEntry {
    /// Unique command name.
    pub name: String,
    /// Transports the command may be invoked from.
    pub origin: Origin,
    /// Positional parameter pattern, e.g. `{id}/{field}`.
    pub pattern: Pattern,
    pub description: String,
    /// Documentation of the returned value.
    pub returns: String,
    /// Documentation of the expected request payload.
    pub request: String,
    /// Documentation of the response payload.
    pub response: String,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl CommandEntry {
    /// Entry with no parameters, no docs and no handler.
    pub fn new(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            origin,
            pattern: Pattern::default(),
            description: String::new(),
            returns: String::new(),
            request: String::new(),
            response: String::new(),
            handler: None,
        }
    }

    pub fn with_params(mut self, pattern: impl Into<Pattern>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn with_returns(mut self, text: impl Into<String>) -> Self {
        self.returns = text.into();
        self
    }

    pub fn with_request(mut self, text: impl Into<String>) -> Self {
        self.request = text.into();
        self
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.response = text.into();
        self
    }

    /// Attach the handler invoked by [`Registry::exec`](super::Registry::exec).
    pub fn with_handler<H: CommandHandler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Attach a handler shared with other entries.
    pub fn with_shared_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn handler(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.handler.as_ref()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Ordered parameter names compiled from the pattern.
    pub fn params(&self) -> &[String] {
        self.pattern.names()
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("pattern", &self.pattern.as_str())
            .field("description", &self.description)
            .field("has_handler", &self.has_handler())
            .finish_non_exhaustive()
    }
}
