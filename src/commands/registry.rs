//! Command registry and dispatch.
//!
//! The `Registry` maps command names to entries, dispatches execution to their
//! handlers and keeps per-command usage counters. Lookups take the shared lock
//! only long enough to clone the entry out; no lock is held while a handler
//! runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use command_proto::{Origin, Pattern, Vars, bind_params, fold_name, parse_line};
use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{Instrument, debug};

use super::context::{DefaultRequest, RequestContext};
use super::entry::CommandEntry;
use crate::config::RegistryConfig;
use crate::error::{CommandError, HandlerResult};
use crate::telemetry::{CommandTimer, spans};

struct Slot {
    entry: Arc<CommandEntry>,
    /// Executions since this entry was added.
    calls: AtomicU64,
}

type Commands = HashMap<String, Arc<Slot>>;

/// A command line resolved against the registry.
#[derive(Debug, Clone)]
pub struct ParsedCommand {
    pub entry: Arc<CommandEntry>,
    /// Lookup name (case folded when the registry is case-insensitive).
    pub name: String,
    pub vars: Vars,
    pub payload: Bytes,
}

/// Registry of commands.
pub struct Registry {
    commands: RwLock<Commands>,
    config: RegistryConfig,
}

impl Registry {
    /// Empty registry with default naming rules.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            commands: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn key(&self, name: &str) -> String {
        fold_name(name, self.config.case).into_owned()
    }

    /// Register `entry`, replacing any entry with the same name wholesale.
    ///
    /// Fails with [`CommandError::EmptyName`] for an empty name when strict
    /// naming is on. Returns `self` so registrations can be chained.
    pub fn add(&self, entry: CommandEntry) -> Result<&Self, CommandError> {
        if entry.name.is_empty() && self.config.strict_names {
            return Err(CommandError::EmptyName);
        }

        let key = self.key(&entry.name);
        let slot = Arc::new(Slot {
            entry: Arc::new(entry),
            calls: AtomicU64::new(0),
        });
        let replaced = self.commands.write().insert(key.clone(), slot).is_some();
        debug!(command = %key, replaced, "Command registered");
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<CommandEntry>> {
        let key = fold_name(name, self.config.case);
        self.commands
            .read()
            .get(key.as_ref())
            .map(|slot| Arc::clone(&slot.entry))
    }

    /// Remove `name`. Absent names are a no-op.
    pub fn del(&self, name: &str) -> Option<Arc<CommandEntry>> {
        let key = fold_name(name, self.config.case);
        let removed = self.commands.write().remove(key.as_ref());
        if removed.is_some() {
            debug!(command = %key, "Command removed");
        }
        removed.map(|slot| Arc::clone(&slot.entry))
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Hold the shared lock for a full traversal.
    ///
    /// Writers block until the guard is dropped, so do not call [`add`] or
    /// [`del`] on the same registry while holding it.
    ///
    /// [`add`]: Registry::add
    /// [`del`]: Registry::del
    pub fn read(&self) -> RegistryReadGuard<'_> {
        RegistryReadGuard {
            commands: self.commands.read(),
        }
    }

    /// Visit every entry under the shared lock.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &CommandEntry),
    {
        for (name, entry) in self.read().iter() {
            f(name, entry);
        }
    }

    /// Report every executable command reachable from `mask`.
    ///
    /// Calls `f(name, pattern)` for each entry whose origin intersects `mask`
    /// and whose handler is set. Matches are collected first so `f` may
    /// register further commands.
    pub fn handle_commands<F>(&self, mask: Origin, mut f: F)
    where
        F: FnMut(&str, &Pattern),
    {
        let matches: Vec<(String, Arc<CommandEntry>)> = self
            .commands
            .read()
            .iter()
            .filter(|(_, slot)| slot.entry.origin.intersects(mask) && slot.entry.has_handler())
            .map(|(name, slot)| (name.clone(), Arc::clone(&slot.entry)))
            .collect();

        for (name, entry) in matches {
            f(&name, &entry.pattern);
        }
    }

    /// Execute `name` with `request`.
    ///
    /// Fails with [`CommandError::NotFound`] when the command is absent or has
    /// no handler; otherwise returns the handler's result verbatim.
    pub async fn exec(
        &self,
        name: &str,
        origin: Origin,
        request: &mut dyn RequestContext,
    ) -> HandlerResult {
        let key = self.key(name);
        let slot = self.commands.read().get(&key).cloned();

        let Some((slot, handler)) =
            slot.and_then(|slot| slot.entry.handler().cloned().map(|h| (slot, h)))
        else {
            crate::metrics::record_command_error("unknown", "not_found");
            debug!(command = %name, "Unknown command");
            return Err(CommandError::NotFound(name.to_string()));
        };

        slot.calls.fetch_add(1, Ordering::Relaxed);
        let _timer = CommandTimer::new(&key);

        let result = handler
            .handle(&slot.entry, origin, request)
            .instrument(spans::command(&key, origin))
            .await;

        if let Err(ref e) = result {
            crate::metrics::record_command_error(&key, e.error_code());
            debug!(command = %key, error = %e, "Command error");
        }

        result
    }

    /// Parse a command line and bind its parameters against the entry's
    /// pattern.
    ///
    /// An unknown name fails with [`CommandError::NotFound`] before any
    /// binding is attempted. Missing values bind to `""`.
    pub fn parse_command(&self, line: &[u8]) -> Result<ParsedCommand, CommandError> {
        let (name, raw) = parse_line(line);
        let key = self.key(&name);
        let entry = self
            .commands
            .read()
            .get(&key)
            .map(|slot| Arc::clone(&slot.entry))
            .ok_or_else(|| CommandError::NotFound(name.into_owned()))?;

        let bound = bind_params(raw, entry.params());
        Ok(ParsedCommand {
            entry,
            name: key,
            vars: bound.vars,
            payload: bound.payload,
        })
    }

    /// Parse `line` and execute it as a [`DefaultRequest`].
    ///
    /// A command whose origin mask does not intersect `origin` is not
    /// reachable from that transport and fails with `NotFound`.
    pub async fn dispatch_line(&self, line: &[u8], origin: Origin) -> HandlerResult {
        let parsed = self.parse_command(line)?;
        if !parsed.entry.origin.intersects(origin) {
            debug!(command = %parsed.name, %origin, "Command not offered on this origin");
            return Err(CommandError::NotFound(parsed.name));
        }

        let name = parsed.name.clone();
        let mut request = DefaultRequest::from(parsed);
        self.exec(&name, origin, &mut request).await
    }

    /// Command usage statistics, most used first. Unused commands are omitted.
    pub fn stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .commands
            .read()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.calls.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared-lock view over a [`Registry`].
pub struct RegistryReadGuard<'a> {
    commands: RwLockReadGuard<'a, Commands>,
}

impl RegistryReadGuard<'_> {
    /// Entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandEntry)> + '_ {
        self.commands
            .iter()
            .map(|(name, slot)| (name.as_str(), slot.entry.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
