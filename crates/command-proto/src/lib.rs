//! # command-proto
//!
//! Wire-level building blocks for slash-delimited command dispatch.
//!
//! ## Features
//!
//! - Placeholder pattern compilation (`{a}/{b}` → `["a", "b"]`)
//! - Command line parsing into a name and a raw parameter tail
//! - Positional parameter binding where the last slot swallows the rest
//! - Origin masks naming the transport kinds a command accepts
//! - JSON broadcast envelopes (`{command, data, err}`)
//! - Optional Tokio line codec for newline-delimited transports
//!
//! This crate holds no shared state; registries and subscription indices live
//! in `command-hub`.

#![deny(clippy::all)]
#![warn(missing_docs)]

//! ## Quick Start
//!
//! ```rust
//! use command_proto::{bind_params, parse_line, Pattern};
//!
//! let pattern = Pattern::new("{a}/{b}");
//! let (name, raw) = parse_line(b"cmd/x/y/extra/more");
//! let bound = bind_params(raw, pattern.names());
//!
//! assert_eq!(name, "cmd");
//! assert_eq!(bound.vars["a"], "x");
//! assert_eq!(bound.vars["b"], "y");
//! assert_eq!(&bound.payload[..], b"extra/more");
//! ```

pub mod casemap;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod envelope;
pub mod error;
pub mod line;
pub mod origin;
pub mod pattern;

pub use self::casemap::{fold_name, CaseMode};
#[cfg(feature = "tokio")]
pub use self::codec::LineCodec;
pub use self::envelope::Envelope;
pub use self::error::{ProtocolError, Result};
pub use self::line::{bind_params, parse_line, Bound, Vars, PARAM_SEPARATOR};
pub use self::origin::Origin;
pub use self::pattern::{compile, Pattern};
