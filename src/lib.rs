//! Remnant: typed reconstruction and rendering of raw backtraces.
//!
//! The host runtime's stack introspection emits weakly-typed records full of
//! overloaded string encodings: closures, anonymous classes, eval blocks and
//! magic dispatch trampolines. This crate classifies those records into a
//! strongly-typed, immutable trace model and renders it back out as
//! human-readable text or a stable, diffable JSON document.
//!
//! Pipeline: raw records → frame reconstruction → trace assembly (call-site
//! stitching, proxy skipping, anchor scan) → [`Trace`] → rendering (filters,
//! argument export, redaction) → text / JSON.
//!
//! Path prettification and reflection metadata are external concerns,
//! injected through the [`host`] collaborator traits so the engine itself
//! performs no I/O and stays deterministic on the same input.

pub mod anchor;
pub mod arguments;
pub mod error;
pub mod filter;
pub mod frame;
pub mod host;
pub mod identifier;
pub mod location;
pub mod raw;
pub mod serialize;
pub mod trace;
pub mod value;
pub mod view;

pub use crate::anchor::{Anchor, ClassAnchor, FunctionAnchor, Rewind};
pub use crate::arguments::{ArgumentFormat, ArgumentKey, ArgumentList};
pub use crate::error::TraceError;
pub use crate::filter::{
    ClassFilter, Filter, FunctionFilter, NamespaceFilter, PathsFilter, VendorFilter,
};
pub use crate::frame::{Frame, Identifier};
pub use crate::host::{Host, NoopPathResolver, NoopReflector, PathResolver, Reflector};
pub use crate::identifier::{ClassIdentifier, FunctionIdentifier};
pub use crate::location::Location;
pub use crate::raw::{RawError, RawFrame};
pub use crate::serialize::{FrameDocument, LocationDocument, TraceDocument, TRACE_SCHEMA};
pub use crate::trace::{PreparedTrace, Trace};
pub use crate::value::Value;
pub use crate::view::ViewOptions;
