//! Rendering and serialisation configuration.

use std::sync::Arc;

use crate::arguments::{ArgumentFormat, ArgumentKey};
use crate::error::TraceError;
use crate::filter::Filter;
use crate::frame::Frame;
use crate::value::Value;

/// Redaction predicate over an argument key and value.
pub type RedactFn = Arc<dyn Fn(&ArgumentKey, &Value) -> bool + Send + Sync>;

const MIN_STRING_LENGTH: usize = 1;
const MAX_STRING_LENGTH: usize = 100;

/// Configuration for rendering and serialising traces.
///
/// Filters compose by logical AND: a frame is visible iff every configured
/// filter accepts it. The gutter is computed by the trace renderer from the
/// frame-index column width; the field value only applies when frames are
/// rendered standalone.
pub struct ViewOptions {
    pub filters: Vec<Box<dyn Filter>>,
    pub argument_format: ArgumentFormat,
    pub max_string_length: usize,
    pub redact: Option<RedactFn>,
    pub root_path: Option<String>,
    pub gutter: usize,
    pub collapse_single_line_arguments: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        ViewOptions {
            filters: Vec::new(),
            argument_format: ArgumentFormat::Count,
            max_string_length: 64,
            redact: None,
            root_path: None,
            gutter: 0,
            collapse_single_line_arguments: true,
        }
    }
}

impl ViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_argument_format(mut self, format: ArgumentFormat) -> Self {
        self.argument_format = format;
        self
    }

    /// Maximum exported string length, accepted in `[1, 100]`.
    pub fn with_max_string_length(mut self, length: usize) -> Result<Self, TraceError> {
        if !(MIN_STRING_LENGTH..=MAX_STRING_LENGTH).contains(&length) {
            return Err(TraceError::invalid_configuration(format!(
                "max string length must be between {} and {}, got {}",
                MIN_STRING_LENGTH, MAX_STRING_LENGTH, length
            )));
        }

        self.max_string_length = length;
        Ok(self)
    }

    pub fn with_redact(mut self, redact: RedactFn) -> Self {
        self.redact = Some(redact);
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn without_argument_collapse(mut self) -> Self {
        self.collapse_single_line_arguments = false;
        self
    }

    /// Whether every configured filter accepts the frame.
    pub fn visible(&self, frame: &Frame) -> bool {
        self.filters.iter().all(|filter| filter.accepts(frame))
    }

    pub fn redacts(&self, key: &ArgumentKey, value: &Value) -> bool {
        match &self.redact {
            Some(redact) => redact(key, value),
            None => false,
        }
    }
}

impl std::fmt::Debug for ViewOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewOptions")
            .field("filters", &self.filters.len())
            .field("argument_format", &self.argument_format)
            .field("max_string_length", &self.max_string_length)
            .field("redact", &self.redact.is_some())
            .field("root_path", &self.root_path)
            .field("gutter", &self.gutter)
            .field(
                "collapse_single_line_arguments",
                &self.collapse_single_line_arguments,
            )
            .finish()
    }
}
