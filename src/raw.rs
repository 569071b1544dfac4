//! Raw input records, as produced by the host runtime's stack introspection.
//!
//! These mirror the conventional `debug_backtrace()` / `Throwable::getTrace()`
//! shapes. They deserialise directly from the JSON form of that data; builder
//! methods cover in-process construction.

use serde::Deserialize;

use crate::value::Value;

/// One raw backtrace record.
///
/// `file`/`line` describe the record's defined location and
/// `call_file`/`call_line` its call site once trace assembly has relabeled
/// the sequence; raw captures only populate `file`/`line`. The `object`
/// receiver is accepted for shape fidelity but reflection flows through the
/// [`Reflector`](crate::host::Reflector) collaborator instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFrame {
    pub function: Option<String>,
    pub class: Option<String>,
    #[serde(rename = "type")]
    pub call_type: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    #[serde(rename = "callFile")]
    pub call_file: Option<String>,
    #[serde(rename = "callLine")]
    pub call_line: Option<u32>,
    #[serde(default)]
    pub args: Vec<Value>,
    pub object: Option<Value>,
}

impl RawFrame {
    pub fn new() -> Self {
        RawFrame::default()
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_call_type(mut self, call_type: impl Into<String>) -> Self {
        self.call_type = Some(call_type.into());
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_call_site(mut self, file: impl Into<String>, line: u32) -> Self {
        self.call_file = Some(file.into());
        self.call_line = Some(line);
        self
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

fn default_error_class() -> String {
    "Exception".to_string()
}

/// A raised-error object: message, code, origin and its captured trace.
#[derive(Debug, Clone, Deserialize)]
pub struct RawError {
    #[serde(default = "default_error_class")]
    pub class: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
    pub file: Option<String>,
    pub line: Option<u32>,
    #[serde(default)]
    pub trace: Vec<RawFrame>,
    pub cause: Option<Box<RawError>>,
}

impl RawError {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        RawError {
            class: class.into(),
            message: message.into(),
            code: 0,
            file: None,
            line: None,
            trace: Vec::new(),
            cause: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_trace(mut self, trace: Vec<RawFrame>) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_cause(mut self, cause: RawError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}
