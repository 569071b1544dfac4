//! Stable JSON documents for assembled traces.
//!
//! The document shape is versioned by a schema tag so downstream consumers
//! can diff and evolve against it.

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::host::Host;
use crate::identifier::FunctionIdentifier;
use crate::location::Location;
use crate::trace::Trace;
use crate::view::ViewOptions;

/// Schema identifier stamped on every serialised trace.
pub const TRACE_SCHEMA: &str = "remnant.trace@1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDocument {
    pub schema: String,
    pub frames: Vec<FrameDocument>,
}

/// One serialised frame.
///
/// `function` is either a bare name string (global functions) or a
/// structured object for the other identifier variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDocument {
    pub function: serde_json::Value,
    pub internal: bool,
    pub arguments: serde_json::Map<String, serde_json::Value>,
    pub call_site: Option<LocationDocument>,
    pub location: Option<LocationDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDocument {
    pub file: String,
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval: Option<u32>,
}

impl TraceDocument {
    pub fn from_trace(trace: &Trace, options: &ViewOptions, host: &Host) -> Self {
        TraceDocument {
            schema: TRACE_SCHEMA.to_string(),
            frames: trace
                .iter()
                .map(|frame| FrameDocument::from_frame(frame, options, host))
                .collect(),
        }
    }
}

impl FrameDocument {
    pub fn from_frame(frame: &Frame, options: &ViewOptions, host: &Host) -> Self {
        FrameDocument {
            function: function_to_json(&frame.function, options, host),
            internal: frame.function.is_internal(host),
            arguments: frame.arguments.to_json(options, host),
            call_site: frame
                .call_site
                .as_ref()
                .map(|location| LocationDocument::from_location(location, options, host)),
            location: frame
                .location
                .as_ref()
                .map(|location| LocationDocument::from_location(location, options, host)),
        }
    }
}

impl LocationDocument {
    pub fn from_location(location: &Location, options: &ViewOptions, host: &Host) -> Self {
        LocationDocument {
            file: location.pretty_file(options, host),
            line: location.line,
            eval: location.eval_line,
        }
    }
}

fn function_to_json(
    function: &FunctionIdentifier,
    options: &ViewOptions,
    host: &Host,
) -> serde_json::Value {
    match function {
        FunctionIdentifier::GlobalFunction { name } => serde_json::Value::String(name.clone()),
        FunctionIdentifier::NamespaceFunction { namespace, name } => serde_json::json!({
            "namespace": namespace,
            "name": name,
        }),
        FunctionIdentifier::ObjectMethod { class, name } => serde_json::json!({
            "class": class.render(options, host),
            "name": name,
            "separator": "->",
        }),
        FunctionIdentifier::StaticMethod { class, name } => serde_json::json!({
            "class": class.render(options, host),
            "name": name,
            "separator": "::",
        }),
        FunctionIdentifier::AnonymousFunction { location } => serde_json::json!({
            "closure": location.as_ref().map(|location| {
                let mut display = location.pretty_file(options, host);

                if let Some(line) = location.line {
                    display.push(':');
                    display.push_str(&line.to_string());
                }

                display
            }),
        }),
    }
}

/// Reconstruct the text renderer's function string from a serialised frame.
pub fn function_display(frame: &FrameDocument) -> String {
    match &frame.function {
        serde_json::Value::String(name) => {
            if frame.internal {
                format!("[internal] {}", name)
            } else {
                name.clone()
            }
        }
        serde_json::Value::Object(fields) => {
            if let Some(closure) = fields.get("closure") {
                return match closure.as_str() {
                    Some(location) => format!("{{closure:{}}}", location),
                    None => "{closure}".to_string(),
                };
            }

            let name = fields
                .get("name")
                .and_then(|name| name.as_str())
                .unwrap_or_default();

            if let Some(class) = fields.get("class").and_then(|class| class.as_str()) {
                let separator = fields
                    .get("separator")
                    .and_then(|separator| separator.as_str())
                    .unwrap_or("->");
                format!("{}{}{}", class, separator, name)
            } else if let Some(namespace) =
                fields.get("namespace").and_then(|namespace| namespace.as_str())
            {
                format!("{}\\{}", namespace, name)
            } else {
                name.to_string()
            }
        }
        _ => String::new(),
    }
}

impl Trace {
    /// Serialise to the `remnant.trace@1` JSON document.
    pub fn to_json(&self, options: &ViewOptions, host: &Host) -> serde_json::Value {
        serde_json::to_value(TraceDocument::from_trace(self, options, host))
            .unwrap_or(serde_json::Value::Null)
    }
}
