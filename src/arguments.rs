//! Captured argument lists: naming, export and redaction.

use crate::host::Host;
use crate::identifier::{ClassIdentifier, FunctionIdentifier};
use crate::value::Value;
use crate::view::ViewOptions;

/// Replacement token for redacted values.
pub const SENSITIVE_PLACEHOLDER: &str = "*sensitive*";

/// How argument lists are rendered in frame output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgumentFormat {
    /// `(...N)` or `()`.
    #[default]
    Count,
    /// Parenthesised, comma-joined value exports.
    InlineValues,
    /// One value per line, prefixed by its key.
    NamedValues,
}

/// Position or resolved parameter name of one argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgumentKey {
    Index(usize),
    Name(String),
}

impl std::fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentKey::Index(index) => write!(f, "arg#{}", index),
            ArgumentKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Ordered argument values, keyed by position or by resolved parameter name.
///
/// Iteration order always matches the original call order; parameter-name
/// resolution rekeys entries without resorting them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentList {
    entries: Vec<(ArgumentKey, Value)>,
}

impl ArgumentList {
    pub fn empty() -> Self {
        ArgumentList::default()
    }

    /// Positional values with no owning function: all keys stay indices.
    pub fn positional(values: Vec<Value>) -> Self {
        ArgumentList {
            entries: values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (ArgumentKey::Index(index), value))
                .collect(),
        }
    }

    /// Build from positional values, rekeying every index the reflector can
    /// resolve to a declared parameter name of the owning function.
    pub fn resolved(values: Vec<Value>, function: &FunctionIdentifier, host: &Host) -> Self {
        let names = parameter_names_for(function, host);

        ArgumentList {
            entries: values
                .into_iter()
                .enumerate()
                .map(|(index, value)| {
                    let key = match names.as_ref().and_then(|names| names.get(index)) {
                        Some(name) => ArgumentKey::Name(name.clone()),
                        None => ArgumentKey::Index(index),
                    };
                    (key, value)
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ArgumentKey, Value)> {
        self.entries.iter()
    }

    pub fn render(&self, options: &ViewOptions, host: &Host) -> String {
        self.render_with_gutter(options, host, options.gutter)
    }

    pub(crate) fn render_with_gutter(
        &self,
        options: &ViewOptions,
        host: &Host,
        gutter: usize,
    ) -> String {
        match options.argument_format {
            ArgumentFormat::Count => self.render_count(),
            ArgumentFormat::InlineValues => self.render_inline(options, host),
            ArgumentFormat::NamedValues => self.render_named(options, host, gutter),
        }
    }

    fn render_count(&self) -> String {
        if self.entries.is_empty() {
            "()".to_string()
        } else {
            format!("(...{})", self.entries.len())
        }
    }

    fn render_inline(&self, options: &ViewOptions, host: &Host) -> String {
        let exports: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| export_value(key, value, options, host))
            .collect();

        format!("({})", exports.join(", "))
    }

    fn render_named(&self, options: &ViewOptions, host: &Host, gutter: usize) -> String {
        if self.entries.is_empty() {
            return "()".to_string();
        }

        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| format!("{}: {}", key, export_value(key, value, options, host)))
            .collect();

        if lines.len() == 1 && options.collapse_single_line_arguments {
            return format!("({})", lines[0]);
        }

        let inner_pad = " ".repeat(gutter + 4);
        let close_pad = " ".repeat(gutter);

        format!(
            "(\n{}{}\n{})",
            inner_pad,
            lines.join(&format!("\n{}", inner_pad)),
            close_pad
        )
    }

    /// JSON export: scalar values pass through natively, everything else is
    /// exported as its display string. Redaction applies here too.
    pub fn to_json(&self, options: &ViewOptions, host: &Host) -> serde_json::Map<String, serde_json::Value> {
        let mut output = serde_json::Map::new();

        for (key, value) in &self.entries {
            let exported = if options.redacts(key, value) {
                serde_json::Value::String(SENSITIVE_PLACEHOLDER.to_string())
            } else {
                match value {
                    Value::Null => serde_json::Value::Null,
                    Value::Bool(b) => serde_json::Value::Bool(*b),
                    Value::Int(i) => serde_json::Value::from(*i),
                    Value::Float(f) => serde_json::Value::from(*f),
                    _ => serde_json::Value::String(export_value(key, value, options, host)),
                }
            };

            output.insert(key.to_string(), exported);
        }

        output
    }
}

fn parameter_names_for(function: &FunctionIdentifier, host: &Host) -> Option<Vec<String>> {
    match function {
        FunctionIdentifier::GlobalFunction { name } => {
            host.reflector.parameter_names(None, name)
        }
        FunctionIdentifier::NamespaceFunction { namespace, name } => {
            host.reflector.parameter_names(Some(namespace), name)
        }
        FunctionIdentifier::ObjectMethod { class, name }
        | FunctionIdentifier::StaticMethod { class, name } => match class {
            ClassIdentifier::Native { name: class_name } => {
                host.reflector.method_parameter_names(class_name, name)
            }
            ClassIdentifier::Anonymous { .. } => None,
        },
        FunctionIdentifier::AnonymousFunction { .. } => None,
    }
}

/// Export one value as display text.
///
/// The rules are total: every value lands in a branch, with the runtime type
/// name as the last resort, so rendering never fails on malformed data.
pub fn export_value(key: &ArgumentKey, value: &Value, options: &ViewOptions, host: &Host) -> String {
    if options.redacts(key, value) {
        return SENSITIVE_PLACEHOLDER.to_string();
    }

    match value {
        Value::String(s) => {
            let length = s.chars().count();

            if length > options.max_string_length {
                let prefix: String = s.chars().take(options.max_string_length).collect();
                format!("'{}...'[{}]", prefix, length)
            } else {
                format!("'{}'", s)
            }
        }
        Value::Array(items) => format!("array({})", items.len()),
        Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Value::Object { class } => {
            let identifier = ClassIdentifier::from_class_string(class);
            format!("object({})", identifier.render(options, host))
        }
        Value::Resource { kind } => format!("{{resource {}}}", kind),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Null => "null".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Opaque(type_name) => type_name.clone(),
    }
}
