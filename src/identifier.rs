//! Class and function identifiers reconstructed from raw backtrace strings.
//!
//! The host runtime overloads plain strings to encode closures, anonymous
//! classes and eval blocks. The decoders here are boundary parsers: they
//! either match a documented synthetic-name pattern or yield nothing, never
//! an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::host::Host;
use crate::location::Location;
use crate::view::ViewOptions;

/// Prefix marking a synthetic closure function name.
pub const CLOSURE_MARKER: &str = "{closure";

/// Prefix marking a synthetic anonymous-class name.
pub const ANONYMOUS_CLASS_MARKER: &str = "class@anonymous";

/// Namespace separator in function and class names.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Control constructs the runtime reports as functions.
const INTERNAL_FUNCTIONS: &[&str] = &["eval", "require", "require_once", "include", "include_once"];

static ANONYMOUS_CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^class@anonymous(?P<file>.+):(?P<line>[0-9]+)(?P<tag>(0x|\$)[0-9a-f]+)$").unwrap()
});

static CLOSURE_FILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{closure:(?P<file>[^:]+):(?P<line>[0-9]+)(.+:(?P<final_line>[0-9]+))?\}$")
        .unwrap()
});

static CLOSURE_METHOD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\{closure:(?P<class>[a-zA-Z0-9_\\]+)::(?P<method>[a-zA-Z0-9_]+)\(\):(?P<line>[0-9]+)(.+:(?P<final_line>[0-9]+))?\}$",
    )
    .unwrap()
});

/// Identifies a class, either by name or by declaration site for anonymous
/// classes.
#[derive(Debug, Clone)]
pub enum ClassIdentifier {
    Native {
        name: String,
    },
    /// Parsed from `class@anonymous<file>:<line><tag>`. The instance tag is
    /// cosmetic; identity is the declaration location alone.
    Anonymous {
        location: Option<Location>,
        instance_tag: Option<String>,
    },
}

impl ClassIdentifier {
    pub fn native(name: impl Into<String>) -> Self {
        ClassIdentifier::Native { name: name.into() }
    }

    /// Resolve a raw class string, decoding the anonymous-class pattern when
    /// the marker is present.
    pub fn from_class_string(class: &str) -> Self {
        if !class.starts_with(ANONYMOUS_CLASS_MARKER) {
            return ClassIdentifier::Native {
                name: class.to_string(),
            };
        }

        match ANONYMOUS_CLASS_REGEX.captures(class) {
            Some(captures) => {
                let file = captures["file"].trim().to_string();
                let line: u32 = captures["line"].parse().unwrap_or(0);

                ClassIdentifier::Anonymous {
                    location: Some(Location::new(file, Some(line))),
                    instance_tag: Some(captures["tag"].to_string()),
                }
            }
            None => {
                log::debug!("unparseable anonymous class string: {}", class);

                ClassIdentifier::Anonymous {
                    location: None,
                    instance_tag: None,
                }
            }
        }
    }

    /// Display name: the class name, or `{anonymous}`.
    pub fn name(&self) -> &str {
        match self {
            ClassIdentifier::Native { name } => name,
            ClassIdentifier::Anonymous { .. } => "{anonymous}",
        }
    }

    /// Namespace portion of a native class name, if any.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            ClassIdentifier::Native { name } => {
                name.rsplit_once(NAMESPACE_SEPARATOR).map(|(ns, _)| ns)
            }
            ClassIdentifier::Anonymous { .. } => None,
        }
    }

    /// Identity comparison: native classes by exact name, anonymous classes
    /// by declaration location. Two location-less anonymous identifiers are
    /// never equal.
    pub fn equals(&self, other: &ClassIdentifier) -> bool {
        match (self, other) {
            (ClassIdentifier::Native { name: a }, ClassIdentifier::Native { name: b }) => a == b,
            (
                ClassIdentifier::Anonymous { location: a, .. },
                ClassIdentifier::Anonymous { location: b, .. },
            ) => match (a, b) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }

    pub fn render(&self, options: &ViewOptions, host: &Host) -> String {
        match self {
            ClassIdentifier::Native { name } => name.clone(),
            ClassIdentifier::Anonymous { location, .. } => match location {
                Some(location) => {
                    let mut output = format!("{{anonymous:{}", location.pretty_file(options, host));

                    if let Some(line) = location.line {
                        output.push(':');
                        output.push_str(&line.to_string());
                    }

                    output.push('}');
                    output
                }
                None => "{anonymous}".to_string(),
            },
        }
    }
}

impl PartialEq for ClassIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Identifies a callable reconstructed from one raw record.
#[derive(Debug, Clone)]
pub enum FunctionIdentifier {
    GlobalFunction {
        name: String,
    },
    NamespaceFunction {
        namespace: String,
        name: String,
    },
    ObjectMethod {
        class: ClassIdentifier,
        name: String,
    },
    StaticMethod {
        class: ClassIdentifier,
        name: String,
    },
    /// A closure, identified by its declaration site when the synthetic name
    /// could be decoded.
    AnonymousFunction {
        location: Option<Location>,
    },
}

impl FunctionIdentifier {
    pub fn global(name: impl Into<String>) -> Self {
        FunctionIdentifier::GlobalFunction { name: name.into() }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        FunctionIdentifier::NamespaceFunction {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn object_method(class: ClassIdentifier, name: impl Into<String>) -> Self {
        FunctionIdentifier::ObjectMethod {
            class,
            name: name.into(),
        }
    }

    pub fn static_method(class: ClassIdentifier, name: impl Into<String>) -> Self {
        FunctionIdentifier::StaticMethod {
            class,
            name: name.into(),
        }
    }

    /// Decode a synthetic closure name into an anonymous-function identifier.
    pub fn closure_from_function_string(function: &str, host: &Host) -> Self {
        FunctionIdentifier::AnonymousFunction {
            location: decode_closure_location(function, host),
        }
    }

    /// Bare function or method name; `{closure}` for anonymous functions.
    pub fn name(&self) -> &str {
        match self {
            FunctionIdentifier::GlobalFunction { name }
            | FunctionIdentifier::NamespaceFunction { name, .. }
            | FunctionIdentifier::ObjectMethod { name, .. }
            | FunctionIdentifier::StaticMethod { name, .. } => name,
            FunctionIdentifier::AnonymousFunction { .. } => "{closure}",
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            FunctionIdentifier::NamespaceFunction { namespace, .. } => Some(namespace),
            FunctionIdentifier::ObjectMethod { class, .. }
            | FunctionIdentifier::StaticMethod { class, .. } => class.namespace(),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<&ClassIdentifier> {
        match self {
            FunctionIdentifier::ObjectMethod { class, .. }
            | FunctionIdentifier::StaticMethod { class, .. } => Some(class),
            _ => None,
        }
    }

    /// Call-site separator glyph for method variants.
    pub fn separator(&self) -> Option<&'static str> {
        match self {
            FunctionIdentifier::ObjectMethod { .. } => Some("->"),
            FunctionIdentifier::StaticMethod { .. } => Some("::"),
            _ => None,
        }
    }

    /// Whether the name matches any of the given function names. Always false
    /// for anonymous functions.
    pub fn is_function(&self, functions: &[&str]) -> bool {
        match self {
            FunctionIdentifier::AnonymousFunction { .. } => false,
            _ => functions.contains(&self.name()),
        }
    }

    /// Whether this is a runtime-builtin global function.
    pub fn is_internal(&self, host: &Host) -> bool {
        match self {
            FunctionIdentifier::GlobalFunction { name } => {
                INTERNAL_FUNCTIONS.contains(&name.as_str())
                    || host.reflector.is_internal_function(name)
            }
            _ => false,
        }
    }

    pub fn equals(&self, other: &FunctionIdentifier) -> bool {
        match (self, other) {
            (
                FunctionIdentifier::GlobalFunction { name: a },
                FunctionIdentifier::GlobalFunction { name: b },
            ) => a == b,
            (
                FunctionIdentifier::NamespaceFunction {
                    namespace: ns_a,
                    name: a,
                },
                FunctionIdentifier::NamespaceFunction {
                    namespace: ns_b,
                    name: b,
                },
            ) => ns_a == ns_b && a == b,
            (
                FunctionIdentifier::ObjectMethod { class: ca, name: a },
                FunctionIdentifier::ObjectMethod { class: cb, name: b },
            )
            | (
                FunctionIdentifier::StaticMethod { class: ca, name: a },
                FunctionIdentifier::StaticMethod { class: cb, name: b },
            ) => ca.equals(cb) && a == b,
            (
                FunctionIdentifier::AnonymousFunction { location: a },
                FunctionIdentifier::AnonymousFunction { location: b },
            ) => match (a, b) {
                (Some(a), Some(b)) => a == b,
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }

    pub fn render(&self, options: &ViewOptions, host: &Host) -> String {
        match self {
            FunctionIdentifier::GlobalFunction { name } => {
                if self.is_internal(host) {
                    format!("[internal] {}", name)
                } else {
                    name.clone()
                }
            }
            FunctionIdentifier::NamespaceFunction { namespace, name } => {
                format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name)
            }
            FunctionIdentifier::ObjectMethod { class, name } => {
                format!("{}->{}", class.render(options, host), name)
            }
            FunctionIdentifier::StaticMethod { class, name } => {
                format!("{}::{}", class.render(options, host), name)
            }
            FunctionIdentifier::AnonymousFunction { location } => match location {
                Some(location) => {
                    let mut output = format!("{{closure:{}", location.pretty_file(options, host));

                    if let Some(line) = location.line {
                        output.push(':');
                        output.push_str(&line.to_string());
                    }

                    output.push('}');
                    output
                }
                None => "{closure}".to_string(),
            },
        }
    }
}

impl PartialEq for FunctionIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Decode a synthetic closure name into its declaration location.
///
/// Two patterns, tried in order: a file-declared closure
/// (`{closure:<file>:<line>}`, optionally with a final line), then a
/// method-declared closure (`{closure:<Class>::<method>():<line>}`) whose
/// file is resolved through the reflector. Non-matches and failed reflection
/// yield `None`.
pub fn decode_closure_location(function: &str, host: &Host) -> Option<Location> {
    if let Some(captures) = CLOSURE_FILE_REGEX.captures(function) {
        let line = captures
            .name("final_line")
            .or_else(|| captures.name("line"))
            .and_then(|m| m.as_str().parse().ok());

        return Some(Location::new(captures["file"].to_string(), line));
    }

    if let Some(captures) = CLOSURE_METHOD_REGEX.captures(function) {
        let class = &captures["class"];
        let method = &captures["method"];

        let Some(file) = host.reflector.method_file(class, method) else {
            log::debug!(
                "no defining file for closure method {}::{}",
                class,
                method
            );
            return None;
        };

        let line = captures
            .name("final_line")
            .or_else(|| captures.name("line"))
            .and_then(|m| m.as_str().parse().ok());

        return Some(Location::new(file, line));
    }

    None
}
