//! Frame reconstruction: one raw record in, one typed frame out.

use crate::arguments::ArgumentList;
use crate::error::TraceError;
use crate::filter::VENDOR_PATH_MARKER;
use crate::host::Host;
use crate::identifier::{
    ClassIdentifier, FunctionIdentifier, CLOSURE_MARKER, NAMESPACE_SEPARATOR,
};
use crate::location::Location;
use crate::raw::RawFrame;
use crate::value::Value;
use crate::view::ViewOptions;

/// Sentinel used when a record carries no function name.
const CLOSURE_SENTINEL: &str = "{closure}";

/// A function or class identifier, for heterogeneous match lists.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    Function(FunctionIdentifier),
    Class(ClassIdentifier),
}

impl From<FunctionIdentifier> for Identifier {
    fn from(value: FunctionIdentifier) -> Self {
        Identifier::Function(value)
    }
}

impl From<ClassIdentifier> for Identifier {
    fn from(value: ClassIdentifier) -> Self {
        Identifier::Class(value)
    }
}

/// One reconstructed call-stack entry.
///
/// `call_site` is where the function was invoked from; `location` is where
/// the function's own code was executing when the stack was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub function: FunctionIdentifier,
    pub arguments: ArgumentList,
    pub call_site: Option<Location>,
    pub location: Option<Location>,
}

impl Frame {
    pub fn new(
        function: FunctionIdentifier,
        arguments: ArgumentList,
        call_site: Option<Location>,
        location: Option<Location>,
    ) -> Self {
        Frame {
            function,
            arguments,
            call_site,
            location,
        }
    }

    /// Reconstruct a frame from one raw record.
    ///
    /// Classification precedence: closure marker, then explicit call type
    /// (`::` static, `->` object), then namespace, then global. A method-type
    /// record without a resolvable class is malformed input and fails.
    pub fn from_record(record: &RawFrame, host: &Host) -> Result<Frame, TraceError> {
        let raw_name = record
            .function
            .clone()
            .unwrap_or_else(|| CLOSURE_SENTINEL.to_string());

        let class = record
            .class
            .as_deref()
            .map(ClassIdentifier::from_class_string);

        // Closures keep their full synthetic name; everything else may carry
        // a namespace prefix to split off.
        let is_closure = raw_name.starts_with(CLOSURE_MARKER);

        let (namespace, mut name) = if is_closure {
            (None, raw_name.clone())
        } else {
            match raw_name.rsplit_once(NAMESPACE_SEPARATOR) {
                Some((namespace, name)) => (Some(namespace.to_string()), name.to_string()),
                None => (None, raw_name.clone()),
            }
        };

        // Magic dispatch records the trampoline, not the target: the first
        // argument is the dynamically dispatched function name. With no
        // arguments the name degrades to empty (lossy, as captured).
        let mut args = record.args.clone();

        if name == "__call" || name == "__callStatic" {
            if args.is_empty() {
                log::debug!("magic dispatch frame without arguments, function name lost");
                name = String::new();
            } else {
                name = match args.remove(0) {
                    Value::String(real) => real,
                    _ => String::new(),
                };
            }
        }

        let function = if is_closure {
            FunctionIdentifier::closure_from_function_string(&raw_name, host)
        } else {
            match record.call_type.as_deref() {
                Some("::") => FunctionIdentifier::static_method(
                    class.clone().ok_or_else(|| {
                        TraceError::classification("class is required for static method")
                    })?,
                    name,
                ),
                Some("->") => FunctionIdentifier::object_method(
                    class.clone().ok_or_else(|| {
                        TraceError::classification("class is required for object method")
                    })?,
                    name,
                ),
                _ => match namespace {
                    Some(namespace) => FunctionIdentifier::namespaced(namespace, name),
                    None => FunctionIdentifier::global(name),
                },
            }
        };

        Ok(Frame {
            arguments: ArgumentList::resolved(args, &function, host),
            call_site: extract_location(record.call_file.as_deref(), record.call_line),
            location: extract_location(record.file.as_deref(), record.line),
            function,
        })
    }

    /// Whether any listed function identifier equals this frame's function,
    /// or any listed class identifier equals its class (method frames only).
    pub fn matches(&self, identifiers: &[Identifier]) -> bool {
        let class = self.function.class();

        identifiers.iter().any(|identifier| match identifier {
            Identifier::Function(function) => self.function.equals(function),
            Identifier::Class(other) => match class {
                Some(class) => class.equals(other),
                None => false,
            },
        })
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
        let location = self.call_site.as_ref().or(self.location.as_ref());

        let mut output = self.function.render(options, host);
        output.push_str(&self.arguments.render_with_gutter(options, host, gutter));

        if let Some(location) = location {
            let prefix = self.origin_prefix(location, options, host);

            output = format!(
                "{} {}\n{}{}",
                prefix,
                output,
                " ".repeat(gutter),
                location.render(options, host)
            );
        }

        output
    }

    // Origin precedence: runtime-internal, vendor code, outside the
    // configured root, application code.
    fn origin_prefix(&self, location: &Location, options: &ViewOptions, host: &Host) -> char {
        if self.function.is_internal(host) {
            '○'
        } else if location.file.contains(VENDOR_PATH_MARKER) {
            '◒'
        } else if options
            .root_path
            .as_deref()
            .is_some_and(|root| !location.file.starts_with(root))
        {
            '◐'
        } else {
            '●'
        }
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.render(&ViewOptions::default(), &Host::default())
        )
    }
}

fn extract_location(file: Option<&str>, line: Option<u32>) -> Option<Location> {
    match (file, line) {
        (Some(file), Some(line)) => Some(Location::new(file, Some(line))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method_record() -> RawFrame {
        RawFrame::new()
            .with_function("bar")
            .with_class("Foo")
            .with_call_type("->")
            .with_location("/app/a.php", 10)
            .with_call_site("/app/b.php", 20)
            .with_args(vec![Value::string("x")])
    }

    #[test]
    fn test_object_method_reconstruction() {
        let frame = Frame::from_record(&method_record(), &Host::default()).unwrap();

        assert!(frame.function.equals(&FunctionIdentifier::object_method(
            ClassIdentifier::native("Foo"),
            "bar"
        )));
        assert_eq!(frame.location, Some(Location::new("/app/a.php", Some(10))));
        assert_eq!(frame.call_site, Some(Location::new("/app/b.php", Some(20))));
        assert_eq!(frame.arguments.len(), 1);
    }

    #[test]
    fn test_method_without_class_fails() {
        let record = RawFrame::new().with_function("bar").with_call_type("->");
        let err = Frame::from_record(&record, &Host::default()).unwrap_err();
        assert!(matches!(err, TraceError::Classification { .. }));

        let record = RawFrame::new().with_function("bar").with_call_type("::");
        assert!(Frame::from_record(&record, &Host::default()).is_err());
    }

    #[test]
    fn test_missing_function_name_becomes_closure() {
        let frame = Frame::from_record(&RawFrame::new(), &Host::default()).unwrap();
        assert!(matches!(
            frame.function,
            FunctionIdentifier::AnonymousFunction { location: None }
        ));
    }

    #[test]
    fn test_namespace_split() {
        let record = RawFrame::new().with_function("App\\Util\\slugify");
        let frame = Frame::from_record(&record, &Host::default()).unwrap();

        assert!(frame
            .function
            .equals(&FunctionIdentifier::namespaced("App\\Util", "slugify")));
    }

    #[test]
    fn test_closure_name_not_namespace_split() {
        let record = RawFrame::new().with_function("{closure:/app/a.php:5}");
        let frame = Frame::from_record(&record, &Host::default()).unwrap();

        let FunctionIdentifier::AnonymousFunction { location } = &frame.function else {
            panic!("expected anonymous function");
        };
        assert_eq!(location.as_ref().unwrap().file, "/app/a.php");
    }

    #[test]
    fn test_magic_dispatch_shifts_first_argument() {
        let record = RawFrame::new()
            .with_function("__call")
            .with_class("Api")
            .with_call_type("->")
            .with_args(vec![Value::string("fetchUsers"), Value::Int(5)]);

        let frame = Frame::from_record(&record, &Host::default()).unwrap();
        assert_eq!(frame.function.name(), "fetchUsers");
        assert_eq!(frame.arguments.len(), 1);
    }

    #[test]
    fn test_magic_dispatch_without_args_is_lossy() {
        let record = RawFrame::new()
            .with_function("__callStatic")
            .with_class("Api")
            .with_call_type("::");

        let frame = Frame::from_record(&record, &Host::default()).unwrap();
        assert_eq!(frame.function.name(), "");
        assert!(frame.arguments.is_empty());
    }

    #[test]
    fn test_matches_by_function_and_class() {
        let frame = Frame::from_record(&method_record(), &Host::default()).unwrap();

        let exact = FunctionIdentifier::object_method(ClassIdentifier::native("Foo"), "bar");
        let unrelated = FunctionIdentifier::global("bar");

        assert!(frame.matches(&[exact.into()]));
        assert!(!frame.matches(&[unrelated.into()]));
        assert!(frame.matches(&[ClassIdentifier::native("Foo").into()]));
        assert!(!frame.matches(&[ClassIdentifier::native("Other").into()]));
    }

    #[test]
    fn test_class_match_meaningless_for_non_methods() {
        let record = RawFrame::new().with_function("main");
        let frame = Frame::from_record(&record, &Host::default()).unwrap();

        assert!(!frame.matches(&[ClassIdentifier::native("Foo").into()]));
    }

    #[test]
    fn test_render_application_frame() {
        let frame = Frame::from_record(&method_record(), &Host::default()).unwrap();
        let rendered = frame.render(&ViewOptions::default(), &Host::default());

        assert_eq!(rendered, "● Foo->bar(...1)\n/app/b.php:20");
    }

    #[test]
    fn test_render_prefix_precedence() {
        let options = ViewOptions::new().with_root_path("/app/");
        let host = Host::default();

        let vendor = Frame::from_record(
            &method_record().with_call_site("/app/vendor/pkg/a.php", 3),
            &host,
        )
        .unwrap();
        assert!(vendor.render(&options, &host).starts_with('◒'));

        let outside = Frame::from_record(
            &method_record().with_call_site("/usr/share/lib.php", 3),
            &host,
        )
        .unwrap();
        assert!(outside.render(&options, &host).starts_with('◐'));

        let internal = Frame::from_record(
            &RawFrame::new()
                .with_function("require")
                .with_call_site("/app/index.php", 1),
            &host,
        )
        .unwrap();
        assert!(internal.render(&options, &host).starts_with('○'));

        let app = Frame::from_record(&method_record(), &host).unwrap();
        assert!(app.render(&options, &host).starts_with('●'));
    }

    #[test]
    fn test_render_without_location_has_no_prefix() {
        let record = RawFrame::new().with_function("main");
        let frame = Frame::from_record(&record, &Host::default()).unwrap();

        assert_eq!(
            frame.render(&ViewOptions::default(), &Host::default()),
            "main()"
        );
    }
}
