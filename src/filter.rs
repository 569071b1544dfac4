//! Filters: per-frame visibility predicates applied at render time.
//!
//! Filters are the inverse of anchors: they hide noise rather than find a
//! start point. A frame is visible iff every configured filter accepts it.

use crate::frame::Frame;
use crate::host::PathResolver;
use crate::identifier::{ClassIdentifier, FunctionIdentifier, NAMESPACE_SEPARATOR};

/// Path fragment marking third-party dependency code.
pub const VENDOR_PATH_MARKER: &str = "/vendor/";

pub trait Filter: Send + Sync {
    fn accepts(&self, frame: &Frame) -> bool;
}

/// Hides method frames of the listed classes.
#[derive(Debug, Clone)]
pub struct ClassFilter {
    pub identifiers: Vec<ClassIdentifier>,
}

impl ClassFilter {
    pub fn new(identifiers: Vec<ClassIdentifier>) -> Self {
        ClassFilter { identifiers }
    }
}

impl Filter for ClassFilter {
    fn accepts(&self, frame: &Frame) -> bool {
        let Some(class) = frame.function.class() else {
            return true;
        };

        !self
            .identifiers
            .iter()
            .any(|identifier| class.equals(identifier))
    }
}

/// Hides frames of the listed functions.
#[derive(Debug, Clone)]
pub struct FunctionFilter {
    pub identifiers: Vec<FunctionIdentifier>,
}

impl FunctionFilter {
    pub fn new(identifiers: Vec<FunctionIdentifier>) -> Self {
        FunctionFilter { identifiers }
    }
}

impl Filter for FunctionFilter {
    fn accepts(&self, frame: &Frame) -> bool {
        !self
            .identifiers
            .iter()
            .any(|identifier| frame.function.equals(identifier))
    }
}

/// Hides frames whose function namespace equals, or sits under, any listed
/// namespace. Frames with no namespace are always visible.
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    pub namespaces: Vec<String>,
}

impl NamespaceFilter {
    pub fn new(namespaces: Vec<String>) -> Self {
        NamespaceFilter { namespaces }
    }
}

impl Filter for NamespaceFilter {
    fn accepts(&self, frame: &Frame) -> bool {
        let Some(namespace) = frame.function.namespace() else {
            return true;
        };

        !self.namespaces.iter().any(|candidate| {
            namespace == candidate
                || namespace.starts_with(&format!("{}{}", candidate, NAMESPACE_SEPARATOR))
        })
    }
}

/// Hides frames called from under any of the configured path prefixes.
///
/// Prefixes are resolved to absolute form once, at construction.
#[derive(Debug, Clone)]
pub struct PathsFilter {
    pub paths: Vec<String>,
}

impl PathsFilter {
    pub fn new(paths: Vec<String>, resolver: &dyn PathResolver) -> Self {
        PathsFilter {
            paths: paths.iter().map(|path| resolver.resolve(path)).collect(),
        }
    }
}

impl Filter for PathsFilter {
    fn accepts(&self, frame: &Frame) -> bool {
        let Some(file) = frame.call_site.as_ref().map(|location| &location.file) else {
            return true;
        };

        !self.paths.iter().any(|path| file.starts_with(path.as_str()))
    }
}

/// Hides frames called from third-party dependency code.
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorFilter;

impl Filter for VendorFilter {
    fn accepts(&self, frame: &Frame) -> bool {
        match &frame.call_site {
            Some(location) => !location.file.contains(VENDOR_PATH_MARKER),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::ArgumentList;
    use crate::location::Location;

    fn frame_with_call_site(file: &str) -> Frame {
        Frame::new(
            FunctionIdentifier::global("main"),
            ArgumentList::empty(),
            Some(Location::new(file, Some(1))),
            None,
        )
    }

    fn method_frame(class: &str, name: &str) -> Frame {
        Frame::new(
            FunctionIdentifier::object_method(ClassIdentifier::native(class), name),
            ArgumentList::empty(),
            None,
            None,
        )
    }

    #[test]
    fn test_class_filter_rejects_matching() {
        let filter = ClassFilter::new(vec![ClassIdentifier::native("App\\Noise")]);

        assert!(!filter.accepts(&method_frame("App\\Noise", "emit")));
        assert!(filter.accepts(&method_frame("App\\Signal", "emit")));
        assert!(filter.accepts(&frame_with_call_site("/app/a.php")));
    }

    #[test]
    fn test_function_filter_rejects_matching() {
        let filter = FunctionFilter::new(vec![FunctionIdentifier::global("main")]);

        assert!(!filter.accepts(&frame_with_call_site("/app/a.php")));
        assert!(filter.accepts(&method_frame("Foo", "main")));
    }

    #[test]
    fn test_namespace_filter_matches_sub_namespaces() {
        let filter = NamespaceFilter::new(vec!["App\\Internal".to_string()]);

        let hidden = Frame::new(
            FunctionIdentifier::namespaced("App\\Internal", "boot"),
            ArgumentList::empty(),
            None,
            None,
        );
        let nested = Frame::new(
            FunctionIdentifier::namespaced("App\\Internal\\Deep", "boot"),
            ArgumentList::empty(),
            None,
            None,
        );
        let sibling = Frame::new(
            FunctionIdentifier::namespaced("App\\InternalTools", "boot"),
            ArgumentList::empty(),
            None,
            None,
        );

        assert!(!filter.accepts(&hidden));
        assert!(!filter.accepts(&nested));
        assert!(filter.accepts(&sibling));
        // Frames with no namespace are always visible
        assert!(filter.accepts(&frame_with_call_site("/app/a.php")));
    }

    #[test]
    fn test_namespace_filter_covers_method_classes() {
        let filter = NamespaceFilter::new(vec!["App\\Internal".to_string()]);

        assert!(!filter.accepts(&method_frame("App\\Internal\\Worker", "run")));
        assert!(filter.accepts(&method_frame("App\\Public\\Worker", "run")));
    }

    #[test]
    fn test_paths_filter() {
        let resolver = crate::host::NoopPathResolver;
        let filter = PathsFilter::new(vec!["/app/framework/".to_string()], &resolver);

        assert!(!filter.accepts(&frame_with_call_site("/app/framework/kernel.php")));
        assert!(filter.accepts(&frame_with_call_site("/app/src/kernel.php")));
        assert!(filter.accepts(&method_frame("Foo", "bar")));
    }

    #[test]
    fn test_vendor_filter() {
        let filter = VendorFilter;

        assert!(!filter.accepts(&frame_with_call_site("/app/vendor/pkg/a.php")));
        assert!(filter.accepts(&frame_with_call_site("/app/src/a.php")));
        assert!(filter.accepts(&method_frame("Foo", "bar")));
    }
}
