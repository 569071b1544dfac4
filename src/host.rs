//! Collaborator interfaces queried during reconstruction and rendering.
//!
//! The engine itself performs no I/O. Path prettification and reflection
//! metadata come from the embedding runtime through these traits.
//! Implementations must be side-effect-free and idempotent.

use std::sync::Arc;

/// Resolves raw file paths into display and absolute forms.
pub trait PathResolver: Send + Sync {
    /// Display form of a path, e.g. with the project root collapsed.
    fn prettify(&self, path: &str) -> String {
        path.to_string()
    }

    /// Absolute form of a configured path prefix. Queried once per prefix at
    /// filter construction.
    fn resolve(&self, path: &str) -> String {
        path.to_string()
    }

    /// Package-relative display fallback (`@pkg:<name>/<rest>`) for paths
    /// outside the project root, if the resolver can determine one.
    fn package_path(&self, _path: &str) -> Option<String> {
        None
    }
}

/// Supplies reflection metadata about functions and methods.
pub trait Reflector: Send + Sync {
    /// Ordered parameter names for a function, keyed the way the runtime
    /// declares them. `None` when the function cannot be reflected.
    fn parameter_names(&self, _namespace: Option<&str>, _name: &str) -> Option<Vec<String>> {
        None
    }

    /// Ordered parameter names for a class method.
    fn method_parameter_names(&self, _class: &str, _method: &str) -> Option<Vec<String>> {
        None
    }

    /// Whether a global function is a runtime builtin.
    fn is_internal_function(&self, _name: &str) -> bool {
        false
    }

    /// Defining file of a class method, used to locate closures declared in
    /// first-class-callable position.
    fn method_file(&self, _class: &str, _method: &str) -> Option<String> {
        None
    }
}

/// No-op resolver: paths pass through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPathResolver;

impl PathResolver for NoopPathResolver {}

/// No-op reflector: no metadata available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReflector;

impl Reflector for NoopReflector {}

/// The pair of collaborators threaded through reconstruction and rendering.
#[derive(Clone)]
pub struct Host {
    pub paths: Arc<dyn PathResolver>,
    pub reflector: Arc<dyn Reflector>,
}

impl Host {
    pub fn new(paths: Arc<dyn PathResolver>, reflector: Arc<dyn Reflector>) -> Self {
        Host { paths, reflector }
    }
}

impl Default for Host {
    fn default() -> Self {
        Host {
            paths: Arc::new(NoopPathResolver),
            reflector: Arc::new(NoopReflector),
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
