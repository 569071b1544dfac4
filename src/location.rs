//! Source locations, including eval-wrapper decoding.

use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::host::Host;
use crate::view::ViewOptions;

static EVAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<path>.+)\((?P<line>[0-9]+)\) : eval\(\)'d code").unwrap()
});

/// A (file, line) pair, with the outer line of an eval wrapper when the
/// code was running inside `eval()`.
///
/// Equality and hashing cover `(file, line)` only; the eval line is display
/// metadata, not identity.
#[derive(Debug, Clone, Eq)]
pub struct Location {
    pub file: String,
    pub line: Option<u32>,
    pub eval_line: Option<u32>,
}

impl Location {
    /// Build a location from raw file/line data.
    ///
    /// A file string in the runtime's eval-wrapper form
    /// (`<path>(<n>) : eval()'d code`) is unwrapped: the stored file is
    /// `<path>`, the stored line is `<n>`, and the incoming line becomes the
    /// eval line. Backslash separators are normalised to `/`.
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        let mut file = file.into();
        let mut line = line;
        let mut eval_line = None;

        if let Some(captures) = EVAL_REGEX.captures(&file) {
            let path = captures["path"].to_string();
            let inner: u32 = captures["line"].parse().unwrap_or(0);
            eval_line = line;
            line = Some(inner);
            file = path;
        }

        Location {
            file: file.replace('\\', "/"),
            line,
            eval_line,
        }
    }

    pub fn equals(&self, other: Option<&Location>) -> bool {
        match other {
            Some(other) => self == other,
            None => false,
        }
    }

    /// Display form of the file path.
    ///
    /// Falls back to a package-relative form for paths outside the configured
    /// root that the resolver left untouched.
    pub fn pretty_file(&self, options: &ViewOptions, host: &Host) -> String {
        let path = host.paths.prettify(&self.file);

        if path == self.file {
            if let Some(root) = &options.root_path {
                if !path.starts_with(root.as_str()) {
                    if let Some(package) = host.paths.package_path(&path) {
                        return package;
                    }
                }
            }
        }

        path
    }

    pub fn render(&self, options: &ViewOptions, host: &Host) -> String {
        let mut output = self.pretty_file(options, host);

        if let Some(line) = self.line {
            output.push(':');
            output.push_str(&line.to_string());
        }

        if let Some(eval_line) = self.eval_line {
            output.push_str(&format!(" [eval:{}]", eval_line));
        }

        output
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file && self.line == other.line
    }
}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file.hash(state);
        self.line.hash(state);
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.render(&ViewOptions::default(), &Host::default())
        )
    }
}
