//! Trace assembly and trace-level rendering.

use crate::anchor::Anchor;
use crate::arguments::ArgumentList;
use crate::error::TraceError;
use crate::frame::Frame;
use crate::host::Host;
use crate::identifier::{ClassIdentifier, FunctionIdentifier};
use crate::location::Location;
use crate::raw::{RawError, RawFrame};
use crate::value::Value;
use crate::view::ViewOptions;

/// File-path suffix identifying transparent facade-proxy shim records, which
/// add no diagnostic value and are dropped before assembly.
pub const FACADE_PROXY_SUFFIX: &str = "Veneer/ProxyTrait.php";

/// Implemented by error types that already carry an assembled trace, so
/// embedders can reuse it instead of re-assembling from raw records.
pub trait PreparedTrace {
    fn stack_trace(&self) -> &Trace;

    fn stack_frame(&self) -> Option<&Frame> {
        self.stack_trace().first_frame()
    }
}

/// An ordered, immutable, non-empty sequence of reconstructed frames.
///
/// Traces are shared snapshots: once constructed they never change, so any
/// number of concurrent render or serialise calls observe the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    frames: Vec<Frame>,
}

impl Trace {
    /// Build directly from reconstructed frames. Fails on empty input.
    pub fn new(frames: Vec<Frame>) -> Result<Trace, TraceError> {
        if frames.is_empty() {
            return Err(TraceError::EmptyTrace);
        }

        Ok(Trace { frames })
    }

    /// Assemble a trace from an ordered raw backtrace.
    ///
    /// Proxy-shim records are removed first, as if they never existed. Each
    /// remaining record's raw file/line is the call site of its own function;
    /// the previous record's raw file/line becomes this record's defined
    /// location (the innermost record uses its own). When an anchor is given
    /// it gates once: frames are dropped from the front until the anchor
    /// first accepts, then everything is kept.
    pub fn from_backtrace(
        records: &[RawFrame],
        anchor: Option<&dyn Anchor>,
        host: &Host,
    ) -> Result<Trace, TraceError> {
        let records: Vec<&RawFrame> = records
            .iter()
            .filter(|record| !is_proxy_record(record))
            .collect();

        let mut last_call: (Option<String>, Option<u32>) = records
            .first()
            .map(|record| (record.file.clone(), record.line))
            .unwrap_or((None, None));

        let mut frames = Vec::new();
        let mut anchored = anchor.is_none();

        for (index, record) in records.iter().enumerate() {
            let mut relabeled = (*record).clone();
            relabeled.call_file = record.file.clone();
            relabeled.call_line = record.line;
            relabeled.file = last_call.0.clone();
            relabeled.line = last_call.1;

            let frame = Frame::from_record(&relabeled, host)?;
            last_call = (record.file.clone(), record.line);

            if !anchored {
                match anchor {
                    Some(anchor) if anchor.accepts(index, &frame) => anchored = true,
                    _ => continue,
                }
            }

            frames.push(frame);
        }

        Trace::new(frames)
    }

    /// Assemble from a raised-error object, prepending a synthetic frame for
    /// the error's own construction at its recorded origin.
    pub fn from_error(
        error: &RawError,
        anchor: Option<&dyn Anchor>,
        host: &Host,
    ) -> Result<Trace, TraceError> {
        let mut frames = match Trace::from_backtrace(&error.trace, anchor, host) {
            Ok(trace) => trace.frames,
            // An error raised at top-level scope has no trace of its own;
            // the synthetic construction frame still satisfies non-emptiness.
            Err(TraceError::EmptyTrace) if error.trace.is_empty() => Vec::new(),
            Err(err) => return Err(err),
        };

        let function = FunctionIdentifier::object_method(
            ClassIdentifier::from_class_string(&error.class),
            "__construct",
        );

        let cause = match &error.cause {
            Some(cause) => Value::object(cause.class.clone()),
            None => Value::Null,
        };

        let arguments = ArgumentList::resolved(
            vec![
                Value::string(error.message.clone()),
                Value::Int(error.code),
                cause,
            ],
            &function,
            host,
        );

        let call_site = match (&error.file, error.line) {
            (Some(file), Some(line)) => Some(Location::new(file.clone(), Some(line))),
            _ => None,
        };

        frames.insert(0, Frame::new(function, arguments, call_site, None));

        Trace::new(frames)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Traces are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// The first frame's defined location.
    pub fn location(&self) -> Option<&Location> {
        self.first_frame().and_then(|frame| frame.location.as_ref())
    }

    /// Always fails: traces cannot be changed after construction, so shared
    /// readers observe a constant value.
    pub fn set_frame(&mut self, _index: usize, _frame: Frame) -> Result<(), TraceError> {
        Err(TraceError::ImmutableTrace)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Render all visible frames as text.
    ///
    /// Each frame is prefixed with a right-aligned descending index and
    /// followed by a blank line. Runs of filtered-out frames collapse into a
    /// single `[N hidden]` placeholder; the first frame is never hidden.
    pub fn render(&self, options: &ViewOptions, host: &Host) -> String {
        let pad = (self.frames.len() + 1).to_string().len();
        let gutter = pad + 2;

        let mut output = String::new();
        let mut hidden = 0usize;

        for (position, frame) in self.frames.iter().enumerate() {
            let index = self.frames.len() - position;

            if position > 0 && !options.visible(frame) {
                hidden += 1;
                continue;
            }

            if hidden > 0 {
                output.push_str(&format!("{:>pad$}  [{} hidden]\n\n", "", hidden));
                hidden = 0;
            }

            output.push_str(&format!(
                "{:>pad$}: {}\n\n",
                index,
                frame.render_with_gutter(options, host, gutter)
            ));
        }

        if hidden > 0 {
            output.push_str(&format!("{:>pad$}  [{} hidden]\n\n", "", hidden));
        }

        output
    }
}

impl std::ops::Index<usize> for Trace {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        &self.frames[index]
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

fn is_proxy_record(record: &RawFrame) -> bool {
    record
        .file
        .as_deref()
        .is_some_and(|file| file.ends_with(FACADE_PROXY_SUFFIX))
}
