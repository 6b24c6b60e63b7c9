//! Internal compiler errors.
//!
//! The pass only runs on trees that already parsed and type
//! checked, so every diagnostic it raises is a bug: the message is
//! rendered to stderr and the pass unwinds with an [`ExplicitBug`]
//! payload.

use std::{borrow::Cow, fmt, panic::panic_any};

use buggy::Bug;
use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFile,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use goflow_ast::Span;

/// The panic payload of an internal compiler error.
///
/// Drivers that run the pass under
/// [`catch_unwind`][std::panic::catch_unwind] can downcast the
/// payload to this type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExplicitBug {
    /// The diagnostic message
    pub message: String,
}

impl fmt::Display for ExplicitBug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal compiler error: {}", self.message)
    }
}

/// A diagnostic message.
pub(crate) type DiagMsg = Cow<'static, str>;

/// A bug diagnostic under construction.
#[must_use]
pub(crate) struct Diag<'a> {
    ctx: &'a DiagCtx,
    message: String,
    labels: Vec<Label<()>>,
    notes: Vec<String>,
}

impl<'a> Diag<'a> {
    fn new(ctx: &'a DiagCtx, msg: impl Into<DiagMsg>) -> Self {
        Self {
            ctx,
            message: msg.into().into_owned(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Adds spans to the diagnostic.
    pub fn with_span(mut self, span: impl Into<MultiSpan>) -> Self {
        let span = span.into();
        for primary in span.primary {
            self.labels.push(Label::primary((), primary.into_range()));
        }
        for (span, msg) in span.labels {
            self.labels
                .push(Label::secondary((), span.into_range()).with_message(msg));
        }
        self
    }

    /// Adds a note to the diagnostic.
    pub fn with_note(mut self, msg: impl Into<DiagMsg>) -> Self {
        self.notes.push(msg.into().into_owned());
        self
    }

    /// Emits the diagnostic and unwinds.
    pub fn emit(self) -> ! {
        let Self {
            ctx,
            message,
            labels,
            notes,
        } = self;
        ctx.render(
            Diagnostic::bug()
                .with_message(message.clone())
                .with_labels(labels)
                .with_notes(notes),
        );
        panic_any(ExplicitBug { message })
    }
}

impl fmt::Debug for Diag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diag")
            .field("message", &self.message)
            .field("labels", &self.labels.len())
            .field("notes", &self.notes)
            .finish()
    }
}

/// Diagnostic context.
#[derive(Clone, Debug)]
pub(crate) struct DiagCtx {
    file: Option<SimpleFile<Cow<'static, str>, String>>,
}

impl DiagCtx {
    /// Creates a diagnostic context that renders spans against
    /// `src`.
    pub fn new(path: &str, src: &str) -> Self {
        Self {
            file: Some(SimpleFile::new(fix_path(path.to_string()), src.to_string())),
        }
    }

    /// Creates a diagnostic context without source text. Spans
    /// are dropped when rendering.
    pub fn detached() -> Self {
        Self { file: None }
    }

    fn render(&self, mut diag: Diagnostic<()>) {
        let detached;
        let file = match &self.file {
            Some(file) => file,
            None => {
                diag.labels.clear();
                detached = SimpleFile::new(Cow::Borrowed("<unknown>"), String::new());
                &detached
            }
        };

        let writer = StandardStream::stderr(ColorChoice::Auto);
        let mut stderr = writer.lock();

        let mut config = term::Config::default();
        config.styles.header_bug.set_intense(true);
        config.styles.line_number.set_intense(true);
        config.styles.note_bullet.set_intense(true);
        config.styles.primary_label_bug.set_intense(true);
        config.styles.secondary_label.set_intense(true);
        config.styles.source_border.set_intense(true);
        let _ = term::emit(&mut stderr, &config, file, &diag);
    }

    fn create_bug(&self, msg: impl Into<DiagMsg>) -> Diag<'_> {
        Diag::new(self, msg)
    }

    /// Emits an ICE diagnostic.
    pub fn emit_bug(&self, msg: impl Into<DiagMsg>) -> ! {
        self.create_bug(msg).emit()
    }

    /// Emits an ICE diagnostic.
    pub fn emit_span_bug(&self, span: impl Into<MultiSpan>, msg: impl Into<DiagMsg>) -> ! {
        self.create_bug(msg).with_span(span).emit()
    }

    /// Emits an ICE diagnostic for a [`Bug`].
    pub fn emit_bug_diag(&self, bug: Bug) -> ! {
        self.create_bug(bug.msg())
            .with_note(bug.to_string())
            .emit()
    }
}

fn fix_path(path: String) -> Cow<'static, str> {
    if path == "-" {
        if cfg!(unix) {
            Cow::Borrowed("/dev/stdin")
        } else {
            Cow::Borrowed("stdin")
        }
    } else {
        Cow::Owned(path)
    }
}

/// A collection of spans.
#[derive(Clone, Default, Debug)]
pub(crate) struct MultiSpan {
    primary: Vec<Span>,
    labels: Vec<(Span, DiagMsg)>,
}

impl MultiSpan {
    /// Creates a collection of spans from a single primary span.
    pub fn from_span(span: Span) -> Self {
        Self {
            primary: vec![span],
            labels: Vec::new(),
        }
    }

    /// Adds a label to the collection of spans.
    pub fn push_label(&mut self, span: Span, msg: impl Into<DiagMsg>) {
        self.labels.push((span, msg.into()));
    }
}

impl From<Span> for MultiSpan {
    fn from(span: Span) -> Self {
        Self::from_span(span)
    }
}

/// Unwraps values that are guaranteed to be present, raising an
/// ICE otherwise.
pub(crate) trait OptionExt<T> {
    /// Returns the contained value or emits an ICE with `msg`.
    fn unwrap_or_bug(self, dcx: &DiagCtx, msg: impl Into<DiagMsg>) -> T;
}

impl<T> OptionExt<T> for Option<T> {
    #[track_caller]
    fn unwrap_or_bug(self, dcx: &DiagCtx, msg: impl Into<DiagMsg>) -> T {
        match self {
            Some(v) => v,
            None => dcx.emit_bug(msg),
        }
    }
}

/// Raises an ICE for a [`Bug`] error.
pub(crate) trait ResultExt<T> {
    /// Returns the contained value or emits the bug as an ICE.
    fn unwrap_or_bug(self, dcx: &DiagCtx) -> T;
}

impl<T> ResultExt<T> for Result<T, Bug> {
    #[track_caller]
    fn unwrap_or_bug(self, dcx: &DiagCtx) -> T {
        match self {
            Ok(v) => v,
            Err(bug) => dcx.emit_bug_diag(bug),
        }
    }
}
