//! User interaction seam between the lifecycle manager and the front end
//!
//! The manager never prints or reads stdin itself. It reports progress and
//! hazards through `notify` and asks yes/no questions through `confirm`; the
//! CLI renders them on the terminal, tests script the answers.

/// Kind of message, used by front ends to pick a style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Regular progress information
    Info,
    /// Completed operation
    Success,
    /// Hazard or recoverable problem
    Warning,
    /// Failed operation
    Error,
    /// Low-importance detail (URLs, per-file decisions)
    Debug,
    /// Emphasized value such as a version or a path
    Note,
    /// File-level change marker (`[A]`, `[U]`)
    Highlight,
}

/// Front end used by the lifecycle manager
pub trait Interaction {
    /// Show a message to the user
    fn notify(&self, kind: MessageKind, message: &str);

    /// Ask a yes/no question; `false` unless the user explicitly agrees
    fn confirm(&self, question: &str) -> bool;
}

impl<T: Interaction + ?Sized> Interaction for &T {
    fn notify(&self, kind: MessageKind, message: &str) {
        (**self).notify(kind, message)
    }

    fn confirm(&self, question: &str) -> bool {
        (**self).confirm(question)
    }
}
