//! Mirror events and the sinks that consume them.
//!
//! Passes never format or print anything themselves: every filesystem
//! mutation is described by an [`EventMirror`] handed to a [`SinkMirrorEvent`].

use std::fmt;
use std::path::PathBuf;

/// One action taken (or declined) by a mirror pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventMirror {
    /// A source file was copied to, or overwrote, its destination mirror.
    FileCopied {
        source: PathBuf,
        destination: PathBuf,
    },
    /// An orphan destination file was removed.
    FileDeleted { path: PathBuf },
    /// An orphan destination directory was removed.
    DirectoryDeleted { path: PathBuf },
    /// An orphan destination directory was kept because it is not empty.
    DirectoryRetained { path: PathBuf },
}

impl EventMirror {
    /// Whether the event should be surfaced as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::DirectoryRetained { .. })
    }
}

impl fmt::Display for EventMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileCopied {
                source,
                destination,
            } => write!(
                f,
                "File '{}' was copied to '{}'",
                source.display(),
                destination.display()
            ),
            Self::FileDeleted { path } => write!(f, "File {} was deleted", path.display()),
            Self::DirectoryDeleted { path } => {
                write!(f, "Directory {} was deleted", path.display())
            }
            Self::DirectoryRetained { path } => {
                write!(f, "Directory {} was retained (not empty)", path.display())
            }
        }
    }
}

/// Receiver of mirror events.
pub trait SinkMirrorEvent {
    fn emit(&mut self, event: EventMirror);
}

/// Forward events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkTracing;

impl SinkMirrorEvent for SinkTracing {
    fn emit(&mut self, event: EventMirror) {
        if event.is_warning() {
            tracing::warn!("{event}");
        } else {
            tracing::info!("{event}");
        }
    }
}

/// Drop every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkDiscard;

impl SinkMirrorEvent for SinkDiscard {
    fn emit(&mut self, _event: EventMirror) {}
}

impl SinkMirrorEvent for Vec<EventMirror> {
    fn emit(&mut self, event: EventMirror) {
        self.push(event);
    }
}

impl<F> SinkMirrorEvent for F
where
    F: FnMut(EventMirror),
{
    fn emit(&mut self, event: EventMirror) {
        self(event);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{EventMirror, SinkMirrorEvent};

    #[test]
    fn event_lines_match_log_format() {
        let event = EventMirror::FileCopied {
            source: PathBuf::from("h1/test.txt"),
            destination: PathBuf::from("h2/test.txt"),
        };
        assert_eq!(
            event.to_string(),
            "File 'h1/test.txt' was copied to 'h2/test.txt'"
        );
        assert_eq!(
            EventMirror::FileDeleted {
                path: PathBuf::from("h2/test2.txt")
            }
            .to_string(),
            "File h2/test2.txt was deleted"
        );
        assert_eq!(
            EventMirror::DirectoryDeleted {
                path: PathBuf::from("h2/sub")
            }
            .to_string(),
            "Directory h2/sub was deleted"
        );
        let retained = EventMirror::DirectoryRetained {
            path: PathBuf::from("h2/keep"),
        };
        assert!(retained.is_warning());
        assert_eq!(
            retained.to_string(),
            "Directory h2/keep was retained (not empty)"
        );
    }

    #[test]
    fn closure_and_vec_sinks_collect_events() {
        let mut lines = Vec::new();
        {
            let mut sink = |event: EventMirror| lines.push(event.to_string());
            sink.emit(EventMirror::FileDeleted {
                path: PathBuf::from("a"),
            });
        }
        assert_eq!(lines, vec!["File a was deleted".to_string()]);

        let mut events: Vec<EventMirror> = Vec::new();
        events.emit(EventMirror::DirectoryDeleted {
            path: PathBuf::from("b"),
        });
        assert_eq!(events.len(), 1);
    }
}
