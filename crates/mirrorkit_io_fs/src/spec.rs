//! Mirror job, option models and top-level error types.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// What to do with an orphan directory that could not be removed because it
/// still holds entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumDirRetainedMode {
    /// Leave the directory in place without reporting it.
    #[default]
    Ignore,
    /// Leave the directory in place and emit a warning.
    Warn,
}

/// Pattern matching mode for exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region JobAndOptions

/// One synchronization request: a source root and a destination root.
///
/// Paths are kept as raw strings so that a missing or blank argument can be
/// rejected by [`SpecMirrorJob::validate`] instead of at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecMirrorJob {
    /// Source root.
    pub dir_source: Option<String>,
    /// Destination root.
    pub dir_destination: Option<String>,
}

impl SpecMirrorJob {
    pub fn new(dir_source: impl Into<String>, dir_destination: impl Into<String>) -> Self {
        Self {
            dir_source: Some(dir_source.into()),
            dir_destination: Some(dir_destination.into()),
        }
    }

    /// `true` iff both paths are present and non-blank after trimming.
    pub fn is_valid(&self) -> bool {
        _is_present(self.dir_source.as_deref()) && _is_present(self.dir_destination.as_deref())
    }

    /// Check the job and hand back the two roots as paths.
    pub fn validate(&self) -> MirrorResult<SpecMirrorRoots> {
        match (self.dir_source.as_deref(), self.dir_destination.as_deref()) {
            (Some(src), Some(dst)) if !src.trim().is_empty() && !dst.trim().is_empty() => {
                Ok(SpecMirrorRoots {
                    path_dir_src: PathBuf::from(src),
                    path_dir_dst: PathBuf::from(dst),
                })
            }
            _ => Err(MirrorError::InvalidArguments),
        }
    }
}

fn _is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Validated roots of a [`SpecMirrorJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMirrorRoots {
    pub path_dir_src: PathBuf,
    pub path_dir_dst: PathBuf,
}

/// Input options shared by the copy and prune passes.
#[derive(Debug, Clone, Default)]
pub struct SpecMirrorOptions {
    /// Handling of orphan directories that are not empty after pruning.
    pub rule_dir_retained: EnumDirRetainedMode,
    /// Exclude patterns applied to entry basename, in both trees.
    pub patterns_exclude: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumPatternMode,
    /// Copy permissions, timestamps and extended attributes after each copy.
    pub if_preserve_metadata: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors that abort a mirror pass.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Source or destination path is missing or blank.
    #[error("source and destination paths must both be set")]
    InvalidArguments,

    /// A referenced path does not exist.
    #[error("path not found: {}", path.display())]
    PathNotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// A root exists but is not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory {
        /// Offending root.
        path: PathBuf,
    },

    /// One root is the other or lies inside it.
    #[error(
        "source and destination directories overlap: {} <-> {}",
        source_root.display(),
        destination_root.display()
    )]
    RootsOverlap {
        /// Normalized source root.
        source_root: PathBuf,
        /// Normalized destination root.
        destination_root: PathBuf,
    },

    /// Invalid exclude pattern.
    #[error("invalid exclude pattern: {0}")]
    InvalidPattern(String),

    /// Any other I/O failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the failing operation was applied to.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl MirrorError {
    /// Wrap an I/O error with the path it concerns.
    ///
    /// `NotFound` becomes [`MirrorError::PathNotFound`].
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::PathNotFound {
                path: path.to_path_buf(),
            };
        }
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::{Path, PathBuf};

    use super::{MirrorError, SpecMirrorJob};

    #[test]
    fn job_with_both_paths_is_valid() {
        let job = SpecMirrorJob::new("h1", "h2");
        assert!(job.is_valid());
        let roots = job.validate().expect("valid job");
        assert_eq!(roots.path_dir_src, PathBuf::from("h1"));
        assert_eq!(roots.path_dir_dst, PathBuf::from("h2"));
    }

    #[test]
    fn job_with_missing_paths_is_rejected() {
        let job = SpecMirrorJob::default();
        assert!(!job.is_valid());
        assert!(matches!(job.validate(), Err(MirrorError::InvalidArguments)));

        let job = SpecMirrorJob {
            dir_source: Some("h1".to_string()),
            dir_destination: None,
        };
        assert!(matches!(job.validate(), Err(MirrorError::InvalidArguments)));
    }

    #[test]
    fn job_with_blank_paths_is_rejected() {
        for (src, dst) in [("", "h2"), ("h1", "   "), ("\t\n", " ")] {
            let job = SpecMirrorJob::new(src, dst);
            assert!(!job.is_valid(), "{src:?} / {dst:?}");
            assert!(matches!(job.validate(), Err(MirrorError::InvalidArguments)));
        }
    }

    #[test]
    fn validate_keeps_untrimmed_path() {
        let roots = SpecMirrorJob::new(" h1", "h2 ").validate().expect("valid job");
        assert_eq!(roots.path_dir_src, PathBuf::from(" h1"));
        assert_eq!(roots.path_dir_dst, PathBuf::from("h2 "));
    }

    #[test]
    fn from_io_maps_not_found() {
        let err = MirrorError::from_io(
            Path::new("missing"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, MirrorError::PathNotFound { ref path } if path == Path::new("missing")));

        let err = MirrorError::from_io(
            Path::new("locked"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, MirrorError::Io { .. }));
        assert!(err.to_string().contains("locked"));
    }
}
