use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumPatternMode, MirrorError, MirrorResult, SpecMirrorRoots};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypePatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

/// Compiled exclude list. An empty or absent list excludes nothing.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpecExcludePatterns {
    patterns: Option<TypePatternSeq>,
}

impl SpecExcludePatterns {
    pub(crate) fn from_raw(
        patterns_exclude: Option<&[String]>,
        rule_pattern: EnumPatternMode,
    ) -> MirrorResult<Self> {
        Ok(Self {
            patterns: _compile(patterns_exclude, rule_pattern)?,
        })
    }

    /// Match against the final component of `path`.
    pub(crate) fn is_excluded(&self, path: &Path) -> bool {
        let Some(patterns) = self.patterns.as_ref() else {
            return false;
        };
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        match patterns {
            TypePatternSeq::Literal(v) => v.iter().any(|p| name.contains(p.as_str())),
            TypePatternSeq::Glob(v) => v.iter().any(|p| p.is_match(&*name)),
            TypePatternSeq::Regex(v) => v.iter().any(|p| p.is_match(&name)),
        }
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumPatternMode,
) -> MirrorResult<Option<TypePatternSeq>> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumPatternMode::Literal => Ok(Some(TypePatternSeq::Literal(patterns.to_vec()))),
        EnumPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| MirrorError::InvalidPattern(format!("`{pattern}`: {e}")))?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypePatternSeq::Glob(l_glob)))
        }
        EnumPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern)
                    .map_err(|e| MirrorError::InvalidPattern(format!("`{pattern}`: {e}")))?;
                l_regex.push(regex);
            }
            Ok(Some(TypePatternSeq::Regex(l_regex)))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Map `path_entry` under `path_root_from` to the same relative location
/// under `path_root_to`. The root itself maps to `path_root_to`.
pub(crate) fn derive_mirror_path(
    path_entry: &Path,
    path_root_from: &Path,
    path_root_to: &Path,
) -> MirrorResult<PathBuf> {
    let path_rel = path_entry.strip_prefix(path_root_from).map_err(|_| MirrorError::Io {
        path: path_entry.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("entry is not under root {}", path_root_from.display()),
        ),
    })?;
    if path_rel.as_os_str().is_empty() {
        return Ok(path_root_to.to_path_buf());
    }
    Ok(path_root_to.join(path_rel))
}

/// Existence check that does not follow symlinks. A path running through a
/// non-directory component counts as absent; other errors are propagated.
pub(crate) fn entry_exists(path: &Path) -> MirrorResult<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(false)
        }
        Err(e) => Err(MirrorError::from_io(path, e)),
    }
}

/// Byte size of `path`, following symlinks.
pub(crate) fn file_size(path: &Path) -> MirrorResult<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| MirrorError::from_io(path, e))
}

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    // Canonicalize the deepest existing ancestor so that a not-yet-created
    // destination still compares against a resolved source.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && !parent.as_os_str().is_empty()
    {
        return _normalize_path(parent).join(name);
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Reject roots where one equals or contains the other.
pub(crate) fn ensure_roots_disjoint(spec_roots: &SpecMirrorRoots) -> MirrorResult<()> {
    let src_resolved = _normalize_path(&spec_roots.path_dir_src);
    let dst_resolved = _normalize_path(&spec_roots.path_dir_dst);
    if dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved) {
        return Err(MirrorError::RootsOverlap {
            source_root: src_resolved,
            destination_root: dst_resolved,
        });
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyPrimitive

/// Copy file content, replacing `path_file_dst` if it exists, and optionally
/// carry permissions, timestamps and extended attributes over.
///
/// An existing symlink at `path_file_dst` is replaced by a regular file; its
/// target is never written.
pub(crate) fn copy_file(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_preserve_metadata: bool,
) -> MirrorResult<()> {
    if let Ok(meta_dst) = fs::symlink_metadata(path_file_dst)
        && meta_dst.file_type().is_symlink()
    {
        fs::remove_file(path_file_dst).map_err(|e| MirrorError::from_io(path_file_dst, e))?;
    }
    fs::copy(path_file_src, path_file_dst).map_err(|e| MirrorError::from_io(path_file_src, e))?;
    if if_preserve_metadata {
        apply_metadata(path_file_src, path_file_dst)
            .map_err(|e| MirrorError::from_io(path_file_dst, e))?;
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(path = %path_file_src.display(), "xattrs not listed ({e})");
            return;
        }
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                path = %path_file_dst.display(),
                name = %name.to_string_lossy(),
                "xattr not copied ({e})"
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
