//! Depth-first directory walk with enter/file/leave hooks.

use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use crate::spec::{MirrorError, MirrorResult};

/// Signal returned by every visitor hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumVisitControl {
    /// Keep walking.
    Continue,
    /// From `enter_directory`: skip the children and the matching
    /// `leave_directory`. From `visit_file`: skip the remaining siblings.
    SkipSubtree,
    /// Stop the whole walk.
    Terminate,
}

/// Hooks fired by [`walk_tree`]. Every hook defaults to `Continue`.
///
/// `visit_file` receives every non-directory entry (regular files, symlinks,
/// special files) together with its unfollowed [`FileType`].
pub trait VisitTree {
    fn enter_directory(&mut self, _path_dir: &Path) -> MirrorResult<EnumVisitControl> {
        Ok(EnumVisitControl::Continue)
    }

    fn visit_file(
        &mut self,
        _path_file: &Path,
        _file_type: FileType,
    ) -> MirrorResult<EnumVisitControl> {
        Ok(EnumVisitControl::Continue)
    }

    fn leave_directory(&mut self, _path_dir: &Path) -> MirrorResult<EnumVisitControl> {
        Ok(EnumVisitControl::Continue)
    }
}

/// Walk `path_root` depth-first.
///
/// The root must be a directory; a missing root yields
/// [`MirrorError::PathNotFound`]. Children are visited in name order,
/// symlinks are never followed. Any hook error aborts the walk and is
/// returned unchanged.
///
/// Returns `Terminate` if a hook stopped the walk, `Continue` otherwise.
pub fn walk_tree<V>(path_root: &Path, visitor: &mut V) -> MirrorResult<EnumVisitControl>
where
    V: VisitTree + ?Sized,
{
    let meta_root = fs::metadata(path_root).map_err(|e| MirrorError::from_io(path_root, e))?;
    if !meta_root.is_dir() {
        return Err(MirrorError::NotADirectory {
            path: path_root.to_path_buf(),
        });
    }
    walk_directory(path_root, visitor)
}

fn walk_directory<V>(path_dir: &Path, visitor: &mut V) -> MirrorResult<EnumVisitControl>
where
    V: VisitTree + ?Sized,
{
    match visitor.enter_directory(path_dir)? {
        EnumVisitControl::Continue => {}
        EnumVisitControl::SkipSubtree => return Ok(EnumVisitControl::Continue),
        EnumVisitControl::Terminate => return Ok(EnumVisitControl::Terminate),
    }

    for (path_entry, file_type) in list_entries(path_dir)? {
        let enum_control = if file_type.is_dir() {
            walk_directory(&path_entry, visitor)?
        } else {
            visitor.visit_file(&path_entry, file_type)?
        };
        match enum_control {
            EnumVisitControl::Continue => {}
            EnumVisitControl::SkipSubtree => break,
            EnumVisitControl::Terminate => return Ok(EnumVisitControl::Terminate),
        }
    }

    visitor.leave_directory(path_dir)
}

fn list_entries(path_dir: &Path) -> MirrorResult<Vec<(PathBuf, FileType)>> {
    let iter_entries = fs::read_dir(path_dir).map_err(|e| MirrorError::from_io(path_dir, e))?;

    let mut l_entries = Vec::new();
    for entry_res in iter_entries {
        let entry = entry_res.map_err(|e| MirrorError::from_io(path_dir, e))?;
        let path_entry = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| MirrorError::from_io(&path_entry, e))?;
        l_entries.push((path_entry, file_type));
    }
    l_entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(l_entries)
}
