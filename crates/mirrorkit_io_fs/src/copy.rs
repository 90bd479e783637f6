//! Copy pass: make every source file exist, with matching size, under the
//! destination root.

use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::event::{EventMirror, SinkMirrorEvent};
use crate::report::{ReportMirror, ReportMirrorBuilder};
use crate::spec::{MirrorError, MirrorResult, SpecMirrorJob, SpecMirrorOptions};
use crate::util::{
    SpecExcludePatterns, copy_file, derive_mirror_path, ensure_roots_disjoint, entry_exists,
    file_size,
};
use crate::walk::{EnumVisitControl, VisitTree, walk_tree};

struct SpecCopyContext<'a> {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    spec_excludes: SpecExcludePatterns,
    if_preserve_metadata: bool,
    builder_report: ReportMirrorBuilder,
    sink: &'a mut dyn SinkMirrorEvent,
}

/// Copy new and resized files from the job's source tree into its
/// destination tree.
///
/// The source tree is walked pre-order, so each destination directory is
/// created before any file lands in it. A destination file is (re)written
/// only when it is missing or its size differs from the source file; equal
/// sizes count as in sync. Every write emits [`EventMirror::FileCopied`].
///
/// Fails with [`MirrorError::InvalidArguments`] before touching the
/// filesystem when the job is invalid, and with
/// [`MirrorError::PathNotFound`] (without creating anything) when the source
/// root is missing. Any later I/O error aborts the pass; work already done
/// is kept.
pub fn mirror_copy(
    spec_job: &SpecMirrorJob,
    spec_options: &SpecMirrorOptions,
    sink: &mut dyn SinkMirrorEvent,
) -> MirrorResult<ReportMirror> {
    let spec_roots = spec_job.validate()?;
    let spec_excludes = SpecExcludePatterns::from_raw(
        spec_options.patterns_exclude.as_deref(),
        spec_options.rule_pattern,
    )?;

    let meta_dir_src = fs::metadata(&spec_roots.path_dir_src)
        .map_err(|e| MirrorError::from_io(&spec_roots.path_dir_src, e))?;
    if !meta_dir_src.is_dir() {
        return Err(MirrorError::NotADirectory {
            path: spec_roots.path_dir_src,
        });
    }
    ensure_roots_disjoint(&spec_roots)?;

    let mut spec_cp_ctx = SpecCopyContext {
        path_dir_src: spec_roots.path_dir_src,
        path_dir_dst: spec_roots.path_dir_dst,
        spec_excludes,
        if_preserve_metadata: spec_options.if_preserve_metadata,
        builder_report: ReportMirrorBuilder::default(),
        sink,
    };

    let path_root = spec_cp_ctx.path_dir_src.clone();
    walk_tree(&path_root, &mut spec_cp_ctx)?;
    Ok(spec_cp_ctx.builder_report.build())
}

impl VisitTree for SpecCopyContext<'_> {
    fn enter_directory(&mut self, path_dir: &Path) -> MirrorResult<EnumVisitControl> {
        if path_dir != self.path_dir_src && self.spec_excludes.is_excluded(path_dir) {
            debug!(path = %path_dir.display(), "excluded directory");
            self.builder_report.add_excluded();
            return Ok(EnumVisitControl::SkipSubtree);
        }
        self.builder_report.add_scanned();

        let path_dir_dst = derive_mirror_path(path_dir, &self.path_dir_src, &self.path_dir_dst)?;
        if !entry_exists(&path_dir_dst)? {
            fs::create_dir_all(&path_dir_dst)
                .map_err(|e| MirrorError::from_io(&path_dir_dst, e))?;
            debug!(path = %path_dir_dst.display(), "created directory");
            self.builder_report.add_dir_created();
        }
        Ok(EnumVisitControl::Continue)
    }

    fn visit_file(
        &mut self,
        path_file: &Path,
        file_type: FileType,
    ) -> MirrorResult<EnumVisitControl> {
        if self.spec_excludes.is_excluded(path_file) {
            debug!(path = %path_file.display(), "excluded file");
            self.builder_report.add_excluded();
            return Ok(EnumVisitControl::Continue);
        }
        self.builder_report.add_scanned();

        if !file_type.is_file() && !self.is_symlink_to_file(path_file, file_type)? {
            self.builder_report.add_warning(format!(
                "Special file skipped: {}",
                path_file.display()
            ));
            return Ok(EnumVisitControl::Continue);
        }

        let path_file_dst = derive_mirror_path(path_file, &self.path_dir_src, &self.path_dir_dst)?;
        if entry_exists(&path_file_dst)? {
            // A destination symlink is always replaced, never written through.
            let if_dst_symlink = fs::symlink_metadata(&path_file_dst)
                .map(|m| m.file_type().is_symlink())
                .map_err(|e| MirrorError::from_io(&path_file_dst, e))?;
            let n_size_src = file_size(path_file)?;
            if !if_dst_symlink && n_size_src == file_size(&path_file_dst)? {
                debug!(path = %path_file.display(), size = n_size_src, "unchanged");
                self.builder_report.add_unchanged();
                return Ok(EnumVisitControl::Continue);
            }
            copy_file(path_file, &path_file_dst, self.if_preserve_metadata)?;
            self.builder_report.add_overwritten();
        } else {
            copy_file(path_file, &path_file_dst, self.if_preserve_metadata)?;
            self.builder_report.add_copied();
        }

        self.sink.emit(EventMirror::FileCopied {
            source: path_file.to_path_buf(),
            destination: path_file_dst,
        });
        Ok(EnumVisitControl::Continue)
    }
}

impl SpecCopyContext<'_> {
    fn is_symlink_to_file(&self, path_file: &Path, file_type: FileType) -> MirrorResult<bool> {
        if !file_type.is_symlink() {
            return Ok(false);
        }
        let meta_target = fs::metadata(path_file).map_err(|e| MirrorError::from_io(path_file, e))?;
        Ok(meta_target.is_file())
    }
}
