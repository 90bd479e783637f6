//! Prune pass: remove destination entries that have no source counterpart.

use std::fs::{self, FileType};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::event::{EventMirror, SinkMirrorEvent};
use crate::report::{ReportMirror, ReportMirrorBuilder};
use crate::spec::{
    EnumDirRetainedMode, MirrorError, MirrorResult, SpecMirrorJob, SpecMirrorOptions,
};
use crate::util::{SpecExcludePatterns, derive_mirror_path, ensure_roots_disjoint, entry_exists};
use crate::walk::{EnumVisitControl, VisitTree, walk_tree};

struct SpecPruneContext<'a> {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    spec_excludes: SpecExcludePatterns,
    rule_dir_retained: EnumDirRetainedMode,
    builder_report: ReportMirrorBuilder,
    sink: &'a mut dyn SinkMirrorEvent,
}

/// Delete every destination file and directory whose source counterpart
/// is missing.
///
/// The destination tree is walked post-order: a directory is judged only
/// after its children were deleted or kept. An orphan directory that still
/// holds entries is left in place; `rule_dir_retained` decides whether that
/// is silent or reported as [`EventMirror::DirectoryRetained`].
///
/// Both roots must exist. Deletions are not transactional: an error aborts
/// the pass and whatever was removed stays removed.
pub fn mirror_prune(
    spec_job: &SpecMirrorJob,
    spec_options: &SpecMirrorOptions,
    sink: &mut dyn SinkMirrorEvent,
) -> MirrorResult<ReportMirror> {
    let spec_roots = spec_job.validate()?;
    let spec_excludes = SpecExcludePatterns::from_raw(
        spec_options.patterns_exclude.as_deref(),
        spec_options.rule_pattern,
    )?;

    // Without a source root every destination entry would look orphaned.
    if !entry_exists(&spec_roots.path_dir_src)? {
        return Err(MirrorError::PathNotFound {
            path: spec_roots.path_dir_src,
        });
    }
    ensure_roots_disjoint(&spec_roots)?;

    let mut spec_prune_ctx = SpecPruneContext {
        path_dir_src: spec_roots.path_dir_src,
        path_dir_dst: spec_roots.path_dir_dst,
        spec_excludes,
        rule_dir_retained: spec_options.rule_dir_retained,
        builder_report: ReportMirrorBuilder::default(),
        sink,
    };

    let path_root = spec_prune_ctx.path_dir_dst.clone();
    walk_tree(&path_root, &mut spec_prune_ctx)?;
    Ok(spec_prune_ctx.builder_report.build())
}

impl VisitTree for SpecPruneContext<'_> {
    fn enter_directory(&mut self, path_dir: &Path) -> MirrorResult<EnumVisitControl> {
        if path_dir != self.path_dir_dst && self.spec_excludes.is_excluded(path_dir) {
            debug!(path = %path_dir.display(), "excluded directory kept");
            self.builder_report.add_excluded();
            return Ok(EnumVisitControl::SkipSubtree);
        }
        Ok(EnumVisitControl::Continue)
    }

    fn visit_file(
        &mut self,
        path_file: &Path,
        _file_type: FileType,
    ) -> MirrorResult<EnumVisitControl> {
        if self.spec_excludes.is_excluded(path_file) {
            debug!(path = %path_file.display(), "excluded file kept");
            self.builder_report.add_excluded();
            return Ok(EnumVisitControl::Continue);
        }
        self.builder_report.add_scanned();

        let path_file_src = derive_mirror_path(path_file, &self.path_dir_dst, &self.path_dir_src)?;
        if entry_exists(&path_file_src)? {
            return Ok(EnumVisitControl::Continue);
        }

        fs::remove_file(path_file).map_err(|e| MirrorError::from_io(path_file, e))?;
        self.builder_report.add_file_deleted();
        self.sink.emit(EventMirror::FileDeleted {
            path: path_file.to_path_buf(),
        });
        Ok(EnumVisitControl::Continue)
    }

    fn leave_directory(&mut self, path_dir: &Path) -> MirrorResult<EnumVisitControl> {
        self.builder_report.add_scanned();

        let path_dir_src = derive_mirror_path(path_dir, &self.path_dir_dst, &self.path_dir_src)?;
        if entry_exists(&path_dir_src)? {
            return Ok(EnumVisitControl::Continue);
        }

        match fs::remove_dir(path_dir) {
            Ok(()) => {
                self.builder_report.add_dir_deleted();
                self.sink.emit(EventMirror::DirectoryDeleted {
                    path: path_dir.to_path_buf(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
                self.builder_report.add_dir_retained();
                match self.rule_dir_retained {
                    EnumDirRetainedMode::Ignore => {
                        debug!(path = %path_dir.display(), "orphan directory not empty");
                    }
                    EnumDirRetainedMode::Warn => {
                        self.builder_report.add_warning(format!(
                            "Directory not empty, kept: {}",
                            path_dir.display()
                        ));
                        self.sink.emit(EventMirror::DirectoryRetained {
                            path: path_dir.to_path_buf(),
                        });
                    }
                }
            }
            Err(e) => return Err(MirrorError::from_io(path_dir, e)),
        }
        Ok(EnumVisitControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use super::mirror_prune;
    use crate::event::{EventMirror, SinkDiscard};
    use crate::spec::{EnumDirRetainedMode, MirrorError, SpecMirrorJob, SpecMirrorOptions};

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, txt).expect("write text");
    }

    fn job(src: &Path, dst: &Path) -> SpecMirrorJob {
        SpecMirrorJob::new(src.to_string_lossy(), dst.to_string_lossy())
    }

    #[test]
    fn mirror_prune_deletes_orphan_file_keeps_sibling() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("h15");
        let dst = tmp.path().join("h16");
        write_text(&src.join("test1.txt"), "1");
        write_text(&dst.join("test1.txt"), "1");
        write_text(&dst.join("test2.txt"), "2");

        let mut l_events: Vec<EventMirror> = Vec::new();
        let report = mirror_prune(&job(&src, &dst), &SpecMirrorOptions::default(), &mut l_events)
            .expect("prune");

        assert!(!dst.join("test2.txt").exists());
        assert!(dst.join("test1.txt").exists());
        assert_eq!(report.cnt_files_deleted, 1);
        assert_eq!(
            l_events,
            vec![EventMirror::FileDeleted {
                path: dst.join("test2.txt")
            }]
        );
    }

    #[test]
    fn mirror_prune_removes_orphan_directories_bottom_up() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).expect("mkdir src");
        write_text(&dst.join("gone/deeper/x.txt"), "x");
        fs::create_dir_all(dst.join("gone/empty")).expect("mkdir empty");

        let mut l_events: Vec<EventMirror> = Vec::new();
        let report = mirror_prune(&job(&src, &dst), &SpecMirrorOptions::default(), &mut l_events)
            .expect("prune");

        assert!(!dst.join("gone").exists());
        assert!(dst.is_dir());
        assert_eq!(report.cnt_files_deleted, 1);
        assert_eq!(report.cnt_dirs_deleted, 3);
        assert_eq!(
            l_events.last(),
            Some(&EventMirror::DirectoryDeleted {
                path: dst.join("gone")
            })
        );
    }

    #[test]
    fn mirror_prune_retains_non_empty_orphan_directory() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).expect("mkdir src");
        write_text(&dst.join("old/keep.lock"), "lock");
        write_text(&dst.join("old/stale.txt"), "stale");

        let spec_options = SpecMirrorOptions {
            patterns_exclude: Some(vec!["*.lock".to_string()]),
            ..SpecMirrorOptions::default()
        };
        let mut l_events: Vec<EventMirror> = Vec::new();
        let report =
            mirror_prune(&job(&src, &dst), &spec_options, &mut l_events).expect("prune");

        assert!(dst.join("old/keep.lock").exists());
        assert!(!dst.join("old/stale.txt").exists());
        assert_eq!(report.cnt_dirs_retained, 1);
        assert_eq!(report.cnt_excluded, 1);
        assert_eq!(report.warning_count(), 0);
        assert!(!l_events.iter().any(EventMirror::is_warning));
    }

    #[test]
    fn mirror_prune_warns_on_retained_directory_when_configured() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).expect("mkdir src");
        write_text(&dst.join("old/keep.lock"), "lock");

        let spec_options = SpecMirrorOptions {
            patterns_exclude: Some(vec!["*.lock".to_string()]),
            rule_dir_retained: EnumDirRetainedMode::Warn,
            ..SpecMirrorOptions::default()
        };
        let mut l_events: Vec<EventMirror> = Vec::new();
        let report =
            mirror_prune(&job(&src, &dst), &spec_options, &mut l_events).expect("prune");

        assert_eq!(report.cnt_dirs_retained, 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            l_events,
            vec![EventMirror::DirectoryRetained {
                path: dst.join("old")
            }]
        );
    }

    #[test]
    fn mirror_prune_requires_both_roots() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write_text(&dst.join("precious.txt"), "p");

        let err = mirror_prune(&job(&src, &dst), &SpecMirrorOptions::default(), &mut SinkDiscard)
            .expect_err("missing source");
        assert!(matches!(err, MirrorError::PathNotFound { ref path } if *path == src));
        assert!(dst.join("precious.txt").exists());

        fs::create_dir_all(&src).expect("mkdir src");
        let err = mirror_prune(
            &job(&src, &tmp.path().join("absent")),
            &SpecMirrorOptions::default(),
            &mut SinkDiscard,
        )
        .expect_err("missing destination");
        assert!(matches!(err, MirrorError::PathNotFound { .. }));
    }

    #[test]
    fn mirror_prune_deletes_orphans_under_source_file_name() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write_text(&src.join("x"), "file in source");
        write_text(&dst.join("x/orphan.txt"), "o");

        let mut l_events: Vec<EventMirror> = Vec::new();
        let report = mirror_prune(&job(&src, &dst), &SpecMirrorOptions::default(), &mut l_events)
            .expect("prune");

        assert!(!dst.join("x/orphan.txt").exists());
        assert!(dst.join("x").is_dir());
        assert_eq!(report.cnt_files_deleted, 1);
        assert_eq!(
            l_events,
            vec![EventMirror::FileDeleted {
                path: dst.join("x/orphan.txt")
            }]
        );
    }

    #[test]
    fn mirror_prune_rejects_destination_file_root() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst.txt");
        fs::create_dir_all(&src).expect("mkdir src");
        write_text(&dst, "d");

        let err = mirror_prune(&job(&src, &dst), &SpecMirrorOptions::default(), &mut SinkDiscard)
            .expect_err("must fail");
        assert!(matches!(err, MirrorError::NotADirectory { ref path } if *path == dst));
        assert!(!err.to_string().contains("source"));
        assert!(dst.is_file());
    }

    #[test]
    fn mirror_prune_invalid_job_rejected_first() {
        let err = mirror_prune(
            &SpecMirrorJob::default(),
            &SpecMirrorOptions::default(),
            &mut SinkDiscard,
        )
        .expect_err("must fail");
        assert!(matches!(err, MirrorError::InvalidArguments));
    }

    #[cfg(unix)]
    #[test]
    fn mirror_prune_removes_orphan_symlink_not_target() {
        use std::os::unix::fs::symlink;

        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        let outside = tmp.path().join("outside.txt");
        fs::create_dir_all(&src).expect("mkdir src");
        fs::create_dir_all(&dst).expect("mkdir dst");
        write_text(&outside, "o");
        symlink(&outside, dst.join("link.txt")).expect("symlink");

        mirror_prune(&job(&src, &dst), &SpecMirrorOptions::default(), &mut SinkDiscard)
            .expect("prune");
        assert!(!dst.join("link.txt").is_symlink());
        assert!(outside.exists());
    }
}
