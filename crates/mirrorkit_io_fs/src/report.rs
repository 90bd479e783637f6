//! Mirror report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one mirror run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportMirror {
    /// Total visited directory/file entries.
    pub cnt_scanned: u64,
    /// Destination directories created by the copy pass.
    pub cnt_dirs_created: u64,
    /// Files copied to a previously absent destination.
    pub cnt_copied: u64,
    /// Destination files replaced because their size differed.
    pub cnt_overwritten: u64,
    /// Files left alone because both sides had the same size.
    pub cnt_unchanged: u64,
    /// Entries ignored by exclude patterns.
    pub cnt_excluded: u64,
    /// Orphan files removed by the prune pass.
    pub cnt_files_deleted: u64,
    /// Orphan directories removed by the prune pass.
    pub cnt_dirs_deleted: u64,
    /// Orphan directories kept because they were not empty.
    pub cnt_dirs_retained: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
}

impl ReportMirror {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_dirs_created".to_string(), self.cnt_dirs_created);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_overwritten".to_string(), self.cnt_overwritten);
        dict_counts.insert("cnt_unchanged".to_string(), self.cnt_unchanged);
        dict_counts.insert("cnt_excluded".to_string(), self.cnt_excluded);
        dict_counts.insert("cnt_files_deleted".to_string(), self.cnt_files_deleted);
        dict_counts.insert("cnt_dirs_deleted".to_string(), self.cnt_dirs_deleted);
        dict_counts.insert("cnt_dirs_retained".to_string(), self.cnt_dirs_retained);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} created_dirs={} copied={} overwritten={} unchanged={} \
             excluded={} deleted_files={} deleted_dirs={} retained_dirs={} warnings={}",
            self.cnt_scanned,
            self.cnt_dirs_created,
            self.cnt_copied,
            self.cnt_overwritten,
            self.cnt_unchanged,
            self.cnt_excluded,
            self.cnt_files_deleted,
            self.cnt_dirs_deleted,
            self.cnt_dirs_retained,
            self.warning_count()
        )
    }

    /// Fold the report of a later pass into this one.
    pub fn merge(mut self, other: ReportMirror) -> ReportMirror {
        self.cnt_scanned += other.cnt_scanned;
        self.cnt_dirs_created += other.cnt_dirs_created;
        self.cnt_copied += other.cnt_copied;
        self.cnt_overwritten += other.cnt_overwritten;
        self.cnt_unchanged += other.cnt_unchanged;
        self.cnt_excluded += other.cnt_excluded;
        self.cnt_files_deleted += other.cnt_files_deleted;
        self.cnt_dirs_deleted += other.cnt_dirs_deleted;
        self.cnt_dirs_retained += other.cnt_dirs_retained;
        self.warnings.extend(other.warnings);
        self
    }
}

impl fmt::Display for ReportMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MIRROR]"))
    }
}

/// Mutable accumulator for mirror statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportMirrorBuilder {
    report: ReportMirror,
}

impl ReportMirrorBuilder {
    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.report.cnt_scanned += 1;
    }

    /// Increment created-directory count by one.
    pub fn add_dir_created(&mut self) {
        self.report.cnt_dirs_created += 1;
    }

    /// Increment copied-file count by one.
    pub fn add_copied(&mut self) {
        self.report.cnt_copied += 1;
    }

    /// Increment overwritten-file count by one.
    pub fn add_overwritten(&mut self) {
        self.report.cnt_overwritten += 1;
    }

    /// Increment unchanged-file count by one.
    pub fn add_unchanged(&mut self) {
        self.report.cnt_unchanged += 1;
    }

    /// Increment excluded count by one.
    pub fn add_excluded(&mut self) {
        self.report.cnt_excluded += 1;
    }

    /// Increment deleted-file count by one.
    pub fn add_file_deleted(&mut self) {
        self.report.cnt_files_deleted += 1;
    }

    /// Increment deleted-directory count by one.
    pub fn add_dir_deleted(&mut self) {
        self.report.cnt_dirs_deleted += 1;
    }

    /// Increment retained-directory count by one.
    pub fn add_dir_retained(&mut self) {
        self.report.cnt_dirs_retained += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportMirror {
        self.report
    }
}
