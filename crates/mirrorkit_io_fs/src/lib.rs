//! `mirrorkit_io_fs` v1:
//! One-way directory mirroring engine.
//!
//! Modules:
//! - `copy`   : copy pass (pre-order walk of the source tree)
//! - `prune`  : prune pass (post-order walk of the destination tree)
//! - `walk`   : depth-first walk with enter/file/leave hooks
//! - `spec`   : job, enums/options, errors
//! - `event`  : mirror events and sinks
//! - `report` : run-time report model
//! - `util`   : shared helper functions

pub mod copy;
pub mod event;
pub mod prune;
pub mod report;
pub mod spec;
mod util;
pub mod walk;

pub use copy::mirror_copy;
pub use event::{EventMirror, SinkDiscard, SinkMirrorEvent, SinkTracing};
pub use prune::mirror_prune;
pub use report::{ReportMirror, ReportMirrorBuilder};
pub use spec::{
    EnumDirRetainedMode, EnumPatternMode, MirrorError, MirrorResult, SpecMirrorJob,
    SpecMirrorOptions, SpecMirrorRoots,
};
pub use walk::{EnumVisitControl, VisitTree, walk_tree};

/// Run the copy pass, then the prune pass, and merge both reports.
///
/// Stops at the first failing pass; a failed copy pass never prunes.
pub fn mirror_tree(
    spec_job: &SpecMirrorJob,
    spec_options: &SpecMirrorOptions,
    sink: &mut dyn SinkMirrorEvent,
) -> MirrorResult<ReportMirror> {
    let report_copy = mirror_copy(spec_job, spec_options, sink)?;
    let report_prune = mirror_prune(spec_job, spec_options, sink)?;
    Ok(report_copy.merge(report_prune))
}
