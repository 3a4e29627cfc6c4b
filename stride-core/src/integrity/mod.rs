//! Data-integrity checks and repairs.
//!
//! Ordinal sequences, foreign keys and field values are validated after the
//! fact. Findings are returned as data in an [`IntegrityReport`]; only the
//! repair functions write.

pub mod fields;
pub mod orphans;
pub mod repair;
pub mod sequence;

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;
use sqlx::SqlitePool;
use std::fmt;

use crate::db::operations::{
    get_all_instances, get_all_sets, get_all_template_exercises, get_all_workouts,
    get_weight_history,
};

pub use fields::FieldViolation;
pub use orphans::{OrphanRecord, ReferenceKind};
pub use sequence::{
    Ordered, Renumbering, SequenceIssue, SiblingKind, check_sequence, group_by_parent,
    plan_renumbering,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A sequence issue together with the sibling group it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopedIssue {
    pub kind: SiblingKind,
    pub parent_id: i64,
    pub issue: SequenceIssue,
}

impl ScopedIssue {
    pub fn severity(&self) -> Severity {
        self.issue.severity()
    }
}

impl fmt::Display for ScopedIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}.{} under {} {}: {}",
            self.severity(),
            self.kind.table(),
            self.kind.ordinal_column(),
            self.kind.parent_table(),
            self.parent_id,
            self.issue
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntegrityReport {
    pub sequence_issues: Vec<ScopedIssue>,
    pub orphans: Vec<OrphanRecord>,
    pub field_violations: Vec<FieldViolation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.sequence_issues.is_empty()
            && self.orphans.is_empty()
            && self.field_violations.is_empty()
    }

    /// Orphans and field violations always count as errors.
    pub fn error_count(&self) -> usize {
        self.sequence_issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
            .count()
            + self.orphans.len()
            + self.field_violations.len()
    }

    pub fn warning_count(&self) -> usize {
        self.sequence_issues
            .iter()
            .filter(|i| i.severity() == Severity::Warning)
            .count()
    }

    pub fn issues_for(&self, kind: SiblingKind, parent_id: i64) -> Vec<&SequenceIssue> {
        self.sequence_issues
            .iter()
            .filter(|i| i.kind == kind && i.parent_id == parent_id)
            .map(|i| &i.issue)
            .collect()
    }

    /// One human-readable line per finding.
    pub fn messages(&self) -> Vec<String> {
        self.sequence_issues
            .iter()
            .map(ToString::to_string)
            .chain(self.orphans.iter().map(|o| format!("[error] {}", o)))
            .chain(self.field_violations.iter().map(|v| format!("[error] {}", v)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairOutcome {
    pub groups_repaired: usize,
    pub rows_renumbered: usize,
    pub orphans_removed: u64,
}

impl RepairOutcome {
    pub fn changed_anything(&self) -> bool {
        self.rows_renumbered > 0 || self.orphans_removed > 0
    }
}

fn scoped_issues<T: Ordered>(rows: &[T], out: &mut Vec<ScopedIssue>) {
    for (parent_id, siblings) in group_by_parent(rows) {
        out.extend(
            check_sequence(&siblings)
                .into_iter()
                .map(|issue| ScopedIssue {
                    kind: T::KIND,
                    parent_id,
                    issue,
                }),
        );
    }
}

/// Runs every check over the whole database.
pub async fn check_database(pool: &SqlitePool) -> Result<IntegrityReport> {
    let instances = get_all_instances(pool).await?;
    let sets = get_all_sets(pool).await?;
    let template_exercises = get_all_template_exercises(pool).await?;

    let mut report = IntegrityReport::default();
    scoped_issues(&instances, &mut report.sequence_issues);
    scoped_issues(&sets, &mut report.sequence_issues);
    scoped_issues(&template_exercises, &mut report.sequence_issues);

    report.orphans = orphans::find_orphans(pool).await?;

    report.field_violations.extend(fields::check_sets(&sets));
    report
        .field_violations
        .extend(fields::check_workouts(&get_all_workouts(pool, false).await?));
    report
        .field_violations
        .extend(fields::check_template_exercises(&template_exercises));
    report
        .field_violations
        .extend(fields::check_weight_entries(&get_weight_history(pool).await?));

    if report.is_clean() {
        info!("Integrity check passed");
    } else {
        warn!(
            "Integrity check found {} errors and {} warnings",
            report.error_count(),
            report.warning_count()
        );
    }
    Ok(report)
}

async fn repair_groups<T: Ordered>(
    pool: &SqlitePool,
    rows: &[T],
    outcome: &mut RepairOutcome,
) -> Result<()> {
    for siblings in group_by_parent(rows).values() {
        let changed = repair::renumber_siblings(pool, siblings).await?;
        if changed > 0 {
            outcome.groups_repaired += 1;
            outcome.rows_renumbered += changed;
        }
    }
    Ok(())
}

/// Renumbers every sibling group that is not `1..=N`.
pub async fn repair_sequences(pool: &SqlitePool) -> Result<RepairOutcome> {
    let mut outcome = RepairOutcome::default();
    repair_groups(pool, &get_all_instances(pool).await?, &mut outcome).await?;
    repair_groups(pool, &get_all_sets(pool).await?, &mut outcome).await?;
    repair_groups(pool, &get_all_template_exercises(pool).await?, &mut outcome).await?;

    info!(
        "Repaired {} sibling groups ({} rows renumbered)",
        outcome.groups_repaired, outcome.rows_renumbered
    );
    Ok(outcome)
}
