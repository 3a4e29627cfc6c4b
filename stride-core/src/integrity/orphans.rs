use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;
use sqlx::SqlitePool;
use std::fmt;

/// How a dangling reference is handled by [`remove_orphans`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceKind {
    /// The parent owns the row; the row is deleted with its own children.
    Owner,
    /// Optional link; cleared to NULL.
    Optional,
    /// Required link to a catalog row; reported only.
    Required,
}

#[derive(Debug, Clone, Copy)]
pub struct ReferenceCheck {
    pub table: &'static str,
    pub column: &'static str,
    pub target_table: &'static str,
    pub kind: ReferenceKind,
}

/// Every foreign key in the schema, children before parents.
pub const REFERENCE_CHECKS: &[ReferenceCheck] = &[
    ReferenceCheck {
        table: "exercise_sets",
        column: "exercise_instance_id",
        target_table: "exercise_instances",
        kind: ReferenceKind::Owner,
    },
    ReferenceCheck {
        table: "exercise_instances",
        column: "workout_id",
        target_table: "workouts",
        kind: ReferenceKind::Owner,
    },
    ReferenceCheck {
        table: "exercise_instances",
        column: "exercise_id",
        target_table: "exercises",
        kind: ReferenceKind::Required,
    },
    ReferenceCheck {
        table: "template_exercises",
        column: "template_id",
        target_table: "workout_templates",
        kind: ReferenceKind::Owner,
    },
    ReferenceCheck {
        table: "template_exercises",
        column: "exercise_id",
        target_table: "exercises",
        kind: ReferenceKind::Required,
    },
    ReferenceCheck {
        table: "workouts",
        column: "template_id",
        target_table: "workout_templates",
        kind: ReferenceKind::Optional,
    },
    ReferenceCheck {
        table: "goals",
        column: "exercise_id",
        target_table: "exercises",
        kind: ReferenceKind::Optional,
    },
];

/// A row whose referenced parent no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanRecord {
    pub table: &'static str,
    pub record_id: i64,
    pub column: &'static str,
    pub target_table: &'static str,
    pub target_id: i64,
    pub kind: ReferenceKind,
}

impl fmt::Display for OrphanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} references missing {} {} via {}",
            self.table, self.record_id, self.target_table, self.target_id, self.column
        )
    }
}

fn orphan_query(check: &ReferenceCheck) -> String {
    format!(
        "SELECT c.id, c.{column} FROM {table} c
         LEFT JOIN {target} p ON p.id = c.{column}
         WHERE c.{column} IS NOT NULL AND p.id IS NULL
         ORDER BY c.id",
        column = check.column,
        table = check.table,
        target = check.target_table,
    )
}

pub async fn find_orphans(pool: &SqlitePool) -> Result<Vec<OrphanRecord>> {
    let mut orphans = Vec::new();

    for check in REFERENCE_CHECKS {
        let rows = sqlx::query_as::<_, (i64, i64)>(&orphan_query(check))
            .fetch_all(pool)
            .await?;
        if !rows.is_empty() {
            warn!(
                "{} rows in {} reference missing {}",
                rows.len(),
                check.table,
                check.target_table
            );
        }
        orphans.extend(rows.into_iter().map(|(record_id, target_id)| OrphanRecord {
            table: check.table,
            record_id,
            column: check.column,
            target_table: check.target_table,
            target_id,
            kind: check.kind,
        }));
    }

    debug!("Orphan scan found {} records", orphans.len());
    Ok(orphans)
}

/// Deletes rows whose owner is gone (instances take their sets along) and
/// clears optional links to missing rows, all in one transaction. Rows with
/// a missing required catalog reference are left in place. Returns the number
/// of rows deleted or updated.
pub async fn remove_orphans(pool: &SqlitePool) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut touched = 0;

    // Sets under instances that are about to go, so foreign-key enforcement
    // does not reject the instance deletion below.
    touched += sqlx::query(
        "DELETE FROM exercise_sets WHERE exercise_instance_id IN (
             SELECT id FROM exercise_instances
             WHERE workout_id NOT IN (SELECT id FROM workouts))",
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    // Parents first; the exercise_sets check runs last in this order.
    for check in REFERENCE_CHECKS.iter().rev() {
        let sql = match check.kind {
            ReferenceKind::Owner => format!(
                "DELETE FROM {table} WHERE {column} NOT IN (SELECT id FROM {target})",
                table = check.table,
                column = check.column,
                target = check.target_table,
            ),
            ReferenceKind::Optional => format!(
                "UPDATE {table} SET {column} = NULL
                 WHERE {column} IS NOT NULL AND {column} NOT IN (SELECT id FROM {target})",
                table = check.table,
                column = check.column,
                target = check.target_table,
            ),
            ReferenceKind::Required => continue,
        };
        touched += sqlx::query(&sql).execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    info!("Removed or detached {} orphaned rows", touched);
    Ok(touched)
}
