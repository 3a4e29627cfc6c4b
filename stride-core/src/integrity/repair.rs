use anyhow::Result;
use log::debug;
use sqlx::SqlitePool;

use crate::integrity::sequence::{Ordered, Renumbering, SiblingKind, plan_renumbering};

/// Writes `changes` for one sibling group in a single transaction, so a
/// group is either fully renumbered or left as it was.
pub async fn apply_renumbering(
    pool: &SqlitePool,
    kind: SiblingKind,
    changes: &[Renumbering],
) -> Result<usize> {
    if changes.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE {} SET {} = ?1 WHERE id = ?2",
        kind.table(),
        kind.ordinal_column()
    );
    let mut tx = pool.begin().await?;
    for change in changes {
        sqlx::query(&sql)
            .bind(change.to)
            .bind(change.record_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(changes.len())
}

/// Renumbers one sibling group to `1..=N`. Returns how many rows changed.
pub async fn renumber_siblings<T: Ordered>(pool: &SqlitePool, siblings: &[T]) -> Result<usize> {
    let plan = plan_renumbering(siblings);
    if !plan.is_empty() {
        debug!(
            "Renumbering {} of {} rows in {}",
            plan.len(),
            siblings.len(),
            T::KIND.table()
        );
    }
    apply_renumbering(pool, T::KIND, &plan).await
}
