//! Sibling row locking for reorders.
//!
//! # Responsibility
//! - Lock the moved row and its `after` neighbour inside the caller's transaction.
//! - Read the rank bounds a reorder allocates between.
//!
//! # Invariants
//! - Rows of one kind are locked in ascending id order.
//! - Callers lock the scope rows (project, then columns) before calling in.
//! - The following sibling is read after the locks are held, never before.

use crate::model::board::SiblingKind;
use crate::model::rank::{Bound, Rank};
use crate::repo::board_repo::{Direction, StoreTx};
use crate::service::error::{BoardError, RepoResultExt};
use uuid::Uuid;

/// Row being moved and the position it is moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderTarget {
    pub kind: SiblingKind,
    pub id: Uuid,
    /// Scope the row lives in before the move.
    pub current_scope: Uuid,
    /// Scope the row lives in after the move.
    pub new_scope: Uuid,
    /// Sibling to place the row after; `None` places it first.
    pub after_id: Option<Uuid>,
}

/// Ranks read under lock for one reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderBounds {
    pub target_rank: Rank,
    pub after_rank: Option<Rank>,
    /// Rank of the sibling that follows the insert position, if any.
    pub next_rank: Option<Rank>,
}

impl ReorderBounds {
    pub fn lower(&self) -> Bound<'_> {
        Bound::from(self.after_rank.as_ref())
    }

    pub fn upper(&self) -> Bound<'_> {
        Bound::from(self.next_rank.as_ref())
    }
}

/// Locks the target and `after` rows and reads the insert-position bounds.
///
/// # Errors
/// - `NotFound` when the target is absent from its current scope.
/// - `Conflict` when `after_id` is absent from the new scope.
/// - `Internal` on store failure.
pub fn lock_for_reorder<T: StoreTx>(
    tx: &T,
    target: &ReorderTarget,
) -> Result<ReorderBounds, BoardError> {
    let label = target.kind.label();
    let mut target_rank = None;
    let mut after_rank = None;

    for id in lock_order(&[Some(target.id), target.after_id]) {
        if id == target.id {
            let rank = tx
                .lock_and_get_rank(target.kind, target.current_scope, id)
                .or_not_found("lock reorder target", &format!("{label} not found"))?;
            target_rank = Some(rank);
        } else {
            let rank = tx
                .lock_and_get_rank(target.kind, target.new_scope, id)
                .or_conflict(
                    "lock reorder neighbour",
                    &format!("{label} specified as `after` does not exist in the target scope"),
                )?;
            after_rank = Some(rank);
        }
    }

    let Some(target_rank) = target_rank else {
        return Err(BoardError::NotFound(format!("{label} not found")));
    };
    let next_rank = tx
        .neighbor(
            target.kind,
            target.new_scope,
            Bound::from(after_rank.as_ref()),
            Direction::After,
            Some(target.id),
        )
        .or_internal("read next sibling rank")?
        .map(|(_, rank)| rank);

    Ok(ReorderBounds {
        target_rank,
        after_rank,
        next_rank,
    })
}

/// Returns distinct ids in the global lock acquisition order.
pub(crate) fn lock_order(ids: &[Option<Uuid>]) -> Vec<Uuid> {
    let mut ordered: Vec<Uuid> = ids.iter().flatten().copied().collect();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}
