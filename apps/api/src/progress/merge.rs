use tracing::info;

use crate::db::PersistenceError;
use crate::models::progress::{ProgressSnapshot, Streak};
use crate::progress::repository::ProgressRepository;

/// Combines two records of the same scope.
///
/// A task is completed when either side completed it. The streak with the
/// later `last_completed_date` wins; on a tie the larger count wins.
pub fn merge_snapshots(a: &ProgressSnapshot, b: &ProgressSnapshot) -> ProgressSnapshot {
    let mut tasks = a.tasks.clone();
    for (key, completed) in &b.tasks {
        let entry = tasks.entry(*key).or_insert(false);
        *entry = *entry || *completed;
    }
    ProgressSnapshot {
        tasks,
        streak: merge_streaks(a.streak, b.streak),
    }
}

fn merge_streaks(a: Streak, b: Streak) -> Streak {
    match a.last_completed_date.cmp(&b.last_completed_date) {
        std::cmp::Ordering::Greater => a,
        std::cmp::Ordering::Less => b,
        std::cmp::Ordering::Equal if a.count >= b.count => a,
        std::cmp::Ordering::Equal => b,
    }
}

/// Folds every scope stored in `from` into `into`. Returns how many scopes were merged.
pub async fn import_progress(
    from: &dyn ProgressRepository,
    into: &dyn ProgressRepository,
) -> Result<usize, PersistenceError> {
    let scopes = from.scopes().await?;
    for scope in &scopes {
        let incoming = from.load(scope).await?;
        let existing = into.load(scope).await?;
        into.save(scope, &merge_snapshots(&existing, &incoming)).await?;
    }
    info!("Imported local progress for {} roadmap(s)", scopes.len());
    Ok(scopes.len())
}
