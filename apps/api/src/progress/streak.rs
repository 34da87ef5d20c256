use chrono::NaiveDate;

use crate::models::progress::Streak;

/// Source of "today" as a device-local calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Applies one task toggle on `today` to the streak.
///
/// - last completion yesterday: count + 1
/// - last completion today: unchanged
/// - anything else (older, absent, or in the future): restart at 1
///
/// The last-completed date is always moved to `today`.
pub fn advance_streak(current: Streak, today: NaiveDate) -> Streak {
    let count = match current.last_completed_date {
        Some(last) if last == today => current.count,
        Some(last) if today.pred_opt() == Some(last) => current.count + 1,
        _ => 1,
    };
    Streak {
        count,
        last_completed_date: Some(today),
    }
}
