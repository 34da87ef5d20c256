// Progress: per-task completion, percentage and day streak for stored roadmaps.
// Two repository backends (postgres, local JSON file) sit behind one trait; the
// hub fans changes out to live subscribers.

pub mod handlers;
pub mod hub;
pub mod identity;
pub mod local;
pub mod merge;
pub mod repository;
pub mod store;
pub mod streak;
