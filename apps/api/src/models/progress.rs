use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Skill,
    Project,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Skill => "skill",
            TaskCategory::Project => "project",
        }
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skill" => Ok(TaskCategory::Skill),
            "project" => Ok(TaskCategory::Project),
            other => Err(format!("unknown task category '{other}'")),
        }
    }
}

/// Addresses one checkbox inside a roadmap: month position, category, item position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub month_index: usize,
    pub category: TaskCategory,
    pub task_index: usize,
}

impl TaskKey {
    pub fn new(month_index: usize, category: TaskCategory, task_index: usize) -> Self {
        Self {
            month_index,
            category,
            task_index,
        }
    }
}

/// `{month}-{category}-{task}`, the suffix used in local storage keys.
impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.month_index,
            self.category.as_str(),
            self.task_index
        )
    }
}

impl FromStr for TaskKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (Some(month), Some(category), Some(task)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("malformed task key '{s}'"));
        };
        Ok(TaskKey {
            month_index: month
                .parse()
                .map_err(|_| format!("bad month index in '{s}'"))?,
            category: category.parse()?,
            task_index: task.parse().map_err(|_| format!("bad task index in '{s}'"))?,
        })
    }
}

/// Consecutive-day completion streak. `last_completed_date` is a device-local calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub count: u32,
    pub last_completed_date: Option<NaiveDate>,
}

/// Everything persisted for one (user, roadmap) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    pub tasks: BTreeMap<TaskKey, bool>,
    pub streak: Streak,
}

impl ProgressSnapshot {
    pub fn is_completed(&self, key: &TaskKey) -> bool {
        self.tasks.get(key).copied().unwrap_or(false)
    }
}

/// Where a progress record lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressScope {
    pub user_id: String,
    pub roadmap_id: Uuid,
}

impl ProgressScope {
    pub fn new(user_id: impl Into<String>, roadmap_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            roadmap_id,
        }
    }
}
