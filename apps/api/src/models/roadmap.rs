use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Self-reported academic year, as offered on the personalization step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcademicYear {
    #[default]
    #[serde(rename = "First Year")]
    FirstYear,
    #[serde(rename = "Second Year")]
    SecondYear,
    #[serde(rename = "Third Year")]
    ThirdYear,
    #[serde(rename = "Final Year")]
    FinalYear,
    #[serde(rename = "Graduate")]
    Graduate,
}

impl AcademicYear {
    pub const ALL: [AcademicYear; 5] = [
        AcademicYear::FirstYear,
        AcademicYear::SecondYear,
        AcademicYear::ThirdYear,
        AcademicYear::FinalYear,
        AcademicYear::Graduate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AcademicYear::FirstYear => "First Year",
            AcademicYear::SecondYear => "Second Year",
            AcademicYear::ThirdYear => "Third Year",
            AcademicYear::FinalYear => "Final Year",
            AcademicYear::Graduate => "Graduate",
        }
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    /// Course / Book / Website
    #[serde(default, rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One month of the learning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Month {
    /// 1-based month number. Zero means the model omitted it; the requester fills it in.
    #[serde(default)]
    pub month: u32,
    pub title: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub weekly_hours: String,
}

/// The generated roadmap. Six months is the intent of the prompt, not a hard rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapData {
    pub roadmap: Vec<Month>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_estimate: String,
    #[serde(default)]
    pub next_steps: String,
}

impl RoadmapData {
    pub fn total_skills(&self) -> usize {
        self.roadmap.iter().map(|m| m.skills.len()).sum()
    }

    pub fn total_projects(&self) -> usize {
        self.roadmap.iter().map(|m| m.projects.len()).sum()
    }
}

/// Accepts `"5-8 hours"` as well as a bare `6` from the model.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Number(serde_json::Number),
        Nothing(()),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => s,
        Loose::Number(n) => n.to_string(),
        Loose::Nothing(()) => String::new(),
    })
}

/// A roadmap as written to the document store.
#[derive(Debug, Clone)]
pub struct NewRoadmap {
    pub quiz_id: Option<Uuid>,
    pub career: String,
    pub current_skills: String,
    pub current_year: AcademicYear,
    pub roadmap: RoadmapData,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoadmapRow {
    pub id: Uuid,
    pub quiz_id: Option<Uuid>,
    pub career: String,
    pub current_skills: String,
    pub current_year: String,
    pub roadmap: Json<RoadmapData>,
    pub created_at: DateTime<Utc>,
}
