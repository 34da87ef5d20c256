use serde::{Deserialize, Serialize};

/// One AI-suggested career path.
///
/// Only `title` is required. The remaining fields are decorative and default to empty
/// so a sparse model answer still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Why this career matches the quiz answers.
    #[serde(default, rename = "match")]
    pub match_reason: String,
    #[serde(default)]
    pub salary: String,
    /// High / Medium / Growing, as labelled by the model.
    #[serde(default)]
    pub demand: String,
}

/// The top-level payload the suggestion prompt asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerSuggestions {
    pub careers: Vec<CareerSuggestion>,
}
