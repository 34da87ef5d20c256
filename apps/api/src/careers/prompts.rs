// Prompt constants for career suggestions.

/// Number of careers the prompt asks for and the flow displays.
pub const SUGGESTION_COUNT: usize = 3;

pub const SUGGESTION_MAX_TOKENS: u32 = 2000;

/// Suggestion prompt template. Replace `{answers_json}` before sending.
pub const SUGGESTION_PROMPT_TEMPLATE: &str = r#"Based on these career quiz responses: {answers_json}

Suggest exactly 3 suitable tech career paths. For each career path, provide:
1. Role title
2. Brief description (2-3 sentences)
3. Required skills (list 5-6 key skills)
4. Why it matches (2-3 sentences)
5. Average salary range
6. Job demand (High/Medium/Growing)

{respond_only_json}
{
  "careers": [
    {
      "title": "Career Title",
      "description": "Description",
      "skills": ["skill1", "skill2"],
      "match": "Why it matches",
      "salary": "$XX,XXX - $XXX,XXX",
      "demand": "High"
    }
  ]
}"#;
