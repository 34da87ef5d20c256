// Prompt constants for roadmap generation.

pub const ROADMAP_MAX_TOKENS: u32 = 3000;

/// Months the prompt asks for. Not enforced on the response.
pub const ROADMAP_MONTHS: usize = 6;

/// Substituted for `{current_skills}` when the user leaves the field blank.
pub const BEGINNER_SKILLS: &str = "Complete beginner";

/// Roadmap prompt template. Replace `{career_title}`, `{current_skills}` and
/// `{current_year}` before sending.
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"Create a detailed 6-month learning roadmap for a {current_year} student wanting to become a {career_title}.

Current skills: {current_skills}
Current year: {current_year}

For each month, provide:
- Main focus/theme
- Specific skills to learn (be very specific, not generic)
- 3-4 recommended resources (courses, books, websites)
- 2-3 hands-on projects to build
- Estimated weekly hours needed

{respond_only_json}
{
  "roadmap": [
    {
      "month": 1,
      "title": "Month title",
      "focus": "Main focus description",
      "skills": ["specific skill 1", "specific skill 2"],
      "resources": [
        {"name": "Resource name", "type": "Course/Book/Website", "link": "URL or platform"}
      ],
      "projects": [
        {"name": "Project name", "description": "What you'll build"}
      ],
      "weeklyHours": "5-8 hours"
    }
  ],
  "totalEstimate": "Total hours needed",
  "nextSteps": "What to do after 6 months"
}"#;
