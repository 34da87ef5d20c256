// Roadmap: the six-month plan requester, the careers → input → generating → roadmap
// flow that drives it, and the HTTP handlers for both flows and stored roadmaps.

pub mod flow;
pub mod generator;
pub mod handlers;
pub mod prompts;
