// Shared prompt fragments.
// Each requester keeps its own prompts.rs alongside it; only cross-cutting pieces live here.

/// System prompt that asks for a JSON-only answer.
/// Output is still run through the structured parser because models do not always comply.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured career advisor. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that carries a response schema.
pub const RESPOND_ONLY_JSON: &str = "Respond ONLY with valid JSON:";
