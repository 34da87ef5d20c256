// Career suggestions: quiz answers in, three candidate career paths out.
// All generation calls go through llm_client.

pub mod prompts;
pub mod suggester;
