// Fictional download-link generation
//
// The generator wraps the external text API with rate-limit retry; the
// batch driver runs it over a list of videos, one at a time, with an
// enforced delay to stay under the API's rate limit.

pub mod batch;
pub mod generator;

pub use batch::{batch_items, run_all, BatchItem};
pub use generator::{
    build_prompt, extract_links, GeminiClient, GenerateError, ModelFailure, QualityPreference,
    SummaryGenerator, SummaryResult, TextModel, DEFAULT_MODEL, FICTIONAL_LINK_PREFIX,
};
