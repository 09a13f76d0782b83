//! Insight Generation Layer
//!
//! Turns a finished analysis into a prose narrative via a text-generation
//! provider. The dashboard treats every failure here as scoped to the
//! insight panel: charts and rankings render regardless.

pub mod composer;
pub mod prompt;
pub mod provider;

pub use composer::InsightComposer;
pub use prompt::build_prompt;
pub use provider::{
    Completion, GeminiProvider, OpenAiProvider, SharedProvider, TextGenProvider, create_provider,
};
