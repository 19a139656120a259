pub mod agent;
pub mod client;
pub mod enhancer;
pub mod extractor;
pub mod prompts;
pub mod response;

pub use agent::{ChatTurn, PipelineError, ProcessOutcome, ResumeAgent, ResumeInput, ResumeRequest, Stage};
pub use client::{CompletionClient, CompletionError, CompletionRequest, HttpCompletionClient, Provider};
