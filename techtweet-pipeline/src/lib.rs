//! The posting pipeline.
//!
//! Each run walks a fixed sequence of stages:
//!
//! 1. verify the posting account ([`Pipeline::verify`])
//! 2. fetch a headline batch and pick one ([`headlines`])
//! 3. build the prompt for the current day ([`prompt`], [`day`])
//! 4. stream and fold the completion
//! 5. resolve an image ([`images`])
//! 6. publish ([`publish`])
//!
//! Verification and generation stop the run. Headline and image failures
//! degrade to fallbacks, and publish failures come back as a
//! [`PublishOutcome`] with `success: false`.
pub mod day;
pub mod headlines;
pub mod images;
pub mod pipeline;
pub mod prompt;
pub mod publish;
pub mod stage;

pub use day::{clock_day, clock_day_now, SequenceCounter};
pub use images::{HttpImageFetcher, ImageFetcher, ImagePayload, DEFAULT_FALLBACK_IMAGES};
pub use pipeline::{Pipeline, PipelineError, PipelineSettings};
pub use prompt::{build_prompt, PromptStyle};
pub use publish::{publish_post, truncate_post, PublishOutcome, SENT_MESSAGE};
pub use stage::Stage;
