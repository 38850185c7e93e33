//! Social network clients used by techtweet.
//!
//! Only X/Twitter is implemented. [`SocialPlatform`] is the seam the pipeline
//! talks to: verify the posting account, upload one image, publish one post.
pub mod traits;
pub mod twitter;

pub use traits::{Account, MediaRef, PublishedPost, SocialError, SocialPlatform};
