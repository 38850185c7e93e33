use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use techtweet_social::{MediaRef, SocialError, SocialPlatform};

use crate::images::ImagePayload;

pub const SENT_MESSAGE: &str = "Tweet sent successfully!";
const ELLIPSIS: &str = "...";

/// Result of a run as reported to callers and HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
}

impl PublishOutcome {
    pub fn sent(post_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(SENT_MESSAGE.to_string()),
            post_id: Some(post_id.into()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>, code: Option<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            code,
            ..Default::default()
        }
    }
}

/// Cap `text` at `max_chars` Unicode scalar values. Longer text keeps its
/// first `max_chars - 3` characters followed by `...`.
pub fn truncate_post(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}

async fn try_publish(
    platform: &dyn SocialPlatform,
    text: &str,
    image: Option<ImagePayload>,
) -> Result<String, SocialError> {
    let media: Vec<MediaRef> = match image {
        Some(img) => vec![platform.upload_media(img.bytes, &img.mime).await?],
        None => Vec::new(),
    };
    let post = platform.publish(text, &media).await?;
    Ok(post.id)
}

/// Upload (when there is an image) and post. Failures are reported in the
/// outcome, never raised, and never retried.
pub async fn publish_post(
    platform: &dyn SocialPlatform,
    message: &str,
    image: Option<ImagePayload>,
    max_chars: usize,
) -> PublishOutcome {
    let text = truncate_post(message, max_chars);
    if let Cow::Owned(_) = text {
        tracing::info!(message_chars = message.chars().count(), max_chars, "pipeline.publish.truncated");
    }
    let with_media = image.is_some();

    match try_publish(platform, &text, image).await {
        Ok(post_id) => {
            tracing::info!(post_id = %post_id, with_media, "pipeline.publish.sent");
            PublishOutcome::sent(post_id)
        }
        Err(e) => {
            let code = e.code();
            tracing::error!(error = %e, code = ?code, with_media, "pipeline.publish.failed");
            PublishOutcome::failed(e.to_string(), code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        let t = "a".repeat(280);
        assert!(matches!(truncate_post(&t, 280), Cow::Borrowed(_)));
    }

    #[test]
    fn long_text_is_cut_to_exactly_max() {
        let t = "b".repeat(281);
        let out = truncate_post(&t, 280);
        assert_eq!(out.chars().count(), 280);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..277], "b".repeat(277));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let t = "🚀".repeat(281);
        let out = truncate_post(&t, 280);
        assert_eq!(out.chars().count(), 280);
        assert!(out.starts_with("🚀🚀"));
        assert_eq!(truncate_post(&"é".repeat(280), 280).chars().count(), 280);
    }

    #[test]
    fn outcome_json_skips_empty_fields() {
        let ok = serde_json::to_value(PublishOutcome::sent("42")).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"success": true, "message": "Tweet sent successfully!", "post_id": "42"})
        );
        let bad = serde_json::to_value(PublishOutcome::failed("boom", Some("403".into()))).unwrap();
        assert_eq!(bad, serde_json::json!({"success": false, "error": "boom", "code": "403"}));
    }
}
