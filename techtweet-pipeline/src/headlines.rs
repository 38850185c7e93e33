use rand::seq::SliceRandom;
use rand::Rng;
use techtweet_news::{Headline, HeadlineSource};

use crate::stage::Stage;

/// Uniform pick from the batch; `None` only when the batch is empty.
pub fn select_headline<'a, R: Rng + ?Sized>(
    headlines: &'a [Headline],
    rng: &mut R,
) -> Option<&'a Headline> {
    headlines.choose(rng)
}

/// Fetch a batch and pick one headline. Every failure degrades to the
/// fallback prompt path.
pub async fn fetch_headline(source: Option<&dyn HeadlineSource>) -> Stage<Option<Headline>> {
    let Some(source) = source else {
        tracing::debug!("pipeline.headline.disabled");
        return Stage::Fallback(None);
    };

    let batch = match source.top_headlines().await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(error = %e, "pipeline.headline.fetch_failed");
            Vec::new()
        }
    };

    let picked = select_headline(&batch, &mut rand::thread_rng()).cloned();
    match picked {
        Some(h) => {
            tracing::info!(title = %h.title, batch = batch.len(), "pipeline.headline.selected");
            Stage::Ok(Some(h))
        }
        None => {
            tracing::info!("pipeline.headline.none");
            Stage::Fallback(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn batch() -> Vec<Headline> {
        ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|t| Headline {
                title: t.to_string(),
                image_url: None,
                published_at: None,
            })
            .collect()
    }

    #[test]
    fn pick_is_always_a_member() {
        let batch = batch();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let h = select_headline(&batch, &mut rng).unwrap();
            assert!(batch.contains(h));
        }
    }

    #[test]
    fn every_member_is_reachable() {
        let batch = batch();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(select_headline(&batch, &mut rng).unwrap().title.clone());
        }
        assert_eq!(seen.len(), batch.len());
    }

    #[test]
    fn empty_batch_has_no_pick() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_headline(&[], &mut rng).is_none());
    }
}
