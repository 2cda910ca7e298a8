//! Bounded-concurrency embedding of journal entries.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::error::EmbeddingError;
use crate::traits::{ai::Embedder, cache::EmbeddingCache};
use crate::types::{document::EmbeddedDocument, entry::Entry};

/// Embed every entry, at most `max_concurrent` calls in flight.
///
/// Entries are sent in batches of up to [`Embedder::max_batch_size`] texts.
/// Calls complete in any order; the returned documents are in `entries`
/// order. The first failure aborts the whole run. When a cache is supplied,
/// unchanged entries are served from it and fresh embeddings are stored.
pub async fn embed_entries<E>(
    embedder: &E,
    cache: Option<&dyn EmbeddingCache>,
    entries: &[Entry],
    max_concurrent: usize,
) -> Result<Vec<EmbeddedDocument>, EmbeddingError>
where
    E: Embedder + ?Sized,
{
    let mut vectors: Vec<Option<Vec<f32>>> = vec![None; entries.len()];

    if let Some(cache) = cache {
        for (slot, entry) in vectors.iter_mut().zip(entries) {
            *slot = cache
                .get_embedding(&entry.id, &entry.content_hash())
                .await
                .filter(|vector| !vector.is_empty());
        }
    }

    let pending: Vec<usize> = (0..entries.len()).filter(|&i| vectors[i].is_none()).collect();
    let batch_size = embedder.max_batch_size().max(1);

    debug!(
        entries = entries.len(),
        cached = entries.len() - pending.len(),
        batch_size,
        max_concurrent,
        "Embedding entries"
    );

    let embedded: Vec<(&[usize], Vec<Vec<f32>>)> = stream::iter(pending.chunks(batch_size))
        .map(|positions| async move {
            let batch = embed_batch(embedder, cache, entries, positions).await?;
            Ok::<_, EmbeddingError>((positions, batch))
        })
        .buffer_unordered(max_concurrent.max(1))
        .try_collect()
        .await?;

    for (positions, batch) in embedded {
        for (&position, vector) in positions.iter().zip(batch) {
            vectors[position] = Some(vector);
        }
    }

    vectors
        .into_iter()
        .zip(entries)
        .map(|(vector, entry)| {
            vector
                .map(|vector| EmbeddedDocument::from_entry(entry, vector))
                .ok_or(EmbeddingError::EmptyResponse)
        })
        .collect()
}

/// Embed the entries at `positions` with one call, caching the results.
async fn embed_batch<E>(
    embedder: &E,
    cache: Option<&dyn EmbeddingCache>,
    entries: &[Entry],
    positions: &[usize],
) -> Result<Vec<Vec<f32>>, EmbeddingError>
where
    E: Embedder + ?Sized,
{
    let texts: Vec<&str> = positions.iter().map(|&i| entries[i].content.as_str()).collect();

    let result = match texts.as_slice() {
        [text] => embedder.embed(text).await.map(|vector| vec![vector]),
        _ => embedder.embed_batch(&texts).await,
    };
    let vectors = result.map_err(|e| {
        warn!(
            first_entry_id = %entries[positions[0]].id,
            batch_len = positions.len(),
            error = %e,
            "Entry embedding failed"
        );
        e
    })?;

    if vectors.len() != positions.len() {
        return Err(EmbeddingError::Provider(format!(
            "expected {} embeddings, got {}",
            positions.len(),
            vectors.len()
        )));
    }
    if vectors.iter().any(|vector| vector.is_empty()) {
        return Err(EmbeddingError::EmptyResponse);
    }

    if let Some(cache) = cache {
        for (&position, vector) in positions.iter().zip(&vectors) {
            let entry = &entries[position];
            cache
                .store_embedding(&entry.id, &entry.content_hash(), vector)
                .await;
        }
    }

    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryEmbeddingCache;
    use crate::testing::MockEmbedder;
    use std::time::Duration;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new("a", "u", "slow one"),
            Entry::new("b", "u", "fast one"),
            Entry::new("c", "u", "medium one"),
        ]
    }

    #[tokio::test]
    async fn test_results_follow_entry_order_not_completion_order() {
        let embedder = MockEmbedder::new()
            .with_embedding("slow one", vec![1.0, 0.0])
            .with_embedding("fast one", vec![0.0, 1.0])
            .with_embedding("medium one", vec![1.0, 1.0])
            .with_delay("slow one", Duration::from_millis(60))
            .with_delay("medium one", Duration::from_millis(30));

        let docs = embed_entries(&embedder, None, &entries(), 3).await.unwrap();

        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(docs[0].vector, vec![1.0, 0.0]);
        assert_eq!(docs[1].text, "fast one");
    }

    #[tokio::test]
    async fn test_concurrency_stays_within_limit() {
        let entries: Vec<Entry> = (0..6)
            .map(|i| Entry::new(i.to_string(), "u", format!("entry {}", i)))
            .collect();
        let embedder = entries.iter().fold(MockEmbedder::new().with_dimension(4), |m, e| {
            m.with_delay(e.content.clone(), Duration::from_millis(20))
        });

        let docs = embed_entries(&embedder, None, &entries, 2).await.unwrap();

        assert_eq!(docs.len(), 6);
        assert!(embedder.peak_in_flight() <= 2);
        assert!(embedder.peak_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_batches_respect_embedder_batch_size() {
        let entries: Vec<Entry> = (0..5)
            .map(|i| Entry::new(i.to_string(), "u", format!("entry {}", i)))
            .collect();
        let embedder = MockEmbedder::new().with_dimension(4).with_batch_size(2);

        let docs = embed_entries(&embedder, None, &entries, 3).await.unwrap();

        let mut sizes = embedder.batch_sizes();
        sizes.sort();
        // The trailing single entry goes through `embed` directly.
        assert_eq!(sizes, vec![2, 2]);
        assert_eq!(embedder.call_count(), 5);

        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
        assert_eq!(docs[3].text, "entry 3");
    }

    #[tokio::test]
    async fn test_batches_only_carry_uncached_entries() {
        let embedder = MockEmbedder::new().with_dimension(4).with_batch_size(8);
        let cache = MemoryEmbeddingCache::new();
        let mut entries = entries();

        embed_entries(&embedder, Some(&cache), &entries, 2).await.unwrap();
        assert_eq!(embedder.batch_sizes(), vec![3]);

        entries[0].content = "slow one, edited".into();
        entries[2].content = "medium one, edited".into();
        embed_entries(&embedder, Some(&cache), &entries, 2).await.unwrap();

        assert_eq!(embedder.batch_sizes(), vec![3, 2]);
        assert_eq!(embedder.call_count(), 5);
    }

    #[tokio::test]
    async fn test_failure_aborts_batch() {
        let embedder = MockEmbedder::new().fail_on("fast one");
        let err = embed_entries(&embedder, None, &entries(), 2).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_vector_rejected() {
        let embedder = MockEmbedder::new().with_embedding("fast one", vec![]);
        let err = embed_entries(&embedder, None, &entries(), 1).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_cache_skips_unchanged_entries() {
        let embedder = MockEmbedder::new().with_dimension(8);
        let cache = MemoryEmbeddingCache::new();
        let mut entries = entries();

        embed_entries(&embedder, Some(&cache), &entries, 4).await.unwrap();
        assert_eq!(embedder.call_count(), 3);

        entries[1].content = "fast one, edited".into();
        let docs = embed_entries(&embedder, Some(&cache), &entries, 4).await.unwrap();

        assert_eq!(embedder.call_count(), 4);
        assert_eq!(embedder.embedded_texts().last().unwrap(), "fast one, edited");
        assert_eq!(docs[1].text, "fast one, edited");
    }
}
