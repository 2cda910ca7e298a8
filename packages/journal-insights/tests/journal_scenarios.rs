//! End-to-end tests for analysis and question answering.
//!
//! These run the public API against scripted model doubles:
//! 1. Analyze an entry into a record
//! 2. Reject prose with no payload
//! 3. Rank the most relevant entry first and refine from it
//! 4. Refuse an empty journal
//! 5. Keep the partial answer when a refine step fails

use std::sync::Arc;

use journal_insights::{
    testing::{MockEmbedder, MockGenerator},
    AnalysisError, Analyzer, Answerer, Entry, GenerationError, MemoryEmbeddingCache, QaError,
    ValidationErrorKind,
};

const HIKING: &str = "Went hiking up the ridge trail with Sam. Legs are sore but the view was worth it.";
const WORK_STRESS: &str = "Deadline moved up again and my manager keeps piling on tasks. Barely slept.";
const BIRTHDAY: &str = "Mia's birthday party was loud and fun, we stayed out way too late.";
const QUESTION: &str = "What has been stressing me out?";

fn journal() -> Vec<Entry> {
    vec![
        Entry::new("hike", "user-1", HIKING),
        Entry::new("work", "user-1", WORK_STRESS),
        Entry::new("party", "user-1", BIRTHDAY),
    ]
}

/// Embedder where the work entry sits closest to the question.
fn journal_embedder() -> MockEmbedder {
    MockEmbedder::new()
        .with_embedding(QUESTION, vec![1.0, 0.0, 0.0])
        .with_embedding(WORK_STRESS, vec![0.9, 0.1, 0.0])
        .with_embedding(HIKING, vec![0.0, 1.0, 0.0])
        .with_embedding(BIRTHDAY, vec![0.1, 0.0, 1.0])
}

#[tokio::test]
async fn test_promotion_entry_yields_exact_record() {
    let generator = MockGenerator::new().with_response(
        r##"{"mood":"joyful","subject":"career","negative":false,"summary":"Got promoted.","color":"#22cc88","sentimentScore":8}"##,
    );
    let analyzer = Analyzer::new(generator);

    let record = analyzer
        .analyze("Today was a great day, I got a promotion!")
        .await
        .unwrap();

    assert_eq!(record.mood, "joyful");
    assert_eq!(record.subject, "career");
    assert!(!record.negative);
    assert_eq!(record.summary, "Got promoted.");
    assert_eq!(record.color, "#22cc88");
    assert_eq!(record.sentiment_score, 8.0);
}

#[tokio::test]
async fn test_prose_response_is_a_validation_error() {
    let generator = MockGenerator::new()
        .with_response("What a lovely entry! You sound really happy about your new role.");
    let analyzer = Analyzer::new(generator);

    match analyzer.analyze("I got a promotion!").await.unwrap_err() {
        AnalysisError::Validation(e) => {
            assert_eq!(e.kind, ValidationErrorKind::PayloadNotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_most_relevant_entry_is_refined_first() {
    let generator = MockGenerator::new()
        .with_response("Work deadlines.")
        .with_response("Work deadlines, mostly.")
        .with_response("Mostly work deadlines and your manager.");
    let answerer = Answerer::new(generator, journal_embedder());
    let entries = journal();

    let ranked = answerer.retrieve(QUESTION, &entries).await.unwrap();
    assert_eq!(ranked.ids(), vec!["work", "party", "hike"]);

    let answer = answerer.answer(QUESTION, &entries).await.unwrap();
    assert_eq!(answer, "Mostly work deadlines and your manager.");

    let prompts = answerer.generator().prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains(WORK_STRESS));
    assert!(prompts[0].contains(QUESTION));
    assert!(prompts[1].contains(BIRTHDAY) && prompts[1].contains("Work deadlines."));
    assert!(prompts[2].contains(HIKING) && prompts[2].contains("Work deadlines, mostly."));
}

#[tokio::test]
async fn test_empty_journal_never_embeds() {
    let answerer = Answerer::new(MockGenerator::new(), journal_embedder());

    let err = answerer.answer(QUESTION, &[]).await.unwrap_err();

    assert!(matches!(err, QaError::EmptyCorpus));
    assert_eq!(answerer.embedder().call_count(), 0);
    assert_eq!(answerer.generator().call_count(), 0);
}

#[tokio::test]
async fn test_refine_failure_keeps_first_answer() {
    let generator = MockGenerator::new()
        .with_response("Work deadlines.")
        .with_failure(GenerationError::Provider("503: overloaded".into()))
        .with_response("never reached");
    let answerer = Answerer::new(generator, journal_embedder());

    let err = answerer.answer(QUESTION, &journal()).await.unwrap_err();

    match &err {
        QaError::RefineFailure { step, source, .. } => {
            assert_eq!(*step, 2);
            assert!(matches!(source, GenerationError::Provider(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.last_good_answer(), Some("Work deadlines."));
    assert_eq!(answerer.generator().call_count(), 2);
}

#[tokio::test]
async fn test_cache_reuses_entry_embeddings_across_questions() {
    let cache = Arc::new(MemoryEmbeddingCache::new());
    let answerer =
        Answerer::new(MockGenerator::new(), journal_embedder()).with_cache(cache.clone());
    let entries = journal();

    answerer.answer(QUESTION, &entries).await.unwrap();
    assert_eq!(answerer.embedder().call_count(), 4);
    assert_eq!(cache.len(), 3);

    answerer.answer(QUESTION, &entries).await.unwrap();
    assert_eq!(answerer.embedder().call_count(), 5);
}
