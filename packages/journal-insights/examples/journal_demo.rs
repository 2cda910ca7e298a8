//! Analyze a few journal entries and answer a question against them.
//!
//! ```sh
//! OPENAI_API_KEY=sk-... cargo run -p journal-insights --features openai --example journal_demo
//! ```

use anyhow::{Context, Result};
use journal_insights::ai::OpenAI;
use journal_insights::{Analyzer, AnswerConfig, Answerer, Entry, QaError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const QUESTION: &str = "What has been stressing me out?";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,journal_insights=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let ai = OpenAI::from_env().context("failed to configure OpenAI")?;
    tracing::info!(model = ai.model(), embedding_model = ai.embedding_model(), "Starting journal demo");

    let entries = vec![
        Entry::new(
            "1",
            "demo",
            "Went hiking up the ridge trail this morning. Sore legs, amazing view.",
        ),
        Entry::new(
            "2",
            "demo",
            "The release deadline moved up again. I stayed at the office until 11 and still feel behind.",
        ),
        Entry::new(
            "3",
            "demo",
            "Mia's birthday party tonight. Loud, silly, and exactly what I needed.",
        ),
    ];

    let analyzer = Analyzer::new(ai.clone());
    for entry in &entries {
        match analyzer.analyze_entry(entry).await {
            Ok(analysis) => {
                let record = &analysis.record;
                println!(
                    "[{}] {} / {} ({:+.1}, {}) - {}",
                    entry.id,
                    record.mood,
                    record.subject,
                    record.sentiment_score,
                    record.color,
                    record.summary
                );
            }
            Err(e) => println!("[{}] analysis failed: {e}", entry.id),
        }
    }

    let answerer = Answerer::with_config(ai.clone(), ai, AnswerConfig::new().with_top_k(3));
    match answerer.answer(QUESTION, &entries).await {
        Ok(answer) => println!("\nQ: {QUESTION}\nA: {answer}"),
        Err(e @ QaError::RefineFailure { .. }) => {
            println!("\nQ: {QUESTION}\nPartial answer: {:?}", e.last_good_answer());
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
