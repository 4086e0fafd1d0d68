//! `careerlens save`: record an answered question.

use std::path::Path;

use careerlens_core::reflection::NewReflection;

pub async fn run(
    config_path: Option<&Path>,
    question: String,
    answer: String,
) -> Result<(), Box<dyn std::error::Error>> {
    // Reject blank input before touching the database.
    let reflection = NewReflection::new(question, answer)?;

    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;
    let saved = store.append(reflection).await?;

    println!(
        "✅ Saved reflection #{} at {}",
        saved.id,
        saved.created_at.format("%Y-%m-%d %H:%M")
    );

    Ok(())
}
