//! Workflow example - generates a template and refines it twice.
//!
//! Run with: `cargo run --example refine_greeting`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use greetviz::session::{ApiKeyStore, EnvKeyHost, KeyGate};
use greetviz::{GeminiProvider, Workflow};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let keys = ApiKeyStore::default();
    let input = Arc::new(tokio::sync::Mutex::new(
        tokio::io::BufReader::new(tokio::io::stdin()).lines(),
    ));
    let gate = KeyGate::new(EnvKeyHost::new(keys.clone(), "GOOGLE_API_KEY", input));
    let provider = GeminiProvider::builder().key_store(keys).build()?;

    let mut workflow = Workflow::new(gate, Arc::new(provider));
    if !workflow.start().await.is_present() {
        workflow.select_key().await;
    }

    let params = workflow.params_mut();
    params.set_language("zh-TW")?;
    params.location = "Taipei".into();
    workflow.generate().await?;

    for instruction in ["Add more gold accents", "Make the lanterns glow"] {
        workflow.set_edit_instruction(instruction);
        workflow.edit().await?;
    }

    workflow.save_artifact("new-year-wish.png")?;
    println!("Saved new-year-wish.png");
    Ok(())
}
