//! Greeting generation example - draws a Cantonese New Year template.
//!
//! Run with: `cargo run --example generate_greeting -- "Hong Kong"`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use greetviz::prompt::generation_prompt;
use greetviz::{AspectRatio, GeminiProvider, GenerationRequest, ImageProvider, ImageSize};

#[tokio::main]
async fn main() -> greetviz::Result<()> {
    let location = std::env::args().nth(1).unwrap_or_else(|| "Hong Kong".into());

    let provider = GeminiProvider::builder().build()?;

    let request = GenerationRequest::new(generation_prompt(
        "Canton Chinese",
        &location,
        Some("Red envelopes and lanterns"),
    ))
    .with_aspect_ratio(AspectRatio::Square)
    .with_image_size(ImageSize::OneK);

    let image = provider.generate(&request).await?;
    image.save("new-year-wish.png")?;
    println!("Saved new-year-wish.png ({} bytes)", image.size());

    Ok(())
}
