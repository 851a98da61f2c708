//! CLI for GreetViz - New Year greeting post templates.

use clap::{Args, Parser, Subcommand};
use greetviz::config::Settings;
use greetviz::session::{ApiKeyStore, EnvKeyHost, SharedLines};
use greetviz::{
    CredentialAvailability, GeminiProvider, ImageProvider, KeyGate, Workflow, WorkflowStatus,
    LANGUAGES,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "greetviz")]
#[command(about = "Create New Year greeting post templates in 100+ languages with Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Settings file (defaults to ./greetviz.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the languages a greeting can be written in
    Languages,

    /// Generate a template, optionally refine it, and save it
    Generate(GenerateArgs),

    /// Interactive session: generate, then refine step by step
    Studio,

    /// Verify that the API key can reach the model
    Check,
}

#[derive(Args)]
struct GenerateArgs {
    /// Language code (see `greetviz languages`)
    #[arg(short, long)]
    language: Option<String>,

    /// City or country, used to pick cultural symbols
    #[arg(short = 'L', long)]
    location: String,

    /// Cultural elements to include, e.g. "Red envelopes, lanterns"
    #[arg(short, long)]
    cultural: Option<String>,

    /// Refinement applied after generation; repeat for several passes
    #[arg(short, long = "edit")]
    edits: Vec<String>,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

type Input = SharedLines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Languages => list_languages(cli.json)?,
        Commands::Generate(args) => generate(args, &settings, cli.json).await?,
        Commands::Studio => studio(&settings).await?,
        Commands::Check => check(&settings, cli.json).await?,
    }

    Ok(())
}

/// Wires the key gate, the provider and the workflow around one stdin reader.
fn open_session(settings: &Settings) -> anyhow::Result<(Workflow, Arc<dyn ImageProvider>, Input)> {
    let keys = ApiKeyStore::default();
    let input: Input = Arc::new(tokio::sync::Mutex::new(
        BufReader::new(tokio::io::stdin()).lines(),
    ));
    let host = EnvKeyHost::new(keys.clone(), settings.api_key_env.clone(), Arc::clone(&input));

    let mut builder = GeminiProvider::builder()
        .key_store(keys)
        .model(settings.gemini_model()?);
    if let Some(ref base) = settings.api_base {
        builder = builder.api_base(base);
    }
    let provider: Arc<dyn ImageProvider> = Arc::new(builder.build()?);

    let mut workflow = Workflow::new(KeyGate::new(host), Arc::clone(&provider));
    workflow
        .params_mut()
        .set_language(&settings.default_language)?;
    Ok((workflow, provider, input))
}

/// Runs the key gate until a key is assumed present.
async fn ensure_key(workflow: &mut Workflow) {
    if workflow.credential() == CredentialAvailability::Unknown {
        workflow.start().await;
    }
    if workflow.credential() != CredentialAvailability::Present {
        eprintln!("A paid Gemini API key is required to generate templates.");
        workflow.select_key().await;
    }
}

async fn generate(args: GenerateArgs, settings: &Settings, json_output: bool) -> anyhow::Result<()> {
    let (mut workflow, _provider, _input) = open_session(settings)?;
    ensure_key(&mut workflow).await;

    let params = workflow.params_mut();
    if let Some(ref code) = args.language {
        params.set_language(code)?;
    }
    params.location = args.location;
    params.cultural_elements = args.cultural;

    workflow.generate().await?;
    let mut applied = 0;
    for edit in &args.edits {
        workflow.set_edit_instruction(edit.as_str());
        if !workflow.can_edit() {
            tracing::warn!("skipping blank --edit");
            continue;
        }
        workflow.edit().await?;
        applied += 1;
    }

    let output = args.output.unwrap_or_else(|| settings.output.clone());
    workflow.save_artifact(&output)?;
    report_saved(&workflow, &output, applied, json_output)
}

fn report_saved(
    workflow: &Workflow,
    output: &Path,
    edits: usize,
    json_output: bool,
) -> anyhow::Result<()> {
    let Some(image) = workflow.artifact() else {
        anyhow::bail!("no template generated");
    };
    let params = workflow.params();

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format.extension(),
            "language": params.language.code,
            "location": params.location,
            "edits": edits,
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Saved template: {} ({} bytes) in {}",
            output.display(),
            image.size(),
            params.language
        );
        if edits > 0 {
            println!("Refinements applied: {}", edits);
        }
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }
    Ok(())
}

const STUDIO_HELP: &str = "\
Commands:
  language <code>     choose the greeting language (see `languages`)
  location <text>     city or country for cultural symbols (required)
  cultural [text]     optional cultural elements; empty clears
  generate            create a new template
  edit <instruction>  refine the current template
  save [path]         save the current template
  languages           list language codes
  status              show the form and the template
  key                 select another API key
  help                show this help
  quit                leave";

async fn studio(settings: &Settings) -> anyhow::Result<()> {
    let (mut workflow, _provider, input) = open_session(settings)?;
    let preview = settings.output.clone();

    println!("Global New Year - greeting template studio");
    println!("Type `help` for commands.");
    tokio::spawn(report_progress(workflow.subscribe()));

    loop {
        if workflow.credential() != CredentialAvailability::Present {
            ensure_key(&mut workflow).await;
        }

        print_prompt(&workflow);
        let Some(line) = input.lock().await.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{STUDIO_HELP}"),
            "languages" => list_languages(false)?,
            "language" => match workflow.params_mut().set_language(rest) {
                Ok(()) => println!("Language: {}", workflow.params().language),
                Err(e) => println!("{e}"),
            },
            "location" => workflow.params_mut().location = rest.to_string(),
            "cultural" => {
                workflow.params_mut().cultural_elements =
                    (!rest.is_empty()).then(|| rest.to_string());
            }
            "generate" => {
                if workflow.generate().await.is_ok() {
                    show_preview(&workflow, &preview);
                }
            }
            "edit" => {
                if workflow.artifact().is_none() {
                    println!("Generate a template first.");
                    continue;
                }
                workflow.set_edit_instruction(rest);
                if !workflow.can_edit() {
                    println!("Describe the change, e.g. `edit Add more gold accents`.");
                    continue;
                }
                if workflow.edit().await.is_ok() {
                    show_preview(&workflow, &preview);
                }
            }
            "save" => {
                let path = if rest.is_empty() {
                    preview.clone()
                } else {
                    PathBuf::from(rest)
                };
                match workflow.save_artifact(&path) {
                    Ok(()) => println!("Saved {}", path.display()),
                    Err(e) => println!("{e}"),
                }
            }
            "status" => print_status(&workflow),
            "key" => {
                workflow.select_key().await;
            }
            other => println!("Unknown command `{other}`. Type `help`."),
        }

        if let Some(ref error) = workflow.status().error {
            println!("! {error}");
        }
    }

    Ok(())
}

/// Prints a progress line each time a request starts.
async fn report_progress(mut status: watch::Receiver<WorkflowStatus>) {
    let mut was_busy = false;
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        if current.is_busy() && !was_busy {
            if current.generating {
                println!("Designing in high quality...");
            } else {
                println!("Applying refinements...");
            }
        }
        was_busy = current.is_busy();
    }
}

fn print_prompt(workflow: &Workflow) {
    use std::io::Write;
    print!("[{}] > ", workflow.params().language.code);
    std::io::stdout().flush().ok();
}

fn show_preview(workflow: &Workflow, preview: &Path) {
    match workflow.save_artifact(preview) {
        Ok(()) => println!("Template written to {}", preview.display()),
        Err(e) => println!("Could not write preview: {e}"),
    }
}

fn print_status(workflow: &Workflow) {
    let params = workflow.params();
    println!("Language:  {}", params.language);
    println!(
        "Location:  {}",
        if params.location.is_empty() {
            "(not set)"
        } else {
            params.location.as_str()
        }
    );
    println!(
        "Cultural:  {}",
        params.cultural_elements.as_deref().unwrap_or("(automatic)")
    );
    match workflow.artifact() {
        Some(image) => println!(
            "Template:  {} bytes ({})",
            image.size(),
            image.format.mime_type()
        ),
        None => println!("Template:  none yet"),
    }
}

async fn check(settings: &Settings, json_output: bool) -> anyhow::Result<()> {
    let (mut workflow, provider, _input) = open_session(settings)?;
    ensure_key(&mut workflow).await;

    let result = provider.health_check().await;
    if json_output {
        let report = serde_json::json!({
            "provider": provider.name(),
            "model": settings.gemini_model()?.as_str(),
            "ok": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &result {
            Ok(()) => println!("✓ {} ({})", provider.name(), settings.gemini_model()?.as_str()),
            Err(e) => println!("✗ {}: {}", provider.name(), e),
        }
    }
    result.map_err(anyhow::Error::from)
}

fn list_languages(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(LANGUAGES)?);
    } else {
        println!("Available languages:\n");
        for lang in LANGUAGES {
            println!("  {:<6} {}", lang.code, lang);
        }
    }
    Ok(())
}
