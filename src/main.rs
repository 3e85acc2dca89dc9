use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;

use folio::{Config, Migration};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Render, normalize and migrate stored rich-text content")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render stored content to an HTML fragment
    Render {
        /// Stored content: a JSON tree, a JSON-encoded string, or raw legacy HTML
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rendering config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Rewrite stored content as a canonical JSON tree
    Normalize {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Convert legacy HTML content into a JSON tree
    Migrate {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the plain text of stored content
    Text {
        input: PathBuf,

        /// Print a short excerpt instead of the full text
        #[arg(long)]
        excerpt: bool,

        /// Print word count and reading time
        #[arg(long)]
        stats: bool,

        /// Rendering config (TOML), for excerpt length and reading speed
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = folio::logging::init_logging(folio::logging::level_for_verbosity(cli.verbose)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Render {
            input,
            output,
            config,
        } => {
            let value = read_stored(&input)?;
            let config = load_config(config.as_deref());
            let html = folio::render_with_config(&value, &config);
            write_output(output.as_deref(), &html)
        }
        Command::Normalize {
            input,
            output,
            compact,
        } => {
            let value = read_stored(&input)?;
            let normalized = folio::normalize(&value);
            let json = if compact {
                serde_json::to_string(&normalized)
            } else {
                serde_json::to_string_pretty(&normalized)
            }
            .map_err(|e| format!("Error serializing JSON: {}", e))?;
            write_output(output.as_deref(), &json)
        }
        Command::Migrate { input, output } => {
            let value = read_stored(&input)?;
            match folio::migrate_value(&value) {
                Migration::Migrated(doc) => {
                    let json = serde_json::to_string_pretty(&folio::to_value(&doc))
                        .map_err(|e| format!("Error serializing JSON: {}", e))?;
                    write_output(output.as_deref(), &json)
                }
                Migration::AlreadyStructured => {
                    eprintln!("{} is already structured; nothing to do", input.display());
                    Ok(())
                }
                Migration::Skipped => {
                    eprintln!("{} has no content to migrate", input.display());
                    Ok(())
                }
            }
        }
        Command::Text {
            input,
            excerpt,
            stats,
            config,
        } => {
            let value = read_stored(&input)?;
            let config = load_config(config.as_deref());
            let doc = folio::parse(&value);
            let mut out = if excerpt {
                folio::text::excerpt(&doc, config.text.excerpt_length)
            } else {
                folio::text::plain_text(&doc)
            };
            if stats {
                out.push_str(&format!(
                    "\n\nwords: {}\nreading time: {} min",
                    folio::text::word_count(&doc),
                    folio::text::reading_time_minutes(&doc, config.text.words_per_minute)
                ));
            }
            write_output(None, &out)
        }
    }
}

/// Read a stored value: JSON when the file parses as JSON, the raw text otherwise.
fn read_stored(path: &Path) -> Result<Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&content).unwrap_or(Value::String(content)))
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => Config::load(path),
        None => Config::compiled_default(),
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), String> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .map_err(|e| format!("Error writing {}: {}", path.display(), e))?;
            info!("wrote {}", path.display());
            println!("Created {}", path.display());
            Ok(())
        }
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
