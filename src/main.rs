//! Persona Notes
//!
//! Entry point for the persona-notes binary. Parses the command line, loads
//! configuration and logging, then dispatches to the persona and note
//! commands of the library.

mod cli;

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use persona_notes::config::{self, AppConfig};
use persona_notes::error::{Error, Result};
use persona_notes::logging::{self, LogGuards};
use persona_notes::note::{
    copy_all_to_clipboard, render_note, FixedNoteGenerator, GenerationParams, ImageDownloader,
    Note, NoteSession, Osc52Clipboard,
};
use persona_notes::persona::{
    JsonFilePersistence, Persona, PersonaGenerator, PersonaRequest, PersonaStore,
    StubPersonaGenerator,
};
use persona_notes::selection::SelectionSet;
use persona_notes::version;

use crate::cli::{Cli, Commands, ConfigSubcommand, NoteArgs, NoteSubcommand, PersonaSubcommand};

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let config = AppConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;

    let build = version::BuildInfo::current();
    debug!(
        version = %build.full_version(),
        data_dir = %config.storage.data_dir,
        "Starting persona-notes"
    );

    let persistence = JsonFilePersistence::new(config.personas_path(), config.selection_path());
    let mut store = PersonaStore::open(persistence)?;

    match cli.command {
        Commands::Persona { subcommand } => handle_persona_command(subcommand, &config, &mut store),
        Commands::Note { subcommand } => handle_note_command(subcommand, &config, &store),
        Commands::Version | Commands::Config { .. } => {
            // Already handled above
            unreachable!();
        }
    }
}

/// Initialize logging from configuration
fn init_logging_from_config(config: &AppConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

/// Single-threaded runtime for the async parts of a command
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize output: {}", e)))
}

// ─────────────────────────────────────────────────────────────────
// Persona Commands
// ─────────────────────────────────────────────────────────────────

fn handle_persona_command(
    subcommand: PersonaSubcommand,
    config: &AppConfig,
    store: &mut PersonaStore<JsonFilePersistence>,
) -> Result<()> {
    match subcommand {
        PersonaSubcommand::List { json } => {
            if json {
                println!("{}", to_json(store.list())?);
            } else if store.is_empty() {
                println!("No personas yet. Create one with `persona-notes persona create`.");
            } else {
                let selected = store.selected().map(|p| p.id.clone());
                for persona in store.list() {
                    let marker = if selected.as_deref() == Some(persona.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {}", marker, persona_line(persona));
                    if !persona.summary().is_empty() {
                        println!("    {}", persona.summary());
                    }
                }
            }
        }

        PersonaSubcommand::Create {
            target_audience,
            audience_category,
            num_id,
            num_content,
            reference_tags,
        } => {
            let reference_tags = match reference_tags {
                Some(path) => read_tags_file(path)?,
                None => String::new(),
            };
            let request = PersonaRequest {
                target_audience,
                num_id,
                num_content,
                audience_category,
                reference_tags,
            };
            request.validate()?;

            let generator = StubPersonaGenerator::new(config.latency());
            let id = store.next_id();
            let persona = runtime()?.block_on(generator.generate(&request, id))?;
            let line = format!("Created persona {} ({})", persona.id, persona.nickname);
            store.add(persona)?;
            println!("{}", line);
        }

        PersonaSubcommand::Show { id, json } => {
            let persona = store.require(&id)?;
            if json {
                println!("{}", to_json(persona)?);
            } else {
                println!("{}", persona_line(persona));
                println!("Created: {}", persona.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
                println!();
                println!("{}", persona.bio);
            }
        }

        PersonaSubcommand::Delete { ids } => {
            let ids: SelectionSet<String> = ids.into_iter().collect();
            // Unknown ids fail the whole command before anything is removed
            store.resolve(&ids)?;
            let removed = store.remove_by_ids(&ids)?;
            println!("Deleted {} persona(s)", removed);
        }

        PersonaSubcommand::Select { id } => {
            let persona = store.select(&id)?;
            println!("Selected {} ({})", persona.id, persona.nickname);
        }

        PersonaSubcommand::Selected => match store.selected() {
            Some(persona) => println!("{}", persona_line(persona)),
            None => println!("No persona selected."),
        },

        PersonaSubcommand::Unselect => {
            store.clear_selection()?;
            println!("Selection cleared.");
        }
    }

    Ok(())
}

fn persona_line(persona: &Persona) -> String {
    format!(
        "{}  {}  {}岁 {} {}",
        persona.id, persona.nickname, persona.age, persona.gender, persona.job
    )
}

fn read_tags_file(path: PathBuf) -> Result<String> {
    fs::read_to_string(&path).map_err(|e| Error::IoRead { path, source: e })
}

// ─────────────────────────────────────────────────────────────────
// Note Commands
// ─────────────────────────────────────────────────────────────────

fn handle_note_command(
    subcommand: NoteSubcommand,
    config: &AppConfig,
    store: &PersonaStore<JsonFilePersistence>,
) -> Result<()> {
    let (mut params, args, download) = match subcommand {
        NoteSubcommand::Poster { args } => (GenerationParams::poster(), args, false),
        NoteSubcommand::Image {
            keyword,
            download,
            args,
        } => (GenerationParams::image(keyword), args, download),
    };

    let personas = target_personas(&args, store)?;
    let generator = FixedNoteGenerator::new(config.latency());
    let mut session = NoteSession::new(generator);

    runtime()?.block_on(async {
        let notes = session.generate(&personas, &mut params).await?;
        print_notes(notes, &personas, args.json)?;

        if args.copy {
            copy_all_to_clipboard(notes, &mut Osc52Clipboard::stderr())?;
            info!(count = notes.len(), "Copied to clipboard");
        }

        if download {
            let downloader = ImageDownloader::new(config.download_dir(), config.download_timeout())?
                .with_max_bytes(config.download.max_bytes);
            for note in notes {
                let path = downloader.download_note_image(note).await?;
                println!("Saved {}", path.display());
            }
        }

        Ok::<(), Error>(())
    })
}

/// Personas named with `--persona`, or the selected persona when none are.
fn target_personas(args: &NoteArgs, store: &PersonaStore<JsonFilePersistence>) -> Result<Vec<Persona>> {
    if !args.personas.is_empty() {
        let ids: SelectionSet<String> = args.personas.iter().cloned().collect();
        return store.resolve(&ids);
    }
    Ok(store.selected().cloned().into_iter().collect())
}

fn print_notes(notes: &[Note], personas: &[Persona], json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(notes)?);
        return Ok(());
    }
    for (i, note) in notes.iter().enumerate() {
        if i > 0 {
            println!("────────────────────────────────────────");
        }
        print!("{}", render_note(note, personas));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────

fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = AppConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate => {
            AppConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
