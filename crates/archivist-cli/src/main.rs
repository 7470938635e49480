//! archivist CLI: dated archiving and untracked-note discovery for markdown vaults
//!
//! Commands: init, archive, archive-current, report, untracked, links,
//! validate, config, completions

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use archivist_core::settings::{CONFIG_DIR, CONFIG_FILE};
use archivist_core::{ArchivistSettings, FileRef, LinkSource, Storage, ValidatedSettings};
use archivist_engine::{Archiver, CurrentArchive, Trigger};
use archivist_query::{format_discovery, OutputFormat, QueryContext};
use archivist_vault::FsVault;

#[derive(Parser)]
#[command(name = "archivist")]
#[command(version)]
#[command(about = "Dated archiving and untracked-note discovery for markdown vaults")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vault root directory
    #[arg(long, global = true, env = "ARCHIVIST_VAULT", default_value = ".")]
    vault: PathBuf,

    /// Archive as of this date (YYYY-MM-DD) instead of today (UTC)
    #[arg(long, global = true, value_name = "DATE")]
    date: Option<NaiveDate>,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration into a vault
    Init {
        /// Vault directory
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Folder receiving archived files and reports
        #[arg(long, default_value = "Archive")]
        archive_folder: String,
        /// Comma-separated folders in scope for discovery (empty: whole vault)
        #[arg(long, default_value = "")]
        include: String,
        /// Root note for reachability tracking (empty: orphan mode)
        #[arg(long, default_value = "")]
        root: String,
        /// Leave files tagged #mirror out of discovery reports
        #[arg(long)]
        exclude_mirrors: bool,
    },
    /// Archive files into the dated archive folder
    Archive {
        /// Files to archive, in order
        #[arg(required = true)]
        files: Vec<String>,
        /// Keep the originals
        #[arg(long)]
        copy: bool,
    },
    /// Archive the active file, or every file an archive view links to
    ArchiveCurrent {
        /// File to treat as the active one
        #[arg(long)]
        file: Option<String>,
        /// Keep the originals
        #[arg(long)]
        copy: bool,
        /// Only report whether the command applies
        #[arg(long)]
        check: bool,
    },
    /// Create the discovery report of untracked files
    Report {
        /// markdown writes the report into the vault; json prints the
        /// discovery without writing
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
    },
    /// List untracked files
    #[command(alias = "u")]
    Untracked {
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
    /// Show the in-scope links of a file
    Links {
        file: String,
    },
    /// Validate the configuration against the vault
    Validate,
    /// Print the effective configuration
    Config,
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormat {
    Table,
    Json,
    Markdown,
}

impl From<ListFormat> for OutputFormat {
    fn from(format: ListFormat) -> Self {
        match format {
            ListFormat::Table => Self::Table,
            ListFormat::Json => Self::Json,
            ListFormat::Markdown => Self::Markdown,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init {
            path,
            archive_folder,
            include,
            root,
            exclude_mirrors,
        } => cmd_init(
            &path,
            ArchivistSettings {
                archive_folder,
                included_folders: include,
                root_file: root,
                exclude_mirrors,
            },
        ),
        Commands::Archive { files, copy } => {
            let vault = open_vault(&cli.vault)?;
            let archiver = archiver(&vault, cli.date)?;
            cmd_archive(&vault, &archiver, &files, copy)
        }
        Commands::ArchiveCurrent { file, copy, check } => {
            let vault = open_vault(&cli.vault)?;
            if let Some(file) = &file {
                vault.set_active_file(file)?;
            }
            let archiver = archiver(&vault, cli.date)?;
            cmd_archive_current(&archiver, copy, check)
        }
        Commands::Report { format } => {
            let vault = open_vault(&cli.vault)?;
            let archiver = archiver(&vault, cli.date)?;
            cmd_report(&archiver, format)
        }
        Commands::Untracked { format } => {
            let vault = open_vault(&cli.vault)?;
            let archiver = archiver(&vault, cli.date)?;
            let discovery = archiver.discover_untracked()?;
            println!("{}", format_discovery(&discovery, format.into()));
            Ok(())
        }
        Commands::Links { file } => {
            let vault = open_vault(&cli.vault)?;
            let settings = validated_settings(&vault)?;
            cmd_links(&vault, &settings, &file)
        }
        Commands::Validate => {
            let vault = open_vault(&cli.vault)?;
            let settings = validated_settings(&vault)?;
            let mode = if settings.root_file.is_some() {
                "root_tracking"
            } else {
                "orphan"
            };
            print_json(&serde_json::json!({
                "archive_folder": settings.archive_folder,
                "included_folders": settings.included_folders,
                "root_file": settings.root_file,
                "exclude_mirrors": settings.exclude_mirrors,
                "mode": mode,
            }))
        }
        Commands::Config => {
            let settings = load_settings(&cli.vault)?;
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "archivist", &mut io::stdout());
            Ok(())
        }
    }
}

/// `ARCHIVIST_LOG` in the environment always applies; `--verbose` adds DEBUG.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_env("ARCHIVIST_LOG").add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();
}

fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

fn load_settings(root: &Path) -> Result<ArchivistSettings> {
    let path = config_path(root);
    ArchivistSettings::load(&path).with_context(|| format!("failed to load {}", path.display()))
}

fn open_vault(root: &Path) -> Result<FsVault> {
    let vault = FsVault::open(root)
        .with_context(|| format!("failed to open vault at {}", root.display()))?;
    Ok(vault.with_notifier(|message| eprintln!("{message}")))
}

fn validated_settings(vault: &FsVault) -> Result<ValidatedSettings> {
    let settings = load_settings(vault.root())?;
    settings.validate(vault).context("invalid configuration")
}

fn archiver(vault: &FsVault, date: Option<NaiveDate>) -> Result<Archiver<'_, FsVault>> {
    let archiver = Archiver::new(vault, validated_settings(vault)?);
    Ok(match date {
        Some(date) => archiver.with_date(date),
        None => archiver,
    })
}

fn resolve_file(vault: &FsVault, path: &str) -> Result<FileRef> {
    let relative = vault.relativize(path)?;
    vault
        .file(&relative)
        .with_context(|| format!("no such file in the vault: {relative}"))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// --- Commands ---

fn cmd_init(path: &Path, settings: ArchivistSettings) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let config = config_path(path);
    if config.exists() {
        println!("Vault already initialized at {}", path.display());
        return Ok(());
    }

    let vault = FsVault::open(path)?;
    settings.validate(&vault).context("invalid configuration")?;

    std::fs::create_dir_all(path.join(CONFIG_DIR))?;
    std::fs::write(&config, settings.to_toml()?)
        .with_context(|| format!("failed to write {}", config.display()))?;
    println!("Initialized archivist vault at {}", path.display());
    Ok(())
}

fn cmd_archive(
    vault: &FsVault,
    archiver: &Archiver<'_, FsVault>,
    paths: &[String],
    copy: bool,
) -> Result<()> {
    let files = paths
        .iter()
        .map(|path| resolve_file(vault, path))
        .collect::<Result<Vec<_>>>()?;

    let outcome = archiver.archive(&files, copy)?;
    print_json(&serde_json::to_value(&outcome)?)?;
    if !outcome.failures.is_empty() {
        bail!("{} of {} file(s) failed to archive", outcome.failures.len(), files.len());
    }
    Ok(())
}

fn cmd_archive_current(archiver: &Archiver<'_, FsVault>, copy: bool, check: bool) -> Result<()> {
    let trigger = if check { Trigger::Check } else { Trigger::Execute };
    let result = archiver.archive_current(trigger, copy)?;
    print_json(&serde_json::json!({
        "applicable": result.applicable(),
        "result": result,
    }))?;
    if let CurrentArchive::Archived(outcome) = &result {
        if !outcome.failures.is_empty() {
            bail!("{} file(s) failed to archive", outcome.failures.len());
        }
    }
    Ok(())
}

fn cmd_report(archiver: &Archiver<'_, FsVault>, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let discovery = archiver.discover_untracked()?;
            println!("{}", format_discovery(&discovery, OutputFormat::Json));
        }
        ReportFormat::Markdown => {
            let report = archiver
                .create_discovery_report()
                .context("failed to create the discovery report")?;
            println!("{}", report.path);
        }
    }
    Ok(())
}

fn cmd_links(vault: &FsVault, settings: &ValidatedSettings, path: &str) -> Result<()> {
    let file = resolve_file(vault, path)?;
    let query = QueryContext::from_settings(vault, settings);
    let unresolved = vault
        .snapshot()?
        .unresolved
        .remove(&file.path)
        .unwrap_or_default();

    let outbound = query.outbound_links(&file)?;
    let inbound = query.inbound_links(&file)?;
    let orphan = query.is_orphan(&file)?;
    let tags = vault.read_tags(&file.path).unwrap_or_default();

    print_json(&serde_json::json!({
        "path": file.path,
        "kind": file.kind,
        "outbound": outbound,
        "inbound": inbound,
        "orphan": orphan,
        "tags": tags,
        "unresolved": unresolved,
    }))
}
