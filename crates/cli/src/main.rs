// rowmap CLI - pair rows of two tabular files and export the mapping

use std::fs;
use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use rowmap_cli::exit_codes::EXIT_SUCCESS;
use rowmap_cli::repl::{describe_record, SessionHost};
use rowmap_cli::CliError;
use rowmap_config::LayoutStore;
use rowmap_io::ImportOptions;
use rowmap_recon::model::{Dataset, Side};
use rowmap_recon::{ReconConfig, ReconSession, ReloadPolicy};

#[derive(Parser)]
#[command(name = "rowmap")]
#[command(about = "Reconcile two tabular files by pairing their rows")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a mapping session over a source and a target file
    #[command(after_help = "\
Commands are read from stdin (or --script), one per line. Type 'help' in
a session for the full list.

Examples:
  rowmap session invoices.csv payments.csv
  rowmap session a.csv b.tsv --script pairs.txt --strict > mapped.csv
  rowmap session a.csv b.csv --retain     # 'load target b2.csv' keeps pairs
  printf 'map source row-0 row-3\\nexport\\n' | rowmap session a.csv b.csv")]
    Session {
        /// Source file (CSV/TSV)
        source: PathBuf,

        /// Target file (CSV/TSV)
        target: PathBuf,

        /// Recon config (TOML)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Column layout file; loaded at start and saved on exit
        #[arg(long, env = "ROWMAP_LAYOUT")]
        layout: Option<PathBuf>,

        /// Read commands from this file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,

        /// Input delimiter (sniffed when omitted)
        #[arg(long)]
        delimiter: Option<char>,

        /// Store numeric-looking fields as numbers
        #[arg(long)]
        infer_numbers: bool,

        /// Keep mappings whose records survive a reload
        #[arg(long)]
        retain: bool,

        /// Exit non-zero on the first bad command or ignored operation
        #[arg(long)]
        strict: bool,
    },

    /// List records in a file that contain a term
    #[command(after_help = "\
Examples:
  rowmap search payments.csv globex
  rowmap search payments.csv 1200 --json")]
    Search {
        /// File to search (CSV/TSV)
        file: PathBuf,

        /// Case-insensitive term; omit to list every record
        #[arg(default_value = "")]
        term: String,

        /// Input delimiter (sniffed when omitted)
        #[arg(long)]
        delimiter: Option<char>,

        /// Store numeric-looking fields as numbers
        #[arg(long)]
        infer_numbers: bool,

        /// Output matching records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a recon config file
    Validate {
        /// Config file (TOML)
        config: PathBuf,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    // try_init also routes `log` records from the library crates
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Session {
            source,
            target,
            config,
            layout,
            script,
            delimiter,
            infer_numbers,
            retain,
            strict,
        } => cmd_session(
            source, target, config, layout, script, delimiter, infer_numbers, retain, strict,
        ),
        Commands::Search { file, term, delimiter, infer_numbers, json } => {
            cmd_search(file, term, delimiter, infer_numbers, json)
        }
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_session(
    source: PathBuf,
    target: PathBuf,
    config: Option<PathBuf>,
    layout_path: Option<PathBuf>,
    script: Option<PathBuf>,
    delimiter: Option<char>,
    infer_numbers: bool,
    retain: bool,
    strict: bool,
) -> Result<(), CliError> {
    let mut config = match config {
        Some(path) => load_config(&path)?,
        None => ReconConfig::default(),
    };
    if retain {
        config.reload.policy = ReloadPolicy::Retain;
    }

    let options = ImportOptions {
        delimiter: input_delimiter(delimiter)?,
        infer_numbers,
    };

    let mut session = ReconSession::new(config);
    session.load(Side::Source, load_dataset(&source, options)?);
    session.load(Side::Target, load_dataset(&target, options)?);

    let layout = match &layout_path {
        Some(path) => LayoutStore::load(path).unwrap_or_else(|| {
            LayoutStore::new(session.config().layout.default_column_width)
        }),
        None => LayoutStore::new(session.config().layout.default_column_width),
    };

    let mut host = SessionHost::new(session, layout);
    host.import = options;
    host.strict = strict;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut err = io::stderr();
    let result = match &script {
        Some(path) => {
            let file = fs::File::open(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
            host.run(BufReader::new(file), &mut out, &mut err)
        }
        None => {
            let stdin = io::stdin();
            host.prompt = stdin.is_terminal();
            host.run(stdin.lock(), &mut out, &mut err)
        }
    };

    // Layout is saved even when a strict session stops early
    if let Some(path) = &layout_path {
        host.layout
            .save(path)
            .map_err(|e| CliError::io(format!("cannot save layout {}: {e}", path.display())))?;
        info!("saved layout to {}", path.display());
    }

    result
}

fn cmd_search(
    file: PathBuf,
    term: String,
    delimiter: Option<char>,
    infer_numbers: bool,
    json: bool,
) -> Result<(), CliError> {
    let options = ImportOptions {
        delimiter: input_delimiter(delimiter)?,
        infer_numbers,
    };
    let dataset = load_dataset(&file, options)?;
    let matches = rowmap_recon::selector::filter_candidates(&dataset.records, &term);

    if json {
        let records: Vec<_> = matches.iter().map(|r| r.as_ref()).collect();
        let out = serde_json::to_string_pretty(&records)
            .map_err(|e| CliError::new(rowmap_cli::exit_codes::EXIT_ERROR, e.to_string()))?;
        println!("{out}");
    } else {
        for record in matches {
            println!("{}", describe_record(record, &dataset.columns));
        }
    }
    Ok(())
}

fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&path)?;
    println!(
        "ok: reload={} export.delimiter={:?} export.include_entry_id={}",
        config.reload.policy, config.export.delimiter, config.export.include_entry_id,
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| {
        CliError::config(format!("{}: {e}", path.display()))
            .with_hint("known sections: [reload] policy, [export] include_entry_id/delimiter, [layout] default_column_width")
    })
}

fn load_dataset(path: &Path, options: ImportOptions) -> Result<Dataset, CliError> {
    if !path.exists() {
        return Err(CliError::io(format!("file not found: {}", path.display())));
    }
    let dataset = rowmap_io::import(path, options).map_err(CliError::parse)?;
    info!("{}: {} record(s), {} column(s)", path.display(), dataset.len(), dataset.columns.len());
    Ok(dataset)
}

fn input_delimiter(delimiter: Option<char>) -> Result<Option<u8>, CliError> {
    match delimiter {
        None => Ok(None),
        Some(c) if c.is_ascii() && c != '"' && c != '\n' => Ok(Some(c as u8)),
        Some(c) => Err(CliError::args(format!("unsupported delimiter: {c:?}"))
            .with_hint("use a single ASCII character such as ',' ';' or '\\t'")),
    }
}
