use clap::{Parser, Subcommand};
use keysync_cli::extract::run_extract_command;
use keysync_cli::pull::{PullOptions, run_pull_command};
use keysync_cli::push::run_push_command;
use keysync_cli::remote::{run_create_command, run_drop_command, run_list_command};
use keysync_cli::settings::{build_client, load_specification};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Specification file (defaults to keysync.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log requests and extraction steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract strings from source files and show the resulting keysets.
    Extract {
        /// Source files or glob patterns (defaults to `source_files` of the specification)
        files: Vec<String>,

        /// Language the extracted texts are recorded under (defaults to the development language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Print the keysets as JSON
        #[arg(long)]
        json: bool,

        /// Display full values without truncation
        #[arg(long)]
        full: bool,
    },

    /// Extract development-language strings and upload them, creating missing keysets.
    Push {
        /// Source files or glob patterns (defaults to `source_files` of the specification)
        files: Vec<String>,
    },

    /// List the keysets of the project.
    List,

    /// Create an empty keyset.
    Create {
        /// Keyset id, e.g. Resources/Localizable.strings
        name: String,
    },

    /// Delete a keyset and all of its translations.
    Drop {
        /// Keyset id, e.g. Resources/Localizable.strings
        name: String,
    },

    /// Download one keyset.
    Pull {
        /// Keyset id, e.g. Resources/Localizable.strings
        name: String,

        /// Only export these languages (repeatable)
        #[arg(short, long = "lang")]
        langs: Vec<String>,

        /// Only export values with this status
        #[arg(long)]
        status: Option<String>,

        /// Leave out values that are not safe to ship
        #[arg(long)]
        safe: bool,

        /// Print JSON instead of the service's XML
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<(), String> {
    let spec = load_specification(args.config.as_deref())?;

    match args.commands {
        Commands::Extract {
            files,
            lang,
            json,
            full,
        } => run_extract_command(&spec, &files, lang, json, full),
        Commands::Push { files } => run_push_command(&spec, &build_client(&spec)?, &files),
        Commands::List => run_list_command(&build_client(&spec)?),
        Commands::Create { name } => run_create_command(&build_client(&spec)?, &name),
        Commands::Drop { name } => run_drop_command(&build_client(&spec)?, &name),
        Commands::Pull {
            name,
            langs,
            status,
            safe,
            json,
        } => run_pull_command(
            &build_client(&spec)?,
            &name,
            &PullOptions {
                languages: langs,
                status,
                safe,
                json,
            },
        ),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
