//! CLI frontend for the Heroforge character progression engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "hf",
    about = "Heroforge: character progression for tabletop campaigns",
    version,
    propagate_version = true
)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new campaign directory with a sample class and character
    Init {
        /// Name of the campaign to create
        name: String,
    },

    /// Validate a campaign file
    Check {
        /// Campaign file
        #[arg(short, long, default_value = "campaign.json")]
        file: PathBuf,
    },

    /// Show derived stats for a character
    Stats {
        /// Character name (case-insensitive)
        character: String,

        /// Campaign file
        #[arg(short, long, default_value = "campaign.json")]
        file: PathBuf,
    },

    /// Award experience and run every level-up it unlocks
    LevelUp {
        /// Character name (case-insensitive)
        character: String,

        /// New experience total
        #[arg(long)]
        xp: u64,

        /// Attributes to raise per level, e.g. `STR,CON` or `STR=3,DEX` in advanced mode
        #[arg(long)]
        raise: Vec<String>,

        /// Skill points per level, e.g. `Climb=1,Swim=1`
        #[arg(long)]
        skills: Vec<String>,

        /// Hit points per level: `roll` or a number
        #[arg(long)]
        hp: Vec<String>,

        /// Use the advanced allocation rules
        #[arg(long)]
        advanced: bool,

        /// RNG seed for hit point rolls
        #[arg(long)]
        seed: Option<u64>,

        /// Player committing the level-up (default: the character's owner)
        #[arg(long = "as")]
        player: Option<String>,

        /// Campaign file
        #[arg(short, long, default_value = "campaign.json")]
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "hf_mechanics=debug,hf=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { name } => commands::init::run(&name),
        Commands::Check { file } => commands::check::run(&file),
        Commands::Stats { character, file } => commands::stats::run(&file, &character),
        Commands::LevelUp {
            character,
            xp,
            raise,
            skills,
            hp,
            advanced,
            seed,
            player,
            file,
        } => commands::level_up::run(
            &file,
            &commands::level_up::LevelUpArgs {
                character: &character,
                xp,
                raise: &raise,
                skills: &skills,
                hp: &hp,
                advanced,
                seed,
                player: player.as_deref(),
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
