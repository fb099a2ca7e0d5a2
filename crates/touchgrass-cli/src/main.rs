use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "touchgrass", version, about = "TouchGrass CLI")]
struct Cli {
    /// Keep all state in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Usage statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Protection, PIN and emergency app settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// First-run walkthrough
    Onboarding {
        #[command(subcommand)]
        action: commands::onboarding::OnboardingAction,
    },
    /// Simulate an unlock and go through the mindful pause
    Lock(commands::lock::LockArgs),
    /// Show the home screen summary
    Dashboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Device and platform detection
    Device {
        #[command(subcommand)]
        action: commands::device::DeviceAction,
    },
    /// Read app state changes ("active"/"inactive") from stdin
    Watch,
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_logging(config: &touchgrass_core::Config) {
    let filter = EnvFilter::try_from_env("TOUCHGRASS_LOG")
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "touchgrass", &mut std::io::stdout());
        return;
    }

    let loaded = touchgrass_core::Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&config);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "using default configuration");
    }

    let result = commands::Context::open(config, cli.ephemeral).and_then(|ctx| match cli.command {
        Commands::Stats { action } => commands::stats::run(&ctx, action),
        Commands::Settings { action } => commands::settings::run(&ctx, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Onboarding { action } => commands::onboarding::run(&ctx, action),
        Commands::Lock(args) => commands::lock::run(&ctx, args),
        Commands::Dashboard { json } => commands::dashboard::run(&ctx, json),
        Commands::Device { action } => commands::device::run(&ctx, action),
        Commands::Watch => commands::watch::run(&ctx),
        Commands::Completions { .. } => Ok(()),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
