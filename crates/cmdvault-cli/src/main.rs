mod cmd;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cmdvault",
    about = "Personal command snippet manager — authenticated web UI plus JSON API",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the database and start the web server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8932", env = "CMDVAULT_PORT")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0", env = "CMDVAULT_BIND")]
        bind: String,
    },

    /// Initialize the database (schema, migration, admin, seed) and exit
    Init,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { port, bind } => cmd::serve::run(&bind, port),
        Commands::Init => cmd::init::run(),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
