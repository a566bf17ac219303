use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lingo")]
#[command(about = "Lingo: LINE translation relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Write a default configuration file (no credentials) if none exists.
    Init {
        /// Config file path (default: LINGO_CONFIG_PATH or ~/.lingo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the webhook server. Credentials come from LINE_CHANNEL_SECRET, LINE_CHANNEL_ACCESS_TOKEN and GROQ_API_KEY (or the config file).
    Serve {
        /// Config file path (default: LINGO_CONFIG_PATH or ~/.lingo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default: PORT env, then config, then 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the X-Line-Signature for a request body file, for testing the webhook with curl.
    Sign {
        /// Config file path (default: LINGO_CONFIG_PATH or ~/.lingo/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Channel secret to sign with (default: LINE_CHANNEL_SECRET or config)
        #[arg(long)]
        secret: Option<String>,

        /// File containing the exact request body
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("lingo {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Sign {
            config,
            secret,
            file,
        }) => {
            if let Err(e) = run_sign(config, secret, file) {
                log::error!("sign failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lingo::config::default_config_path);
    if lingo::config::init_config(&path)? {
        println!("wrote default configuration to {}", path.display());
    } else {
        println!("configuration already exists at {}", path.display());
    }
    Ok(())
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = lingo::config::load_config(config_path)?;
    log::debug!("using config {}", path.display());
    config.gateway.port = match port {
        Some(p) => p,
        None => lingo::config::resolve_port(&config)?,
    };
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    lingo::gateway::run_gateway(config).await
}

fn run_sign(
    config_path: Option<PathBuf>,
    secret: Option<String>,
    file: PathBuf,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let secret = match secret {
        Some(s) => s,
        None => {
            let (config, _) = lingo::config::load_config(config_path)?;
            lingo::config::resolve_channel_secret(&config).with_context(|| {
                format!(
                    "no channel secret (pass --secret or set {})",
                    lingo::config::ENV_CHANNEL_SECRET
                )
            })?
        }
    };
    let body = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    println!("{}", lingo::signature::sign(&secret, &body));
    Ok(())
}
