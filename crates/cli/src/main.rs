use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;

/// Operate the shelf book catalog service
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    /// Directory holding base.toml and {env}.toml (overrides SHELF_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<std::path::PathBuf>,

    /// Environment name (overrides SHELF_ENV)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Load the configuration, print it, and exit
    CheckConfig,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        if self.config_dir.is_none() && self.env.is_none() {
            return Settings::load();
        }

        let config_dir = match &self.config_dir {
            Some(dir) => dir.clone(),
            None => std::env::var("SHELF_CONFIG_DIR")
                .map(Into::into)
                .unwrap_or_else(|_| "config".into()),
        };
        let env = match &self.env {
            Some(env) => env.clone(),
            None => std::env::var("SHELF_ENV").unwrap_or_else(|_| "local".to_string()),
        };
        Settings::load_from(&config_dir, &env)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli
        .settings()
        .with_context(|| "failed to load shelf settings")?;

    match cli.command {
        Command::CheckConfig => {
            println!("{:#?}", settings);
            Ok(())
        }
        Command::Migrate => {
            shelf_telemetry::init(&settings.telemetry)?;
            let (_pool, _registry, applied) = shelf_app::bootstrap::migrate(&settings).await?;
            tracing::info!(applied, "migrations applied");
            Ok(())
        }
        Command::Serve => {
            shelf_telemetry::init(&settings.telemetry)?;
            shelf_app::bootstrap::serve(&settings).await
        }
    }
}
