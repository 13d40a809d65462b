use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, EnvFilter};
use virtualcard::{jobs, settings, storage, web};

#[derive(Parser, Debug)]
#[command(
    name = "virtualcard",
    version,
    about = "Virtual membership cards and short-lived QR codes"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database + migrations)
    let db = storage::init(&settings.database).await?;

    // background sweep, kept alive for the lifetime of the server
    let _scheduler = if settings.jobs.enabled {
        Some(jobs::init_scheduler(db.clone(), &settings.jobs).await?)
    } else {
        tracing::info!("Background jobs are disabled");
        None
    };

    // start web server
    web::serve(settings, db).await?;
    Ok(())
}
