use color_eyre::eyre::{Result, eyre};
use soma_adapters::Settings;
use soma_school_service::{SchoolService, build_state, connect_from_settings};
use tokio::net::TcpListener;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    init_tracing()?;

    let settings = Settings::load()?;

    let pool = connect_from_settings(&settings).await?;
    let state = build_state(&settings, pool).map_err(|e| eyre!(e))?;

    let listener = TcpListener::bind(settings.application.address()).await?;

    SchoolService::new(state).run(listener).await?;

    Ok(())
}

fn init_tracing() -> Result<()> {
    let fmt_layer = fmt::layer().compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}
