use barista_auth::Gate;
use coffee_shop::{config::Settings, drinks::Menu, AppState};
use color_eyre::eyre::WrapErr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,coffee_shop=debug")),
        )
        .init();

    let settings = Settings::load().wrap_err("unable to load settings")?;
    let auth = settings
        .auth
        .auth_config()
        .wrap_err("invalid authorization settings")?;

    tracing::info!(
        issuer = %auth.issuer,
        audience = %auth.audience,
        jwks.url = %auth.jwks_url,
        "authorizing against identity provider"
    );

    let gate = Gate::from_config(&auth)?;

    if let Some(interval) = settings.auth.refresh_interval() {
        gate.keys().spawn_refresh(interval);
    }

    let cors = coffee_shop::cors(&settings.cors_origins).wrap_err("invalid CORS origin")?;
    let app = coffee_shop::router(
        AppState {
            gate,
            menu: Menu::seeded(),
        },
        cors,
    );

    let listener = tokio::net::TcpListener::bind(settings.bind)
        .await
        .wrap_err_with(|| format!("unable to bind {}", settings.bind))?;
    tracing::info!(addr = %settings.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "unable to listen for shutdown signal");
    }
}
