use anyhow::Result;
use cmdvault_core::{bootstrap, config::Config, store};

/// Bootstrap the store, then serve until ctrl-c.
///
/// Bootstrap runs to completion before the listener is bound, so no request
/// ever races the schema migration or the seed.
pub fn run(bind: &str, port: u16) -> Result<()> {
    let config = Config::from_env();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = store::connect(&config.database_url).await?;
        bootstrap::run(&pool, &config).await?;

        let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;

        tokio::select! {
            res = cmdvault_server::serve_on(pool, config.secret_key.as_deref(), listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
