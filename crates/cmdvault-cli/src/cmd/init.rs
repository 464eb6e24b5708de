use anyhow::Result;
use cmdvault_core::{bootstrap, config::Config, store};

/// One-shot bootstrap without starting the server. Useful for provisioning
/// and for capturing a generated admin password before first deploy.
pub fn run() -> Result<()> {
    let config = Config::from_env();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let pool = store::connect(&config.database_url).await?;
        bootstrap::run(&pool, &config).await?;
        println!("database ready at {}", config.database_url);
        Ok(())
    })
}
