use vidmod_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let (state, router) = vidmod_api::setup::initialize_app(config.clone()).await?;

    vidmod_api::setup::server::start_server(&config, router, state.queue.clone()).await?;

    Ok(())
}
