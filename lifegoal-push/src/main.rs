use anyhow::Context;
use lifegoal_push::PushConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = PushConfig::from_env().context("loading push service configuration")?;
    log::debug!("{config:?}");
    lifegoal_push::serve(config).await
}
