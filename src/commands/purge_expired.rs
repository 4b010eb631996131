use tracing::info;

use crate::controllers::paste;
use crate::App;

pub async fn run(mut app: App) -> anyhow::Result<()> {
    let now = app.clock.now();
    let count = paste::purge_expired(&mut app, now).await?;
    if count == 0 {
        info!("no expired pastes");
    }
    Ok(())
}
