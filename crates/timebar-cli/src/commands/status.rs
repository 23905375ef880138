use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use timebar_core::TimerPoller;

use crate::app;

pub async fn run() -> Result<()> {
    let config = app::load_config()?;
    let api = app::connect(&config)?;

    let mut poller = TimerPoller::new(Arc::new(api), config.poll.clone());
    poller.check_once().await?;
    println!("{}", poller.status_at(Utc::now())?.display());
    Ok(())
}
