use anyhow::{Context, Result};
use timebar_core::{Credentials, StatusEndpoint, StatusMessage, send_once};

use crate::app;

pub async fn run(token: String) -> Result<()> {
    let config = app::load_config()?;
    let credentials = Credentials::new(token.trim());
    credentials.store(&config.credentials_path).with_context(|| {
        format!(
            "failed to store credentials at {}",
            config.credentials_path.display()
        )
    })?;
    println!("Signed in (credentials saved to {})", config.credentials_path.display());

    let endpoint = StatusEndpoint::default_for_platform();
    match send_once(&endpoint, &StatusMessage::CredentialsUpdated).await {
        Ok(()) => println!("Notified running tray"),
        Err(e) => tracing::info!("no running tray to notify: {e}"),
    }
    Ok(())
}
