use anyhow::{Context, Result};
use timebar_core::{Config, Credentials, HttpApi};

pub fn load_config() -> Result<Config> {
    Config::load().with_context(|| {
        format!(
            "failed to load settings from {}",
            Config::settings_path().display()
        )
    })
}

/// API client authenticated with the stored credentials
pub fn connect(config: &Config) -> Result<HttpApi> {
    let credentials = Credentials::load(&config.credentials_path)
        .context("not signed in (run `timebar sign-in --token <TOKEN>`)")?;
    HttpApi::new(config, credentials).context("failed to build API client")
}
