//! Server configuration loading for the CLI.

use anyhow::{Context, Result};
use room_server::Config;
use std::path::Path;

/// Load the server config, or the defaults when no file is given.
pub async fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    // Config::from_file is blocking; config files are tiny.
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || Config::from_file(&path))
        .await
        .context("Config loader task failed")?
        .context("Failed to load server configuration")
}
