//! The `medboard logout` and `medboard status` commands.

use std::path::PathBuf;

use anyhow::Result;

use medboard_client::open_session;

use super::{load_config, suggest};

pub fn logout(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let session = open_session(&config)?;

    let nav = session.end()?;
    println!("Logged out.");
    suggest(nav);
    Ok(())
}

pub fn status(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let session = open_session(&config)?;

    println!("API: {}", config.api_url);
    if session.is_authenticated() {
        println!("Logged in.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
