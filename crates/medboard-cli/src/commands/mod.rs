pub mod auth;
pub mod dashboard;
pub mod init;
pub mod quiz;
pub mod session;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use medboard_client::ClientConfig;
use medboard_core::gate::{Navigation, Route};

pub fn load_config(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config = medboard_client::load_config_from(path.as_deref())?;
    debug!(api_url = %config.api_url, "loaded config");
    Ok(config)
}

/// Split a `:name arg` line into its name and trimmed argument.
/// Returns `None` for lines that are not commands.
pub fn split_command(line: &str) -> Option<(&str, &str)> {
    let command = line.trim().strip_prefix(':')?;
    Some(
        command
            .split_once(char::is_whitespace)
            .map(|(name, arg)| (name, arg.trim()))
            .unwrap_or((command, "")),
    )
}

/// Command that takes the user to `route`.
fn route_hint(route: Route) -> &'static str {
    match route {
        Route::Login => "medboard login --email <email> --password <password>",
        Route::Signup => "medboard signup --name <name> --email <email> --password <password>",
        Route::Sso => "medboard sso --email <email>",
        Route::Chat => "medboard quiz",
        Route::Dashboard => "medboard dashboard",
    }
}

/// Carry out a navigation effect. A terminal cannot change pages, so after
/// any requested delay this becomes an error telling the user where to go.
pub async fn follow(nav: Navigation) -> anyhow::Error {
    info!(to = %nav.to, delay_ms = nav.after.as_millis() as u64, "redirect requested");
    if !nav.after.is_zero() {
        tokio::time::sleep(nav.after).await;
    }
    anyhow::anyhow!("redirecting to {}: run `{}`", nav.to, route_hint(nav.to))
}

/// Print where to go next after a successful action.
pub fn suggest(nav: Navigation) {
    println!("Next: {}", route_hint(nav.to));
}
