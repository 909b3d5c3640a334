//! The `medboard login`, `signup`, `sso` and `google-login` commands.

use std::path::PathBuf;

use anyhow::Result;

use medboard_client::{create_auth_api, open_session};
use medboard_core::auth::{self as flows, LoginForm, SignupForm, SsoRequest};

use super::{load_config, suggest};

pub async fn login(config_path: Option<PathBuf>, email: String, password: String) -> Result<()> {
    let config = load_config(config_path)?;
    let session = open_session(&config)?;
    let api = create_auth_api(&config)?;

    let nav = flows::login(api.as_ref(), &session, &LoginForm::new(&email, &password)).await?;
    println!("Logged in as {}.", email.trim());
    suggest(nav);
    Ok(())
}

pub async fn signup(
    config_path: Option<PathBuf>,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    let config = load_config(config_path)?;
    let api = create_auth_api(&config)?;

    let message = flows::signup(api.as_ref(), &SignupForm::new(&name, &email, &password)).await?;
    println!("{message}");
    Ok(())
}

pub async fn sso(config_path: Option<PathBuf>, email: String) -> Result<()> {
    let config = load_config(config_path)?;
    let api = create_auth_api(&config)?;

    let message = flows::request_sso(api.as_ref(), &SsoRequest::new(&email)).await?;
    println!("{message}");
    Ok(())
}

pub fn google_login(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let api = create_auth_api(&config)?;

    println!("Open this URL in your browser to sign in with Google:");
    println!("  {}", api.google_login_url());
    Ok(())
}
