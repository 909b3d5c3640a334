//! The `medboard init` command.

use anyhow::Result;

use medboard_client::config::LOCAL_CONFIG_FILE;

pub fn execute() -> Result<()> {
    if std::path::Path::new(LOCAL_CONFIG_FILE).exists() {
        println!("{LOCAL_CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(LOCAL_CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {LOCAL_CONFIG_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Point api_url in {LOCAL_CONFIG_FILE} at your MedBoard server");
    println!("  2. Run: medboard signup --name <name> --email <email> --password <password>");
    println!("  3. Run: medboard login --email <email> --password <password>");
    println!("  4. Run: medboard quiz --specialty Cardiology");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# medboard configuration

# Base URL of the tutor API (MEDBOARD_API_URL overrides this).
api_url = "http://localhost:8000"
timeout_secs = 10

# Where the session token is stored. Defaults to ~/.config/medboard/session.json.
# session_file = "${HOME}/.config/medboard/session.json"

default_specialty = "General Medicine"
default_difficulty = "Intermediate"

# discipline, body_system, specialty, question_type, age_group, acuity, pathophysiology
default_group_by = "discipline"
"#;
