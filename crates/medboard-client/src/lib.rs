//! medboard-client: HTTP access to the MedBoard tutor API.
//!
//! Implements the `TutorApi` and `AuthApi` traits over reqwest, loads
//! client configuration, and persists the session token on disk.

pub mod config;
pub mod http;
pub mod store;

pub use config::{
    create_auth_api, create_tutor_api, load_config, load_config_from, open_session, ClientConfig,
};
pub use http::HttpClient;
pub use store::FileStore;
