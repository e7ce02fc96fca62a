//! Authentication management for the pypas access token
//!
//! This module validates access tokens with the service and keeps the
//! accepted token in the global user config file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pypas::app::{ClientConfig, Endpoints, PypasClient};
//! use pypas::auth::{authenticate, save_token};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PypasClient::new(ClientConfig::default(), Endpoints::default())?;
//! let name = authenticate(&client, "my-token").await?;
//! save_token(Path::new("/home/me/.pypas.toml"), "my-token")?;
//! println!("Welcome {}", name);
//! # Ok(())
//! # }
//! ```

pub mod credentials;

// Re-export main public API
pub use credentials::{
    authenticate, clear_token, get_auth_status, prompt_token, save_token, AuthStatus,
};
