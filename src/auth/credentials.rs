//! Access token management for the pypas service
//!
//! The token lives in the global user config file next to any other settings
//! the user keeps there. Saving or clearing it rewrites the file while keeping
//! every other key intact.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::app::PypasClient;
use crate::constants::files;
use crate::errors::{AuthError, AuthResult, TransportError};

const TOKEN_KEY: &str = "token";

/// Authentication status information
#[derive(Debug, Clone)]
pub struct AuthStatus {
    /// Global user config file
    pub config_file: PathBuf,
    /// Whether the config file exists
    pub config_exists: bool,
    /// Whether a non-empty token is stored
    pub token_set: bool,
}

impl AuthStatus {
    /// Get descriptive status message for display
    pub fn status_message(&self) -> String {
        match (self.config_exists, self.token_set) {
            (false, _) => format!("No user config at {}", self.config_file.display()),
            (true, false) => "Not authenticated - run 'pypas auth' to store a token".to_string(),
            (true, true) => "Access token stored".to_string(),
        }
    }
}

/// Check current authentication status of a config file
pub fn get_auth_status(config_file: &Path) -> AuthStatus {
    let token_set = read_table(config_file)
        .ok()
        .and_then(|table| table.get(TOKEN_KEY).and_then(|v| v.as_str()).map(str::to_string))
        .is_some_and(|token| !token.is_empty());

    AuthStatus {
        config_file: config_file.to_path_buf(),
        config_exists: config_file.exists(),
        token_set,
    }
}

/// Prompt for a token without echoing it
pub fn prompt_token() -> AuthResult<String> {
    let token = rpassword::prompt_password("Access token: ")
        .map_err(|e| AuthError::Storage(io::Error::new(io::ErrorKind::Other, e)))?;
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(token)
}

/// Validate a token with the service and return the user's name
pub async fn authenticate(client: &PypasClient, token: &str) -> AuthResult<String> {
    if token.trim().is_empty() {
        return Err(AuthError::EmptyToken);
    }
    match client.authenticate(token).await {
        Ok(name) => {
            info!("Token accepted for {}", name);
            Ok(name)
        }
        Err(TransportError::Http(e)) => Err(AuthError::Http(e)),
        Err(TransportError::Io(e)) => Err(AuthError::Storage(e)),
        Err(TransportError::Rejected { message }) => Err(AuthError::Rejected { message }),
        Err(other) => Err(AuthError::Rejected {
            message: other.to_string(),
        }),
    }
}

/// Store `token` in the config file, keeping its other keys
pub fn save_token(config_file: &Path, token: &str) -> AuthResult<()> {
    let mut table = read_table(config_file)?;
    table.insert(
        TOKEN_KEY.to_string(),
        toml::Value::String(token.to_string()),
    );
    write_table(config_file, &table)?;
    debug!("Token saved to {}", config_file.display());
    Ok(())
}

/// Remove the stored token; returns whether one was present
pub fn clear_token(config_file: &Path) -> AuthResult<bool> {
    if !config_file.exists() {
        return Ok(false);
    }
    let mut table = read_table(config_file)?;
    let removed = table
        .remove(TOKEN_KEY)
        .and_then(|value| value.as_str().map(|token| !token.is_empty()))
        .unwrap_or(false);
    write_table(config_file, &table)?;
    debug!("Token cleared from {}", config_file.display());
    Ok(removed)
}

fn read_table(config_file: &Path) -> AuthResult<toml::Table> {
    if !config_file.exists() {
        return Ok(toml::Table::new());
    }
    let content = fs::read_to_string(config_file)?;
    content
        .parse::<toml::Table>()
        .map_err(|e| AuthError::Serialize {
            path: config_file.to_path_buf(),
            reason: e.message().to_string(),
        })
}

/// Write the table back with owner-only permissions
fn write_table(config_file: &Path, table: &toml::Table) -> AuthResult<()> {
    let content = toml::to_string(table).map_err(|e| AuthError::Serialize {
        path: config_file.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = config_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(config_file)?;
    file.write_all(content.as_bytes())?;

    // Set restrictive permissions (Unix-like systems only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(files::TOKEN_FILE_PERMISSIONS);
        file.set_permissions(perms)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::{ClientConfig, Endpoints};
    use serde_json::json;
    use tempfile::TempDir;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_save_token_preserves_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(".pypas.toml");
        fs::write(
            &config_file,
            "token = \"old\"\n\n[exercise]\nlarge_file_size = 2048\n",
        )
        .unwrap();

        save_token(&config_file, "new-token").unwrap();

        let table: toml::Table = fs::read_to_string(&config_file).unwrap().parse().unwrap();
        assert_eq!(table["token"].as_str(), Some("new-token"));
        assert_eq!(table["exercise"]["large_file_size"].as_integer(), Some(2048));
        assert!(get_auth_status(&config_file).token_set);
    }

    #[test]
    fn test_save_token_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join(".pypas.toml");

        save_token(&config_file, "abc").unwrap();

        let status = get_auth_status(&config_file);
        assert!(status.config_exists);
        assert!(status.token_set);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(".pypas.toml");
        save_token(&config_file, "abc").unwrap();

        let mode = fs::metadata(&config_file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_clear_token() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(".pypas.toml");
        fs::write(&config_file, "token = \"abc\"\n[logging]\nlevel = \"info\"\n").unwrap();

        assert!(clear_token(&config_file).unwrap());
        assert!(!get_auth_status(&config_file).token_set);
        let content = fs::read_to_string(&config_file).unwrap();
        assert!(content.contains("level = \"info\""));

        // Clearing twice is fine
        assert!(!clear_token(&config_file).unwrap());
    }

    #[test]
    fn test_clear_token_without_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(".pypas.toml");
        assert!(!clear_token(&config_file).unwrap());
        assert!(!config_file.exists());
    }

    #[test]
    fn test_status_message() {
        let status = AuthStatus {
            config_file: PathBuf::from("/home/user/.pypas.toml"),
            config_exists: true,
            token_set: false,
        };
        assert!(status.status_message().contains("pypas auth"));
    }

    #[tokio::test]
    async fn test_authenticate_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/access/auth/bad/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": false, "payload": "Invalid token"}),
            ))
            .mount(&server)
            .await;

        let endpoints = Endpoints::with_base(Url::parse(&server.uri()).unwrap());
        let client = PypasClient::new(ClientConfig::default(), endpoints).unwrap();

        match authenticate(&client, "bad").await {
            Err(AuthError::Rejected { message }) => assert_eq!(message, "Invalid token"),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_authenticate_empty_token() {
        let client = PypasClient::new(ClientConfig::default(), Endpoints::default()).unwrap();
        assert!(matches!(
            authenticate(&client, "  ").await,
            Err(AuthError::EmptyToken)
        ));
    }
}
