//! API credentials stored on local disk.
//!
//! The token file is written by the sign-in flow and read once when the poller
//! starts. A missing or malformed file is fatal for the poller.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the sign-in flow drops the token unless configured otherwise
pub const DEFAULT_CREDENTIALS_PATH: &str = "/tmp/timer-credentials.json";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credential file does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to access credential file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed credential file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("credential token is empty")]
    EmptyToken,
}

/// Bearer token used for every API request
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
}

// Keep the token out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read credentials from `path`
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CredentialsError::Missing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(CredentialsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let credentials: Credentials =
            serde_json::from_str(&contents).map_err(|source| CredentialsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if credentials.token.trim().is_empty() {
            return Err(CredentialsError::EmptyToken);
        }

        Ok(credentials)
    }

    /// Write credentials to `path`, replacing any previous file.
    ///
    /// The token goes to a fresh owner-only temporary file in the same
    /// directory, which is then renamed over `path`. A symlink planted at
    /// `path` is replaced, never followed.
    pub fn store(&self, path: &Path) -> Result<(), CredentialsError> {
        if self.token.trim().is_empty() {
            return Err(CredentialsError::EmptyToken);
        }

        let io_err = |source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let json = serde_json::to_string_pretty(self).map_err(|source| CredentialsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut file = tempfile::Builder::new()
            .prefix(".timebar-credentials")
            .tempfile_in(dir)
            .map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        match Credentials::load(&path) {
            Err(CredentialsError::Missing(p)) => assert_eq!(p, path),
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Credentials::load(&path),
            Err(CredentialsError::Parse { .. })
        ));
    }

    #[test]
    fn missing_token_field_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, r#"{"user": "me"}"#).unwrap();
        assert!(matches!(
            Credentials::load(&path),
            Err(CredentialsError::Parse { .. })
        ));
    }

    #[test]
    fn loads_token_and_ignores_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, r#"{"token": "abc123", "expires": 0}"#).unwrap();
        let creds = Credentials::load(&path).unwrap();
        assert_eq!(creds.token, "abc123");
        assert_eq!(creds.bearer(), "Bearer abc123");
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("creds.json");
        Credentials::new("xyz").store(&path).unwrap();
        assert_eq!(Credentials::load(&path).unwrap(), Credentials::new("xyz"));
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("creds.json")]);
    }

    #[test]
    fn store_rejects_empty_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        assert!(matches!(
            Credentials::new("  ").store(&path),
            Err(CredentialsError::EmptyToken)
        ));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn store_does_not_follow_planted_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let victim = dir.path().join("victim.txt");
        fs::write(&victim, "untouched").unwrap();
        let path = dir.path().join("timer-credentials.json");
        symlink(&victim, path.with_extension("json.tmp")).unwrap();
        symlink(&victim, &path).unwrap();

        Credentials::new("tok").store(&path).unwrap();

        assert_eq!(fs::read_to_string(&victim).unwrap(), "untouched");
        assert!(!fs::symlink_metadata(&path).unwrap().file_type().is_symlink());
        assert_eq!(Credentials::load(&path).unwrap().token, "tok");
    }

    #[cfg(unix)]
    #[test]
    fn stored_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        Credentials::new("tok").store(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", Credentials::new("secret"));
        assert!(!rendered.contains("secret"));
    }
}
