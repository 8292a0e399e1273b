use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::bail;
use anyhow::Context;

use crate::types::SeedResult;

/// Name of the report server client binary.
pub const CLIENT_BINARY: &str = "CodeChecker";

/// Environment variable to point the seeder at a specific client, either a path or a program
/// name to look up in `PATH`.
pub const SEEDER_CLIENT_PATH_ENV: &str = "SEEDER_CLIENT_PATH";

/// Locate the client the seeder drives, honouring [`SEEDER_CLIENT_PATH_ENV`].
pub fn client_path() -> SeedResult<PathBuf> {
    resolve_client(env::var_os(SEEDER_CLIENT_PATH_ENV))
}

fn resolve_client(configured: Option<OsString>) -> SeedResult<PathBuf> {
    let configured = match configured {
        Some(configured) if configured.is_empty() => {
            bail!("{SEEDER_CLIENT_PATH_ENV} is set but empty")
        }
        Some(configured) => PathBuf::from(configured),
        None => PathBuf::from(CLIENT_BINARY),
    };

    if is_bare_name(&configured) {
        log::debug!("Looking up report client '{}' in PATH", configured.display());
        return which::which(&configured).with_context(|| {
            format!(
                "Report client '{}' is not on PATH, install it or set {SEEDER_CLIENT_PATH_ENV}",
                configured.display()
            )
        });
    }

    if !configured.is_file() {
        bail!(
            "{SEEDER_CLIENT_PATH_ENV} points at {} which is not a file",
            configured.display()
        );
    }

    Ok(configured)
}

fn is_bare_name(path: &Path) -> bool {
    path.components().count() == 1 && path.parent() == Some(Path::new(""))
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn reject_empty_client_path() {
        assert!(resolve_client(Some(OsString::new())).is_err());
    }

    #[test]
    fn reject_missing_client_path() {
        let result = resolve_client(Some("/non/existent/path/to/CodeChecker".into()));
        assert!(result.is_err());
    }

    #[test]
    fn reject_directory_as_client() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        assert!(resolve_client(Some(dir.path().into())).is_err());
    }

    #[test]
    fn use_configured_client_path() {
        let temp = NamedTempFile::new().expect("failed to create temp file");
        let result = resolve_client(Some(temp.path().into())).expect("failed to get client path");
        assert_eq!(temp.path(), result);
    }

    #[test]
    fn bare_name_is_looked_up_in_path() {
        assert!(is_bare_name(Path::new("CodeChecker")));
        assert!(!is_bare_name(Path::new("./CodeChecker")));
        assert!(!is_bare_name(Path::new("/usr/bin/CodeChecker")));

        let result = resolve_client(Some("no-such-report-client-binary".into()));
        assert!(result.is_err());
    }
}
