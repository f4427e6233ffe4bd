//! Private key material loading.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ssh::AUTH_TARGET;
use crate::ssh::config::Environment;
use crate::ssh::error::AuthError;

/// Resolves identity file paths and reads their bytes.
///
/// `~/` is expanded against the home directory and relative paths against the
/// working directory, both taken from the injected [`Environment`].
#[derive(Debug, Clone)]
pub struct KeyLoader {
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
}

impl KeyLoader {
    pub fn new(env: &Environment) -> Self {
        Self {
            home: env.home.clone(),
            cwd: env.cwd.clone(),
        }
    }

    /// Turn a user-supplied path into an absolute one where possible.
    ///
    /// Without a home directory a `~/` path is left as written and will fail to load.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let expanded = match (path.strip_prefix("~/"), &self.home) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        };

        match &self.cwd {
            Some(cwd) if expanded.is_relative() => cwd.join(expanded),
            _ => expanded,
        }
    }

    /// Read the key bytes for `path`.
    ///
    /// A missing or unreadable file is an ordinary outcome reported as
    /// [`AuthError::KeyUnavailable`].
    pub fn load(&self, path: &str) -> Result<Vec<u8>, AuthError> {
        let resolved = self.resolve(path);
        read_key(&resolved)
    }
}

fn read_key(path: &Path) -> Result<Vec<u8>, AuthError> {
    std::fs::read(path).map_err(|source| {
        debug!(target: AUTH_TARGET, "cannot read key file '{}': {}", path.display(), source);
        AuthError::KeyUnavailable {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(home: Option<&str>, cwd: Option<&str>) -> KeyLoader {
        KeyLoader::new(&Environment {
            user: None,
            home: home.map(PathBuf::from),
            cwd: cwd.map(PathBuf::from),
        })
    }

    mod resolve {
        use super::*;

        #[test]
        fn test_tilde_expands_to_home() {
            let keys = loader(Some("/home/bob"), Some("/work"));
            assert_eq!(
                keys.resolve("~/.ssh/id_rsa"),
                PathBuf::from("/home/bob/.ssh/id_rsa")
            );
        }

        #[test]
        fn test_relative_resolves_against_cwd() {
            let keys = loader(Some("/home/bob"), Some("/work"));
            assert_eq!(keys.resolve("k"), PathBuf::from("/work/k"));
        }

        #[test]
        fn test_absolute_unchanged() {
            let keys = loader(Some("/home/bob"), Some("/work"));
            assert_eq!(keys.resolve("/abs/k"), PathBuf::from("/abs/k"));
        }

        #[test]
        fn test_tilde_without_home_resolves_under_cwd() {
            let keys = loader(None, Some("/work"));
            assert_eq!(keys.resolve("~/.ssh/id_rsa"), PathBuf::from("/work/~/.ssh/id_rsa"));
        }

        #[test]
        fn test_bare_tilde_user_is_not_expanded() {
            let keys = loader(Some("/home/bob"), Some("/work"));
            assert_eq!(keys.resolve("~alice/k"), PathBuf::from("/work/~alice/k"));
        }
    }

    mod load {
        use super::*;

        #[test]
        fn test_missing_file_is_key_unavailable() {
            let keys = loader(Some("/nonexistent-home"), Some("/nonexistent-cwd"));
            let err = keys.load("~/.ssh/id_dsa").unwrap_err();
            match err {
                AuthError::KeyUnavailable { path, .. } => {
                    assert_eq!(path, PathBuf::from("/nonexistent-home/.ssh/id_dsa"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_reads_key_bytes() {
            let dir = std::env::temp_dir().join(format!("ssh-fallback-key-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("id_test"), b"key material").unwrap();

            let keys = loader(None, Some(dir.to_str().unwrap()));
            let bytes = keys.load("id_test").unwrap();
            assert_eq!(bytes, b"key material");

            std::fs::remove_dir_all(&dir).unwrap();
        }
    }
}
