//! Flat-file credential store.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::{append_file, format, read_file, rewrite_file, CredentialRepository};
use crate::error::Result;
use crate::record::Credential;

/// Accounts kept one per line as `username password role`.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Use the credential file at `path`. Nothing is read until needed.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the store file exists yet.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl CredentialRepository for CredentialStore {
    fn load_all(&self) -> Result<Vec<Credential>> {
        let Some(contents) = read_file(&self.path)? else {
            trace!("{} does not exist yet", self.path.display());
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            match format::parse_credential(line) {
                Some(entry) => entries.push(entry),
                None if line.trim().is_empty() => {}
                None => debug!(
                    "Skipping malformed line {} of {}",
                    index + 1,
                    self.path.display()
                ),
            }
        }
        Ok(entries)
    }

    fn append(&self, entry: &Credential) -> Result<()> {
        format::validate_credential(entry)?;
        append_file(&self.path, &format::format_credential(entry))
    }

    fn rewrite_all(&self, entries: &[Credential]) -> Result<()> {
        let mut contents = String::new();
        for entry in entries {
            format::validate_credential(entry)?;
            contents.push_str(&format::format_credential(entry));
        }
        rewrite_file(&self.path, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Role;
    use crate::storage::scratch_dir;

    fn create_test_store(name: &str) -> CredentialStore {
        CredentialStore::new(scratch_dir(name).join("credentials.txt"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let store = create_test_store("cred_missing");
        assert!(!store.exists());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_creates_file() {
        let store = create_test_store("cred_append");
        store
            .append(&Credential::new("admin", "admin@123", Role::Admin))
            .unwrap();

        assert!(store.exists());
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "admin admin@123 admin\n"
        );
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let store = create_test_store("cred_malformed");
        std::fs::write(
            store.path(),
            "admin admin@123 admin\nbroken line\n\nbob pw staff extra\nann pw parent\n",
        )
        .unwrap();

        let entries = store.load_all().unwrap();
        assert_eq!(
            entries,
            vec![
                Credential::new("admin", "admin@123", Role::Admin),
                Credential::new("ann", "pw", Role::Parent),
            ]
        );
    }

    #[test]
    fn test_rewrite_all_preserves_order() {
        let store = create_test_store("cred_rewrite");
        let entries = vec![
            Credential::new("zed", "1", Role::Accountant),
            Credential::new("amy", "2", Role::Student),
            Credential {
                username: "eve".to_string(),
                password: "3".to_string(),
                role: "janitor".to_string(),
            },
        ];

        store.rewrite_all(&entries).unwrap();
        assert_eq!(store.load_all().unwrap(), entries);
    }

    #[test]
    fn test_rewrite_all_truncates() {
        let store = create_test_store("cred_truncate");
        store
            .rewrite_all(&[
                Credential::new("a", "1", Role::Staff),
                Credential::new("b", "2", Role::Staff),
            ])
            .unwrap();
        store
            .rewrite_all(&[Credential::new("c", "3", Role::Staff)])
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "c 3 staff\n"
        );
    }

    #[test]
    fn test_append_rejects_password_with_space() {
        let store = create_test_store("cred_invalid");
        let result = store.append(&Credential::new("bob", "p w", Role::Staff));

        assert!(result.is_err());
        assert!(!store.exists());
    }
}
