//! Storage layer for studentrec.
//!
//! Accounts and student records live in two plain-text files. Every mutation
//! other than an append reads the whole file, changes it in memory and
//! truncates-and-rewrites it. There is no locking and no recovery from a
//! crash in the middle of a rewrite.
//!
//! The menus only talk to the [`CredentialRepository`] and
//! [`StudentRepository`] traits, so the flat files can be replaced without
//! touching them.

pub mod credentials;
pub mod format;
pub mod students;

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{Credential, Marks, Role, Session, StudentRecord};

pub use credentials::CredentialStore;
pub use students::StudentStore;

/// Access to the account table.
pub trait CredentialRepository {
    /// Every well-formed entry, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load_all(&self) -> Result<Vec<Credential>>;

    /// Add one entry at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is invalid or the store cannot be written.
    fn append(&self, entry: &Credential) -> Result<()>;

    /// Replace the whole table, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is invalid or the store cannot be written.
    fn rewrite_all(&self, entries: &[Credential]) -> Result<()>;

    /// The first entry whose username and password both match exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<Credential>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|entry| entry.username == username && entry.password == password))
    }

    /// Make sure an admin-role entry with the given username exists.
    ///
    /// Returns `true` if the entry had to be created.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    fn ensure_default_admin_exists(&self, username: &str, password: &str) -> Result<bool> {
        let exists = self
            .load_all()?
            .iter()
            .any(|entry| entry.username == username && entry.has_role(Role::Admin));
        if exists {
            return Ok(false);
        }

        self.append(&Credential::new(username, password, Role::Admin))?;
        info!("Created default admin account '{}'", username);
        Ok(true)
    }

    /// Set the password of every entry owned by the session's account.
    ///
    /// Returns how many entries changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is invalid or the store cannot be
    /// read or written.
    fn update_password(&self, session: &Session, new_password: &str) -> Result<usize> {
        format::validate_token("password", new_password)?;

        let mut entries = self.load_all()?;
        let mut changed = 0;
        for entry in entries.iter_mut().filter(|entry| session.owns(entry)) {
            entry.password = new_password.to_string();
            changed += 1;
        }

        self.rewrite_all(&entries)?;
        debug!(
            "Updated password on {} entries for {} ({})",
            changed, session.username, session.role
        );
        Ok(changed)
    }
}

/// Access to the student table.
pub trait StudentRepository {
    /// Every record up to the first malformed one, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load_all(&self) -> Result<Vec<StudentRecord>>;

    /// Add one record at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is invalid or the store cannot be written.
    fn append(&self, record: &StudentRecord) -> Result<()>;

    /// Replace the whole table, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is invalid or the store cannot be written.
    fn rewrite_all(&self, records: &[StudentRecord]) -> Result<()>;

    /// The first record with the given registration number.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn find_by_regno(&self, regno: &str) -> Result<Option<StudentRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|record| record.regno == regno))
    }

    /// Replace the name and marks of the first record with the given regno.
    ///
    /// Returns `false`, without writing, when no record matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the store cannot be read
    /// or written.
    fn update_by_regno(&self, regno: &str, name: &str, marks: Marks) -> Result<bool> {
        format::validate_name(name)?;

        let mut records = self.load_all()?;
        let Some(record) = records.iter_mut().find(|record| record.regno == regno) else {
            return Ok(false);
        };
        record.name = name.to_string();
        record.marks = marks;

        self.rewrite_all(&records)?;
        Ok(true)
    }

    /// Remove every record with the given regno.
    ///
    /// Returns `false`, without writing, when no record matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    fn delete_by_regno(&self, regno: &str) -> Result<bool> {
        let records = self.load_all()?;
        let before = records.len();
        let remaining: Vec<StudentRecord> = records
            .into_iter()
            .filter(|record| record.regno != regno)
            .collect();
        if remaining.len() == before {
            return Ok(false);
        }

        self.rewrite_all(&remaining)?;
        debug!("Deleted {} records with regno {}", before - remaining.len(), regno);
        Ok(true)
    }

    /// Every record whose name equals the query exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn search_by_name(&self, name: &str) -> Result<Vec<StudentRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|record| record.name == name)
            .collect())
    }
}

/// Both stores, as used by the console.
#[derive(Debug)]
pub struct Registry {
    /// Account table.
    pub credentials: CredentialStore,
    /// Student table.
    pub students: StudentStore,
}

impl Registry {
    /// Open the stores named by the configuration.
    ///
    /// Creates the data directory if it doesn't exist. The files themselves
    /// are created on first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|source| Error::DirectoryCreate {
                path: data_dir.clone(),
                source,
            })?;
        }

        debug!("Using data directory {}", data_dir.display());
        Ok(Self::new(config.credentials_path(), config.students_path()))
    }

    /// Use the given store files.
    #[must_use]
    pub fn new(credentials_path: impl Into<PathBuf>, students_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials: CredentialStore::new(credentials_path),
            students: StudentStore::new(students_path),
        }
    }

    /// Add a student record and the matching student account.
    ///
    /// The two appends are not transactional: if the account cannot be
    /// written the record stays.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is invalid or either store cannot be written.
    pub fn add_student(&self, record: &StudentRecord) -> Result<Credential> {
        let credential = Credential::for_student(&record.regno);
        format::validate_student(record)?;
        format::validate_credential(&credential)?;

        self.students.append(record)?;
        self.credentials.append(&credential)?;
        info!("Added student {}", record.regno);
        Ok(credential)
    }
}

/// Read a whole store file; `None` if it doesn't exist.
fn read_file(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::StoreRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Append text to a store file, creating it if needed.
fn append_file(path: &Path, text: &str) -> Result<()> {
    let write_err = |source: std::io::Error| Error::StoreWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)
}

/// Truncate a store file and write the given contents.
fn rewrite_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| Error::StoreWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// A fresh, empty directory for one test.
#[cfg(test)]
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("studentrec-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_registry(name: &str) -> Registry {
        let dir = scratch_dir(name);
        Registry::new(dir.join("credentials.txt"), dir.join("students.txt"))
    }

    fn create_test_session(username: &str, password: &str, role: Role) -> Session {
        Session::from_credential(Credential::new(username, password, role)).unwrap()
    }

    #[test]
    fn test_add_student_writes_both_stores() {
        let registry = create_test_registry("add_student");
        let record = StudentRecord::new("S100", "Ann Lee", Marks::new(80, 70, 90));

        let credential = registry.add_student(&record).unwrap();
        assert_eq!(credential.password, "S100@123");

        let students = std::fs::read_to_string(registry.students.path()).unwrap();
        assert_eq!(students, "S100\tAnn Lee\t80\t70\t90\n");
        let credentials = std::fs::read_to_string(registry.credentials.path()).unwrap();
        assert_eq!(credentials, "S100 S100@123 student\n");
    }

    #[test]
    fn test_add_student_rejects_tab_in_name_before_writing() {
        let registry = create_test_registry("add_student_tab");
        let record = StudentRecord::new("S1", "Ann\tLee", Marks::default());

        assert!(registry.add_student(&record).is_err());
        assert!(!registry.students.path().exists());
        assert!(!registry.credentials.path().exists());
    }

    #[test]
    fn test_add_student_allows_duplicate_regno() {
        let registry = create_test_registry("add_duplicate");
        let record = StudentRecord::new("S1", "Ann", Marks::default());
        registry.add_student(&record).unwrap();
        registry.add_student(&record).unwrap();

        assert_eq!(registry.students.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_ensure_default_admin_is_idempotent() {
        let registry = create_test_registry("default_admin");
        let creds = &registry.credentials;

        assert!(creds.ensure_default_admin_exists("admin", "admin@123").unwrap());
        assert!(!creds.ensure_default_admin_exists("admin", "admin@123").unwrap());

        let entries = creds.load_all().unwrap();
        assert_eq!(entries, vec![Credential::new("admin", "admin@123", Role::Admin)]);
    }

    #[test]
    fn test_ensure_default_admin_requires_username_and_role() {
        let registry = create_test_registry("default_admin_and");
        let creds = &registry.credentials;
        creds.append(&Credential::new("root", "pw", Role::Admin)).unwrap();
        creds.append(&Credential::new("admin", "pw", Role::Staff)).unwrap();

        assert!(creds.ensure_default_admin_exists("admin", "admin@123").unwrap());
        assert_eq!(creds.load_all().unwrap().len(), 3);
    }

    #[test]
    fn test_ensure_default_admin_keeps_changed_password() {
        let registry = create_test_registry("default_admin_changed");
        let creds = &registry.credentials;
        creds.append(&Credential::new("admin", "n3w", Role::Admin)).unwrap();

        assert!(!creds.ensure_default_admin_exists("admin", "admin@123").unwrap());
        assert_eq!(creds.load_all().unwrap()[0].password, "n3w");
    }

    #[test]
    fn test_find_by_credentials_exact_match_only() {
        let registry = create_test_registry("find_exact");
        let creds = &registry.credentials;
        creds.append(&Credential::new("bob", "Secret", Role::Staff)).unwrap();

        assert!(creds.find_by_credentials("bob", "Secret").unwrap().is_some());
        assert!(creds.find_by_credentials("bob", "secret").unwrap().is_none());
        assert!(creds.find_by_credentials("bob", "Secret ").unwrap().is_none());
        assert!(creds.find_by_credentials("Bob", "Secret").unwrap().is_none());
    }

    #[test]
    fn test_find_by_credentials_first_match_wins() {
        let registry = create_test_registry("find_first");
        let creds = &registry.credentials;
        creds.append(&Credential::new("bob", "pw", Role::Staff)).unwrap();
        creds.append(&Credential::new("bob", "pw", Role::Parent)).unwrap();

        let found = creds.find_by_credentials("bob", "pw").unwrap().unwrap();
        assert!(found.has_role(Role::Staff));
    }

    #[test]
    fn test_update_password_only_touches_matching_role() {
        let registry = create_test_registry("password_role");
        let creds = &registry.credentials;
        creds.append(&Credential::new("bob", "old", Role::Staff)).unwrap();
        creds.append(&Credential::new("bob", "old", Role::Parent)).unwrap();

        let session = create_test_session("bob", "old", Role::Staff);
        assert_eq!(creds.update_password(&session, "new").unwrap(), 1);

        let entries = creds.load_all().unwrap();
        assert_eq!(entries[0], Credential::new("bob", "new", Role::Staff));
        assert_eq!(entries[1], Credential::new("bob", "old", Role::Parent));
    }

    #[test]
    fn test_update_password_updates_all_duplicates() {
        let registry = create_test_registry("password_dupes");
        let creds = &registry.credentials;
        creds.append(&Credential::new("bob", "a", Role::Staff)).unwrap();
        creds.append(&Credential::new("bob", "b", Role::Staff)).unwrap();

        let session = create_test_session("bob", "a", Role::Staff);
        assert_eq!(creds.update_password(&session, "c").unwrap(), 2);
    }

    #[test]
    fn test_update_password_rejects_spaces() {
        let registry = create_test_registry("password_spaces");
        let creds = &registry.credentials;
        creds.append(&Credential::new("bob", "old", Role::Staff)).unwrap();
        let before = std::fs::read(creds.path()).unwrap();

        let session = create_test_session("bob", "old", Role::Staff);
        assert!(creds.update_password(&session, "new pw").is_err());
        assert_eq!(std::fs::read(creds.path()).unwrap(), before);
    }

    #[test]
    fn test_update_by_regno() {
        let registry = create_test_registry("update_regno");
        let students = &registry.students;
        students
            .append(&StudentRecord::new("S1", "Ann", Marks::new(1, 2, 3)))
            .unwrap();

        assert!(students
            .update_by_regno("S1", "Ann Lee", Marks::new(80, 70, 90))
            .unwrap());
        let record = students.find_by_regno("S1").unwrap().unwrap();
        assert_eq!(record.name, "Ann Lee");
        assert_eq!(record.marks, Marks::new(80, 70, 90));
    }

    #[test]
    fn test_update_by_regno_missing() {
        let registry = create_test_registry("update_missing");
        let students = &registry.students;
        students
            .append(&StudentRecord::new("S1", "Ann", Marks::new(1, 2, 3)))
            .unwrap();
        let before = std::fs::read(students.path()).unwrap();

        assert!(!students.update_by_regno("S2", "Bo", Marks::default()).unwrap());
        assert_eq!(std::fs::read(students.path()).unwrap(), before);
    }

    #[test]
    fn test_delete_by_regno() {
        let registry = create_test_registry("delete_regno");
        let students = &registry.students;
        for regno in ["S1", "S2", "S3"] {
            students
                .append(&StudentRecord::new(regno, "Kid", Marks::default()))
                .unwrap();
        }

        assert!(students.delete_by_regno("S2").unwrap());
        let regnos: Vec<String> = students
            .load_all()
            .unwrap()
            .into_iter()
            .map(|record| record.regno)
            .collect();
        assert_eq!(regnos, vec!["S1", "S3"]);
    }

    #[test]
    fn test_delete_missing_regno_leaves_file_identical() {
        let registry = create_test_registry("delete_missing");
        let students = &registry.students;
        students
            .append(&StudentRecord::new("S1", "Ann", Marks::new(1, 2, 3)))
            .unwrap();
        let before = std::fs::read(students.path()).unwrap();

        assert!(!students.delete_by_regno("S9").unwrap());
        assert_eq!(std::fs::read(students.path()).unwrap(), before);
    }

    #[test]
    fn test_search_by_name_is_whole_field() {
        let registry = create_test_registry("search_name");
        let students = &registry.students;
        students
            .append(&StudentRecord::new("S1", "Ann Lee", Marks::default()))
            .unwrap();
        students
            .append(&StudentRecord::new("S2", "Ann", Marks::default()))
            .unwrap();
        students
            .append(&StudentRecord::new("S3", "Ann Lee", Marks::default()))
            .unwrap();

        assert_eq!(students.search_by_name("Ann Lee").unwrap().len(), 2);
        assert_eq!(students.search_by_name("Ann").unwrap().len(), 1);
        assert!(students.search_by_name("ann lee").unwrap().is_empty());
    }

    #[test]
    fn test_registry_open_creates_data_dir() {
        let dir = scratch_dir("open_registry").join("nested").join("data");
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.clone());

        let registry = Registry::open(&config).unwrap();
        assert!(dir.is_dir());
        assert_eq!(registry.students.path(), dir.join("students.txt"));
    }
}
