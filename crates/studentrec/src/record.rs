//! Core record types for studentrec.
//!
//! This module defines the account and student records kept in the flat-file
//! stores, the closed set of roles, and the session of a signed-in user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Suffix appended to a registration number to form a new student's password.
pub const STUDENT_PASSWORD_SUFFIX: &str = "@123";

/// The kind of account, deciding which menu a session gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control over students and accounts.
    Admin,
    /// Can view and update student records.
    Staff,
    /// Can view their own record.
    Student,
    /// Can view a child's record.
    Parent,
    /// Can view all records.
    Accountant,
}

impl Role {
    /// Every role, in menu-table order.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Staff,
        Role::Student,
        Role::Parent,
        Role::Accountant,
    ];

    /// The tag stored in the credential file.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Student => "student",
            Self::Parent => "parent",
            Self::Accountant => "accountant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::UnknownRole(s.to_string()))
    }
}

/// One row of the credential store.
///
/// The role is kept as the raw tag found in the file so that rewriting the
/// store never drops or alters rows this program cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Login name.
    pub username: String,
    /// Cleartext password.
    pub password: String,
    /// Role tag as stored.
    pub role: String,
}

impl Credential {
    /// Create a credential for a known role.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.as_str().to_string(),
        }
    }

    /// The account a new student gets: the regno with the default suffix.
    #[must_use]
    pub fn for_student(regno: &str) -> Self {
        Self::new(regno, format!("{regno}{STUDENT_PASSWORD_SUFFIX}"), Role::Student)
    }

    /// Check whether this row has the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role.as_str()
    }
}

/// The three marks of a student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks(pub [i32; 3]);

impl Marks {
    /// Create marks from the three subject scores.
    #[must_use]
    pub fn new(m1: i32, m2: i32, m3: i32) -> Self {
        Self([m1, m2, m3])
    }
}

impl FromStr for Marks {
    type Err = Error;

    /// Parse exactly three whitespace-separated integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::invalid_field("marks", "expected three whole numbers");
        let parsed = s
            .split_whitespace()
            .map(str::parse::<i32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        match parsed.as_slice() {
            [m1, m2, m3] => Ok(Self::new(*m1, *m2, *m3)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [m1, m2, m3] = self.0;
        write!(f, "{m1} {m2} {m3}")
    }
}

/// One row of the student store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Registration number; the lookup key.
    pub regno: String,
    /// Full name, may contain spaces.
    pub name: String,
    /// Subject marks.
    pub marks: Marks,
}

impl StudentRecord {
    /// Create a new student record.
    #[must_use]
    pub fn new(regno: impl Into<String>, name: impl Into<String>, marks: Marks) -> Self {
        Self {
            regno: regno.into(),
            name: name.into(),
            marks,
        }
    }
}

/// The signed-in user.
///
/// Passed explicitly through the menus; change password updates it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Login name.
    pub username: String,
    /// Current password, checked again before a password change.
    pub password: String,
    /// Role deciding the menu.
    pub role: Role,
}

impl Session {
    /// Build a session from a matched credential row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRole`] if the row's tag names no known role.
    pub fn from_credential(credential: Credential) -> Result<Self, Error> {
        let role = credential.role.parse()?;
        Ok(Self {
            username: credential.username,
            password: credential.password,
            role,
        })
    }

    /// Check whether a credential row belongs to this session's account.
    #[must_use]
    pub fn owns(&self, credential: &Credential) -> bool {
        credential.username == self.username && credential.has_role(self.role)
    }
}
