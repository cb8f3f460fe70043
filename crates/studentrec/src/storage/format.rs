//! Line formats of the two store files.
//!
//! Credentials are `username password role`, whitespace separated.
//! Students are `regno<TAB>name<TAB>m1<TAB>m2<TAB>m3`.

use crate::error::{Error, Result};
use crate::record::{Credential, Marks, StudentRecord};

/// Field separator of the student store.
pub const STUDENT_FIELD_SEPARATOR: char = '\t';

/// Check a value stored as a whitespace-delimited token.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] if the value is empty or contains whitespace.
pub fn validate_token(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_field(field, "must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(Error::invalid_field(field, "must not contain spaces"));
    }
    Ok(())
}

/// Check a student name, which may contain spaces but not tabs or line breaks.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] if the name contains a tab or line break.
pub fn validate_name(value: &str) -> Result<()> {
    if value.contains([STUDENT_FIELD_SEPARATOR, '\n', '\r']) {
        return Err(Error::invalid_field(
            "name",
            "must not contain tabs or line breaks",
        ));
    }
    Ok(())
}

/// Check every field of a credential before it is written.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] for the first field that would break the format.
pub fn validate_credential(credential: &Credential) -> Result<()> {
    validate_token("username", &credential.username)?;
    validate_token("password", &credential.password)?;
    validate_token("role", &credential.role)
}

/// Check every field of a student record before it is written.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] for the first field that would break the format.
pub fn validate_student(record: &StudentRecord) -> Result<()> {
    validate_token("regno", &record.regno)?;
    validate_name(&record.name)
}

/// Parse one credential line; `None` unless it has exactly three tokens.
#[must_use]
pub fn parse_credential(line: &str) -> Option<Credential> {
    let mut tokens = line.split_whitespace();
    let (username, password, role) = (tokens.next()?, tokens.next()?, tokens.next()?);
    if tokens.next().is_some() {
        return None;
    }
    Some(Credential {
        username: username.to_string(),
        password: password.to_string(),
        role: role.to_string(),
    })
}

/// Render one credential line, including the trailing newline.
#[must_use]
pub fn format_credential(credential: &Credential) -> String {
    format!(
        "{} {} {}\n",
        credential.username, credential.password, credential.role
    )
}

/// Parse one student line; `None` if any of the five fields is malformed.
///
/// The name is kept verbatim; the other fields tolerate surrounding blanks.
#[must_use]
pub fn parse_student(line: &str) -> Option<StudentRecord> {
    let fields: Vec<&str> = line.split(STUDENT_FIELD_SEPARATOR).collect();
    let [regno, name, m1, m2, m3] = fields.as_slice() else {
        return None;
    };

    let regno = regno.trim();
    if regno.is_empty() {
        return None;
    }
    let mark = |field: &str| field.trim().parse::<i32>().ok();

    Some(StudentRecord::new(
        regno,
        *name,
        Marks::new(mark(m1)?, mark(m2)?, mark(m3)?),
    ))
}

/// Render one student line, including the trailing newline.
#[must_use]
pub fn format_student(record: &StudentRecord) -> String {
    let [m1, m2, m3] = record.marks.0;
    format!("{}\t{}\t{m1}\t{m2}\t{m3}\n", record.regno, record.name)
}
