//! The individual menu actions.

use tracing::info;

use crate::console::Console;
use crate::error::Result;
use crate::record::{Credential, Role, Session, StudentRecord};
use crate::storage::{format, CredentialRepository, Registry, StudentRepository};

/// Read a student name: the whole line, kept as typed, re-prompting while it
/// is blank or holds a tab.
fn read_name<C: Console>(console: &mut C, prompt: &str) -> Result<String> {
    loop {
        let name = console.read_line(prompt)?;
        if name.trim().is_empty() {
            console.say("Name must not be empty.")?;
            continue;
        }
        match format::validate_name(&name) {
            Ok(()) => return Ok(name),
            Err(e) => console.say(&e.user_message())?,
        }
    }
}

fn summary_line(record: &StudentRecord) -> String {
    format!("{} {} {}", record.regno, record.name, record.marks)
}

pub(super) fn add_student<C: Console>(console: &mut C, registry: &Registry) -> Result<()> {
    let regno = console.read_word("Regno: ")?;
    let name = read_name(console, "Name: ")?;
    let marks = console.read_marks("Marks (3): ")?;

    let credential = registry.add_student(&StudentRecord::new(regno, name, marks))?;

    console.say("Student added.")?;
    console.say(&format!("Login → {}", credential.username))?;
    console.say(&format!("Password → {}", credential.password))?;
    console.read_line("\nPress Enter to continue...")?;
    Ok(())
}

pub(super) fn show_all<C: Console, S: StudentRepository>(console: &mut C, students: &S) -> Result<()> {
    let records = students.load_all()?;
    if records.is_empty() {
        return console.say("No student data.");
    }

    console.say("RegNo\tName\tM1\tM2\tM3")?;
    for record in &records {
        console.print(&format::format_student(record))?;
    }
    Ok(())
}

pub(super) fn update_student<C: Console, S: StudentRepository>(
    console: &mut C,
    students: &S,
) -> Result<()> {
    let regno = console.read_word("Enter regno: ")?;
    if students.find_by_regno(&regno)?.is_none() {
        return console.say("Not found.");
    }

    let name = read_name(console, "New name: ")?;
    let marks = console.read_marks("New marks (3): ")?;
    if students.update_by_regno(&regno, &name, marks)? {
        console.say("Updated.")
    } else {
        console.say("Not found.")
    }
}

pub(super) fn delete_student<C: Console, S: StudentRepository>(
    console: &mut C,
    students: &S,
) -> Result<()> {
    let regno = console.read_word("Enter regno: ")?;
    if students.delete_by_regno(&regno)? {
        info!("Deleted student {}", regno);
        console.say("Deleted.")
    } else {
        console.say("Not found.")
    }
}

pub(super) fn search_student<C: Console, S: StudentRepository>(
    console: &mut C,
    students: &S,
) -> Result<()> {
    console.print("Search by:\n1. RegNo\n2. Name\n")?;
    let choice = console.read_line("Choice: ")?;

    if students.load_all()?.is_empty() {
        return console.say("No data.");
    }

    match choice.trim() {
        "1" => {
            let regno = console.read_word("Enter regno: ")?;
            match students.find_by_regno(&regno)? {
                Some(record) => console.say(&summary_line(&record)),
                None => console.say("Not found."),
            }
        }
        "2" => {
            let name = console.read_line("Enter name: ")?;
            let matches = students.search_by_name(name.trim())?;
            if matches.is_empty() {
                return console.say("Not found.");
            }
            for record in &matches {
                console.say(&summary_line(record))?;
            }
            Ok(())
        }
        _ => console.say("Invalid choice."),
    }
}

pub(super) fn show_record<C: Console, S: StudentRepository>(
    console: &mut C,
    students: &S,
    regno: &str,
) -> Result<()> {
    let Some(record) = students.find_by_regno(regno)? else {
        return console.say("Record not found.");
    };

    console.say(&format!("RegNo: {}", record.regno))?;
    console.say(&format!("Name : {}", record.name))?;
    console.say(&format!("Marks: {}", record.marks))
}

pub(super) fn create_admin<C: Console, R: CredentialRepository>(
    console: &mut C,
    credentials: &R,
) -> Result<()> {
    let username = console.read_word("Enter new admin username: ")?;
    let password = console.read_masked("Enter password: ")?;

    credentials.append(&Credential::new(username.as_str(), password, Role::Admin))?;
    info!("Created admin account '{}'", username);
    console.say("New admin created!")
}

/// Change the signed-in user's password after re-checking the current one.
///
/// Returns whether the password changed. Every credential row with the
/// session's username and role gets the new password.
///
/// # Errors
///
/// Returns console errors, and store errors if the credential file cannot be
/// read or rewritten.
pub fn change_password<C: Console, R: CredentialRepository>(
    console: &mut C,
    credentials: &R,
    session: &mut Session,
) -> Result<bool> {
    let current = console.read_masked("Current password: ")?;
    if current != session.password {
        console.say("Incorrect.")?;
        return Ok(false);
    }

    let new_password = console.read_masked("New password: ")?;
    let confirm = console.read_masked("Confirm password: ")?;
    if new_password != confirm {
        console.say("Mismatch.")?;
        return Ok(false);
    }

    if let Err(e) = format::validate_token("password", &new_password) {
        console.say(&e.user_message())?;
        return Ok(false);
    }

    credentials.update_password(session, &new_password)?;
    session.password = new_password;
    info!("Password changed for {} ({})", session.username, session.role);
    console.say("Password changed.")?;
    Ok(true)
}
