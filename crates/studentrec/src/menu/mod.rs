//! Role menus.
//!
//! Each role gets a fixed, numbered list of actions. The menu loops until the
//! user picks Logout; everything else returns to the same menu.

mod actions;

use std::fmt;

use tracing::{debug, warn};

use crate::console::Console;
use crate::error::Result;
use crate::record::{Role, Session};
use crate::storage::Registry;

pub use actions::change_password;

/// Something a menu entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Add a student and their account.
    AddStudent,
    /// List every student.
    ViewAll,
    /// Replace a student's name and marks.
    UpdateStudent,
    /// Remove a student.
    DeleteStudent,
    /// Find students by regno or name.
    SearchStudent,
    /// Show the record whose regno is the session's username.
    ViewOwnRecord,
    /// Show the record of any regno.
    ViewChildRecord,
    /// Change the session's password.
    ChangePassword,
    /// Add another admin account.
    CreateAdmin,
    /// Leave the menu.
    Logout,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where the menu goes after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Show the menu again.
    Continue,
    /// Leave the menu.
    Logout,
}

/// The numbered entries of a role's menu, in display order.
#[must_use]
pub fn entries(role: Role) -> &'static [(Action, &'static str)] {
    use Action::{
        AddStudent, ChangePassword, CreateAdmin, DeleteStudent, Logout, SearchStudent,
        UpdateStudent, ViewAll, ViewChildRecord, ViewOwnRecord,
    };

    match role {
        Role::Admin => &[
            (AddStudent, "Add Student"),
            (ViewAll, "View All Students"),
            (UpdateStudent, "Update Student"),
            (DeleteStudent, "Delete Student"),
            (SearchStudent, "Search Student"),
            (ChangePassword, "Change Password"),
            (CreateAdmin, "Create New Admin"),
            (Logout, "Logout"),
        ],
        Role::Staff => &[
            (ViewAll, "View All Students"),
            (UpdateStudent, "Update Student Marks"),
            (ChangePassword, "Change Password"),
            (Logout, "Logout"),
        ],
        Role::Student => &[
            (ViewOwnRecord, "View My Record"),
            (ChangePassword, "Change Password"),
            (Logout, "Logout"),
        ],
        Role::Parent => &[
            (ViewChildRecord, "View Child Record"),
            (ChangePassword, "Change Password"),
            (Logout, "Logout"),
        ],
        Role::Accountant => &[
            (ViewAll, "View All Students"),
            (ChangePassword, "Change Password"),
            (Logout, "Logout"),
        ],
    }
}

/// Map a typed choice to an action of the role's menu.
///
/// Anything that isn't a listed number gives `None`.
#[must_use]
pub fn choose(role: Role, input: &str) -> Option<Action> {
    let number: usize = input.trim().parse().ok()?;
    entries(role)
        .get(number.checked_sub(1)?)
        .map(|(action, _)| *action)
}

/// The menu text shown before each choice.
#[must_use]
pub fn render(role: Role) -> String {
    let mut text = format!("===== {} MENU =====\n", role.as_str().to_uppercase());
    for (number, (_, label)) in entries(role).iter().enumerate() {
        text.push_str(&format!("{}. {label}\n", number + 1));
    }
    text
}

/// Run the session's menu until Logout.
///
/// Failed actions are reported and the menu continues; only the end of
/// input leaves early.
///
/// # Errors
///
/// Returns [`crate::Error::InputClosed`] or [`crate::Error::Interrupted`]
/// when no more input can be read.
pub fn run<C: Console>(console: &mut C, registry: &Registry, session: &mut Session) -> Result<()> {
    loop {
        console.print(&render(session.role))?;
        let input = console.read_line("Choice: ")?;

        let flow = match choose(session.role, &input) {
            None => {
                console.say("Invalid choice.")?;
                Flow::Continue
            }
            Some(action) => {
                debug!("{} chose {}", session.username, action);
                match perform(action, console, registry, session) {
                    Ok(flow) => flow,
                    Err(e) if e.is_end_of_input() => return Err(e),
                    Err(e) => {
                        warn!("{} failed: {}", action, e);
                        console.say(&e.user_message())?;
                        Flow::Continue
                    }
                }
            }
        };

        console.print("\n")?;
        if flow == Flow::Logout {
            return Ok(());
        }
    }
}

/// Carry out one action.
fn perform<C: Console>(
    action: Action,
    console: &mut C,
    registry: &Registry,
    session: &mut Session,
) -> Result<Flow> {
    match action {
        Action::AddStudent => actions::add_student(console, registry)?,
        Action::ViewAll => actions::show_all(console, &registry.students)?,
        Action::UpdateStudent => actions::update_student(console, &registry.students)?,
        Action::DeleteStudent => actions::delete_student(console, &registry.students)?,
        Action::SearchStudent => actions::search_student(console, &registry.students)?,
        Action::ViewOwnRecord => {
            actions::show_record(console, &registry.students, &session.username)?;
        }
        Action::ViewChildRecord => {
            let regno = console.read_word("Enter child regno: ")?;
            actions::show_record(console, &registry.students, &regno)?;
        }
        Action::ChangePassword => {
            actions::change_password(console, &registry.credentials, session)?;
        }
        Action::CreateAdmin => actions::create_admin(console, &registry.credentials)?,
        Action::Logout => {
            console.say("Logging out...")?;
            return Ok(Flow::Logout);
        }
    }
    Ok(Flow::Continue)
}
