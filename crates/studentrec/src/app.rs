//! The interactive program: bootstrap, then sign-in and menus until input ends.

use tracing::{error, info, warn};

use crate::auth;
use crate::config::Config;
use crate::console::Console;
use crate::error::{Error, Result};
use crate::menu;
use crate::storage::{CredentialRepository, Registry};

const BANNER: &str = "\n=============================\n     STUDENT RECORD SYSTEM\n=============================\n";

/// Why the interactive loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shutdown {
    /// Input ended or the user pressed Ctrl-C.
    EndOfInput,
    /// A signed-in account had a role with no menu.
    UnknownRole(String),
}

/// Make sure the default admin account exists, announcing it if created.
///
/// # Errors
///
/// Returns an error if the credential store cannot be read or written.
pub fn bootstrap<C: Console>(console: &mut C, registry: &Registry, config: &Config) -> Result<()> {
    let admin = &config.bootstrap;
    let created = registry
        .credentials
        .ensure_default_admin_exists(&admin.admin_username, &admin.admin_password)?;
    if created {
        console.say(&format!(
            "[System] Default admin created ({} / {})",
            admin.admin_username, admin.admin_password
        ))?;
    }
    Ok(())
}

/// Bootstrap, then loop over sign-in and the role menu.
///
/// Failed sign-ins retry without limit. Logging out returns to sign-in.
///
/// # Errors
///
/// Returns an error if bootstrap fails or the console cannot be written.
pub fn run<C: Console>(console: &mut C, registry: &Registry, config: &Config) -> Result<Shutdown> {
    bootstrap(console, registry, config)?;

    loop {
        console.print(BANNER)?;

        let mut session = match auth::login(console, &registry.credentials) {
            Ok(Some(session)) => session,
            Ok(None) => {
                console.say("Login failed! Try again.\n")?;
                continue;
            }
            Err(Error::UnknownRole(tag)) => {
                error!("Account has unknown role '{}'; stopping", tag);
                console.say("Unknown role.")?;
                return Ok(Shutdown::UnknownRole(tag));
            }
            Err(e) if e.is_end_of_input() => return Ok(Shutdown::EndOfInput),
            Err(e) => {
                warn!("Sign-in failed: {}", e);
                console.say(&e.user_message())?;
                continue;
            }
        };

        match menu::run(console, registry, &mut session) {
            Ok(()) => info!("{} logged out", session.username),
            Err(e) if e.is_end_of_input() => return Ok(Shutdown::EndOfInput),
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::record::{Credential, Role};
    use crate::storage::{scratch_dir, StudentRepository};

    fn create_test_registry(name: &str) -> Registry {
        let dir = scratch_dir(name);
        Registry::new(dir.join("credentials.txt"), dir.join("students.txt"))
    }

    #[test]
    fn test_bootstrap_creates_default_admin_once() {
        let registry = create_test_registry("app_bootstrap");
        let config = Config::default();

        let mut console = ScriptedConsole::default();
        bootstrap(&mut console, &registry, &config).unwrap();
        bootstrap(&mut console, &registry, &config).unwrap();

        assert_eq!(
            console
                .output()
                .matches("[System] Default admin created (admin / admin@123)")
                .count(),
            1
        );
        assert_eq!(
            std::fs::read_to_string(registry.credentials.path()).unwrap(),
            "admin admin@123 admin\n"
        );
    }

    #[test]
    fn test_bootstrap_uses_configured_admin() {
        let registry = create_test_registry("app_bootstrap_config");
        let mut config = Config::default();
        config.bootstrap.admin_username = "head".to_string();
        config.bootstrap.admin_password = "s3cret".to_string();

        let mut console = ScriptedConsole::default();
        bootstrap(&mut console, &registry, &config).unwrap();
        assert!(registry
            .credentials
            .find_by_credentials("head", "s3cret")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_run_ends_when_input_closes() {
        let registry = create_test_registry("app_eof");
        let mut console = ScriptedConsole::default();

        let shutdown = run(&mut console, &registry, &Config::default()).unwrap();
        assert_eq!(shutdown, Shutdown::EndOfInput);
        assert!(console.output().contains("STUDENT RECORD SYSTEM"));
    }

    #[test]
    fn test_run_retries_failed_login() {
        let registry = create_test_registry("app_retry");
        let mut console = ScriptedConsole::new(["admin", "wrong", "nobody", "x", "admin", "admin@123", "8"]);

        let shutdown = run(&mut console, &registry, &Config::default()).unwrap();
        assert_eq!(shutdown, Shutdown::EndOfInput);
        let output = console.output();
        assert_eq!(output.matches("Login failed! Try again.").count(), 2);
        assert!(output.contains("Logged in as admin!"));
        assert!(output.contains("===== ADMIN MENU ====="));
        // Logout goes back to sign-in
        assert_eq!(output.matches("----- SIGN IN -----").count(), 4);
    }

    #[test]
    fn test_run_stops_on_unknown_role() {
        let registry = create_test_registry("app_unknown_role");
        registry
            .credentials
            .append(&Credential {
                username: "eve".to_string(),
                password: "pw".to_string(),
                role: "janitor".to_string(),
            })
            .unwrap();
        let mut console = ScriptedConsole::new(["eve", "pw", "admin", "admin@123"]);

        let shutdown = run(&mut console, &registry, &Config::default()).unwrap();
        assert_eq!(shutdown, Shutdown::UnknownRole("janitor".to_string()));
        assert!(console.output().contains("Unknown role.\n"));
        assert_eq!(console.remaining_input(), 2);
    }

    #[test]
    fn test_new_student_can_sign_in() {
        let registry = create_test_registry("app_student_login");
        let mut console = ScriptedConsole::new([
            "admin", "admin@123", "1", "S100", "Ann Lee", "80 70 90", "", "8",
            "S100", "S100@123", "1", "3",
        ]);

        let shutdown = run(&mut console, &registry, &Config::default()).unwrap();
        assert_eq!(shutdown, Shutdown::EndOfInput);
        assert!(console.output().contains("Logged in as student!"));
        assert!(console.output().contains("Name : Ann Lee\nMarks: 80 70 90\n"));
        assert!(registry.students.find_by_regno("S100").unwrap().is_some());
    }

    #[test]
    fn test_changed_password_required_on_next_login() {
        let registry = create_test_registry("app_password_change");
        registry
            .credentials
            .append(&Credential::new("bob", "old", Role::Staff))
            .unwrap();
        let mut console = ScriptedConsole::new([
            "bob", "old", "3", "old", "n3w", "n3w", "4", "bob", "old", "bob", "n3w", "4",
        ]);

        run(&mut console, &registry, &Config::default()).unwrap();
        let output = console.output();
        assert!(output.contains("Password changed."));
        assert_eq!(output.matches("Login failed! Try again.").count(), 1);
        assert_eq!(output.matches("Logged in as staff!").count(), 2);
    }
}
