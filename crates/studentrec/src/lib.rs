//! `studentrec` - Student records and accounts at the console
//!
//! This library provides the flat-file stores for accounts and student
//! records, masked console input, sign-in, and the per-role menus.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod menu;
pub mod record;
pub mod storage;

pub use app::Shutdown;
pub use config::Config;
pub use console::{Console, TerminalConsole};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Credential, Marks, Role, Session, StudentRecord};
pub use storage::{CredentialRepository, Registry, StudentRepository};
