//! Device adapters.

mod shell;

pub use shell::ShellDevice;
