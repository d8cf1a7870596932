//! Use case implementations.

mod dispatch_command_use_case;
mod listen_commands_use_case;
mod resolve_credentials_use_case;
mod save_secret_use_case;

pub use dispatch_command_use_case::DispatchCommandUseCase;
pub use listen_commands_use_case::{ListenCommandsUseCase, ListenSummary};
pub use resolve_credentials_use_case::ResolveCredentialsUseCase;
pub use save_secret_use_case::SaveSecretUseCase;
