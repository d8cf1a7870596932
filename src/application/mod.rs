//! Application layer with use cases and DTOs.

/// Cooperative cancellation.
pub mod cancellation;
/// Data transfer objects.
pub mod dto;
/// Application services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use cancellation::CancelToken;
pub use dto::{ResolvedCredentials, SecretRequest, SecretSource};
pub use services::AlertQueue;
pub use use_cases::{
    DispatchCommandUseCase, ListenCommandsUseCase, ResolveCredentialsUseCase, SaveSecretUseCase,
};
