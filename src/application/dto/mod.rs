//! Data transfer objects for the application layer.

mod secret_dto;

pub use secret_dto::{ResolvedCredentials, SecretRequest, SecretSource};
