//! Secret storage adapters.

#[cfg(feature = "keyring")]
mod keyring_storage;
#[cfg(not(feature = "keyring"))]
mod keyring_storage_stub;

#[cfg(feature = "keyring")]
pub use keyring_storage::KeyringSecretStorage;
#[cfg(not(feature = "keyring"))]
pub use keyring_storage_stub::KeyringSecretStorage;
