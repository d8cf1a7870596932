//! Domain error types.

mod codec_error;
mod device_error;
mod dispatch_error;
mod secret_error;

pub use codec_error::CodecError;
pub use device_error::DeviceError;
pub use dispatch_error::{DispatchError, DispatchErrorKind};
pub use secret_error::SecretError;
