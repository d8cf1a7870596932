//! UI screens.

mod alert_popup;
mod app;
mod control_screen;
mod secret_screen;
pub mod utils;

pub use alert_popup::AlertPopup;
pub use app::{App, AppServices};
pub use control_screen::{ControlAction, ControlScreen};
pub use secret_screen::{SecretAction, SecretScreen, SecretState};
