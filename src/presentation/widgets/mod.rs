mod button;
mod input;
mod spinner;
mod status_bar;

pub use button::Button;
pub use input::TextInput;
pub use spinner::{Spinner, SpinnerLine};
pub use status_bar::{StatusBar, StatusLevel};
