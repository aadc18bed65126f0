//! External capabilities consumed by the scheduler.
//!
//! Each capability is a trait; adapters talk to the real services. The
//! scheduler only sees the traits, so tests substitute recording mocks and
//! the CLI substitutes console fallbacks when credentials are absent.

pub mod console;
pub mod popup;
pub mod traits;
pub mod twilio;
pub mod weather;

pub use console::{ConsoleMessenger, ConsolePopup};
pub use popup::DesktopPopup;
pub use traits::{Messenger, Observation, Popup, Weather};
pub use twilio::TwilioMessenger;
pub use weather::WeatherApi;
