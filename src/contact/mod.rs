pub mod traits;
pub mod whatsapp;

pub use traits::{ContactLauncher, LoggingLauncher, RecordingLauncher, SystemLauncher};
pub use whatsapp::{ContactHandoff, ContactIntent};
