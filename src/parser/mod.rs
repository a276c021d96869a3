pub mod recording;
pub mod types;

pub use recording::{ensure_leading_navigate, load_recording, Recording};
pub use types::{Action, ActionKind};
