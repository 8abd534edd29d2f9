mod controller;
mod events;
mod progress;
mod state;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::SessionController;
pub use events::{Effect, SessionEvent};
pub use progress::SessionProgress;
pub use state::{SessionState, SessionStatus};
pub use view::PaletteView;
pub use workflow::{SessionWorkflow, SubmitOutcome};
