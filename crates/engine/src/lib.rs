#![forbid(unsafe_code)]

pub mod error;
pub mod integrity;
pub mod session;
pub mod timer;

pub use exam_core::Clock;

pub use error::SessionError;
pub use integrity::{
    DenyingSurface, FullscreenSurface, GrantingSurface, IntegrityAction, IntegrityMonitor,
    IntegritySignal, KeyPress, ViolationKind,
};
pub use session::{
    Effect, PaletteView, SessionController, SessionEvent, SessionProgress, SessionState,
    SessionStatus, SessionWorkflow, SubmitOutcome,
};
pub use timer::{Countdown, TickOutcome};
