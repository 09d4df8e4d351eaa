mod frame;
mod scheduler;
mod session;
mod state_machine;

pub use frame::{FrameLoop, FrameRequest};
pub use scheduler::{ScheduleReport, schedule_notes};
pub use session::Session;
pub use state_machine::{PlaybackPhase, TickOutcome, Transport};
