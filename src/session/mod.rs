mod controller;
mod driver;
mod render;
mod state;


pub use controller::{Flow, SessionController, MAX_PLACEHOLDERS};
pub use driver::{run_session, SessionOutcome};
pub use render::{RenderCommand, RenderSink};
pub use state::{SessionId, SessionState};
