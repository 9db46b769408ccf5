pub mod commands;
pub mod controller;
pub mod events;
pub mod logging;
pub mod session;
pub mod staging;

pub use commands::SessionCommand;
pub use controller::{Applied, PageMode, QueryController, SearchTicket, Settled};
pub use events::{CopyPhase, LogLevel, SessionEvent};
pub use session::{run_session, SessionDeps};
pub use staging::{StagingPipeline, StagingRequest};
