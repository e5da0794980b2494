//! The scriptable Bolt stub server.

mod actor;
mod error;
mod service;

pub use actor::{Actor, StepOutcome};
pub use error::{StubError, StubResult};
pub use service::{StubConfig, StubService, EXIT_INTERRUPTED, EXIT_TIMEOUT};
