pub mod actions;
pub mod engine;
pub mod events;
mod machine;
pub mod snapshot;

pub use actions::{ActionBuffer, CountdownAction, CountdownApplyStatus};
pub use engine::{CountdownApplyResult, CountdownEngine};
pub use events::CountdownCommand;
pub use snapshot::{CountdownPhase, CountdownPolicy, CountdownSnapshot, CountdownState};
