pub mod controller;
pub mod dedup;
pub mod executor;
pub mod filter;
pub mod pacing;
pub mod selector;
pub mod shutdown;
pub mod stats;

pub use controller::BotRunner;
pub use dedup::DedupStore;
pub use executor::{ActionErrorKind, ActionExecutor, ActionOutcome};
pub use filter::is_suitable;
pub use pacing::{Pacer, WaitOutcome};
pub use selector::CommentSelector;
pub use shutdown::{ShutdownHandle, ShutdownSignal};
pub use stats::RunStats;
