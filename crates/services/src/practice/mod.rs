mod session;
mod snapshot;
mod workflow;

// Public API of the practice subsystem.
pub use crate::error::PracticeError;
pub use session::{AnswerResult, HintGate, PendingRegeneration, PracticeSession};
pub use snapshot::PracticeSnapshot;
pub use workflow::{HintAdvance, PracticeLoopService};
