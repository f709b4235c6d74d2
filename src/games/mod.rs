pub mod clock;
pub mod code;
pub mod scheduler;
pub mod sequence;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock, Timer, TokioTimer, VirtualTimer};
pub use code::{CodeGenerator, TimestampCodeGenerator};
pub use scheduler::{DrawScheduler, GameEvent, SchedulerState, Step};
pub use sequence::{validate_custom, Sequence, SequenceBuilder};
pub use types::*;
