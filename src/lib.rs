//! Bingo Draw - scheduled server-side 75-ball bingo caller
//!
//! A game counts down in whole minutes, then calls the 75 balls (shuffled or
//! caller-ordered) at a fixed interval, relaying every milestone to an
//! external messaging endpoint.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;
pub mod sink;

pub use config::{AppConfig, ConfigLoader, SinkConfig, TimingConfig};
pub use errors::{BingoError, BingoResult};
pub use games::{DrawScheduler, GameConfig, GameParams, GameSummary, Sequence, SequenceBuilder};
pub use sink::{EventSink, HttpEventSink, MemorySink};
