//! Countdown-then-draw scheduler
//!
//! [`DrawScheduler::advance`] is a pure state machine: each call returns the
//! next thing to do (emit an event, wait, or stop). [`DrawScheduler::start`]
//! drives it with a [`Timer`], a [`Clock`] and an [`EventSink`].

use crate::config::{SinkConfig, TimingConfig};
use crate::errors::BingoResult;
use crate::games::clock::{Clock, Timer};
use crate::games::sequence::Sequence;
use crate::games::types::{DrawItem, DrawResult, GameConfig, GameSummary, BALL_COUNT};
use crate::sink::{EventPayload, EventSink, SinkEnvelope};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Countdown { remaining_minutes: u32 },
    PreDrawWait,
    Drawing { drawn: usize },
    Complete,
}

/// Milestone the scheduler wants relayed to the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    MinutesRemaining(u32),
    NumberDrawn { item: DrawItem, position: usize },
}

impl GameEvent {
    pub fn payload(&self, time_utc: u64) -> EventPayload {
        match self {
            GameEvent::MinutesRemaining(minutes) => EventPayload::countdown(*minutes, time_utc),
            GameEvent::NumberDrawn { item, position } => {
                EventPayload::draw(item.label(), *position, time_utc)
            }
        }
    }
}

/// Next action requested by [`DrawScheduler::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Emit(GameEvent),
    Wait(Duration),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Countdown { remaining: u32, announced: bool },
    PreDrawWait { announced: bool },
    Drawing { next: usize, pause_first: bool },
    Complete,
}

/// Runs one game from countdown to the last ball
pub struct DrawScheduler {
    config: GameConfig,
    sequence: Sequence,
    sink: SinkConfig,
    tick: Duration,
    phase: Phase,
    result: DrawResult,
}

impl DrawScheduler {
    pub fn new(
        config: GameConfig,
        sequence: Sequence,
        sink: SinkConfig,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            config,
            sequence,
            sink,
            tick: timing.countdown_tick(),
            phase: Phase::Idle,
            result: DrawResult::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn draw_result(&self) -> &DrawResult {
        &self.result
    }

    pub fn state(&self) -> SchedulerState {
        match self.phase {
            Phase::Idle => SchedulerState::Idle,
            Phase::Countdown { remaining, .. } => SchedulerState::Countdown {
                remaining_minutes: remaining,
            },
            Phase::PreDrawWait { .. } => SchedulerState::PreDrawWait,
            Phase::Drawing { .. } => SchedulerState::Drawing {
                drawn: self.result.len(),
            },
            Phase::Complete => SchedulerState::Complete,
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval_secs)
    }

    /// Move the state machine forward by one step
    pub fn advance(&mut self) -> Step {
        loop {
            match self.phase {
                Phase::Idle => {
                    self.phase = if self.config.start_in_minutes > 0 {
                        Phase::Countdown {
                            remaining: self.config.start_in_minutes,
                            announced: false,
                        }
                    } else {
                        Phase::PreDrawWait { announced: false }
                    };
                }
                Phase::Countdown {
                    remaining,
                    announced: false,
                } => {
                    self.phase = Phase::Countdown {
                        remaining,
                        announced: true,
                    };
                    return Step::Emit(GameEvent::MinutesRemaining(remaining));
                }
                Phase::Countdown {
                    remaining,
                    announced: true,
                } => {
                    let remaining = remaining.saturating_sub(1);
                    // 0 is announced by the pre-draw step, not by the countdown
                    self.phase = if remaining > 0 {
                        Phase::Countdown {
                            remaining,
                            announced: false,
                        }
                    } else {
                        Phase::PreDrawWait { announced: false }
                    };
                    return Step::Wait(self.tick);
                }
                Phase::PreDrawWait { announced: false } => {
                    self.phase = Phase::PreDrawWait { announced: true };
                    return Step::Emit(GameEvent::MinutesRemaining(0));
                }
                Phase::PreDrawWait { announced: true } => {
                    self.phase = Phase::Drawing {
                        next: 0,
                        pause_first: false,
                    };
                    return Step::Wait(self.interval());
                }
                Phase::Drawing {
                    next,
                    pause_first: true,
                } => {
                    self.phase = Phase::Drawing {
                        next,
                        pause_first: false,
                    };
                    return Step::Wait(self.interval());
                }
                Phase::Drawing {
                    next,
                    pause_first: false,
                } => {
                    let Some(item) = self.sequence.items().get(next).cloned() else {
                        self.phase = Phase::Complete;
                        continue;
                    };
                    let position = next + 1;
                    self.result.record(item.clone(), position);
                    self.phase = if position < self.sequence.len() {
                        Phase::Drawing {
                            next: position,
                            pause_first: true,
                        }
                    } else {
                        Phase::Complete
                    };
                    return Step::Emit(GameEvent::NumberDrawn { item, position });
                }
                Phase::Complete => return Step::Finished,
            }
        }
    }

    /// Run the game to completion.
    ///
    /// Sink failures are logged and skipped; only a payload that cannot be
    /// encoded ends the run early.
    pub async fn start(
        &mut self,
        timer: &dyn Timer,
        clock: &dyn Clock,
        sink: &dyn EventSink,
    ) -> BingoResult<GameSummary> {
        info!("Starting game with code: {}", self.config.code);
        info!("Using sink endpoint: {}", self.sink.url);

        loop {
            match self.advance() {
                Step::Emit(event) => self.emit(&event, clock, sink).await?,
                Step::Wait(duration) => {
                    debug!("Game {} waiting {:?}", self.config.code, duration);
                    timer.sleep(duration).await;
                }
                Step::Finished => break,
            }
        }

        info!("Game {} complete, {} numbers drawn", self.config.code, self.result.len());
        Ok(self.summary())
    }

    async fn emit(
        &self,
        event: &GameEvent,
        clock: &dyn Clock,
        sink: &dyn EventSink,
    ) -> BingoResult<()> {
        match event {
            GameEvent::MinutesRemaining(0) => info!("Game {} starting", self.config.code),
            GameEvent::MinutesRemaining(minutes) => {
                info!("Game {}: {} minutes remaining", self.config.code, minutes)
            }
            GameEvent::NumberDrawn { item, position } => info!(
                "Game {}: drew {} ({}/{})",
                self.config.code,
                item.label(),
                position,
                BALL_COUNT
            ),
        }

        let payload = event.payload(clock.now_unix_secs());
        let envelope = SinkEnvelope::new(&self.sink, &self.config.code, &payload)?;
        if let Err(e) = sink.deliver(&self.sink.url, &envelope).await {
            warn!("Failed to deliver event for game {}: {}", self.config.code, e);
        }
        Ok(())
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            status: "success".to_string(),
            message: "Bingo game complete".to_string(),
            code: self.config.code.clone(),
            start_in_minutes: self.config.start_in_minutes,
            interval_seconds: self.config.interval_secs,
            sink_endpoint: self.sink.url.clone(),
            total_drawn: self.result.len(),
            drawn_labels: self.result.summary_labels(),
        }
    }
}
