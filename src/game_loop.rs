//! Timed driver around [`Game`]: paces automatic drops from a clock, routes
//! commands, and owns the start/restart control.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::game::{Game, GameState};
use crate::input::Command;

// ============================================================================
// Clocks
// ============================================================================

/// Millisecond time source for the loop.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle while the loop owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ============================================================================
// Control Surface
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Nothing started yet.
    Idle,
    Running,
    /// Game over noticed; ticking has stopped.
    Ended,
}

/// The start/restart trigger as the player sees it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ControlState {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// No session is scheduled.
    Idle,
    Continue,
    /// The session just ended; no further ticks advance it.
    GameOver,
}

// ============================================================================
// Game Loop
// ============================================================================

pub struct GameLoop<C: Clock> {
    game: Game,
    clock: C,
    last_time_ms: u64,
    phase: Phase,
}

impl<C: Clock> GameLoop<C> {
    pub fn new(game: Game, clock: C) -> Self {
        let last_time_ms = clock.now_ms();
        Self {
            game,
            clock,
            last_time_ms,
            phase: Phase::Idle,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn control(&self) -> ControlState {
        match self.phase {
            Phase::Idle => ControlState {
                label: "Start",
                enabled: true,
            },
            Phase::Running => ControlState {
                label: "Playing",
                enabled: false,
            },
            Phase::Ended => ControlState {
                label: "Restart",
                enabled: true,
            },
        }
    }

    /// Begins a fresh session. Any running session is descheduled before its
    /// state is reinitialized.
    pub fn start(&mut self) {
        self.phase = Phase::Idle;
        self.game.restart();
        self.last_time_ms = self.clock.now_ms();
        self.phase = Phase::Running;
    }

    /// One scheduled frame. Paused frames re-base the timestamp so the pause
    /// itself never counts towards a drop.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Idle;
        }

        let now = self.clock.now_ms();
        match self.game.state {
            GameState::GameOver => {
                self.phase = Phase::Ended;
                TickOutcome::GameOver
            }
            GameState::Paused => {
                self.last_time_ms = now;
                TickOutcome::Continue
            }
            GameState::Playing => {
                let elapsed = now.saturating_sub(self.last_time_ms);
                self.last_time_ms = now;
                self.game
                    .advance(u32::try_from(elapsed).unwrap_or(u32::MAX));
                TickOutcome::Continue
            }
        }
    }

    /// Applies a player command. Returns `false` for [`Command::Quit`], which
    /// the caller handles.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::Start => {
                if self.control().enabled {
                    self.start();
                }
            }
            _ if self.phase != Phase::Running => {}
            Command::TogglePause => self.game.toggle_pause(),
            Command::MoveLeft => {
                self.game.move_piece(-1);
            }
            Command::MoveRight => {
                self.game.move_piece(1);
            }
            Command::SoftDrop => self.game.soft_drop(),
            Command::Rotate => {
                self.game.rotate_piece();
            }
            Command::HardDrop => self.game.hard_drop(),
        }
        true
    }
}
