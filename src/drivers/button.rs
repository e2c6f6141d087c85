//! Tick-driven debounce and long-press detector.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up. The main loop samples the raw
//! pin level and calls [`PressDetector::poll`] with the current monotonic
//! time; the detector never sleeps, so its behaviour depends only on the
//! sequence of `(level, now_ms)` samples it is fed.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                               | Event        |
//! |-------------|-----------------------------------------|--------------|
//! | Short press | Released before the long-press threshold | `ShortPress` |
//! | Long press  | Held >= threshold (fires while held)     | `LongPress`  |
//!
//! Level changes are ignored for `debounce_ms` after the press edge and
//! again after the release, so contact bounce can never classify a single
//! actuation twice. A long press fires once and then latches until release;
//! the release that follows it is silent.

use crate::app::ports::Level;
use crate::config::NodeConfig;

/// Classification of the button input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    None,
    ShortPress,
    LongPress { held_ms: u32 },
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    Debounce { pressed_at: u32 },
    Held { pressed_at: u32 },
    /// Long press already emitted; waiting for release.
    Latched,
    /// Release observed; bounces ignored until the window closes.
    ReleaseGuard { released_at: u32 },
}

pub struct PressDetector {
    state: GestureState,
    debounce_ms: u32,
    long_press_ms: u32,
    hold_sample_ms: u32,
    tick_ms: u32,
}

impl PressDetector {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            state: GestureState::Idle,
            debounce_ms: config.debounce_ms,
            long_press_ms: config.long_press_ms,
            hold_sample_ms: config.hold_sample_ms,
            tick_ms: config.tick_ms,
        }
    }

    /// Feed one pin sample. `now_ms` is monotonic milliseconds since boot
    /// (wrapping arithmetic, so a u32 rollover mid-press is harmless).
    pub fn poll(&mut self, level: Level, now_ms: u32) -> ButtonEvent {
        let pressed = level == Level::Low;

        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::Debounce { pressed_at: now_ms };
                }
                ButtonEvent::None
            }

            GestureState::Debounce { pressed_at } => {
                if now_ms.wrapping_sub(pressed_at) < self.debounce_ms {
                    return ButtonEvent::None;
                }
                self.state = GestureState::Held { pressed_at };
                self.held(pressed, pressed_at, now_ms)
            }

            GestureState::Held { pressed_at } => self.held(pressed, pressed_at, now_ms),

            GestureState::Latched => {
                if !pressed {
                    self.state = GestureState::ReleaseGuard { released_at: now_ms };
                }
                ButtonEvent::None
            }

            GestureState::ReleaseGuard { released_at } => {
                if now_ms.wrapping_sub(released_at) >= self.debounce_ms {
                    self.state = if pressed {
                        GestureState::Debounce { pressed_at: now_ms }
                    } else {
                        GestureState::Idle
                    };
                }
                ButtonEvent::None
            }
        }
    }

    /// Delay the caller should wait before the next [`poll`](Self::poll):
    /// the fast re-sample interval while a press is being timed, the tick
    /// period otherwise.
    pub fn next_poll_ms(&self) -> u32 {
        match self.state {
            GestureState::Debounce { .. } | GestureState::Held { .. } => self.hold_sample_ms,
            _ => self.tick_ms,
        }
    }

    /// True while a press is being debounced or timed.
    pub fn is_timing_press(&self) -> bool {
        matches!(
            self.state,
            GestureState::Debounce { .. } | GestureState::Held { .. }
        )
    }

    fn held(&mut self, pressed: bool, pressed_at: u32, now_ms: u32) -> ButtonEvent {
        if !pressed {
            self.state = GestureState::ReleaseGuard { released_at: now_ms };
            return ButtonEvent::ShortPress;
        }

        let held_ms = now_ms.wrapping_sub(pressed_at);
        if held_ms >= self.long_press_ms {
            self.state = GestureState::Latched;
            return ButtonEvent::LongPress { held_ms };
        }

        ButtonEvent::None
    }
}
