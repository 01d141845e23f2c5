//! Anything Goes: a game-show companion.
//!
//! A random-length countdown ends in a siren; dismissing it opens a prize
//! wheel whose result is awarded to one of two contestants. Everything here
//! except [`web`] is platform neutral and driven through the [`Scheduler`],
//! [`RandomSource`] and [`AudioBackend`] seams, so the whole round protocol
//! runs under test on a virtual clock.

pub mod config;
pub mod countdown;
pub mod random;
pub mod schedule;
pub mod score;
pub mod session;
pub mod theme;
pub mod tone;
pub mod utils;
pub mod web;
pub mod wheel;

pub use random::RandomSource;
pub use schedule::{Scheduler, TaskHandle};
pub use score::Contestant;
pub use session::{AppMode, GameEvent, Listener, Session, SessionView};
pub use theme::Theme;
pub use tone::{AudioBackend, ToneEngine};
pub use wheel::{RangeUpdate, Segment, WheelConfig, WheelState};
