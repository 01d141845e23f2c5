//! Application-level configuration constants.

// Countdown
pub const MIN_COUNTDOWN_MS: u32 = 1_000;
pub const MAX_COUNTDOWN_MS: u32 = 120_000;
pub const CLOCK_TICK_PERIOD_MS: u32 = 500;

// Wheel range limits
pub const WHEEL_VALUE_LIMIT: i32 = 20;
pub const MAX_WHEEL_SPAN: i32 = 40;
pub const DEFAULT_WHEEL_MIN: i32 = 0;
pub const DEFAULT_WHEEL_MAX: i32 = 10;

// Spin behaviour
pub const SPIN_DURATION_MS: u32 = 4_000;
pub const MIN_SPIN_TURNS: u32 = 5;
pub const EXTRA_SPIN_TURNS: u32 = 2;
pub const SPIN_TICK_COUNT: u32 = 40;
pub const SPIN_TICK_BASE_MS: u32 = 50;
pub const SPIN_TICK_STEP_MS: u32 = 5;
pub const SPIN_TRANSITION: &str = "transform 4s cubic-bezier(0.17, 0.67, 0.12, 0.99)";

// Audio bus levels
pub const CLOCK_TICK_LEVEL: f32 = 0.08;
pub const SPIN_TICK_LEVEL: f32 = 1.0 / 3.0;

// Persisted preferences
pub const THEME_KEY: &str = "theme";

// Virtual frame interval used by the manual scheduler
pub const FRAME_INTERVAL_MS: f64 = 16.0;

// Rendering geometry
pub const DONUT_RADIUS: f64 = 90.0;
pub const WHEEL_RADIUS: f64 = 95.0;
pub const WHEEL_CENTER: f64 = 100.0;
pub const WHEEL_LABEL_RADIUS: f64 = WHEEL_RADIUS * 0.65;

pub const WHEEL_COLORS: [&str; 15] = [
    "#ff6b6b", "#feca57", "#48dbfb", "#ff9ff3", "#54a0ff", "#5f27cd", "#00d2d3", "#ff6b35",
    "#7bed9f", "#a55eea", "#fd79a8", "#0abde3", "#10ac84", "#ee5a24", "#7158e2",
];
