use crate::battle::calculators::hp_pressure_chance;
use crate::rng::TurnRng;

/// Capture chance in percent: `max(0, 100 - 50 * current/max)`.
///
/// A full-HP target still has a 50 point chance; the roll below is scaled by
/// max HP, not by 100, so large creatures are easier to catch than the
/// percentage suggests.
pub fn capture_chance(current_hp: u32, max_hp: u32) -> f64 {
    hp_pressure_chance(current_hp, max_hp)
}

/// Result of one capture roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureAttempt {
    pub chance: f64,
    pub roll: f64,
    pub success: bool,
}

/// Rolls a uniform value in `[0, max_hp)` and succeeds iff it is at most the chance.
pub fn attempt_capture(current_hp: u32, max_hp: u32, rng: &mut TurnRng) -> CaptureAttempt {
    let chance = capture_chance(current_hp, max_hp);
    let roll = rng.scaled(f64::from(max_hp), "capture roll");
    CaptureAttempt {
        chance,
        roll,
        success: roll <= chance,
    }
}

/// Get a descriptive capture chance category for display purposes
pub fn capture_chance_description(chance: f64) -> &'static str {
    match chance {
        c if c >= 95.0 => "Excellent",
        c if c >= 85.0 => "Very Good",
        c if c >= 70.0 => "Good",
        c if c >= 60.0 => "Fair",
        c if c > 50.0 => "Poor",
        _ => "Very Poor",
    }
}
