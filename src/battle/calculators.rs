use crate::rng::TurnRng;

/// Power used when a move's power is unknown or the lookup fails.
pub const DEFAULT_MOVE_POWER: u16 = 10;

/// Probability that any single attack is a critical hit.
pub const CRITICAL_HIT_CHANCE: f64 = 0.1;
pub const CRITICAL_MULTIPLIER: u32 = 2;

/// Inclusive bounds of the per-attack random factor.
pub const RANDOM_FACTOR_MIN: u32 = 217;
pub const RANDOM_FACTOR_MAX: u32 = 255;

/// Type effectiveness is not modelled; every matchup is neutral.
pub const NEUTRAL_EFFECTIVENESS: f64 = 1.0;

/// Constant bonus multiplier applied to the additive term.
const SAME_TYPE_BONUS: f64 = 1.5;

/// Pure damage formula.
///
/// `floor(((2*level*crit/5 + 2) * power * (attack/defense)) / 50 + 2 * 1.5 * te * (rf/255))`
///
/// A zero defense is treated as one.
pub fn compute_damage(
    level: u8,
    power: u16,
    attack: u16,
    defense: u16,
    critical_multiplier: u32,
    type_effectiveness: f64,
    random_factor: u32,
) -> u32 {
    let level_term = (2.0 * f64::from(level) * f64::from(critical_multiplier)) / 5.0 + 2.0;
    let stat_ratio = f64::from(attack) / f64::from(defense.max(1));
    let scaled = (level_term * f64::from(power) * stat_ratio) / 50.0;
    let bonus = 2.0 * SAME_TYPE_BONUS * type_effectiveness
        * (f64::from(random_factor) / f64::from(RANDOM_FACTOR_MAX));

    let damage = (scaled + bonus).floor();
    if damage.is_finite() && damage > 0.0 {
        damage as u32
    } else {
        0
    }
}

/// Outcome of rolling one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    pub damage: u32,
    /// The same draw drives both the multiplier and the log annotation.
    pub critical: bool,
    pub random_factor: u32,
}

/// Rolls the critical hit and random factor for one attack, then applies
/// [`compute_damage`]. Consumes exactly two draws: critical, then random factor.
pub fn roll_attack(
    level: u8,
    power: u16,
    attack: u16,
    defense: u16,
    rng: &mut TurnRng,
) -> AttackRoll {
    let critical = rng.chance(CRITICAL_HIT_CHANCE, "critical hit");
    let random_factor =
        rng.range_inclusive(RANDOM_FACTOR_MIN, RANDOM_FACTOR_MAX, "damage random factor");
    let multiplier = if critical { CRITICAL_MULTIPLIER } else { 1 };

    AttackRoll {
        damage: compute_damage(
            level,
            power,
            attack,
            defense,
            multiplier,
            NEUTRAL_EFFECTIVENESS,
            random_factor,
        ),
        critical,
        random_factor,
    }
}

/// Percentage pressure chance shared by escaping and capturing:
/// `max(0, 100 - 50 * current/max)`. A zero maximum counts as fully drained.
pub(crate) fn hp_pressure_chance(current_hp: u32, max_hp: u32) -> f64 {
    if max_hp == 0 {
        return 100.0;
    }
    let ratio = f64::from(current_hp.min(max_hp)) / f64::from(max_hp);
    (100.0 - 50.0 * ratio).max(0.0)
}

/// Chance, in percent, of escaping from a wild opponent at the given HP.
pub fn escape_chance(opponent_hp: u32, opponent_max_hp: u32) -> f64 {
    hp_pressure_chance(opponent_hp, opponent_max_hp)
}

/// Escape succeeds iff a uniform roll in `[0, 100)` is at most the chance.
pub fn roll_escape(chance: f64, rng: &mut TurnRng) -> bool {
    rng.scaled(100.0, "escape roll") <= chance
}
