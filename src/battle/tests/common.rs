use crate::battle::engine::BattleSession;
use crate::combatant::Combatant;
use crate::provider::StaticProvider;

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let geodude = TestCombatantBuilder::new("Geodude")
///     .with_stats(40, 80, 100)
///     .with_hp(10)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    name: String,
    level: u8,
    base_hp: u16,
    attack: u16,
    defense: u16,
    moves: Vec<String>,
    current_hp: Option<u32>,
}

impl TestCombatantBuilder {
    /// Level 50, base HP 40 (100 max HP), 50 attack, 50 defense, knows Tackle.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 50,
            base_hp: 40,
            attack: 50,
            defense: 50,
            moves: vec!["tackle".to_string()],
            current_hp: None,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_stats(mut self, base_hp: u16, attack: u16, defense: u16) -> Self {
        self.base_hp = base_hp;
        self.attack = attack;
        self.defense = defense;
        self
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = moves.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn build(self) -> Combatant {
        let mut combatant = Combatant::new(
            self.name,
            self.level,
            self.base_hp,
            self.attack,
            self.defense,
            self.moves,
        );
        if let Some(hp) = self.current_hp {
            combatant.set_hp(hp);
        }
        combatant
    }
}

/// Provider knowing a handful of moves, including one without power.
pub fn test_provider() -> StaticProvider {
    StaticProvider::new()
        .with_move("tackle", Some(35))
        .with_move("scratch", Some(40))
        .with_move("ember", Some(40))
        .with_move("growl", None)
        .with_move("splash", Some(0))
}

/// A battle that has left its intro and awaits the player's first action.
pub fn started_battle(player: Combatant, opponent: Combatant) -> BattleSession {
    let mut battle = BattleSession::new(player, opponent);
    battle.begin();
    battle
}
