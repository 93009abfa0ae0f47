use crate::combatant::format_move_name;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    Intro,
    AwaitingPlayerAction,
    ResolvingPlayerMove,
    ResolvingOpponentMove,
    Fleeing,
    Capturing,
    Won,
    Lost,
    Fled,
    Captured,
}

impl BattlePhase {
    /// Won, Lost, Fled and Captured end the battle; nothing changes afterwards.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BattlePhase::Won | BattlePhase::Lost | BattlePhase::Fled | BattlePhase::Captured
        )
    }

    pub fn outcome(self) -> Option<BattleOutcome> {
        match self {
            BattlePhase::Won => Some(BattleOutcome::Won),
            BattlePhase::Lost => Some(BattleOutcome::Lost),
            BattlePhase::Fled => Some(BattleOutcome::Fled),
            BattlePhase::Captured => Some(BattleOutcome::Captured),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleOutcome {
    Won,
    Lost,
    Fled,
    Captured,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    PhaseChanged {
        from: BattlePhase,
        to: BattlePhase,
    },
    WildAppeared {
        pokemon: String,
    },
    /// The provider could not supply a move's power; the fallback was used.
    MovePowerDefaulted {
        move_name: String,
        power: u16,
    },
    AttackResolved {
        attacker: Side,
        pokemon: String,
        move_name: String,
        power: u16,
        damage: u32,
        critical: bool,
        target_remaining_hp: u32,
    },
    EscapeAttempted {
        chance: f64,
        success: bool,
    },
    CaptureAttempted {
        pokemon: String,
        chance: f64,
        success: bool,
    },
    PokemonFainted {
        side: Side,
        pokemon: String,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::PhaseChanged { .. } => None,
            BattleEvent::WildAppeared { pokemon } => {
                Some(format!("A wild {} appeared!", pokemon))
            }
            BattleEvent::MovePowerDefaulted { .. } => None,

            BattleEvent::AttackResolved {
                attacker,
                pokemon,
                move_name,
                damage,
                critical,
                ..
            } => {
                let prefix = match attacker {
                    Side::Player => "",
                    Side::Opponent => "Wild ",
                };
                // A zero-damage hit never carries the critical annotation.
                let suffix = if *critical && *damage > 0 {
                    " (Critical Hit!)"
                } else {
                    ""
                };
                Some(format!(
                    "{}{} used {} and dealt {} damage!{}",
                    prefix,
                    pokemon,
                    format_move_name(move_name),
                    damage,
                    suffix
                ))
            }

            BattleEvent::EscapeAttempted { success, .. } => Some(if *success {
                "You successfully ran away!".to_string()
            } else {
                "Failed to escape!".to_string()
            }),
            BattleEvent::CaptureAttempted {
                pokemon, success, ..
            } => Some(if *success {
                format!("You successfully captured {}!", pokemon)
            } else {
                "Capture failed!".to_string()
            }),

            BattleEvent::PokemonFainted { side, pokemon } => Some(match side {
                Side::Player => format!("Your {} fainted!", pokemon),
                Side::Opponent => format!("Wild {} fainted!", pokemon),
            }),
            BattleEvent::BattleEnded { outcome } => Some(
                match outcome {
                    BattleOutcome::Won => "You won the battle!",
                    BattleOutcome::Lost => "You have been defeated!",
                    BattleOutcome::Fled => "Got away safely!",
                    BattleOutcome::Captured => "The wild Pokemon was added to your collection!",
                }
                .to_string(),
            ),
        }
    }

    /// Events that represent one executed turn. Each contributes exactly one
    /// battle log entry.
    pub fn is_turn_entry(&self) -> bool {
        matches!(
            self,
            BattleEvent::AttackResolved { .. }
                | BattleEvent::EscapeAttempted { .. }
                | BattleEvent::CaptureAttempted { .. }
        )
    }
}

/// Event bus for collecting the events of one battle step.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// User-visible text for every non-silent event, in order.
    pub fn formatted(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    /// Shows debug format of all events, one per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        let terminal: Vec<BattlePhase> = [
            BattlePhase::Intro,
            BattlePhase::AwaitingPlayerAction,
            BattlePhase::ResolvingPlayerMove,
            BattlePhase::ResolvingOpponentMove,
            BattlePhase::Fleeing,
            BattlePhase::Capturing,
            BattlePhase::Won,
            BattlePhase::Lost,
            BattlePhase::Fled,
            BattlePhase::Captured,
        ]
        .into_iter()
        .filter(|p| p.is_terminal())
        .collect();
        assert_eq!(
            terminal,
            vec![
                BattlePhase::Won,
                BattlePhase::Lost,
                BattlePhase::Fled,
                BattlePhase::Captured
            ]
        );
        assert_eq!(BattlePhase::Fled.outcome(), Some(BattleOutcome::Fled));
        assert_eq!(BattlePhase::Capturing.outcome(), None);
    }

    #[test]
    fn test_attack_text() {
        let event = BattleEvent::AttackResolved {
            attacker: Side::Opponent,
            pokemon: "Zubat".to_string(),
            move_name: "wing-attack".to_string(),
            power: 60,
            damage: 12,
            critical: true,
            target_remaining_hp: 40,
        };
        assert_eq!(
            event.format(),
            Some("Wild Zubat used Wing Attack and dealt 12 damage! (Critical Hit!)".to_string())
        );
    }

    #[test]
    fn test_zero_damage_critical_is_not_annotated() {
        let event = BattleEvent::AttackResolved {
            attacker: Side::Player,
            pokemon: "Turtwig".to_string(),
            move_name: "growl".to_string(),
            power: 0,
            damage: 0,
            critical: true,
            target_remaining_hp: 100,
        };
        assert_eq!(
            event.format(),
            Some("Turtwig used Growl and dealt 0 damage!".to_string())
        );
    }

    #[test]
    fn test_silent_events_and_turn_entries() {
        let phase = BattleEvent::PhaseChanged {
            from: BattlePhase::Intro,
            to: BattlePhase::AwaitingPlayerAction,
        };
        assert_eq!(phase.format(), None);
        assert!(!phase.is_turn_entry());

        let escape = BattleEvent::EscapeAttempted { chance: 50.0, success: false };
        assert_eq!(escape.format(), Some("Failed to escape!".to_string()));
        assert!(escape.is_turn_entry());

        let faint = BattleEvent::PokemonFainted {
            side: Side::Player,
            pokemon: "Piplup".to_string(),
        };
        assert!(!faint.is_turn_entry());
    }

    #[test]
    fn test_event_bus() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());
        bus.push(BattleEvent::WildAppeared { pokemon: "Bidoof".to_string() });
        bus.push(BattleEvent::PhaseChanged {
            from: BattlePhase::Intro,
            to: BattlePhase::AwaitingPlayerAction,
        });
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.formatted(), vec!["A wild Bidoof appeared!".to_string()]);
        assert!(format!("{}", bus).contains("PhaseChanged"));
    }
}
