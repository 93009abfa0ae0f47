use crate::battle::calculators::{escape_chance, roll_attack, roll_escape, DEFAULT_MOVE_POWER};
use crate::battle::catch::attempt_capture;
use crate::battle::state::{BattleEvent, BattlePhase, EventBus, Side};
use crate::combatant::Combatant;
use crate::errors::InvalidTransition;
use crate::provider::DataProvider;
use crate::rng::TurnRng;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause between the player's attack animation and the opponent's reply.
pub const ATTACK_ANIMATION_DELAY: Duration = Duration::from_millis(1000);
/// Pause before leaving the battle after a successful escape.
pub const FLEE_SUCCESS_DELAY: Duration = Duration::from_millis(1500);
/// Pause before the opponent punishes a failed escape.
pub const FLEE_FAILURE_DELAY: Duration = Duration::from_millis(1000);
/// Pause while the ball shakes before a capture resolves.
pub const CAPTURE_DELAY: Duration = Duration::from_millis(5000);

/// Used when the opponent has no moves at all.
pub const FALLBACK_MOVE: &str = "tackle";

/// A command issued by the player while the battle awaits input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Fight(String),
    Run,
    Capture,
}

impl PlayerAction {
    fn label(&self) -> &'static str {
        match self {
            PlayerAction::Fight(_) => "Fight",
            PlayerAction::Run => "Run",
            PlayerAction::Capture => "Capture",
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Fight(move_name) => write!(f, "Fight with {}", move_name),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// The next piece of work a battle owes, resolved by [`BattleSession::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingStep {
    PlayerMove(String),
    Escape,
    Capture,
    OpponentMove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    step: PendingStep,
    delay: Duration,
}

/// One wild battle between the player's chosen Pokemon and an opponent.
///
/// Every transition is gated on the current phase. A continuation scheduled by
/// `submit` only runs through `advance`, and only while the phase it was
/// scheduled for is still current, so a stale or doubled trigger cannot
/// resolve a turn twice.
#[derive(Debug, Clone)]
pub struct BattleSession {
    player: Combatant,
    opponent: Combatant,
    phase: BattlePhase,
    log: Vec<String>,
    headline: String,
    pending: Option<Scheduled>,
    move_power_cache: HashMap<String, u16>,
    turns_taken: u32,
}

impl BattleSession {
    pub fn new(player: Combatant, opponent: Combatant) -> Self {
        Self {
            player,
            opponent,
            phase: BattlePhase::Intro,
            log: Vec::new(),
            headline: String::new(),
            pending: None,
            move_power_cache: HashMap::new(),
            turns_taken: 0,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn opponent(&self) -> &Combatant {
        &self.opponent
    }

    /// One entry per executed turn, oldest first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// The most recent user-visible message.
    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// The side expected to act next. `Some(Side::Player)` only while the
    /// battle awaits a player action.
    pub fn turn_owner(&self) -> Option<Side> {
        match self.phase {
            BattlePhase::AwaitingPlayerAction => Some(Side::Player),
            BattlePhase::ResolvingOpponentMove => Some(Side::Opponent),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// True while a scheduled continuation is waiting for `advance`.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Presentation delay the pending continuation asks for.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.as_ref().map(|scheduled| scheduled.delay)
    }

    /// Leaves the intro and starts accepting player actions.
    pub fn begin(&mut self) -> EventBus {
        let mut bus = EventBus::new();
        if self.phase != BattlePhase::Intro {
            return bus;
        }
        info!(
            player = %self.player.display_name,
            opponent = %self.opponent.display_name,
            "battle started"
        );
        self.record(
            BattleEvent::WildAppeared {
                pokemon: self.opponent.display_name.clone(),
            },
            &mut bus,
        );
        self.transition(BattlePhase::AwaitingPlayerAction, &mut bus);
        bus
    }

    /// Accepts a player action and schedules its resolution.
    ///
    /// Outside `AwaitingPlayerAction` this returns an error and leaves the
    /// session untouched.
    pub fn submit(&mut self, action: PlayerAction) -> Result<EventBus, InvalidTransition> {
        if self.phase != BattlePhase::AwaitingPlayerAction {
            debug!(action = %action, phase = ?self.phase, "action rejected");
            return Err(InvalidTransition {
                action: action.label(),
                phase: self.phase,
            });
        }

        let mut bus = EventBus::new();
        let (phase, step, delay) = match action {
            PlayerAction::Fight(move_name) => (
                BattlePhase::ResolvingPlayerMove,
                PendingStep::PlayerMove(move_name),
                Duration::ZERO,
            ),
            PlayerAction::Run => (BattlePhase::Fleeing, PendingStep::Escape, Duration::ZERO),
            PlayerAction::Capture => (BattlePhase::Capturing, PendingStep::Capture, CAPTURE_DELAY),
        };
        self.transition(phase, &mut bus);
        self.pending = Some(Scheduled { step, delay });
        Ok(bus)
    }

    /// Runs the pending continuation, if any. Does nothing once the battle is over.
    pub fn advance<P: DataProvider + ?Sized>(
        &mut self,
        provider: &P,
        rng: &mut TurnRng,
    ) -> EventBus {
        let mut bus = EventBus::new();
        if self.phase.is_terminal() {
            self.pending = None;
            return bus;
        }
        let Some(scheduled) = self.pending.take() else {
            return bus;
        };

        match scheduled.step {
            PendingStep::PlayerMove(move_name) => {
                self.execute_player_move(&move_name, provider, rng, &mut bus)
            }
            PendingStep::Escape => self.execute_escape(rng, &mut bus),
            PendingStep::Capture => self.execute_capture(rng, &mut bus),
            PendingStep::OpponentMove => self.execute_opponent_move(provider, rng, &mut bus),
        }
        bus
    }

    /// Runs continuations until the battle waits for input again or ends.
    pub fn settle<P: DataProvider + ?Sized>(&mut self, provider: &P, rng: &mut TurnRng) -> EventBus {
        let mut bus = EventBus::new();
        while self.pending.is_some() {
            for event in self.advance(provider, rng).into_events() {
                bus.push(event);
            }
        }
        bus
    }

    /// Submits an action and resolves it, including any opponent counter-turn.
    pub fn act<P: DataProvider + ?Sized>(
        &mut self,
        action: PlayerAction,
        provider: &P,
        rng: &mut TurnRng,
    ) -> Result<EventBus, InvalidTransition> {
        let mut bus = self.submit(action)?;
        for event in self.settle(provider, rng).into_events() {
            bus.push(event);
        }
        Ok(bus)
    }

    fn execute_player_move<P: DataProvider + ?Sized>(
        &mut self,
        move_name: &str,
        provider: &P,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) {
        self.turns_taken += 1;
        self.execute_attack(Side::Player, move_name, provider, rng, bus);

        if self.opponent.is_fainted() {
            self.faint(Side::Opponent, bus);
            self.transition(BattlePhase::Won, bus);
        } else {
            self.schedule_opponent_move(ATTACK_ANIMATION_DELAY, bus);
        }
    }

    fn execute_escape(&mut self, rng: &mut TurnRng, bus: &mut EventBus) {
        self.turns_taken += 1;
        let chance = escape_chance(self.opponent.current_hp(), self.opponent.max_hp());
        let success = roll_escape(chance, rng);
        debug!(chance, success, "escape attempt");
        self.record(BattleEvent::EscapeAttempted { chance, success }, bus);

        if success {
            self.transition(BattlePhase::Fled, bus);
        } else {
            self.schedule_opponent_move(FLEE_FAILURE_DELAY, bus);
        }
    }

    fn execute_capture(&mut self, rng: &mut TurnRng, bus: &mut EventBus) {
        self.turns_taken += 1;
        let attempt = attempt_capture(self.opponent.current_hp(), self.opponent.max_hp(), rng);
        debug!(
            chance = attempt.chance,
            roll = attempt.roll,
            success = attempt.success,
            "capture attempt"
        );
        self.record(
            BattleEvent::CaptureAttempted {
                pokemon: self.opponent.display_name.clone(),
                chance: attempt.chance,
                success: attempt.success,
            },
            bus,
        );

        if attempt.success {
            self.transition(BattlePhase::Captured, bus);
        } else {
            self.schedule_opponent_move(Duration::ZERO, bus);
        }
    }

    fn execute_opponent_move<P: DataProvider + ?Sized>(
        &mut self,
        provider: &P,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) {
        let move_name = if self.opponent.moves.is_empty() {
            FALLBACK_MOVE.to_string()
        } else {
            let index = rng.index(self.opponent.moves.len(), "opponent move choice");
            self.opponent.moves[index].clone()
        };
        self.execute_attack(Side::Opponent, &move_name, provider, rng, bus);

        if self.player.is_fainted() {
            self.faint(Side::Player, bus);
            self.transition(BattlePhase::Lost, bus);
        } else {
            self.transition(BattlePhase::AwaitingPlayerAction, bus);
        }
    }

    fn execute_attack<P: DataProvider + ?Sized>(
        &mut self,
        attacker: Side,
        move_name: &str,
        provider: &P,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) {
        let power = self.move_power(move_name, provider, bus);
        let (attacking, defending) = match attacker {
            Side::Player => (&self.player, &mut self.opponent),
            Side::Opponent => (&self.opponent, &mut self.player),
        };

        let roll = roll_attack(
            attacking.level,
            power,
            attacking.attack,
            defending.defense,
            rng,
        );
        defending.take_damage(roll.damage);
        debug!(
            ?attacker,
            move_name,
            power,
            damage = roll.damage,
            critical = roll.critical,
            random_factor = roll.random_factor,
            remaining = defending.current_hp(),
            "attack resolved"
        );

        let event = BattleEvent::AttackResolved {
            attacker,
            pokemon: attacking.display_name.clone(),
            move_name: move_name.to_string(),
            power,
            damage: roll.damage,
            critical: roll.critical,
            target_remaining_hp: defending.current_hp(),
        };
        self.record(event, bus);
    }

    /// Looks up a move's power, caching successful answers for this battle.
    fn move_power<P: DataProvider + ?Sized>(
        &mut self,
        move_name: &str,
        provider: &P,
        bus: &mut EventBus,
    ) -> u16 {
        let key = move_name.to_ascii_lowercase();
        if let Some(&power) = self.move_power_cache.get(&key) {
            return power;
        }

        match provider.move_power(&key) {
            Ok(power) => {
                let power = power.unwrap_or(DEFAULT_MOVE_POWER);
                self.move_power_cache.insert(key, power);
                power
            }
            Err(err) => {
                warn!(move_name, error = %err, "move power lookup failed, using default");
                self.record(
                    BattleEvent::MovePowerDefaulted {
                        move_name: key,
                        power: DEFAULT_MOVE_POWER,
                    },
                    bus,
                );
                DEFAULT_MOVE_POWER
            }
        }
    }

    fn schedule_opponent_move(&mut self, delay: Duration, bus: &mut EventBus) {
        self.transition(BattlePhase::ResolvingOpponentMove, bus);
        self.pending = Some(Scheduled {
            step: PendingStep::OpponentMove,
            delay,
        });
    }

    fn faint(&mut self, side: Side, bus: &mut EventBus) {
        let pokemon = match side {
            Side::Player => self.player.display_name.clone(),
            Side::Opponent => self.opponent.display_name.clone(),
        };
        self.record(BattleEvent::PokemonFainted { side, pokemon }, bus);
    }

    fn transition(&mut self, to: BattlePhase, bus: &mut EventBus) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug!(?from, ?to, "battle phase changed");
        self.phase = to;
        bus.push(BattleEvent::PhaseChanged { from, to });

        if let Some(outcome) = to.outcome() {
            self.pending = None;
            info!(?outcome, turns = self.turns_taken, "battle ended");
            self.record(BattleEvent::BattleEnded { outcome }, bus);
        }
    }

    /// Publishes an event; turn events also append to the log.
    fn record(&mut self, event: BattleEvent, bus: &mut EventBus) {
        if let Some(text) = event.format() {
            if event.is_turn_entry() {
                self.log.push(text.clone());
            }
            self.headline = text;
        }
        bus.push(event);
    }
}
