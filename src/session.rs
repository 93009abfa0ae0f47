//! Session adapter: walks the player through the screens of one game, turns
//! battle outcomes into persistence calls, and reports what the presentation
//! layer should show and play.

use crate::battle::engine::{BattleSession, PlayerAction, FLEE_SUCCESS_DELAY};
use crate::battle::state::{BattleEvent, BattleOutcome, EventBus, Side};
use crate::combatant::Combatant;
use crate::config::GameConfig;
use crate::errors::{GameError, GameResult, LookupError, PersistenceError};
use crate::overworld::{MoveOutcome, Overworld};
use crate::provider::DataProvider;
use crate::rng::TurnRng;
use crate::store::{PersistenceStore, PlayerId};
use schema::{CaughtRecord, ChosenSnapshot, Direction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::Display;
use tracing::{debug, error, info, warn};

/// Pause on the battle screen after a win or capture before returning to the route.
pub const CELEBRATION_DELAY: Duration = Duration::from_millis(3000);
/// Pause on the battle screen before the defeat screen.
pub const DEFEAT_DELAY: Duration = Duration::from_millis(3000);
/// Most steps a single [`GameSession::walk`] call takes.
pub const MAX_WALK_STEPS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Screen {
    Title,
    StarterSelection,
    Route,
    /// An encounter fired but its combatants are not loaded yet.
    Loading,
    Encounter,
    /// The caught Pokemon list.
    Captured,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Title,
    Route,
    Battle,
}

/// Audio/visual cue for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Music(Theme),
    Cry(String),
    Attack(Side),
    Hit(Side),
    BallShake,
    Victory,
    Defeat,
    /// Hold the current frame before presenting what follows.
    Wait(Duration),
}

/// Result of a persistence side effect. Failures never roll back the battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceNote {
    Saved { operation: String },
    Failed { operation: String, error: String },
}

/// Everything a presentation layer needs after one session call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub screen: Screen,
    pub cues: Vec<Cue>,
    pub events: Vec<BattleEvent>,
    pub persistence: Vec<PersistenceNote>,
}

impl SessionUpdate {
    fn new(screen: Screen) -> Self {
        Self {
            screen,
            cues: Vec::new(),
            events: Vec::new(),
            persistence: Vec::new(),
        }
    }

    /// An update that changes nothing on `screen`.
    pub fn idle(screen: Screen) -> Self {
        Self::new(screen)
    }

    /// User-visible text for the events of this update.
    pub fn messages(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }
}

pub struct GameSession {
    config: GameConfig,
    provider: Box<dyn DataProvider + Send + Sync>,
    store: Box<dyn PersistenceStore + Send + Sync>,
    rng: TurnRng,
    player: PlayerId,
    screen: Screen,
    offers: Vec<ChosenSnapshot>,
    overworld: Overworld,
    battle: Option<BattleSession>,
    last_battle: Option<BattleSession>,
    loading_error: Option<String>,
}

impl GameSession {
    /// Builds a session on the title screen.
    ///
    /// The route's encounter rate is read from the provider once, here; if the
    /// lookup fails the configured fallback rate is used.
    pub fn new(
        config: GameConfig,
        provider: Box<dyn DataProvider + Send + Sync>,
        store: Box<dyn PersistenceStore + Send + Sync>,
        rng: TurnRng,
        player: PlayerId,
    ) -> GameResult<Self> {
        let grid = config.route_grid()?;
        let rate = match provider.encounter_area(&config.encounter_area) {
            Ok(area) => area.encounter_rate(),
            Err(err) => {
                warn!(
                    area = %config.encounter_area,
                    error = %err,
                    fallback = config.fallback_encounter_rate,
                    "encounter rate lookup failed, using fallback"
                );
                config.fallback_encounter_rate
            }
        };
        info!(player = %player, rate, "session created");
        let overworld = Overworld::new(grid, config.start, rate);

        Ok(Self {
            config,
            provider,
            store,
            rng,
            player,
            screen: Screen::Title,
            offers: Vec::new(),
            overworld,
            battle: None,
            last_battle: None,
            loading_error: None,
        })
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn overworld(&self) -> &Overworld {
        &self.overworld
    }

    /// The battle in progress, if the encounter screen is showing.
    pub fn battle(&self) -> Option<&BattleSession> {
        self.battle.as_ref()
    }

    /// The most recently finished battle, kept for display only.
    pub fn last_battle(&self) -> Option<&BattleSession> {
        self.last_battle.as_ref()
    }

    pub fn offers(&self) -> &[ChosenSnapshot] {
        &self.offers
    }

    /// Why the pending encounter has not loaded yet.
    pub fn loading_error(&self) -> Option<&str> {
        self.loading_error.as_deref()
    }

    pub fn chosen(&self) -> GameResult<ChosenSnapshot> {
        Ok(self.store.load_chosen(&self.player)?)
    }

    pub fn caught(&self) -> GameResult<Vec<CaughtRecord>> {
        Ok(self.store.list_caught(&self.player)?)
    }

    pub fn caught_count(&self) -> GameResult<usize> {
        Ok(self.store.count_caught(&self.player)?)
    }

    /// Draws a fresh set of distinct starter species. Also used to re-roll.
    pub fn offer_starters(&mut self) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::Title, Screen::StarterSelection], "offer starters")?;

        let mut roster = self.provider.roster()?;
        let count = self.config.starter_count.min(roster.len());
        let mut offers = Vec::with_capacity(count);
        for i in 0..count {
            let pick = i + self.rng.index(roster.len() - i, "starter species");
            roster.swap(i, pick);
            let stats = self.provider.stats(&roster[i])?;
            let moves = sample_moves(&stats.moves, self.config.move_slots, &mut self.rng);
            offers.push(ChosenSnapshot::from_stats(&stats, moves));
        }

        info!(
            offers = ?offers.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            "starters offered"
        );
        self.offers = offers;
        let mut update = self.navigate(Screen::StarterSelection);
        update.cues.push(Cue::Music(Theme::Title));
        Ok(update)
    }

    /// Saves the offered starter at `index` as the player's chosen Pokemon and
    /// heads out onto the route.
    pub fn choose_starter(&mut self, index: usize) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::StarterSelection], "choose starter")?;
        let snapshot = self.offers.get(index).cloned().ok_or_else(|| {
            GameError::InvalidCommand(format!(
                "no starter #{} (offered {})",
                index + 1,
                self.offers.len()
            ))
        })?;

        self.store.save_chosen(&self.player, &snapshot)?;
        info!(player = %self.player, chosen = %snapshot.name, "starter chosen");

        self.offers.clear();
        let mut update = self.navigate(Screen::Route);
        update.persistence.push(PersistenceNote::Saved {
            operation: "save chosen".to_string(),
        });
        update.cues.push(Cue::Cry(snapshot.audio));
        update.cues.push(Cue::Music(Theme::Route));
        Ok(update)
    }

    /// Goes straight to the route with a previously chosen Pokemon.
    pub fn resume(&mut self) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::Title, Screen::Captured], "resume")?;
        self.store.load_chosen(&self.player)?;
        let mut update = self.navigate(Screen::Route);
        update.cues.push(Cue::Music(Theme::Route));
        Ok(update)
    }

    /// Takes one step on the route; may start an encounter.
    pub fn step(&mut self, direction: Direction) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::Route], "walk")?;
        let outcome = self.overworld.try_move(direction, &mut self.rng);
        debug!(?outcome, "step");

        match outcome {
            MoveOutcome::Moved {
                encounter: true, ..
            } => {
                self.screen = Screen::Loading;
                Ok(self.load_encounter())
            }
            _ => Ok(SessionUpdate::new(self.screen)),
        }
    }

    /// Takes up to `steps` steps in one direction, at least one and at most
    /// [`MAX_WALK_STEPS`]. Stops early at a wall or when an encounter starts.
    pub fn walk(&mut self, direction: Direction, steps: u32) -> GameResult<Vec<SessionUpdate>> {
        self.expect_screen(&[Screen::Route], "walk")?;
        let steps = steps.clamp(1, MAX_WALK_STEPS);

        let mut updates = Vec::new();
        for _ in 0..steps {
            let before = self.overworld.position();
            let update = self.step(direction)?;
            let stop = update.screen != Screen::Route || self.overworld.position() == before;
            updates.push(update);
            if stop {
                break;
            }
        }
        debug!(?direction, requested = steps, taken = updates.len(), "walk");
        Ok(updates)
    }

    /// Tries again to load an encounter that is stuck on the loading screen.
    pub fn retry_encounter(&mut self) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::Loading], "retry encounter")?;
        Ok(self.load_encounter())
    }

    /// Gives up on a stuck encounter and returns to the route.
    pub fn abandon_encounter(&mut self) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::Loading], "abandon encounter")?;
        self.overworld.clear_pending();
        self.loading_error = None;
        let mut update = self.navigate(Screen::Route);
        update.cues.push(Cue::Music(Theme::Route));
        Ok(update)
    }

    pub fn fight(&mut self, move_name: &str) -> GameResult<SessionUpdate> {
        let battle = self.active_battle("fight")?;
        let known = battle
            .player()
            .moves
            .iter()
            .find(|m| m.eq_ignore_ascii_case(move_name.trim()))
            .cloned()
            .ok_or_else(|| {
                GameError::InvalidCommand(format!(
                    "{} does not know {}",
                    battle.player().display_name,
                    move_name
                ))
            })?;
        self.battle_action(PlayerAction::Fight(known))
    }

    pub fn run(&mut self) -> GameResult<SessionUpdate> {
        self.active_battle("run")?;
        self.battle_action(PlayerAction::Run)
    }

    pub fn capture(&mut self) -> GameResult<SessionUpdate> {
        self.active_battle("capture")?;
        self.battle_action(PlayerAction::Capture)
    }

    /// Shows the caught list.
    pub fn open_caught_list(&mut self) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::Title, Screen::Route], "view caught list")?;
        Ok(self.navigate(Screen::Captured))
    }

    /// Leaves the caught list: for the route if a Pokemon has been chosen,
    /// otherwise back to the title screen.
    pub fn return_to_route(&mut self) -> GameResult<SessionUpdate> {
        self.expect_screen(&[Screen::Captured], "leave the caught list")?;
        match self.store.load_chosen(&self.player) {
            Ok(_) => {
                let mut update = self.navigate(Screen::Route);
                update.cues.push(Cue::Music(Theme::Route));
                Ok(update)
            }
            Err(err) if err.is_not_found() => {
                debug!(player = %self.player, "nothing chosen yet, back to title");
                let mut update = self.navigate(Screen::Title);
                update.cues.push(Cue::Music(Theme::Title));
                Ok(update)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Back to the title screen with a fresh walk. Stored data is untouched.
    pub fn restart(&mut self) -> GameResult<SessionUpdate> {
        let grid = self.overworld.grid().clone();
        let rate = self.overworld.encounter_probability();
        self.overworld = Overworld::new(grid, self.config.start, rate);
        self.battle = None;
        self.offers.clear();
        self.loading_error = None;
        info!(player = %self.player, "session restarted");

        let mut update = self.navigate(Screen::Title);
        update.cues.push(Cue::Music(Theme::Title));
        Ok(update)
    }

    fn expect_screen(&self, allowed: &[Screen], command: &str) -> GameResult<()> {
        if allowed.contains(&self.screen) {
            Ok(())
        } else {
            Err(GameError::InvalidCommand(format!(
                "cannot {} on the {} screen",
                command, self.screen
            )))
        }
    }

    fn active_battle(&self, command: &str) -> GameResult<&BattleSession> {
        self.expect_screen(&[Screen::Encounter], command)?;
        self.battle
            .as_ref()
            .ok_or_else(|| GameError::InvalidCommand(format!("cannot {} outside a battle", command)))
    }

    fn navigate(&mut self, screen: Screen) -> SessionUpdate {
        if self.screen != screen {
            debug!(from = ?self.screen, to = ?screen, "screen changed");
            self.screen = screen;
        }
        SessionUpdate::new(screen)
    }

    /// Loads both combatants and starts the battle. Any failure leaves the
    /// session on the loading screen.
    fn load_encounter(&mut self) -> SessionUpdate {
        match self.build_battle() {
            Ok(mut battle) => {
                self.loading_error = None;
                let bus = battle.begin();
                let mut update = self.navigate(Screen::Encounter);
                update.cues.push(Cue::Music(Theme::Battle));
                update.cues.push(Cue::Cry(battle.opponent().audio_cue.clone()));
                update.events = bus.into_events();
                self.battle = Some(battle);
                update
            }
            Err(err) => {
                warn!(error = %err, "encounter could not be loaded");
                self.loading_error = Some(err.to_string());
                SessionUpdate::new(Screen::Loading)
            }
        }
    }

    fn build_battle(&mut self) -> GameResult<BattleSession> {
        let area = self.provider.encounter_area(&self.config.encounter_area)?;
        if area.slots.is_empty() {
            return Err(LookupError::MalformedData(format!("area '{}' has no encounters", area.name)).into());
        }
        let slot = &area.slots[self.rng.index(area.slots.len(), "wild species")];
        let stats = self.provider.stats(&slot.species)?;
        let moves = sample_moves(&stats.moves, self.config.move_slots, &mut self.rng);
        let chosen = self.store.load_chosen(&self.player)?;

        let level = self.config.level;
        let opponent = Combatant::from_stats(&stats, moves, level);
        let player = Combatant::from_snapshot(&chosen, level);
        info!(opponent = %opponent, player = %player, "wild encounter loaded");
        Ok(BattleSession::new(player, opponent))
    }

    /// Drives one player action through every scheduled step, emitting the
    /// delay hints between them.
    fn battle_action(&mut self, action: PlayerAction) -> GameResult<SessionUpdate> {
        let Some(battle) = self.battle.as_mut() else {
            return Err(GameError::InvalidCommand("no battle in progress".to_string()));
        };

        let mut update = SessionUpdate::new(self.screen);
        if action == PlayerAction::Capture {
            update.cues.push(Cue::BallShake);
        }
        let mut bus = battle.submit(action)?;

        while let Some(delay) = battle.pending_delay() {
            if !delay.is_zero() {
                update.cues.push(Cue::Wait(delay));
            }
            let step = battle.advance(&*self.provider, &mut self.rng);
            push_battle_cues(&step, &mut update.cues);
            for event in step.into_events() {
                bus.push(event);
            }
        }
        update.events = bus.into_events();

        if let Some(outcome) = battle.phase().outcome() {
            self.finish_battle(outcome, &mut update);
        }
        update.screen = self.screen;
        Ok(update)
    }

    fn finish_battle(&mut self, outcome: BattleOutcome, update: &mut SessionUpdate) {
        let Some(battle) = self.battle.take() else {
            return;
        };
        self.overworld.clear_pending();

        let next = match outcome {
            BattleOutcome::Won => {
                update.cues.push(Cue::Victory);
                update.cues.push(Cue::Wait(CELEBRATION_DELAY));
                Screen::Route
            }
            BattleOutcome::Fled => {
                update.cues.push(Cue::Wait(FLEE_SUCCESS_DELAY));
                Screen::Route
            }
            BattleOutcome::Captured => {
                let record = battle.opponent().to_caught_record();
                let result = self.store.append_caught(&self.player, &record);
                update.persistence.push(note("append caught", result));
                update.cues.push(Cue::Victory);
                update.cues.push(Cue::Wait(CELEBRATION_DELAY));
                Screen::Route
            }
            BattleOutcome::Lost => {
                let result = self.store.clear_caught(&self.player);
                update.persistence.push(note("clear caught", result));
                update.cues.push(Cue::Wait(DEFEAT_DELAY));
                update.cues.push(Cue::Defeat);
                Screen::Defeat
            }
        };

        if next == Screen::Route {
            update.cues.push(Cue::Music(Theme::Route));
        }
        self.last_battle = Some(battle);
        self.navigate(next);
    }
}

fn note(operation: &str, result: Result<(), PersistenceError>) -> PersistenceNote {
    match result {
        Ok(()) => PersistenceNote::Saved {
            operation: operation.to_string(),
        },
        Err(err) => {
            error!(operation, error = %err, "persistence side effect failed");
            PersistenceNote::Failed {
                operation: operation.to_string(),
                error: err.to_string(),
            }
        }
    }
}

fn push_battle_cues(bus: &EventBus, cues: &mut Vec<Cue>) {
    for event in bus.events() {
        if let BattleEvent::AttackResolved {
            attacker, damage, ..
        } = event
        {
            cues.push(Cue::Attack(*attacker));
            if *damage > 0 {
                cues.push(Cue::Hit(attacker.other()));
            }
        }
    }
}

/// Picks up to `slots` distinct moves from `pool` in random order.
pub fn sample_moves(pool: &[String], slots: usize, rng: &mut TurnRng) -> Vec<String> {
    let mut moves = pool.to_vec();
    let count = slots.min(moves.len());
    for i in 0..count {
        let pick = i + rng.index(moves.len() - i, "move sample");
        moves.swap(i, pick);
    }
    moves.truncate(count);
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use crate::battle::state::BattlePhase;
    use crate::store::fixtures::caught;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use schema::{EncounterArea, EncounterSlot, SpriteSet, StatsRecord};
    use std::sync::Arc;

    fn species(id: u16, name: &str, hp: u16, attack: u16, defense: u16) -> StatsRecord {
        StatsRecord {
            id,
            name: name.to_string(),
            hp,
            attack,
            defense,
            moves: vec!["tackle".to_string()],
            types: vec![],
            sprites: SpriteSet::default(),
            audio: format!("cries/{}.mp3", name),
        }
    }

    fn provider() -> Arc<StaticProvider> {
        Arc::new(
            StaticProvider::new()
                .with_species(species(387, "turtwig", 55, 68, 64))
                .with_species(species(390, "chimchar", 44, 58, 44))
                .with_species(species(393, "piplup", 53, 51, 53))
                .with_species(species(74, "geodude", 40, 80, 100))
                .with_move("tackle", Some(35))
                .with_area(EncounterArea {
                    name: "test-route".to_string(),
                    slots: vec![EncounterSlot {
                        species: "geodude".to_string(),
                        chance: 50,
                    }],
                }),
        )
    }

    fn config() -> GameConfig {
        GameConfig {
            encounter_area: "test-route".to_string(),
            route_layout: vec!["TTTT".to_string(), "TPGT".to_string(), "TTTT".to_string()],
            start: crate::overworld::Position::new(1, 1),
            ..GameConfig::default()
        }
    }

    fn session(
        provider: Arc<StaticProvider>,
        store: Arc<MemoryStore>,
        script: Vec<f64>,
    ) -> GameSession {
        GameSession::new(
            config(),
            Box::new(provider),
            Box::new(store),
            TurnRng::new_for_test(script),
            PlayerId::from("ash"),
        )
        .unwrap()
    }

    #[test]
    fn test_rate_comes_from_area_or_fallback() {
        let store = Arc::new(MemoryStore::new());
        let game = session(provider(), store.clone(), vec![]);
        assert_eq!(game.overworld().encounter_probability(), 0.5);

        let offline = provider();
        offline.set_offline(true);
        let game = session(offline, store, vec![]);
        assert_eq!(game.overworld().encounter_probability(), 0.1);
    }

    #[test]
    fn test_starters_are_distinct_and_choice_is_saved() {
        let store = Arc::new(MemoryStore::new());
        // three species picks, each followed by one move-sample draw
        let mut game = session(provider(), store.clone(), vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let update = game.offer_starters().unwrap();
        assert_eq!(update.screen, Screen::StarterSelection);
        let mut names: Vec<String> = game.offers().iter().map(|o| o.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);

        let first = game.offers()[0].clone();
        let update = game.choose_starter(0).unwrap();
        assert_eq!(update.screen, Screen::Route);
        assert_eq!(store.load_chosen(&PlayerId::from("ash")).unwrap(), first);
    }

    #[test]
    fn test_choose_out_of_range_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let mut game = session(provider(), store, vec![0.0; 6]);
        game.offer_starters().unwrap();
        assert!(matches!(game.choose_starter(7), Err(GameError::InvalidCommand(_))));
        assert_eq!(game.screen(), Screen::StarterSelection);
    }

    #[test]
    fn test_walking_requires_the_route_screen() {
        let store = Arc::new(MemoryStore::new());
        let mut game = session(provider(), store, vec![]);
        assert!(matches!(
            game.step(Direction::Right),
            Err(GameError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_encounter_waits_on_loading_until_data_arrives() {
        let backend = provider();
        let store = Arc::new(MemoryStore::new());
        store
            .save_chosen(
                &PlayerId::from("ash"),
                &ChosenSnapshot::from_stats(&species(387, "turtwig", 55, 68, 64), vec!["tackle".into()]),
            )
            .unwrap();
        // encounter draw, then (retry) slot pick + move sample
        let mut game = session(backend.clone(), store, vec![0.0, 0.0, 0.0]);
        game.resume().unwrap();

        backend.set_offline(true);
        let update = game.step(Direction::Right).unwrap();
        assert_eq!(update.screen, Screen::Loading);
        assert!(game.loading_error().is_some());
        assert!(game.battle().is_none());

        backend.set_offline(false);
        let update = game.retry_encounter().unwrap();
        assert_eq!(update.screen, Screen::Encounter);
        assert_eq!(update.messages(), vec!["A wild Geodude appeared!".to_string()]);
        assert_eq!(game.battle().map(|b| b.opponent().max_hp()), Some(100));
    }

    /// A store whose caught list cannot be written.
    struct FailingAppendStore {
        inner: MemoryStore,
    }

    impl PersistenceStore for FailingAppendStore {
        fn save_chosen(&self, player: &PlayerId, snapshot: &ChosenSnapshot) -> crate::errors::PersistenceResult<()> {
            self.inner.save_chosen(player, snapshot)
        }

        fn load_chosen(&self, player: &PlayerId) -> crate::errors::PersistenceResult<ChosenSnapshot> {
            self.inner.load_chosen(player)
        }

        fn append_caught(&self, _player: &PlayerId, _record: &CaughtRecord) -> crate::errors::PersistenceResult<()> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }

        fn list_caught(&self, player: &PlayerId) -> crate::errors::PersistenceResult<Vec<CaughtRecord>> {
            self.inner.list_caught(player)
        }

        fn clear_caught(&self, player: &PlayerId) -> crate::errors::PersistenceResult<()> {
            self.inner.clear_caught(player)
        }
    }

    fn ash() -> PlayerId {
        PlayerId::from("ash")
    }

    fn starter(hp: u16, attack: u16) -> ChosenSnapshot {
        ChosenSnapshot::from_stats(&species(387, "turtwig", hp, attack, 64), vec!["tackle".into()])
    }

    /// A session already on the route with `chosen` saved, standing left of
    /// the single grass tile.
    fn on_route<S>(store: Arc<S>, chosen: ChosenSnapshot, script: Vec<f64>) -> GameSession
    where
        S: PersistenceStore + Send + Sync + 'static,
    {
        store.save_chosen(&ash(), &chosen).unwrap();
        let mut game = GameSession::new(
            config(),
            Box::new(provider()),
            Box::new(store),
            TurnRng::new_for_test(script),
            ash(),
        )
        .unwrap();
        game.resume().unwrap();
        game
    }

    // encounter check, wild slot pick, move sample
    const ENCOUNTER: [f64; 3] = [0.0, 0.0, 0.0];

    fn script(turn: &[f64]) -> Vec<f64> {
        ENCOUNTER.iter().chain(turn).copied().collect()
    }

    #[test]
    fn test_capture_appends_the_caught_record() {
        let store = Arc::new(MemoryStore::new());
        // capture roll 0 <= 50, then a second encounter after walking back
        let mut draws = script(&[0.0]);
        draws.extend(ENCOUNTER);
        let mut game = on_route(store.clone(), starter(55, 68), draws);

        assert_eq!(game.step(Direction::Right).unwrap().screen, Screen::Encounter);
        let update = game.capture().unwrap();

        assert_eq!(update.screen, Screen::Route);
        assert_eq!(
            update.persistence,
            vec![PersistenceNote::Saved { operation: "append caught".to_string() }]
        );
        assert!(update.cues.contains(&Cue::BallShake));
        let caught = store.list_caught(&ash()).unwrap();
        assert_eq!(caught.len(), 1);
        assert_eq!(caught[0].name, "Geodude");
        assert_eq!(caught[0].hp, 100);
        assert_eq!(game.last_battle().map(|b| b.phase()), Some(BattlePhase::Captured));
        assert!(game.battle().is_none());

        // The encounter guard was released: the grass can trigger again.
        assert!(!game.overworld().encounter_pending());
        game.step(Direction::Left).unwrap();
        assert_eq!(game.step(Direction::Right).unwrap().screen, Screen::Encounter);
    }

    #[test]
    fn test_defeat_clears_the_collection() {
        let store = Arc::new(MemoryStore::new());
        store.append_caught(&ash(), &caught("zubat")).unwrap();
        // Player: no crit, rf 217 -> 13 damage. Geodude: tackle, no crit -> 21 damage.
        let draws = script(&[0.5, 0.0, 0.0, 0.5, 0.0]);
        let mut game = on_route(store.clone(), starter(1, 68), draws);

        game.step(Direction::Right).unwrap();
        assert_eq!(game.battle().map(|b| b.player().max_hp()), Some(2));
        let update = game.fight("tackle").unwrap();

        assert_eq!(update.screen, Screen::Defeat);
        assert_eq!(
            update.persistence,
            vec![PersistenceNote::Saved { operation: "clear caught".to_string() }]
        );
        assert_eq!(update.cues.last(), Some(&Cue::Defeat));
        assert_eq!(store.count_caught(&ash()).unwrap(), 0);
        assert_eq!(game.last_battle().map(|b| b.phase()), Some(BattlePhase::Lost));
        assert!(!game.overworld().encounter_pending());
    }

    #[test]
    fn test_victory_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        store.append_caught(&ash(), &caught("zubat")).unwrap();
        // 1000 attack against 100 defense knocks Geodude out in one hit.
        let mut game = on_route(store.clone(), starter(55, 1000), script(&[0.5, 0.0]));

        game.step(Direction::Right).unwrap();
        let update = game.fight("tackle").unwrap();

        assert_eq!(update.screen, Screen::Route);
        assert!(update.persistence.is_empty());
        assert!(update.cues.contains(&Cue::Victory));
        assert_eq!(store.list_caught(&ash()).unwrap(), vec![caught("zubat")]);
        assert_eq!(game.last_battle().map(|b| b.phase()), Some(BattlePhase::Won));
        assert!(!game.overworld().encounter_pending());
    }

    #[test]
    fn test_escape_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        // escape roll 0 <= 50
        let mut game = on_route(store.clone(), starter(55, 68), script(&[0.0]));

        game.step(Direction::Right).unwrap();
        let update = game.run().unwrap();

        assert_eq!(update.screen, Screen::Route);
        assert!(update.persistence.is_empty());
        assert!(update.cues.contains(&Cue::Wait(FLEE_SUCCESS_DELAY)));
        assert_eq!(store.count_caught(&ash()).unwrap(), 0);
        assert_eq!(game.last_battle().map(|b| b.phase()), Some(BattlePhase::Fled));
        assert!(!game.overworld().encounter_pending());
    }

    #[test]
    fn test_failed_append_is_reported_without_undoing_the_capture() {
        let store = Arc::new(FailingAppendStore { inner: MemoryStore::new() });
        let mut game = on_route(store.clone(), starter(55, 68), script(&[0.0]));

        game.step(Direction::Right).unwrap();
        let update = game.capture().unwrap();

        assert_eq!(update.screen, Screen::Route);
        assert_eq!(
            update.persistence,
            vec![PersistenceNote::Failed {
                operation: "append caught".to_string(),
                error: "Storage I/O failed: disk full".to_string(),
            }]
        );
        assert_eq!(game.last_battle().map(|b| b.phase()), Some(BattlePhase::Captured));
        assert_eq!(store.count_caught(&ash()).unwrap(), 0);
        assert!(!game.overworld().encounter_pending());
    }

    #[test]
    fn test_leaving_the_caught_list_without_a_starter_goes_to_title() {
        let store = Arc::new(MemoryStore::new());
        let mut game = session(provider(), store.clone(), vec![]);

        game.open_caught_list().unwrap();
        let update = game.return_to_route().unwrap();
        assert_eq!(update.screen, Screen::Title);
        assert_eq!(game.screen(), Screen::Title);

        store.save_chosen(&ash(), &starter(55, 68)).unwrap();
        game.open_caught_list().unwrap();
        assert_eq!(game.return_to_route().unwrap().screen, Screen::Route);
    }

    #[test]
    fn test_walk_stops_at_a_wall() {
        // one encounter check on the grass, which misses
        let mut game = on_route(Arc::new(MemoryStore::new()), starter(55, 68), vec![0.9]);

        let updates = game.walk(Direction::Right, 10).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(game.overworld().position(), crate::overworld::Position::new(2, 1));
        assert_eq!(game.screen(), Screen::Route);

        // zero steps still takes one
        assert_eq!(game.walk(Direction::Left, 0).unwrap().len(), 1);
        assert_eq!(game.overworld().position(), crate::overworld::Position::new(1, 1));
    }

    #[test]
    fn test_walk_stops_when_an_encounter_starts() {
        let mut game = on_route(Arc::new(MemoryStore::new()), starter(55, 68), ENCOUNTER.to_vec());

        let updates = game.walk(Direction::Right, 5).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].screen, Screen::Encounter);
        assert!(matches!(game.walk(Direction::Right, 1), Err(GameError::InvalidCommand(_))));
    }

    #[test]
    fn test_walk_is_capped() {
        let store = Arc::new(MemoryStore::new());
        store.save_chosen(&ash(), &starter(55, 68)).unwrap();
        let config = GameConfig {
            route_layout: vec!["P".repeat(200)],
            start: crate::overworld::Position::new(0, 0),
            ..config()
        };
        let mut game = GameSession::new(
            config,
            Box::new(provider()),
            Box::new(store),
            TurnRng::new_for_test(vec![]),
            ash(),
        )
        .unwrap();
        game.resume().unwrap();

        let updates = game.walk(Direction::Right, u32::MAX).unwrap();
        assert_eq!(updates.len(), MAX_WALK_STEPS as usize);
        assert_eq!(game.overworld().position().x, MAX_WALK_STEPS as usize);
    }

    #[test]
    fn test_sample_moves_never_exceeds_pool() {
        let pool = vec!["tackle".to_string(), "growl".to_string()];
        let mut rng = TurnRng::new_for_test(vec![0.9, 0.0]);
        let moves = sample_moves(&pool, 4, &mut rng);
        assert_eq!(moves, vec!["growl".to_string(), "tackle".to_string()]);
    }
}
