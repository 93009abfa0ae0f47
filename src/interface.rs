//! Text front end shared by the terminal client and the MCP server.
//!
//! Parses typed commands, runs them against a [`GameSession`], and renders
//! screens, battles and updates as plain text.

use crate::battle::catch::{capture_chance, capture_chance_description};
use crate::battle::engine::BattleSession;
use crate::combatant::{format_move_name, Combatant};
use crate::config::GameConfig;
use crate::errors::GameResult;
use crate::overworld::Overworld;
use crate::provider::{BundledProvider, CachingProvider};
use crate::rng::TurnRng;
use crate::session::{Cue, GameSession, PersistenceNote, Screen, SessionUpdate};
use crate::store::{FileStore, PlayerId};
use schema::{CaughtRecord, ChosenSnapshot, Direction, TileKind};
use std::str::FromStr;

const HP_BAR_WIDTH: usize = 20;
const PLAYER_MARKER: char = '@';

/// Opens a session backed by the bundled Pokedex (behind a stats cache) and
/// a file store under `config.store_dir`.
pub fn open_session(
    config: GameConfig,
    player: Option<&str>,
    seed: Option<u64>,
) -> GameResult<GameSession> {
    let provider = CachingProvider::new(BundledProvider::new(), config.stats_cache_ttl());
    let store = FileStore::open(&config.store_dir)?;
    let player = PlayerId::new(player.unwrap_or(&config.default_player));
    let rng = match seed {
        Some(seed) => TurnRng::from_seed(seed),
        None => TurnRng::new_random(),
    };
    GameSession::new(config, Box::new(provider), Box::new(store), rng, player)
}

/// One parsed line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Resume,
    Choose(usize),
    Walk(Direction),
    Fight(String),
    Run,
    Capture,
    Retry,
    Abandon,
    Caught,
    Back,
    Status,
    Restart,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((head, rest)) = parts.split_first() else {
            return Err("Type a command, or 'help' for a list.".to_string());
        };

        match head.to_lowercase().as_str() {
            "start" | "new" => Ok(Command::Start),
            "continue" | "resume" => Ok(Command::Resume),
            "choose" | "pick" => {
                let number = rest
                    .first()
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| "Which starter? (e.g., 'choose 1')".to_string())?;
                Ok(Command::Choose(number - 1))
            }
            "w" => Ok(Command::Walk(Direction::Up)),
            "a" => Ok(Command::Walk(Direction::Left)),
            "s" => Ok(Command::Walk(Direction::Down)),
            "d" => Ok(Command::Walk(Direction::Right)),
            "walk" | "go" => {
                let direction = rest
                    .first()
                    .ok_or_else(|| "Which way? (up, down, left, right)".to_string())?;
                Direction::from_str(direction)
                    .map(Command::Walk)
                    .map_err(|_| format!("'{}' is not a direction.", direction))
            }
            "fight" | "use" | "attack" => {
                if rest.is_empty() {
                    return Err("Which move? (e.g., 'fight tackle')".to_string());
                }
                // "quick attack" and "quick-attack" both name the same move
                Ok(Command::Fight(rest.join("-")))
            }
            "run" | "flee" => Ok(Command::Run),
            "capture" | "catch" | "ball" => Ok(Command::Capture),
            "retry" => Ok(Command::Retry),
            "abandon" => Ok(Command::Abandon),
            "caught" | "collection" => Ok(Command::Caught),
            "back" => Ok(Command::Back),
            "status" | "look" => Ok(Command::Status),
            "restart" => Ok(Command::Restart),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Direction::from_str(other)
                .map(Command::Walk)
                .map_err(|_| format!("Unknown command '{}'. Type 'help' for a list.", other)),
        }
    }
}

/// Runs one command. `Status`, `Help` and `Quit` have no session effect and
/// return an update for the current screen.
pub fn execute_command(game: &mut GameSession, command: &Command) -> GameResult<SessionUpdate> {
    match command {
        Command::Start => game.offer_starters(),
        Command::Resume => game.resume(),
        Command::Choose(index) => game.choose_starter(*index),
        Command::Walk(direction) => game.step(*direction),
        Command::Fight(move_name) => game.fight(move_name),
        Command::Run => game.run(),
        Command::Capture => game.capture(),
        Command::Retry => game.retry_encounter(),
        Command::Abandon => game.abandon_encounter(),
        Command::Caught => game.open_caught_list(),
        Command::Back => game.return_to_route(),
        Command::Restart => game.restart(),
        Command::Status | Command::Help | Command::Quit => Ok(SessionUpdate::idle(game.screen())),
    }
}

pub fn help_text() -> String {
    [
        "--- Commands ---",
        "  start              Offer starter Pokemon (again to re-roll)",
        "  continue           Resume with your saved Pokemon",
        "  choose <n>         Pick starter number n",
        "  w/a/s/d, walk <dir> Take a step on the route",
        "  fight <move>       Attack with one of your moves",
        "  run                Try to escape",
        "  capture            Throw a ball",
        "  retry / abandon    Retry or give up a stuck encounter",
        "  caught / back      Open or leave your collection",
        "  status             Show the current screen",
        "  restart            Back to the title screen",
        "  quit               Leave the game",
    ]
    .join("\n")
}

/// Renders whatever the current screen shows.
pub fn display_screen(game: &GameSession) -> String {
    match game.screen() {
        Screen::Title => {
            "=== Pokemon Encounter ===\nType 'start' for a new game or 'continue' to resume."
                .to_string()
        }
        Screen::StarterSelection => display_starter_offers(game.offers()),
        Screen::Route => display_route(game.overworld()),
        Screen::Loading => match game.loading_error() {
            Some(error) => format!(
                "Loading the wild Pokemon failed: {}\nType 'retry' or 'abandon'.",
                error
            ),
            None => "Loading...".to_string(),
        },
        Screen::Encounter => match game.battle() {
            Some(battle) => display_battle_status(battle),
            None => "No battle is currently active.".to_string(),
        },
        Screen::Captured => match game.caught() {
            Ok(records) => display_caught_list(&records),
            Err(err) => format!("Could not read your collection: {}", err),
        },
        Screen::Defeat => {
            let mut output = String::from("*** You were defeated! Your collection was lost. ***\n");
            if let Some(battle) = game.last_battle() {
                output.push_str(&display_battle_log(battle));
            }
            output.push_str("Type 'restart' to try again.");
            output
        }
    }
}

/// The route with the player drawn at their position.
pub fn display_route(overworld: &Overworld) -> String {
    let position = overworld.position();
    let mut output = String::from("--- Route ---\n");
    for (y, row) in overworld.grid().rows().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            if x == position.x && y == position.y {
                output.push(PLAYER_MARKER);
            } else {
                output.push(tile_glyph(*tile));
            }
        }
        output.push('\n');
    }
    output.push_str(&format!(
        "You are at {} facing {}.",
        position,
        overworld.facing()
    ));
    output
}

fn tile_glyph(tile: TileKind) -> char {
    match tile {
        TileKind::Blocked => '#',
        TileKind::Open => '.',
        TileKind::Trigger => '"',
    }
}

pub fn display_starter_offers(offers: &[ChosenSnapshot]) -> String {
    if offers.is_empty() {
        return "No starters on offer. Type 'start'.".to_string();
    }
    let mut output = String::from("--- Choose Your Starter ---\n");
    for (i, offer) in offers.iter().enumerate() {
        let moves: Vec<String> = offer.moves.iter().map(|m| format_move_name(m)).collect();
        output.push_str(&format!(
            " {}. {} (HP {} / Atk {} / Def {})\n    Moves: {}\n",
            i + 1,
            crate::combatant::display_name(&offer.name),
            offer.hp,
            offer.attack,
            offer.defense,
            moves.join(", ")
        ));
    }
    output.push_str("Type 'choose <n>', or 'start' to re-roll.");
    output
}

/// `[##########----------]` scaled to the combatant's remaining HP.
pub fn hp_bar(combatant: &Combatant) -> String {
    let filled = (combatant.hp_ratio() * HP_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(HP_BAR_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(HP_BAR_WIDTH - filled)
    )
}

pub fn display_battle_status(battle: &BattleSession) -> String {
    let opponent = battle.opponent();
    let player = battle.player();
    let chance = capture_chance(opponent.current_hp(), opponent.max_hp());

    let mut output = String::new();
    output.push_str(&format!("--- Wild {} ---\n", opponent));
    output.push_str(&format!("  {}\n", hp_bar(opponent)));
    output.push_str(&format!(
        "  Capture chance: {}\n",
        capture_chance_description(chance)
    ));
    output.push_str(&format!("--- Your {} ---\n", player));
    output.push_str(&format!("  {}\n", hp_bar(player)));
    let moves: Vec<String> = player.moves.iter().map(|m| format_move_name(m)).collect();
    output.push_str(&format!("  Moves: {}\n", moves.join(", ")));

    if !battle.headline().is_empty() {
        output.push_str(&format!("\n{}\n", battle.headline()));
    }
    output.push_str(&display_battle_log(battle));
    output
}

pub fn display_battle_log(battle: &BattleSession) -> String {
    if battle.log().is_empty() {
        return String::new();
    }
    let mut output = String::from("--- Battle Log ---\n");
    for (turn, entry) in battle.log().iter().enumerate() {
        output.push_str(&format!(" {:>2}. {}\n", turn + 1, entry));
    }
    output
}

pub fn display_caught_list(records: &[CaughtRecord]) -> String {
    if records.is_empty() {
        return "--- Your Collection ---\nYou haven't caught anything yet.\nType 'back' to return to the route.".to_string();
    }
    let mut output = format!("--- Your Collection ({}) ---\n", records.len());
    for (i, record) in records.iter().enumerate() {
        output.push_str(&format!(
            " {}. {} (HP {} / Atk {} / Def {})\n",
            i + 1,
            record.name,
            record.hp,
            record.attack,
            record.defense
        ));
    }
    output.push_str("Type 'back' to return to the route.");
    output
}

/// Event messages plus any persistence failures, one per line.
pub fn display_update(update: &SessionUpdate) -> String {
    let mut lines = update.messages();
    for note in &update.persistence {
        if let PersistenceNote::Failed { operation, error } = note {
            lines.push(format!("(Could not {}: {})", operation, error));
        }
    }
    lines.join("\n")
}

/// Short name for a cue, for clients without audio.
pub fn describe_cue(cue: &Cue) -> String {
    match cue {
        Cue::Music(theme) => format!("music: {}", theme),
        Cue::Cry(source) => format!("cry: {}", source),
        Cue::Attack(side) => format!("attack: {:?}", side),
        Cue::Hit(side) => format!("hit: {:?}", side),
        Cue::BallShake => "ball shake".to_string(),
        Cue::Victory => "victory".to_string(),
        Cue::Defeat => "defeat".to_string(),
        Cue::Wait(delay) => format!("wait {} ms", delay.as_millis()),
    }
}
