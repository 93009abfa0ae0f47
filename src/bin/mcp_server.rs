//! Pokemon Encounter MCP Server
//!
//! A Model Context Protocol server (rmcp) that exposes the route walk and the
//! wild battle engine for LLM interaction.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use pokemon_encounter::interface::{
    display_screen, display_update, execute_command, open_session, Command,
};
use pokemon_encounter::{Direction, GameConfig, GameSession};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use serde_json::json;
use tokio::io::{stdin, stdout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pokemon-encounter-mcp")]
#[command(about = "MCP server for the Pokemon encounter game")]
struct Cli {
    /// RON config file; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Player whose save file to use
    #[arg(long)]
    player: Option<String>,
    /// RNG seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone)]
pub struct PokemonEncounterService {
    tool_router: ToolRouter<PokemonEncounterService>,
    game: Arc<Mutex<GameSession>>,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ChooseStarterRequest {
    #[schemars(description = "Starter number to choose, as listed by offer_starters (1-based)")]
    pub number: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WalkRequest {
    #[schemars(description = "Direction to walk: up, down, left or right")]
    pub direction: String,
    #[schemars(description = "Number of steps to take (default 1, at most 64); stops early at a wall or on an encounter")]
    pub steps: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FightRequest {
    #[schemars(description = "Name of the move to use")]
    pub move_name: String,
}

fn internal_error(message: String) -> McpError {
    McpError {
        code: ErrorCode(-32603),
        message: Cow::from(message),
        data: None,
    }
}

#[tool_router]
impl PokemonEncounterService {
    pub fn new(game: GameSession) -> Self {
        Self {
            tool_router: Self::tool_router(),
            game: Arc::new(Mutex::new(game)),
        }
    }

    /// Runs one command and renders its messages followed by the screen.
    /// Rejected commands come back as text so the model can correct itself.
    fn run(&self, command: Command) -> Result<CallToolResult, McpError> {
        let mut game = self
            .game
            .lock()
            .map_err(|_| internal_error("game session lock poisoned".to_string()))?;
        let text = match execute_command(&mut game, &command) {
            Ok(update) => render(&game, &display_update(&update)),
            Err(err) => {
                warn!(?command, error = %err, "tool command rejected");
                format!("Error: {}\n\n{}", err, display_screen(&game))
            }
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Offer a fresh set of starter Pokemon (call again to re-roll)")]
    async fn offer_starters(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Start)
    }

    #[tool(description = "Pick one of the offered starters and head out onto the route")]
    async fn choose_starter(
        &self,
        Parameters(request): Parameters<ChooseStarterRequest>,
    ) -> Result<CallToolResult, McpError> {
        if request.number == 0 {
            return Ok(CallToolResult::success(vec![Content::text(
                "Starter numbers start at 1.",
            )]));
        }
        self.run(Command::Choose(request.number - 1))
    }

    #[tool(description = "Continue with the previously chosen Pokemon")]
    async fn resume(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Resume)
    }

    #[tool(description = "Walk on the route; tall grass may start a wild encounter")]
    async fn walk(
        &self,
        Parameters(request): Parameters<WalkRequest>,
    ) -> Result<CallToolResult, McpError> {
        let direction = match request.direction.parse::<Direction>() {
            Ok(direction) => direction,
            Err(_) => {
                return Ok(CallToolResult::success(vec![Content::text(format!(
                    "'{}' is not a direction. Use up, down, left or right.",
                    request.direction
                ))]))
            }
        };

        let mut game = self
            .game
            .lock()
            .map_err(|_| internal_error("game session lock poisoned".to_string()))?;
        let messages = match game.walk(direction, request.steps.unwrap_or(1)) {
            Ok(updates) => updates
                .iter()
                .map(display_update)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>(),
            Err(err) => {
                warn!(error = %err, "walk rejected");
                vec![format!("Error: {}", err)]
            }
        };
        Ok(CallToolResult::success(vec![Content::text(render(
            &game,
            &messages.join("\n"),
        ))]))
    }

    #[tool(description = "Attack the wild Pokemon with one of your moves")]
    async fn fight(
        &self,
        Parameters(request): Parameters<FightRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Command::Fight(request.move_name.trim().replace(' ', "-")))
    }

    #[tool(description = "Try to run away from the wild Pokemon")]
    async fn run_away(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Run)
    }

    #[tool(description = "Throw a ball at the wild Pokemon")]
    async fn capture(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Capture)
    }

    #[tool(description = "Retry loading a wild encounter that failed to load")]
    async fn retry_encounter(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Retry)
    }

    #[tool(description = "Give up on a wild encounter that failed to load")]
    async fn abandon_encounter(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Abandon)
    }

    #[tool(description = "Show the current screen: route, battle, starters or collection")]
    async fn get_status(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Status)
    }

    #[tool(description = "List every Pokemon you have caught, as JSON")]
    async fn get_caught(&self) -> Result<CallToolResult, McpError> {
        let game = self
            .game
            .lock()
            .map_err(|_| internal_error("game session lock poisoned".to_string()))?;
        let caught = game
            .caught()
            .map_err(|err| internal_error(format!("Error reading collection: {}", err)))?;
        let payload = json!({
            "player": game.player_id().as_str(),
            "count": caught.len(),
            "caught": caught,
        });
        Ok(CallToolResult::success(vec![Content::text(payload.to_string())]))
    }

    #[tool(description = "Return to the title screen; saved data is kept")]
    async fn restart(&self) -> Result<CallToolResult, McpError> {
        self.run(Command::Restart)
    }
}

fn render(game: &GameSession, messages: &str) -> String {
    if messages.is_empty() {
        display_screen(game)
    } else {
        format!("{}\n\n{}", messages, display_screen(game))
    }
}

#[tool_handler]
impl ServerHandler for PokemonEncounterService {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let game = open_session(config, cli.player.as_deref(), cli.seed)?;

    info!("Pokemon Encounter MCP server starting");
    let service = PokemonEncounterService::new(game);
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;
    let quit_reason = server.waiting().await?;

    info!(?quit_reason, "Pokemon Encounter MCP server exiting");
    Ok(())
}
