use anyhow::Context;
use clap::Parser;
use pokemon_encounter::interface::{
    describe_cue, display_screen, display_update, execute_command, help_text, open_session,
    Command,
};
use pokemon_encounter::{Cue, GameConfig, GameSession, SessionUpdate};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pokemon-encounter")]
#[command(about = "Walk the route, meet wild Pokemon, fight or catch them")]
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
    /// Skip the pauses between battle steps
    #[arg(long)]
    no_wait: bool,
    /// Print audio cues as they fire
    #[arg(long)]
    show_cues: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    let mut game = open_session(config, cli.player.as_deref(), cli.seed)
        .context("starting the game session")?;
    println!("{}", display_screen(&game));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        debug!(?command, "command");

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", help_text()),
            command => match execute_command(&mut game, &command) {
                Ok(update) => present(&game, &update, &cli),
                Err(err) => {
                    warn!(error = %err, "command rejected");
                    println!("{}", err);
                }
            },
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn present(game: &GameSession, update: &SessionUpdate, cli: &Cli) {
    for cue in &update.cues {
        match cue {
            Cue::Wait(delay) if !cli.no_wait => thread::sleep(*delay),
            _ if cli.show_cues => println!("  ({})", describe_cue(cue)),
            _ => {}
        }
    }
    let messages = display_update(update);
    if !messages.is_empty() {
        println!("{}", messages);
    }
    println!("{}", display_screen(game));
}
