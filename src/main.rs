//! Cricket scorer (default binary).
//!
//! With no subcommand this runs the scorer's terminal scoreboard. The other
//! subcommands watch a live match or work with saved history, squads and
//! tournaments. The board uses crossterm and a framebuffer renderer (no
//! widget toolkit).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{mpsc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cricket_scorer::adapter::{Adapter, ServerConfig};
use cricket_scorer::config::AppConfig;
use cricket_scorer::core::{default_team_a, default_team_b, validate_team, MatchSnapshot, MatchState};
use cricket_scorer::input::{handle_key_event, is_start_key, should_quit};
use cricket_scorer::observe::{connect_observer, wait_for_welcome, ObserveConfig, ObserveEvent};
use cricket_scorer::session::{ScoringSession, SessionNotice};
use cricket_scorer::stats::{aggregate, bowling_leaderboard, leaderboard, standings};
use cricket_scorer::store::{JsonFileStore, Store, TeamRecord};
use cricket_scorer::term::{FrameBuffer, ScoreboardView, StatusView, TerminalRenderer, ViewRole, Viewport};
use cricket_scorer::types::{Player, Role, ScoreCommand, Team};

const FRAME_POLL: Duration = Duration::from_millis(50);
const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Parser)]
#[command(name = "cricket-scorer", version, about = "Ball-by-ball cricket scorer")]
struct Cli {
    /// Directory holding matches.json, teams.json and tournaments.json
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,
    /// Owner id for saved records and the live broadcast
    #[arg(long, global = true)]
    scorer_id: Option<String>,

    #[command(flatten)]
    score: ScoreArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Args)]
struct ScoreArgs {
    /// Overs per innings
    #[arg(long)]
    overs: Option<u32>,
    /// Append the completed match to this tournament
    #[arg(long)]
    tournament: Option<String>,
    /// Saved squad id for team A
    #[arg(long)]
    team_a: Option<String>,
    /// Saved squad id for team B
    #[arg(long)]
    team_b: Option<String>,
    /// Live channel bind host
    #[arg(long)]
    live_host: Option<String>,
    /// Live channel bind port
    #[arg(long)]
    live_port: Option<u16>,
    /// Do not start the live channel
    #[arg(long)]
    offline: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Watch a live match
    Observe {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 7878)]
        port: u16,
        #[arg(long, env = "CRICKET_LIVE_VIEWER_TOKEN")]
        token: Option<String>,
        /// Scorer id to expect
        #[arg(long)]
        watch: Option<String>,
    },
    /// List completed matches, newest first
    History,
    /// Delete a completed match
    Delete { id: String },
    /// Career statistics for every player in your matches
    Stats,
    /// Leaderboard across all recent matches
    Leaderboard {
        #[arg(long)]
        bowling: bool,
    },
    /// Saved squads
    #[command(subcommand)]
    Teams(TeamsCommand),
    /// Tournaments
    #[command(subcommand)]
    Tournament(TournamentCommand),
}

#[derive(Debug, Subcommand)]
enum TeamsCommand {
    List,
    /// Save a squad. Each player is `Name:Role`; with none given the default
    /// eleven are copied.
    Add {
        name: String,
        #[arg(long = "player")]
        players: Vec<String>,
    },
    /// Rename a squad
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum TournamentCommand {
    List,
    Create {
        name: String,
        /// Member team names
        #[arg(long = "team", required = true)]
        teams: Vec<String>,
        #[arg(long, default_value = "T2")]
        match_type: String,
    },
    /// Points table
    Standings { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(id) = cli.scorer_id.clone() {
        config.scorer_id = id;
    }
    if let Some(overs) = cli.score.overs {
        config.total_overs = overs;
    }
    if let Some(tid) = cli.score.tournament.clone() {
        config.tournament_id = Some(tid);
    }

    match cli.command {
        None => {
            init_tracing(Some(&config.log_path))?;
            run_scorer(&config, &cli.score)
        }
        Some(Command::Observe { host, port, token, watch }) => {
            init_tracing(Some(&config.log_path))?;
            run_observer(ObserveConfig { host, port, token, watch })
        }
        Some(other) => {
            init_tracing(None)?;
            run_command(&config, other)
        }
    }
}

/// Logs go to a file while the terminal is in raw mode, stderr otherwise.
fn init_tracing(log_path: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<JsonFileStore> {
    JsonFileStore::open(&config.data_dir)
        .with_context(|| format!("open data directory {}", config.data_dir.display()))
}

// ============== Scorer ==============

fn run_scorer(config: &AppConfig, args: &ScoreArgs) -> Result<()> {
    let store = open_store(config)?;
    let team_a = squad(&store, &config.scorer_id, args.team_a.as_deref(), default_team_a)?;
    let team_b = squad(&store, &config.scorer_id, args.team_b.as_deref(), default_team_b)?;

    let adapter = if args.offline || ServerConfig::is_disabled() {
        None
    } else {
        let mut live = ServerConfig::from_env();
        live.scorer_id = config.scorer_id.clone();
        if let Some(host) = args.live_host.clone() {
            live.host = host;
        }
        if let Some(port) = args.live_port {
            live.port = port;
        }
        match Adapter::start(live) {
            Ok(adapter) => Some(adapter),
            Err(e) => {
                warn!(error = %e, "live channel unavailable");
                None
            }
        }
    };

    let mut session = ScoringSession::new(
        MatchState::new(),
        Box::new(store),
        config.scorer_id.clone(),
        config.tournament_id.clone(),
        adapter,
    );
    info!(scorer = %config.scorer_id, overs = config.total_overs, "scorer ready");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = score_loop(&mut term, &mut session, (team_a, team_b), config.total_overs);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn squad(store: &JsonFileStore, owner: &str, id: Option<&str>, fallback: fn() -> Team) -> Result<Team> {
    let Some(id) = id else {
        return Ok(fallback());
    };
    store
        .list_teams(owner)?
        .into_iter()
        .find(|t| t.id == id)
        .map(|t| t.to_team())
        .ok_or_else(|| anyhow!("no saved squad with id {id}"))
}

fn score_loop(
    term: &mut TerminalRenderer,
    session: &mut ScoringSession,
    (team_a, team_b): (Team, Team),
    total_overs: u32,
) -> Result<()> {
    let view = ScoreboardView::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut status = StatusView {
        role: ViewRole::Scorer,
        channel: session.live_addr().map(|a| a.to_string()),
        notice: None,
    };

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(session.snapshot(), &status, Viewport::new(w, h), &mut fb);
        term.draw(&fb)?;

        if event::poll(FRAME_POLL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if is_start_key(key) {
                        if session.state().ended() {
                            session.apply(ScoreCommand::Reset);
                        }
                        if !session.state().started() {
                            match session.start_match(team_a.clone(), team_b.clone(), total_overs) {
                                Ok(()) => status.notice = None,
                                Err(e) => status.notice = Some(e.to_string()),
                            }
                        }
                    } else if let Some(cmd) = handle_key_event(key, session.snapshot()) {
                        session.apply(cmd);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        session.pump_remote();
        while let Some(notice) = session.poll_notice() {
            status.notice = Some(match notice {
                SessionNotice::Saved { match_id } => format!("Match saved ({match_id})"),
                SessionNotice::PersistFailed(e) => format!("Save failed: {e}"),
            });
        }
    }
}

// ============== Viewer ==============

fn run_observer(config: ObserveConfig) -> Result<()> {
    let rx = connect_observer(&config)?;
    let (_, scorer_id) = wait_for_welcome(&rx, Duration::from_secs(5))?;
    info!(host = %config.host, port = config.port, scorer = %scorer_id, "watching");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = observe_loop(&mut term, &rx, scorer_id);

    let _ = term.exit();
    result
}

fn observe_loop(term: &mut TerminalRenderer, rx: &mpsc::Receiver<ObserveEvent>, scorer_id: String) -> Result<()> {
    let view = ScoreboardView::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snapshot = MatchState::new().snapshot();
    let mut status = StatusView {
        role: ViewRole::Viewer,
        channel: Some(scorer_id),
        notice: Some("Waiting for the scorer...".to_string()),
    };

    loop {
        while let Ok(ev) = rx.try_recv() {
            apply_observe_event(ev, &mut snapshot, &mut status);
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snapshot, &status, Viewport::new(w, h), &mut fb);
        term.draw(&fb)?;

        if event::poll(FRAME_POLL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press && should_quit(key) => return Ok(()),
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }
    }
}

fn apply_observe_event(ev: ObserveEvent, snapshot: &mut MatchSnapshot, status: &mut StatusView) {
    match ev {
        ObserveEvent::Observation(obs) => {
            *snapshot = obs.snapshot;
            status.notice = None;
        }
        ObserveEvent::Error { code, message } => {
            status.notice = Some(ObserveEvent::describe_error(code, &message));
        }
        ObserveEvent::Closed => {
            status.notice = Some("Connection to the scorer closed".to_string());
        }
        ObserveEvent::Welcome { .. } => {}
    }
}

// ============== Records ==============

fn run_command(config: &AppConfig, command: Command) -> Result<()> {
    let mut store = open_store(config)?;
    let owner = config.scorer_id.as_str();

    match command {
        Command::History => {
            let matches = store.list_matches(owner).context("failed to load history")?;
            if matches.is_empty() {
                println!("No completed matches.");
            }
            for m in matches.iter().take(HISTORY_LIMIT) {
                println!("{}  {} {}  {}", m.id, m.date, m.time, m.headline());
                println!("    {}  (man of the match: {})", m.result, m.man_of_match);
            }
        }
        Command::Delete { id } => {
            store.delete_match(&id).context("failed to delete match")?;
            println!("Deleted {id}");
        }
        Command::Stats => {
            let matches = store.list_matches(owner).context("failed to load history")?;
            print_batting(&aggregate(&matches));
        }
        Command::Leaderboard { bowling } => {
            let matches = store.all_matches(usize::MAX)?;
            if bowling {
                print_bowling(&bowling_leaderboard(&matches));
            } else {
                print_batting(&leaderboard(&matches));
            }
        }
        Command::Teams(cmd) => run_teams(&mut store, owner, cmd)?,
        Command::Tournament(cmd) => run_tournament(&mut store, owner, cmd)?,
        Command::Observe { .. } => bail!("observe runs the viewer"),
    }
    Ok(())
}

fn print_batting(stats: &[cricket_scorer::stats::PlayerStats]) {
    println!("{:<24} {:>4} {:>6} {:>6} {:>5} {:>7} {:>4} {:>4}", "Player", "Inn", "Runs", "Avg", "HS", "SR", "4s", "6s");
    for s in stats {
        println!(
            "{:<24} {:>4} {:>6} {:>6.2} {:>5} {:>7.2} {:>4} {:>4}",
            s.player_name,
            s.matches,
            s.runs,
            s.batting_average(),
            s.highest_score,
            s.strike_rate(),
            s.fours,
            s.sixes
        );
    }
}

fn print_bowling(stats: &[cricket_scorer::stats::PlayerStats]) {
    println!("{:<24} {:>6} {:>5} {:>5} {:>6} {:>6}", "Player", "Overs", "Runs", "Wkts", "Econ", "Best");
    for s in stats {
        println!(
            "{:<24} {:>6} {:>5} {:>5} {:>6.2} {:>6}",
            s.player_name,
            s.overs_display(),
            s.runs_conceded,
            s.wickets,
            s.economy(),
            s.best_bowling()
        );
    }
}

fn run_teams(store: &mut JsonFileStore, owner: &str, cmd: TeamsCommand) -> Result<()> {
    match cmd {
        TeamsCommand::List => {
            for t in store.list_teams(owner)? {
                println!("{}  {} ({} players)", t.id, t.name, t.players.len());
            }
        }
        TeamsCommand::Add { name, players } => {
            let team = build_squad(&name, &players)?;
            validate_team(&team).map_err(|e| anyhow!("invalid squad: {e}"))?;
            let id = store.save_team(TeamRecord::new(owner, &team, Utc::now()))?;
            println!("Saved squad {id}");
        }
        TeamsCommand::Rename { id, name } => {
            let existing = store
                .list_teams(owner)?
                .into_iter()
                .find(|t| t.id == id)
                .ok_or_else(|| anyhow!("no saved squad with id {id}"))?;
            store.update_team(&id, &name, existing.players)?;
            println!("Renamed {id}");
        }
        TeamsCommand::Delete { id } => {
            store.delete_team(&id)?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

/// `Name:Role` pairs, numbered from 1.
fn build_squad(name: &str, specs: &[String]) -> Result<Team> {
    if specs.is_empty() {
        let mut team = default_team_a();
        team.name = name.to_string();
        return Ok(team);
    }
    let players = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let (player, role) = spec.rsplit_once(':').unwrap_or((spec.as_str(), "Batsman"));
            let role = Role::from_str(role).ok_or_else(|| anyhow!("unknown role in {spec:?}"))?;
            Ok(Player::new(i as u32 + 1, player.trim(), role))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Team::new(name, players))
}

fn run_tournament(store: &mut JsonFileStore, owner: &str, cmd: TournamentCommand) -> Result<()> {
    match cmd {
        TournamentCommand::List => {
            for t in store.list_tournaments(owner)? {
                println!(
                    "{}  {} [{}] {} teams, {} matches",
                    t.id,
                    t.name,
                    t.match_type,
                    t.teams.len(),
                    t.match_ids.len()
                );
            }
        }
        TournamentCommand::Create { name, teams, match_type } => {
            let id = store.create_tournament(owner, &name, teams, &match_type)?;
            println!("Created tournament {id}");
        }
        TournamentCommand::Standings { id } => {
            let tournament = store.get_tournament(&id)?;
            let records = tournament
                .match_ids
                .iter()
                .filter_map(|mid| match store.get_match(mid) {
                    Ok(m) => Some(m),
                    Err(e) => {
                        error!(match_id = %mid, error = %e, "tournament match missing");
                        None
                    }
                })
                .collect::<Vec<_>>();
            println!("{}", tournament.name);
            println!("{:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>7}", "Team", "P", "W", "L", "T", "Pts", "NRR");
            for row in standings(&tournament, &records) {
                println!(
                    "{:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>+7.3}",
                    row.team_name,
                    row.played,
                    row.won,
                    row.lost,
                    row.tied,
                    row.points,
                    row.net_run_rate()
                );
            }
        }
    }
    Ok(())
}
