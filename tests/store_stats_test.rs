//! Completed matches through the JSON store and back out as statistics.

use chrono::{Duration, Utc};

use cricket_scorer::core::{default_team_a, default_team_b, validate_team, MatchState};
use cricket_scorer::stats::{aggregate, bowling_leaderboard, leaderboard, standings};
use cricket_scorer::store::{JsonFileStore, MatchRecord, Store, TeamRecord};
use cricket_scorer::types::{ScoreCommand, Team};

fn named(mut team: Team, name: &str) -> Team {
    team.name = name.to_string();
    team
}

/// Bat first scoring `first` off every ball, then chase scoring `second`
/// off every ball until the match ends.
fn finished(a: &str, b: &str, first: u32, second: u32, minutes_ago: i64) -> MatchRecord {
    let mut m = MatchState::new();
    m.start_match(named(default_team_a(), a), named(default_team_b(), b), 2)
        .unwrap();
    while m.innings() == 1 {
        m.apply(ScoreCommand::runs(first));
    }
    m.apply(ScoreCommand::SelectBowler { player_id: 8 });
    while !m.ended() {
        m.apply(ScoreCommand::runs(second));
    }
    MatchRecord::from_completed(&m, "club", None, Utc::now() - Duration::minutes(minutes_ago)).unwrap()
}

#[test]
fn tournament_round_trip_and_standings() {
    let dir = tempfile::tempdir().unwrap();
    let (older, newer, tid) = {
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        let tid = store
            .create_tournament("club", "Summer Cup", vec!["Lions".into(), "Tigers".into()], "T2")
            .unwrap();

        // Lions 24/0 beat Tigers 12/0 by 12 runs.
        let older = store.save_match(finished("Lions", "Tigers", 2, 1, 30)).unwrap();
        // Tigers 12/0, Lions chase with twos.
        let newer = store.save_match(finished("Tigers", "Lions", 1, 2, 5)).unwrap();
        store.add_match_to_tournament(&tid, &older).unwrap();
        store.add_match_to_tournament(&tid, &newer).unwrap();
        // Adding twice does not duplicate.
        store.add_match_to_tournament(&tid, &newer).unwrap();
        (older, newer, tid)
    };

    let store = JsonFileStore::open(dir.path()).unwrap();
    let matches = store.list_matches("club").unwrap();
    assert_eq!(matches.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec![newer.as_str(), older.as_str()]);
    assert!(store.list_matches("someone-else").unwrap().is_empty());

    let first = store.get_match(&older).unwrap();
    assert_eq!(first.result, "Lions won by 12 runs");
    assert_eq!(first.headline(), "Lions 24/0 (2.0) vs Tigers 12/0 (2.0)");
    assert_eq!(store.get_match(&newer).unwrap().result, "Lions won by 10 wickets");

    let tournament = store.get_tournament(&tid).unwrap();
    assert_eq!(tournament.match_ids, vec![older.clone(), newer.clone()]);

    let table = standings(&tournament, &matches);
    assert_eq!(table[0].team_name, "Lions");
    assert_eq!((table[0].played, table[0].won, table[0].points), (2, 2, 4));
    assert_eq!((table[1].team_name.as_str(), table[1].lost, table[1].points), ("Tigers", 2, 0));
    assert!(table[0].net_run_rate() > 0.0);
    assert!(table[1].net_run_rate() < 0.0);
}

#[test]
fn statistics_from_saved_history() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path()).unwrap();
    store.save_match(finished("Team A", "Team B", 2, 0, 20)).unwrap();
    store.save_match(finished("Team A", "Team B", 1, 3, 10)).unwrap();

    let history = store.list_matches("club").unwrap();
    let stats = aggregate(&history);
    // Kohli faced balls in both first innings; runs sorted descending.
    let kohli = stats.iter().find(|s| s.player_name == "Virat Kohli").unwrap();
    assert_eq!(kohli.matches, 2);
    assert!(stats.windows(2).all(|w| w[0].runs >= w[1].runs));

    let board = leaderboard(&store.all_matches(100).unwrap());
    assert_eq!(board, stats);
    // Nobody took a wicket.
    assert!(bowling_leaderboard(&history).is_empty());

    let bumrah = stats.iter().find(|s| s.player_name == "Jasprit Bumrah").unwrap();
    assert!(bumrah.total_balls_bowled() > 0);
}

#[test]
fn delete_removes_only_that_match() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path()).unwrap();
    let keep = store.save_match(finished("Team A", "Team B", 1, 1, 2)).unwrap();
    let gone = store.save_match(finished("Team A", "Team B", 2, 2, 1)).unwrap();

    store.delete_match(&gone).unwrap();
    assert!(store.get_match(&gone).unwrap_err().is_not_found());
    assert!(store.delete_match(&gone).unwrap_err().is_not_found());

    let reopened = JsonFileStore::open(dir.path()).unwrap();
    let ids: Vec<String> = reopened.list_matches("club").unwrap().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![keep]);
}

#[test]
fn saved_squad_starts_a_match() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        store
            .save_team(TeamRecord::new("club", &named(default_team_b(), "Visitors"), Utc::now()))
            .unwrap()
    };

    let mut store = JsonFileStore::open(dir.path()).unwrap();
    let saved = store.list_teams("club").unwrap();
    assert_eq!(saved.len(), 1);
    let squad = saved[0].to_team();
    assert!(validate_team(&squad).is_ok());

    let mut m = MatchState::new();
    m.start_match(default_team_a(), squad.clone(), 1).unwrap();
    assert_eq!(m.team(cricket_scorer::types::TeamSide::B).name, "Visitors");

    store.update_team(&id, "Away XI", squad.players).unwrap();
    assert_eq!(store.list_teams("club").unwrap()[0].name, "Away XI");
    store.delete_team(&id).unwrap();
    assert!(store.list_teams("club").unwrap().is_empty());
}
