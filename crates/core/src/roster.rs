//! Default squads and roster validation.

use std::collections::HashSet;

use cricket_scorer_types::{Player, Role, Team, TEAM_SIZE};

use crate::MatchSetupError;

const TEAM_A: [(&str, Role); TEAM_SIZE] = [
    ("Virat Kohli", Role::Batsman),
    ("Rohit Sharma", Role::Batsman),
    ("Shubman Gill", Role::Batsman),
    ("Suryakumar Yadav", Role::AllRounder),
    ("Hardik Pandya", Role::AllRounder),
    ("Rishabh Pant", Role::Batsman),
    ("Axar Patel", Role::AllRounder),
    ("Jasprit Bumrah", Role::Bowler),
    ("Mohammed Siraj", Role::Bowler),
    ("Yuzvendra Chahal", Role::Bowler),
    ("Kuldeep Yadav", Role::Bowler),
];

const TEAM_B: [(&str, Role); TEAM_SIZE] = [
    ("Kane Williamson", Role::Batsman),
    ("Babar Azam", Role::Batsman),
    ("Steve Smith", Role::Batsman),
    ("Ben Stokes", Role::AllRounder),
    ("Pat Cummins", Role::AllRounder),
    ("Jonny Bairstow", Role::Batsman),
    ("Keshav Maharaj", Role::AllRounder),
    ("Jofra Archer", Role::Bowler),
    ("Mark Wood", Role::Bowler),
    ("Reece Topley", Role::Bowler),
    ("Tom Hartley", Role::Bowler),
];

fn build(name: &str, first_id: u32, squad: &[(&str, Role)]) -> Team {
    let players = squad
        .iter()
        .enumerate()
        .map(|(i, (player, role))| Player::new(first_id + i as u32, *player, *role))
        .collect();
    Team::new(name, players)
}

/// "Team A" with player ids 1..=11
pub fn default_team_a() -> Team {
    build("Team A", 1, &TEAM_A)
}

/// "Team B" with player ids 12..=22
pub fn default_team_b() -> Team {
    build("Team B", 12, &TEAM_B)
}

/// Check a roster is playable: a name, exactly eleven named players, no repeated ids.
pub fn validate_team(team: &Team) -> Result<(), MatchSetupError> {
    if team.name.trim().is_empty() {
        return Err(MatchSetupError::EmptyTeamName);
    }
    if team.players.len() != TEAM_SIZE {
        return Err(MatchSetupError::WrongSquadSize {
            team: team.name.clone(),
            count: team.players.len(),
            expected: TEAM_SIZE,
        });
    }

    let mut seen = HashSet::with_capacity(TEAM_SIZE);
    for player in &team.players {
        if !seen.insert(player.id) {
            return Err(MatchSetupError::DuplicatePlayerId {
                team: team.name.clone(),
                id: player.id,
            });
        }
        if player.name.trim().is_empty() {
            return Err(MatchSetupError::EmptyPlayerName {
                team: team.name.clone(),
                id: player.id,
            });
        }
    }
    Ok(())
}
