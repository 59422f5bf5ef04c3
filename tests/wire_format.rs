//! Integration tests for the saved/synced JSON shape of a tournament.

use padel_tournament_web::logic::generate_matches;
use padel_tournament_web::sync::decode_snapshot;
use padel_tournament_web::{
    edit_teams, record_result, Player, SyncError, Team, TeamEdit, Tournament, TournamentFormat,
};
use serde_json::{json, Value};

fn cup() -> Tournament {
    let teams: Vec<Team> = (0..4)
        .map(|i| Team::new(Player::new(format!("A{i}")), Player::new(format!("B{i}"))))
        .collect();
    let players = teams.iter().flat_map(|t| t.players.clone()).collect();
    let mut t = Tournament::new(TournamentFormat::Cup, players, teams);
    t.matches = generate_matches(TournamentFormat::Cup, &t.teams);
    t.current_match_id = t.first_pending_in_round(1);
    t
}

#[test]
fn records_use_camel_case_and_embed_teams() {
    let t = cup();
    let m = t.matches[0].clone();
    let t = record_result(&t, m.id, m.team_a).unwrap();
    let value = serde_json::to_value(&t).unwrap();

    for key in ["id", "players", "teams", "matches", "format", "currentRound", "currentMatchId", "status"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert_eq!(value["format"], json!("cup"));
    assert_eq!(value["status"], json!("active"));
    assert_eq!(value["players"][0], json!("A0"));

    let first = &value["matches"][0];
    assert_eq!(first["matchType"], json!("group"));
    assert_eq!(first["status"], json!("completed"));
    assert_eq!(first["winnerId"], json!(m.team_a));
    assert_eq!(first["teamA"]["id"], json!(m.team_a));
    assert_eq!(first["teamA"]["points"], json!(3));
    assert!(first["teamB"]["players"].is_array());
}

#[test]
fn embedded_teams_follow_team_edits() {
    let t = cup();
    let team = t.teams[0].clone();
    let other = t.teams[1].clone();
    let swapped = edit_teams(
        &t,
        &[
            TeamEdit {
                id: team.id,
                players: ["A0".to_string(), "A1".to_string()],
            },
            TeamEdit {
                id: other.id,
                players: ["B0".to_string(), "B1".to_string()],
            },
        ],
    )
    .unwrap();

    let value = serde_json::to_value(&swapped).unwrap();
    let snapshot = value["matches"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["teamA"]["id"] == json!(team.id))
        .unwrap();
    assert_eq!(snapshot["teamA"]["players"], json!(["A0", "A1"]));
}

#[test]
fn snapshots_read_back_equal() {
    let mut t = cup();
    t.owner_id = Some("owner".to_string());
    t.restamp(chrono::Utc::now());
    let json = serde_json::to_vec(&t).unwrap();
    assert_eq!(decode_snapshot(&json).unwrap(), t);
}

#[test]
fn older_records_without_optional_fields_still_load() {
    let t = cup();
    let mut value = serde_json::to_value(&t).unwrap();
    let record = value.as_object_mut().unwrap();
    record.remove("format");
    record.remove("status");
    record.remove("currentMatchId");
    for m in record["matches"].as_array_mut().unwrap() {
        let m = m.as_object_mut().unwrap();
        m.remove("matchType");
        m.remove("status");
        m.remove("winnerId");
    }
    let loaded: Tournament = serde_json::from_value(value).unwrap();
    assert_eq!(loaded.format, TournamentFormat::Cup);
    assert_eq!(loaded.current_match_id, None);
    assert_eq!(loaded.matches.len(), t.matches.len());
}

#[test]
fn non_uuid_ids_are_malformed() {
    let t = cup();
    let mut value: Value = serde_json::to_value(&t).unwrap();
    value["matches"][0]["id"] = json!("round1_match_0_1");
    let payload = serde_json::to_vec(&value).unwrap();
    assert!(matches!(decode_snapshot(&payload), Err(SyncError::Malformed(_))));

    let mut value: Value = serde_json::to_value(&t).unwrap();
    value["teams"][0]["id"] = json!("team_1");
    let payload = serde_json::to_vec(&value).unwrap();
    assert!(matches!(decode_snapshot(&payload), Err(SyncError::Malformed(_))));
}

#[test]
fn records_breaking_invariants_are_rejected() {
    let t = cup();
    let m = t.matches[0].clone();
    let t = record_result(&t, m.id, m.team_a).unwrap();

    // Points that do not add up to the recorded wins.
    let mut value: Value = serde_json::to_value(&t).unwrap();
    value["teams"][0]["points"] = json!(7);
    let payload = serde_json::to_vec(&value).unwrap();
    assert!(matches!(decode_snapshot(&payload), Err(SyncError::Malformed(_))));

    // A winner that is not in the match.
    let mut value: Value = serde_json::to_value(&t).unwrap();
    let outsider = t.teams.iter().find(|team| !m.involves(team.id)).unwrap().id;
    value["matches"][0]["winnerId"] = json!(outsider);
    let payload = serde_json::to_vec(&value).unwrap();
    assert!(decode_snapshot(&payload).is_err());

    assert!(decode_snapshot(b"[]").is_err());
}
