//! Single binary web server: JSON API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST, PORT, DATA_DIR (one JSON file per tournament), INACTIVITY_HOURS.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{self, Bytes, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use padel_tournament_web::{
    correct_winner, edit_teams, parse_roster, record_result, schedule, set_current_match,
    start_tournament, sync::decode_snapshot, transitions, Error, JsonFileStore, OwnerIdentity,
    RemoteSync, ServerConfig, SessionIdentity, SyncError, SyncHub, SyncedTournament, TeamEdit,
    TeamId, Tournament, TournamentError, TournamentFormat, TournamentId, Transition,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

type SyncedSession = SyncedTournament<JsonFileStore, SyncHub>;

/// Per-tournament entry: synced tournament + last activity time (for auto-cleanup).
struct TournamentEntry {
    session: SyncedSession,
    last_activity: Instant,
}

impl TournamentEntry {
    fn new(session: SyncedSession) -> Self {
        Self {
            session,
            last_activity: Instant::now(),
        }
    }
}

/// Tournaments currently in memory, by id. Idle entries are dropped; their files stay on disk
/// and are loaded again on the next request.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OwnerResponse {
    owner_id: String,
}

/// A changed tournament plus what a spectator should be told about it.
#[derive(Serialize)]
struct ChangeResponse<'a> {
    tournament: &'a Tournament,
    transitions: Vec<Transition>,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    /// Local state kept after a failed save or push.
    #[serde(skip_serializing_if = "Option::is_none")]
    tournament: Option<&'a Tournament>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    players: Vec<String>,
    #[serde(default)]
    format: TournamentFormat,
}

#[derive(Deserialize)]
struct ImportQuery {
    #[serde(default)]
    format: TournamentFormat,
}

#[derive(Deserialize)]
struct RecordResultBody {
    match_id: Uuid,
    winner_id: TeamId,
}

#[derive(Deserialize)]
struct CorrectWinnerBody {
    #[serde(default)]
    winner_id: Option<TeamId>,
}

#[derive(Deserialize)]
struct CurrentMatchBody {
    match_id: Uuid,
}

#[derive(Deserialize)]
struct EditTeamsBody {
    teams: Vec<TeamEdit>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id (e.g. /api/tournaments/{id}/matches/{match_id})
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: Uuid,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

/// Validation errors are the client's fault; store and sync failures keep the local state and
/// hand it back so the client can keep going.
fn error_response(e: &Error, local: Option<&Tournament>) -> HttpResponse {
    match e {
        Error::Validation(_)
        | Error::Sync(SyncError::Malformed(_) | SyncError::WrongTournament { .. }) => {
            HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
                tournament: None,
            })
        }
        _ => {
            log::warn!("{}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: e.to_string(),
                tournament: local,
            })
        }
    }
}

/// Find a tournament in memory, or load it from disk and start watching it. Touching it
/// refreshes last_activity.
fn load_entry<'a>(
    g: &'a mut HashMap<TournamentId, TournamentEntry>,
    id: TournamentId,
    hub: &SyncHub,
    config: &ServerConfig,
) -> Result<Option<&'a mut TournamentEntry>, Error> {
    if !g.contains_key(&id) {
        let store = JsonFileStore::new(config.tournament_path(id));
        if let Some(mut session) = SyncedTournament::restore(store, hub.clone())? {
            session.watch();
            if let Err(e) = session.refresh() {
                log::warn!("Could not refresh tournament {} from the hub: {}", id, e);
            }
            log::info!("Loaded tournament {} from disk", id);
            g.insert(id, TournamentEntry::new(session));
        }
    }
    Ok(g.get_mut(&id).map(|entry| {
        entry.last_activity = Instant::now();
        entry
    }))
}

/// Run an engine operation through the entry's session and report what changed.
fn apply_change<F>(entry: &mut TournamentEntry, op: F) -> HttpResponse
where
    F: FnOnce(&Tournament) -> Result<Tournament, TournamentError>,
{
    let before = entry.session.tournament().clone();
    let outcome = entry
        .session
        .apply(op)
        .map(|after| transitions(&before, after));
    match outcome {
        Ok(transitions) => HttpResponse::Ok().json(ChangeResponse {
            tournament: entry.session.tournament(),
            transitions,
        }),
        Err(e) => error_response(&e, Some(entry.session.tournament())),
    }
}

/// Create, persist and publish a tournament for the given roster.
fn create_tournament(
    state: &AppState,
    hub: &SyncHub,
    config: &ServerConfig,
    identity: &dyn OwnerIdentity,
    names: &[String],
    format: TournamentFormat,
) -> HttpResponse {
    let tournament = match start_tournament(names, format, identity, &mut rand::thread_rng()) {
        Ok(t) => t,
        Err(e) => return error_response(&e.into(), None),
    };
    let id = tournament.id;
    let store = JsonFileStore::new(config.tournament_path(id));
    let mut session = SyncedTournament::new(tournament, store, hub.clone());
    session.watch();
    let flushed = session.flush();

    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = g.entry(id).or_insert(TournamentEntry::new(session));
    match flushed {
        Ok(()) => HttpResponse::Ok().json(entry.session.tournament()),
        Err(e) => error_response(&e, Some(entry.session.tournament())),
    }
}

/// Drop tournaments idle for `timeout` from memory and from the hub. Their files stay on disk.
fn unload_idle(state: &AppState, hub: &SyncHub, timeout: Duration) -> usize {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return 0,
    };
    let idle: Vec<TournamentId> = g
        .iter()
        .filter(|(_, entry)| entry.last_activity.elapsed() >= timeout)
        .map(|(id, _)| *id)
        .collect();
    for id in &idle {
        g.remove(id);
        if let Err(e) = hub.remove(*id) {
            log::warn!("Could not remove tournament {} from the hub: {}", id, e);
        }
    }
    idle.len()
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "padel-tournament-web",
    })
}

/// The caller's owner id (created on first visit, kept in the session cookie).
#[get("/api/owner")]
async fn api_owner(session: Session) -> HttpResponse {
    let owner_id = SessionIdentity::new(&session).get_or_create_owner_id();
    HttpResponse::Ok().json(OwnerResponse { owner_id })
}

/// Create a tournament from a list of player names.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    session: Session,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let identity = SessionIdentity::new(&session);
    create_tournament(&state, &hub, &config, &identity, &body.players, body.format)
}

/// Create a tournament from a CSV roster (one name per line, first column).
#[post("/api/tournaments/import")]
async fn api_import_tournament(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    session: Session,
    query: Query<ImportQuery>,
    body: Bytes,
) -> HttpResponse {
    let names = match parse_roster(&body[..]) {
        Ok(names) => names,
        Err(e) => return error_response(&e.into(), None),
    };
    let identity = SessionIdentity::new(&session);
    create_tournament(&state, &hub, &config, &identity, &names, query.format)
}

/// Get a tournament by id (404 if not found), with pending remote updates merged.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    };
    entry.session.drain_updates();
    HttpResponse::Ok().json(entry.session.tournament())
}

/// Standings, match on court, upcoming play order and phase.
#[get("/api/tournaments/{id}/schedule")]
async fn api_get_schedule(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    };
    entry.session.drain_updates();
    match schedule(entry.session.tournament()) {
        Ok(s) => HttpResponse::Ok().json(s),
        Err(e) => error_response(&e.into(), None),
    }
}

/// Record the winner of a pending match in the current round.
#[post("/api/tournaments/{id}/results")]
async fn api_record_result(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    };
    apply_change(entry, |t| record_result(t, body.match_id, body.winner_id))
}

/// Change or clear the winner of any match.
#[put("/api/tournaments/{id}/matches/{match_id}/winner")]
async fn api_correct_winner(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentMatchPath>,
    body: Json<CorrectWinnerBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    };
    apply_change(entry, |t| correct_winner(t, path.match_id, body.winner_id))
}

/// Put a different pending match of the current round on court.
#[put("/api/tournaments/{id}/current-match")]
async fn api_set_current_match(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
    body: Json<CurrentMatchBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    };
    apply_change(entry, |t| set_current_match(t, body.match_id))
}

/// Reassign players between teams.
#[put("/api/tournaments/{id}/teams")]
async fn api_edit_teams(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
    body: Json<EditTeamsBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    };
    apply_change(entry, |t| edit_teams(t, &body.teams))
}

/// Offer a snapshot from another observer. The newer of it and ours wins.
#[post("/api/tournaments/{id}/sync")]
async fn api_sync(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
    body: Bytes,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(e)) => e,
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    };
    let snapshot = match decode_snapshot(&body) {
        Ok(s) if s.id == path.id => s,
        Ok(s) => {
            let e = SyncError::WrongTournament {
                expected: path.id,
                found: s.id,
            };
            return error_response(&e.into(), None);
        }
        Err(e) => return error_response(&e.into(), None),
    };
    if let Err(e) = hub.push(&snapshot) {
        return error_response(&e.into(), Some(entry.session.tournament()));
    }
    entry.session.drain_updates();
    HttpResponse::Ok().json(entry.session.tournament())
}

/// Delete a tournament from memory, disk and the hub.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(
    state: AppState,
    hub: Data<SyncHub>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match load_entry(&mut g, path.id, &hub, &config) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(),
        Err(e) => return error_response(&e, None),
    }
    let Some(mut entry) = g.remove(&path.id) else {
        return not_found();
    };
    if let Err(e) = entry.session.delete() {
        return error_response(&e, None);
    }
    if let Err(e) = hub.remove(path.id) {
        log::warn!("Could not remove tournament {} from the hub: {}", path.id, e);
    }
    log::info!("Deleted tournament {}", path.id);
    HttpResponse::NoContent().finish()
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_owner)
        .service(favicon)
        .service(api_import_tournament)
        .service(api_create_tournament)
        .service(api_get_schedule)
        .service(api_get_tournament)
        .service(api_record_result)
        .service(api_correct_winner)
        .service(api_set_current_match)
        .service(api_edit_teams)
        .service(api_sync)
        .service(api_delete_tournament);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!(
        "Starting server at http://{}:{} (data in {})",
        bind.0,
        bind.1,
        config.data_dir.display()
    );

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));
    let hub = Data::new(SyncHub::new());
    let inactivity_timeout = config.inactivity_timeout;
    let config = Data::new(config);
    let key = Key::generate();

    // Background task: every 30 minutes, drop tournaments idle past the timeout from memory
    let state_cleanup = state.clone();
    let hub_cleanup = hub.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let removed = unload_idle(&state_cleanup, &hub_cleanup, inactivity_timeout);
            if removed > 0 {
                log::info!("Unloaded {} inactive tournament(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(state.clone())
            .app_data(hub.clone())
            .app_data(config.clone())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}
