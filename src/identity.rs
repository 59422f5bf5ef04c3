//! Owner identity: an opaque, stable id stamped on the tournaments a client creates.

use actix_session::Session;
use uuid::Uuid;

/// Session key holding the owner id.
pub const OWNER_ID_KEY: &str = "owner_id";

pub trait OwnerIdentity {
    fn get_or_create_owner_id(&self) -> String;
}

/// Owner id kept in the client's cookie session. A missing or malformed value is replaced with a
/// fresh UUID.
pub struct SessionIdentity<'a> {
    session: &'a Session,
}

impl<'a> SessionIdentity<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

impl OwnerIdentity for SessionIdentity<'_> {
    fn get_or_create_owner_id(&self) -> String {
        let stored = self
            .session
            .get::<String>(OWNER_ID_KEY)
            .ok()
            .flatten()
            .filter(|id| is_owner_id(id));
        if let Some(id) = stored {
            return id;
        }
        let id = Uuid::new_v4().to_string();
        if let Err(e) = self.session.insert(OWNER_ID_KEY, &id) {
            log::warn!("Could not store owner id in session: {}", e);
        }
        id
    }
}

/// Always the same id.
#[derive(Clone, Debug)]
pub struct FixedIdentity(String);

impl FixedIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl OwnerIdentity for FixedIdentity {
    fn get_or_create_owner_id(&self) -> String {
        self.0.clone()
    }
}

pub fn is_owner_id(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}
