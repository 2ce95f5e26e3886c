use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use super::session::{extract_session_from_request_parts, SessionExtractionError};
use super::state::ServerState;
use crate::read_state::{ReadStateBackend, ReadStateError, ReadStateStore};

/// The read state of whoever sent the request, opened once per request.
pub struct VisitorReadState {
    pub backend: ReadStateBackend,
    pub store: Box<dyn ReadStateStore>,
}

impl VisitorReadState {
    /// Adds the cookies queued by the store to `jar`.
    pub fn flush_cookies(&mut self, mut jar: CookieJar) -> CookieJar {
        for cookie in self.store.drain_response_cookies() {
            jar = jar.add(cookie);
        }
        jar
    }
}

pub enum VisitorReadStateRejection {
    Session(SessionExtractionError),
    Store(ReadStateError),
}

impl IntoResponse for VisitorReadStateRejection {
    fn into_response(self) -> axum::response::Response {
        match self {
            VisitorReadStateRejection::Session(e) => e.into_response(),
            VisitorReadStateRejection::Store(e) => {
                error!("Could not open read state: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl FromRequestParts<ServerState> for VisitorReadState {
    type Rejection = VisitorReadStateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let session = extract_session_from_request_parts(parts, ctx)
            .map_err(VisitorReadStateRejection::Session)?;
        let backend = ReadStateBackend::for_account(session.map(|s| s.account_id));
        debug!("Opening {:?} read state", backend);

        let jar = CookieJar::from_headers(&parts.headers);
        let store = ctx
            .read_state_factory
            .open(backend, &jar)
            .map_err(VisitorReadStateRejection::Store)?;
        Ok(VisitorReadState { backend, store })
    }
}
