use chrono::NaiveDate;
use std::sync::Arc;
use vax_core::catalog::Catalog;
use vax_core::config::SessionConfig;
use vax_core::session::Session;

/// Read-only state shared with the connection handler.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<Catalog>,
    pub session: SessionConfig,
}

impl ServerState {
    pub fn new(catalog: Catalog, session: SessionConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            session,
        }
    }

    pub fn open_session(&self, today: NaiveDate) -> Session {
        Session::new(Arc::clone(&self.catalog), self.session.clone(), today)
    }
}
