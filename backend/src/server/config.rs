//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use yamda::inbound::http::json::BodyLimit;
use yamda::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) body_limit: BodyLimit,
}

impl ServerConfig {
    /// Construct a server configuration over an initialised pool.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool) -> Self {
        Self {
            bind_addr,
            db_pool,
            body_limit: BodyLimit::default(),
        }
    }

    /// Cap request bodies at `bytes`.
    #[must_use]
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.body_limit = BodyLimit(bytes);
        self
    }
}
