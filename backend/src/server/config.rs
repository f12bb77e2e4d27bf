//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use foodgram::inbound::http::session_config::SessionSettings;
use foodgram::outbound::persistence::DbPool;

/// Everything the HTTP server needs once settings are resolved.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) media_root: PathBuf,
}

impl ServerConfig {
    /// Construct a server configuration from resolved settings.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        media_root: PathBuf,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool,
            media_root,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Directory served under `/media` and written by the image store.
    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }
}
