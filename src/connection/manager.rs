//! Connection manager for the session's graph database connection.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::db::{Connector, GraphClient};
use crate::error::{CypherError, Result};

/// An active database connection with its metadata.
pub struct ActiveConnection {
    /// Connection name (if using a named connection from the config file).
    pub name: Option<String>,
    /// Resolved configuration used to connect.
    pub config: ConnectionConfig,
    /// Graph client.
    pub client: Box<dyn GraphClient>,
}

/// Snapshot of the session connection for `%neo4j --status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub name: Option<String>,
    pub uri: Option<String>,
    pub username: Option<String>,
    pub database: Option<String>,
}

impl ConnectionStatus {
    /// One-line description for display.
    pub fn summary(&self) -> String {
        match (&self.uri, &self.username, &self.database) {
            (Some(uri), Some(user), Some(db)) if self.connected => {
                format!("Connected to {} as {} (database: {})", uri, user, db)
            }
            _ => "Not connected. Use %neo4j to connect.".to_string(),
        }
    }
}

/// Owns the single shared connection reused across cells.
pub struct ConnectionManager {
    active: Option<ActiveConnection>,
    connector: Arc<dyn Connector>,
    default_config: ConnectionConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager with no active connection.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            active: None,
            connector,
            default_config: ConnectionConfig::default(),
        }
    }

    /// Sets the configuration used when a cell needs to auto-connect.
    ///
    /// Unset fields are still filled from the environment.
    pub fn with_default_config(mut self, config: ConnectionConfig) -> Self {
        self.default_config = config;
        self
    }

    /// Connects with the given configuration, replacing any existing connection.
    ///
    /// The previous connection is closed only once the new one is up, so a
    /// failed attempt leaves the session as it was.
    pub async fn connect(&mut self, config: ConnectionConfig, name: Option<String>) -> Result<()> {
        let client = self.connector.connect(&config).await?;
        info!("Connected to {}", config.display_string());

        if let Some(old) = self.active.take() {
            if let Err(e) = old.client.close().await {
                warn!("Failed to close previous connection: {}", e);
            }
        }

        self.active = Some(ActiveConnection {
            name,
            config,
            client,
        });

        Ok(())
    }

    /// Opens a one-off client that is not stored in the session.
    pub async fn connect_ephemeral(&self, config: &ConnectionConfig) -> Result<Box<dyn GraphClient>> {
        self.connector.connect(config).await
    }

    /// Resolves the auto-connect configuration: defaults, then environment.
    pub fn auto_config(&self) -> Result<ConnectionConfig> {
        let mut config = self.default_config.clone();
        config.apply_env_defaults()?;
        Ok(config)
    }

    /// Returns the active client, connecting from the environment if needed.
    pub async fn client(&mut self) -> Result<&dyn GraphClient> {
        if self.active.is_none() {
            let config = self.auto_config()?;
            info!("No active connection, connecting from environment");
            self.connect(config, None).await?;
        }

        self.active
            .as_ref()
            .map(|c| c.client.as_ref())
            .ok_or_else(|| CypherError::internal("Connection missing after connect"))
    }

    /// Get the active client without connecting.
    pub fn current(&self) -> Option<&dyn GraphClient> {
        self.active.as_ref().map(|c| c.client.as_ref())
    }

    /// Configuration of the active connection.
    pub fn active_config(&self) -> Option<&ConnectionConfig> {
        self.active.as_ref().map(|c| &c.config)
    }

    /// Check if there's an active connection.
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the status of the session connection.
    pub fn status(&self) -> ConnectionStatus {
        match &self.active {
            Some(conn) => ConnectionStatus {
                connected: true,
                name: conn.name.clone(),
                uri: Some(conn.config.uri().to_string()),
                username: Some(conn.config.username().to_string()),
                database: Some(conn.config.database_name().to_string()),
            },
            None => ConnectionStatus {
                connected: false,
                name: None,
                uri: None,
                username: None,
                database: None,
            },
        }
    }

    /// Close the active connection.
    ///
    /// Returns false if there was nothing to close.
    pub async fn close(&mut self) -> Result<bool> {
        match self.active.take() {
            Some(conn) => {
                conn.client.close().await?;
                info!("Closed connection to {}", conn.config.display_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
