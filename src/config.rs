//! Client configuration for colwire
//!
//! Centralized connection options with sensible defaults.

/// Connection options for a client session
#[derive(Debug, Clone)]
pub struct ClientOptions {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Server hostname. The engine never dials by itself; this is consumed
    /// by whichever caller establishes the transport (e.g. the CLI).
    pub host: String,

    /// Server native-protocol port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    /// User to authenticate as
    pub username: String,

    /// Password (empty by default)
    pub password: String,

    /// Default database for the session
    pub database: String,

    /// Client name advertised in the handshake and in per-query client info
    pub client_name: String,

    // -------------------------------------------------------------------------
    // Receive Pipeline Configuration
    // -------------------------------------------------------------------------
    /// Capacity of each receive buffer (in bytes)
    pub receive_buffer_size: usize,

    /// Number of pooled receive buffers. Minimum 2: one held by the
    /// consumer while the background thread fills another.
    pub receive_buffer_count: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9000,
            username: "default".to_string(),
            password: String::new(),
            database: "system".to_string(),
            client_name: "colwire client".to_string(),
            receive_buffer_size: 64 * 1024, // 64 KB
            receive_buffer_count: 2,
        }
    }
}

impl ClientOptions {
    /// Create a new options builder
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }
}

/// Builder for ClientOptions
#[derive(Default)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    /// Set the server hostname
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.options.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Set the user to authenticate as
    pub fn username(mut self, user: impl Into<String>) -> Self {
        self.options.username = user.into();
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.options.password = password.into();
        self
    }

    /// Set the default database
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.options.database = database.into();
        self
    }

    /// Set the advertised client name
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.options.client_name = name.into();
        self
    }

    /// Set the capacity of each receive buffer (in bytes)
    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.options.receive_buffer_size = size;
        self
    }

    /// Set the number of pooled receive buffers (minimum 2)
    pub fn receive_buffer_count(mut self, count: usize) -> Self {
        self.options.receive_buffer_count = count;
        self
    }

    pub fn build(self) -> ClientOptions {
        self.options
    }
}
