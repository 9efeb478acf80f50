// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Manta";

/// Application name in lowercase (for paths, identifiers and log targets)
pub const APP_NAME_LOWER: &str = "manta";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "manta.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "MANTA_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "MANTA_DEBUG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "MANTA_LOG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "MANTA_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "MANTA_PORT";

/// Environment variable for CORS allowed origins (comma separated)
pub const ENV_ALLOWED_ORIGINS: &str = "MANTA_ALLOWED_ORIGINS";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port (OTLP/HTTP standard port)
pub const DEFAULT_PORT: u16 = 4318;

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Environment variable for the SQLite database path
pub const ENV_DB_PATH: &str = "MANTA_DB_PATH";

/// Environment variable for the attribute storage strategy (json, key_value)
pub const ENV_ATTRIBUTE_STORAGE: &str = "MANTA_ATTRIBUTE_STORAGE";

// =============================================================================
// SQLite Database
// =============================================================================

/// Default SQLite database path
pub const DEFAULT_DB_PATH: &str = "manta.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for general API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for OTLP endpoints (16 MB)
pub const OTLP_BODY_LIMIT: usize = 16 * 1024 * 1024;

// =============================================================================
// Pagination
// =============================================================================

/// Page size when `limit` is omitted
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest accepted `limit`
pub const MAX_PAGE_LIMIT: u32 = 500;

// =============================================================================
// Ingestion
// =============================================================================

/// Service name used when a resource carries no `service.name`
pub const UNKNOWN_SERVICE_NAME: &str = "unknown";

/// `Retry-After` sent when the store is busy
pub const BACKPRESSURE_RETRY_AFTER_SECS: u64 = 1;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
