//! Default configuration values - single source of truth

/// Default database host
pub const HOST: &str = "localhost";

/// Default MySQL port
pub const PORT: u16 = 3306;

/// Default number of connections kept open
pub const POOL_MIN: usize = 2;

/// Default upper bound on open connections
pub const POOL_MAX: usize = 10;

/// Default idle time before a connection is closed (30 minutes)
pub const INACTIVE_CONNECTION_TTL_SECS: u64 = 30 * 60;

/// Default configuration file name, without extension
pub const CONFIG_FILE: &str = "rdao";

/// Prefix of environment variables overriding the configuration
pub const ENV_PREFIX: &str = "RDAO";
