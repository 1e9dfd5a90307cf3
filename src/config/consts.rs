use std::time::Duration;

/// Retry interval used when caching or retry mode is on but no interval is configured
pub const DEFAULT_RESEND_INTERVAL: Duration = Duration::from_millis(100);
/// Default capacity of a sink node's input buffer
pub const DEFAULT_BUFFER_LENGTH: usize = 1024;
/// Default in-memory cache size, used as the input buffer in cache/retry mode
pub const DEFAULT_MEMORY_CACHE_THRESHOLD: usize = 1024;
/// Largest input buffer a sink node accepts from configuration
pub const MAX_BUFFER_LENGTH: usize = 1 << 20;
/// Largest lookback the `lag` function keeps per partition key
pub const MAX_LAG_SIZE: usize = 1 << 16;
