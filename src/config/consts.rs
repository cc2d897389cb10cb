/// Default buffer size for demo payloads (in bytes)
pub const DEFAULT_BUFSIZE: u64 = 1024;
/// Minimum allowed buffer size (in bytes)
pub const MIN_BUFSIZE: u64 = 64;
/// Maximum allowed buffer size (in bytes)
pub const MAX_BUFSIZE: u64 = 1_048_576;

/// Default packet injection rate (inter-packet gap in micro-seconds)
pub const DEFAULT_INJECTION_RATE: u64 = 100;
/// Minimum allowed injection rate (in micro-seconds)
pub const MIN_INJECTION_RATE: u64 = 1;

/// Default per-job timeout (in seconds)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// Minimum allowed per-job timeout (in seconds)
pub const MIN_TIMEOUT_SECONDS: u64 = 1;
/// Maximum allowed per-job timeout (in seconds) - one day
pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;

/// Default network driver when none is configured and auto-detection is off
pub const DEFAULT_DRIVER: &str = "mlx5";
