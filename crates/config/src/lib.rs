//! Block-building configuration.
//!
//! All settings come from environment variables, falling back to LevelDB's
//! defaults when a variable is absent or does not parse:
//!
//! ```text
//! BLOCK_RESTART_INTERVAL  records between restart points  (default: 16)
//! BLOCK_SIZE_KB           soft block size target in KiB   (default: 4)
//! ```

use tracing::warn;

/// Default number of records between restart points.
pub const DEFAULT_RESTART_INTERVAL: usize = 16;

/// Default soft target for an uncompressed block, in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    /// Records between restart points. Always at least 1.
    pub restart_interval: usize,
    /// Soft upper bound for a sealed block, in bytes.
    pub block_size: usize,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            restart_interval: DEFAULT_RESTART_INTERVAL,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl BlockConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let restart_interval = match parse_or(&lookup, "BLOCK_RESTART_INTERVAL", DEFAULT_RESTART_INTERVAL) {
            0 => {
                warn!(
                    default = DEFAULT_RESTART_INTERVAL,
                    "BLOCK_RESTART_INTERVAL must be at least 1, using default"
                );
                DEFAULT_RESTART_INTERVAL
            }
            n => n,
        };
        let block_size_kb = parse_or(&lookup, "BLOCK_SIZE_KB", DEFAULT_BLOCK_SIZE / 1024);

        Self {
            restart_interval,
            block_size: block_size_kb.saturating_mul(1024),
        }
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default, "unparseable setting, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(BlockConfig::from_lookup(|_| None), BlockConfig::default());
    }

    #[test]
    fn reads_both_settings() {
        let cfg = BlockConfig::from_lookup(lookup_from(&[
            ("BLOCK_RESTART_INTERVAL", "4"),
            ("BLOCK_SIZE_KB", "16"),
        ]));
        assert_eq!(cfg.restart_interval, 4);
        assert_eq!(cfg.block_size, 16 * 1024);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let cfg = BlockConfig::from_lookup(lookup_from(&[
            ("BLOCK_RESTART_INTERVAL", "lots"),
            ("BLOCK_SIZE_KB", "-1"),
        ]));
        assert_eq!(cfg, BlockConfig::default());
    }

    #[test]
    fn zero_restart_interval_is_rejected() {
        let cfg = BlockConfig::from_lookup(lookup_from(&[("BLOCK_RESTART_INTERVAL", "0")]));
        assert_eq!(cfg.restart_interval, DEFAULT_RESTART_INTERVAL);
    }
}
