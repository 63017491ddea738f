use {
    std::{collections::BTreeMap, time::Duration},
    tracing::warn,
};

pub const TABLE_CACHE_SIZE: &str = "derby.language.tableDescriptorCacheSize";
pub const SPS_CACHE_SIZE: &str = "derby.language.spsCacheSize";
pub const PERMISSIONS_CACHE_SIZE: &str = "derby.language.permissionsCacheSize";
pub const SEQUENCE_CACHE_SIZE: &str = "derby.language.sequenceGeneratorCacheSize";
pub const IDENTITY_CACHE_SIZE: &str = "derby.language.identityGeneratorCacheSize";
pub const SEQUENCE_PREALLOCATOR: &str = "derby.language.sequencePreallocator";
pub const SEQUENCE_FLUSH_POLICY: &str = "derby.language.sequenceFlushPolicy";
pub const LOCK_WAIT_TIMEOUT: &str = "derby.locks.waitTimeout";
pub const UPGRADE: &str = "upgrade";

/// What happens to the unused part of a pre-allocated sequence range when
/// the generator is flushed from its cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Write the next unissued value back, so nothing is skipped.
    ReturnUnused,
    /// Leave the catalog at the end of the range; the gap is lost.
    DiscardUnused,
}

/// Tunables of the data dictionary, read from database properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub table_cache_size: usize,
    pub sps_cache_size: usize,
    pub permissions_cache_size: usize,
    pub sequence_cache_size: usize,
    pub identity_cache_size: usize,
    /// Values reserved per round trip to SYSSEQUENCES.
    pub sequence_preallocation: i64,
    pub flush_policy: FlushPolicy,
    pub lock_wait_timeout: Duration,
    /// Permission to perform a hard upgrade of an older database.
    pub upgrade: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            table_cache_size: 64,
            sps_cache_size: 32,
            permissions_cache_size: 64,
            sequence_cache_size: 32,
            identity_cache_size: 32,
            sequence_preallocation: 100,
            flush_policy: FlushPolicy::ReturnUnused,
            lock_wait_timeout: Duration::from_secs(60),
            upgrade: false,
        }
    }
}

impl CatalogConfig {
    /// Reads the configuration from a property map. Malformed or out of
    /// range values fall back to their defaults.
    pub fn from_properties(props: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let int = |key: &str, min: i64, max: i64, default: i64| {
            int_property(key, props.get(key).map(String::as_str), min, max, default)
        };

        Self {
            table_cache_size: int(TABLE_CACHE_SIZE, 0, i32::MAX as i64, 64) as usize,
            sps_cache_size: int(SPS_CACHE_SIZE, 0, i32::MAX as i64, 32) as usize,
            permissions_cache_size: int(PERMISSIONS_CACHE_SIZE, 0, i32::MAX as i64, 64) as usize,
            sequence_cache_size: int(SEQUENCE_CACHE_SIZE, 0, i32::MAX as i64, 32) as usize,
            identity_cache_size: int(IDENTITY_CACHE_SIZE, 0, i32::MAX as i64, 32) as usize,
            sequence_preallocation: int(SEQUENCE_PREALLOCATOR, 1, i32::MAX as i64, 100),
            flush_policy: match props.get(SEQUENCE_FLUSH_POLICY).map(String::as_str) {
                None | Some("returnUnused") => FlushPolicy::ReturnUnused,
                Some("discardUnused") => FlushPolicy::DiscardUnused,
                Some(other) => {
                    warn!(key = SEQUENCE_FLUSH_POLICY, value = other, "ignoring unknown policy");
                    defaults.flush_policy
                }
            },
            lock_wait_timeout: Duration::from_secs(
                int(LOCK_WAIT_TIMEOUT, 0, i32::MAX as i64, 60) as u64,
            ),
            upgrade: props
                .get(UPGRADE)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

fn int_property(key: &str, value: Option<&str>, min: i64, max: i64, default: i64) -> i64 {
    let Some(value) = value else {
        return default;
    };

    match value.trim().parse::<i64>() {
        Ok(v) if (min..=max).contains(&v) => v,
        Ok(v) => {
            warn!(key, value = v, min, max, "property out of range, using default");
            default
        }
        Err(_) => {
            warn!(key, value, "property is not a number, using default");
            default
        }
    }
}
