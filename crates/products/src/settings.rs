//! Editor settings read from the environment.

use std::time::Duration;

use storefront_core::StoreId;

pub const STORE_ID_VAR: &str = "STOREFRONT_STORE_ID";
pub const NOTICE_TTL_VAR: &str = "STOREFRONT_NOTICE_TTL_MS";
pub const PREFETCH_TIMEOUT_VAR: &str = "STOREFRONT_PREFETCH_TIMEOUT_MS";

const DEFAULT_STORE_ID: &str = "default";
const DEFAULT_NOTICE_TTL_MS: u64 = 4_000;
const DEFAULT_PREFETCH_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    /// Store whose inventory row is loaded.
    pub store_id: StoreId,
    /// How long a rejection notice stays visible.
    pub notice_ttl: Duration,
    /// Upper bound on the hydration prefetches taken together.
    pub prefetch_timeout: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            store_id: StoreId::new(DEFAULT_STORE_ID),
            notice_ttl: Duration::from_millis(DEFAULT_NOTICE_TTL_MS),
            prefetch_timeout: Duration::from_millis(DEFAULT_PREFETCH_TIMEOUT_MS),
        }
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: u64) -> Duration {
    let Some(raw) = lookup(var) else {
        return Duration::from_millis(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            tracing::warn!(var, value = %raw, default, "invalid duration; using default");
            Duration::from_millis(default)
        }
    }
}

impl EditorSettings {
    /// Build settings from a variable lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store_id = match lookup(STORE_ID_VAR) {
            Some(raw) if !raw.trim().is_empty() => StoreId::new(raw),
            Some(_) => {
                tracing::warn!(var = STORE_ID_VAR, "blank store id; using default");
                StoreId::new(DEFAULT_STORE_ID)
            }
            None => StoreId::new(DEFAULT_STORE_ID),
        };

        Self {
            store_id,
            notice_ttl: millis(&lookup, NOTICE_TTL_VAR, DEFAULT_NOTICE_TTL_MS),
            prefetch_timeout: millis(&lookup, PREFETCH_TIMEOUT_VAR, DEFAULT_PREFETCH_TIMEOUT_MS),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn notice_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.notice_ttl)
            .unwrap_or_else(|_| chrono::Duration::milliseconds(DEFAULT_NOTICE_TTL_MS as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(EditorSettings::from_lookup(lookup(&[])), EditorSettings::default());
    }

    #[test]
    fn reads_every_variable() {
        let settings = EditorSettings::from_lookup(lookup(&[
            (STORE_ID_VAR, "berlin-1"),
            (NOTICE_TTL_VAR, "2500"),
            (PREFETCH_TIMEOUT_VAR, "100"),
        ]));
        assert_eq!(settings.store_id.as_str(), "berlin-1");
        assert_eq!(settings.notice_ttl, Duration::from_millis(2500));
        assert_eq!(settings.prefetch_timeout, Duration::from_millis(100));
        assert_eq!(settings.notice_ttl_chrono(), chrono::Duration::milliseconds(2500));
    }

    #[test]
    fn malformed_values_fall_back() {
        let settings = EditorSettings::from_lookup(lookup(&[
            (STORE_ID_VAR, "  "),
            (NOTICE_TTL_VAR, "soon"),
            (PREFETCH_TIMEOUT_VAR, "0"),
        ]));
        assert_eq!(settings, EditorSettings::default());
    }
}
