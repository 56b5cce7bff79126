//! Environment variable loading for configuration

use std::env;

use super::builder::ConfigBuilder;
use crate::Result;
use crate::output::OutputFormat;

/// Environment variable names
mod vars {
    pub const CHCOMPACT_MAX_BODY_BYTES: &str = "CHCOMPACT_MAX_BODY_BYTES";
    pub const CHCOMPACT_CACHE_CAPACITY: &str = "CHCOMPACT_CACHE_CAPACITY";
    pub const CHCOMPACT_FORMAT: &str = "CHCOMPACT_FORMAT";
    pub const CHCOMPACT_LIMIT: &str = "CHCOMPACT_LIMIT";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const CHCOMPACT_JSON_LOGS: &str = "CHCOMPACT_JSON_LOGS";
}

/// Load configuration from environment variables
pub fn load_from_env(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    // Body limit, 0 lifts it
    if let Ok(limit_str) = env::var(vars::CHCOMPACT_MAX_BODY_BYTES)
        && let Ok(limit) = limit_str.parse::<usize>()
    {
        builder = builder.max_body_bytes((limit > 0).then_some(limit));
    }

    if let Ok(capacity_str) = env::var(vars::CHCOMPACT_CACHE_CAPACITY)
        && let Ok(capacity) = capacity_str.parse::<usize>()
    {
        builder = builder.descriptor_cache_capacity(capacity);
    }

    // Output
    if let Ok(format) = env::var(vars::CHCOMPACT_FORMAT) {
        builder = builder.output_format(format.parse::<OutputFormat>()?);
    }

    if let Ok(limit_str) = env::var(vars::CHCOMPACT_LIMIT)
        && let Ok(limit) = limit_str.parse::<usize>()
    {
        builder = builder.limit(Some(limit));
    }

    // Telemetry
    if let Ok(level) = env::var(vars::RUST_LOG) {
        builder = builder.log_level(level);
    }

    if let Ok(val) = env::var(vars::CHCOMPACT_JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&val));
    }

    Ok(builder)
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        vars::CHCOMPACT_MAX_BODY_BYTES,
        vars::CHCOMPACT_CACHE_CAPACITY,
        vars::CHCOMPACT_FORMAT,
        vars::CHCOMPACT_LIMIT,
        vars::RUST_LOG,
        vars::CHCOMPACT_JSON_LOGS,
    ];

    fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap();

        let old_values: Vec<_> = ALL_VARS.iter().map(|k| (*k, env::var(k).ok())).collect();

        for key in ALL_VARS {
            // SAFETY: We hold a mutex lock to ensure no concurrent modifications
            unsafe { env::remove_var(key) };
        }
        for (key, value) in vars {
            // SAFETY: We hold a mutex lock to ensure no concurrent modifications
            unsafe { env::set_var(key, value) };
        }

        let result = f();

        for (key, old_value) in old_values {
            match old_value {
                // SAFETY: We hold a mutex lock to ensure no concurrent modifications
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        result
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_load_all_vars() {
        let config = with_env_vars(
            &[
                (vars::CHCOMPACT_MAX_BODY_BYTES, "2048"),
                (vars::CHCOMPACT_CACHE_CAPACITY, "16"),
                (vars::CHCOMPACT_FORMAT, "tsv"),
                (vars::CHCOMPACT_LIMIT, "7"),
                (vars::RUST_LOG, "debug"),
                (vars::CHCOMPACT_JSON_LOGS, "yes"),
            ],
            || load_from_env(ConfigBuilder::new()).unwrap().build().unwrap(),
        );

        assert_eq!(config.decoder.max_body_bytes, Some(2048));
        assert_eq!(config.decoder.descriptor_cache_capacity, 16);
        assert_eq!(config.output.format, OutputFormat::Tsv);
        assert_eq!(config.output.limit, Some(7));
        assert_eq!(config.telemetry.log_level, "debug");
        assert!(config.telemetry.json_logs);
    }

    #[test]
    fn test_no_vars_keeps_builder() {
        let config = with_env_vars(&[], || {
            load_from_env(ConfigBuilder::new().limit(Some(1)))
                .unwrap()
                .build()
                .unwrap()
        });
        assert_eq!(config.output.limit, Some(1));
        assert_eq!(config.telemetry.log_level, "warn");
    }

    #[test]
    fn test_invalid_numbers_ignored() {
        let config = with_env_vars(
            &[
                (vars::CHCOMPACT_MAX_BODY_BYTES, "lots"),
                (vars::CHCOMPACT_LIMIT, "-1"),
            ],
            || load_from_env(ConfigBuilder::new()).unwrap().build().unwrap(),
        );
        assert_eq!(config.decoder.max_body_bytes, Some(256 * 1024 * 1024));
        assert_eq!(config.output.limit, None);
    }

    #[test]
    fn test_zero_body_limit_means_unbounded() {
        let config = with_env_vars(&[(vars::CHCOMPACT_MAX_BODY_BYTES, "0")], || {
            load_from_env(ConfigBuilder::new()).unwrap().build().unwrap()
        });
        assert_eq!(config.decoder.max_body_bytes, None);
    }

    #[test]
    fn test_invalid_format_is_error() {
        let result = with_env_vars(&[(vars::CHCOMPACT_FORMAT, "parquet")], || {
            load_from_env(ConfigBuilder::new())
        });
        assert!(result.unwrap_err().is_config());
    }
}
