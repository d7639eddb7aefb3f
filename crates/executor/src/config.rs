use std::time::Duration;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Upper bound on resolver invocations running at the same time within
    /// one operation.
    pub max_parallelism: usize,
    /// Operations still running after this long are cancelled.
    #[serde(deserialize_with = "duration_str::deserialize_option_duration")]
    pub operation_timeout: Option<Duration>,
    /// Deadline for executing the selection set of one subscription event.
    #[serde(deserialize_with = "duration_str::deserialize_duration")]
    pub subscription_event_timeout: Duration,
    pub introspection: bool,
    /// Also open spans for plain member reads.
    pub trace_trivial_fields: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 10,
            operation_timeout: None,
            subscription_event_timeout: Duration::from_secs(1),
            introspection: true,
            trace_trivial_fields: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid executor configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("max_parallelism must be at least 1")]
    ZeroParallelism,
}

impl ExecutorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ExecutorConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults() {
        let config = ExecutorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExecutorConfig::default());
        assert_eq!(config.max_parallelism, 10);
        assert_eq!(config.subscription_event_timeout, Duration::from_secs(1));
    }

    #[test]
    fn full_config() {
        let config = ExecutorConfig::from_toml_str(
            r#"
            max_parallelism = 4
            operation_timeout = "30s"
            subscription_event_timeout = "250ms"
            introspection = false
            trace_trivial_fields = true
            "#,
        )
        .unwrap();

        insta::assert_debug_snapshot!(config, @r###"
        ExecutorConfig {
            max_parallelism: 4,
            operation_timeout: Some(
                30s,
            ),
            subscription_event_timeout: 250ms,
            introspection: false,
            trace_trivial_fields: true,
        }
        "###);
    }

    #[rstest]
    #[case("max_parallelism = 0", "max_parallelism must be at least 1")]
    #[case("maxParallelism = 4", "unknown field `maxParallelism`")]
    #[case("operation_timeout = \"soon\"", "operation_timeout")]
    fn invalid_configs(#[case] input: &str, #[case] expected: &str) {
        let error = ExecutorConfig::from_toml_str(input).unwrap_err().to_string();
        assert!(error.contains(expected), "{error}");
    }
}
