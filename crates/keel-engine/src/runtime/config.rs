use std::time::Duration;

use crate::error::ConfigError;
use crate::input::{InputPolicy, positive_seconds};
use crate::time::DEFAULT_SMOOTHING_WINDOW;

pub const ENV_FRAME_RATE: &str = "KEEL_FRAME_RATE";
pub const ENV_HOLD_FREQUENCY: &str = "KEEL_HOLD_FREQUENCY";
pub const ENV_DOUBLE_PRESS_DELAY: &str = "KEEL_DOUBLE_PRESS_DELAY";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Target frames per second. Zero or negative runs uncapped.
    pub frame_rate: i32,

    /// Tracker-wide input policy.
    pub input: InputPolicy,

    /// Time constant of the frame-duration filter.
    pub smoothing_window: Duration,

    /// Used as a prefix in runtime log lines.
    pub name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            input: InputPolicy::default(),
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            name: "keel".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Applies `KEEL_FRAME_RATE`, `KEEL_HOLD_FREQUENCY` and `KEEL_DOUBLE_PRESS_DELAY`
    /// from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Like [`with_env_overrides`](Self::with_env_overrides) with a custom lookup.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup(ENV_FRAME_RATE) {
            self.frame_rate = v.trim().parse().map_err(|e| {
                ConfigError::invalid("frame_rate", format!("`{v}` is not an integer: {e}"))
            })?;
        }
        if let Some(v) = lookup(ENV_HOLD_FREQUENCY) {
            self.input.hold_frequency =
                positive_seconds("hold_frequency", seconds(&v, "hold_frequency")?)?;
        }
        if let Some(v) = lookup(ENV_DOUBLE_PRESS_DELAY) {
            self.input.double_press_delay =
                positive_seconds("double_press_delay", seconds(&v, "double_press_delay")?)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.input.validate()?;
        if self.smoothing_window.is_zero() {
            return Err(ConfigError::invalid("smoothing_window", "must be positive"));
        }
        Ok(())
    }
}

fn seconds(value: &str, parameter: &'static str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(parameter, format!("`{value}` is not a number: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let c = RuntimeConfig::default();
        assert_eq!(c.frame_rate, 60);
        assert_eq!(c.smoothing_window, Duration::from_secs(1));
        assert_eq!(c.name, "keel");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn overrides_apply() {
        let c = RuntimeConfig::default()
            .with_overrides_from(env(&[
                (ENV_FRAME_RATE, " 30 "),
                (ENV_HOLD_FREQUENCY, "0.05"),
                (ENV_DOUBLE_PRESS_DELAY, "0.3"),
            ]))
            .unwrap();
        assert_eq!(c.frame_rate, 30);
        assert_eq!(c.input.hold_frequency, Duration::from_millis(50));
        assert_eq!(c.input.double_press_delay, Duration::from_millis(300));
    }

    #[test]
    fn missing_overrides_keep_defaults() {
        let c = RuntimeConfig::default().with_overrides_from(env(&[])).unwrap();
        assert_eq!(c, RuntimeConfig::default());
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        let err = RuntimeConfig::default()
            .with_overrides_from(env(&[(ENV_FRAME_RATE, "fast")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidConfiguration { parameter: "frame_rate", .. }
        ));

        for bad in ["-1", "0", "NaN", "inf", "soon"] {
            let res = RuntimeConfig::default()
                .with_overrides_from(env(&[(ENV_DOUBLE_PRESS_DELAY, bad)]));
            assert!(res.is_err(), "{bad} accepted");
        }
    }
}
