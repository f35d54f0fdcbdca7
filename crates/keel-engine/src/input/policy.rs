use std::time::Duration;

use crate::error::ConfigError;

/// Debounce timing applied to a control.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InputPolicy {
    /// Minimum spacing between two `Repeated` events.
    pub hold_frequency: Duration,

    /// Maximum spacing between two downs for them to count as a multi-press.
    pub double_press_delay: Duration,

    /// Continuous-down time before a press becomes `Held`. `None` means never.
    pub held_threshold: Option<Duration>,
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self {
            hold_frequency: Duration::from_millis(1),
            double_press_delay: Duration::from_millis(200),
            held_threshold: None,
        }
    }
}

impl InputPolicy {
    pub fn set_hold_frequency(&mut self, seconds: f64) -> Result<(), ConfigError> {
        self.hold_frequency = positive_seconds("hold_frequency", seconds)?;
        Ok(())
    }

    pub fn set_double_press_delay(&mut self, seconds: f64) -> Result<(), ConfigError> {
        self.double_press_delay = positive_seconds("double_press_delay", seconds)?;
        Ok(())
    }

    /// Checks that both debounce windows are non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_frequency.is_zero() {
            return Err(ConfigError::invalid("hold_frequency", "must be positive"));
        }
        if self.double_press_delay.is_zero() {
            return Err(ConfigError::invalid("double_press_delay", "must be positive"));
        }
        Ok(())
    }

    pub fn with_held_threshold(mut self, threshold: Duration) -> Self {
        self.held_threshold = Some(threshold);
        self
    }

    pub(crate) fn hold_frequency_ns(&self) -> u64 {
        nanos(self.hold_frequency)
    }

    pub(crate) fn double_press_delay_ns(&self) -> u64 {
        nanos(self.double_press_delay)
    }

    pub(crate) fn held_threshold_ns(&self) -> Option<u64> {
        self.held_threshold.map(nanos)
    }
}

/// Converts a seconds value into a duration, rejecting non-finite and non-positive input.
pub(crate) fn positive_seconds(
    parameter: &'static str,
    seconds: f64,
) -> Result<Duration, ConfigError> {
    if !seconds.is_finite() {
        return Err(ConfigError::invalid(parameter, format!("{seconds} is not finite")));
    }
    if seconds <= 0.0 {
        return Err(ConfigError::invalid(parameter, format!("{seconds} is not positive")));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| ConfigError::invalid(parameter, e.to_string()))
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
