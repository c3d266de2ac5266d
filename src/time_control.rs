// Time scaling and pause for whoever drives the simulation
use crate::app_settings::TimeSettings;
use crate::error::ConfigError;

/// Turns frame deltas into tick deltas.
#[derive(Debug, Clone)]
pub struct TimeController {
    /// Unscaled frame delta in seconds
    pub base_dt: f64,

    /// Selectable time multipliers
    steps: Vec<f64>,
    index: usize,
    default_index: usize,

    paused: bool,
}

impl TimeController {
    pub fn new(settings: &TimeSettings) -> Result<Self, ConfigError> {
        if settings.scale_steps.is_empty()
            || settings
                .scale_steps
                .iter()
                .any(|step| !step.is_finite() || *step <= 0.0)
        {
            return Err(ConfigError::TimeScaleSteps);
        }
        if settings.default_scale_index >= settings.scale_steps.len() {
            return Err(ConfigError::TimeScaleIndex {
                index: settings.default_scale_index,
                len: settings.scale_steps.len(),
            });
        }
        if !settings.time_step.is_finite() || settings.time_step <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "time_step",
                value: settings.time_step,
            });
        }

        Ok(Self {
            base_dt: settings.time_step,
            steps: settings.scale_steps.clone(),
            index: settings.default_scale_index,
            default_index: settings.default_scale_index,
            paused: settings.paused,
        })
    }

    /// Current time multiplier
    pub fn scale(&self) -> f64 {
        self.steps[self.index]
    }

    /// Next faster multiplier; stays on the last one.
    pub fn step_forward(&mut self) {
        if self.index + 1 < self.steps.len() {
            self.index += 1;
        }
    }

    /// Next slower multiplier; stays on the first one.
    pub fn step_backward(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Jumps to a multiplier by index, clamped to the available steps.
    pub fn set_step(&mut self, index: usize) {
        self.index = index.min(self.steps.len() - 1);
    }

    pub fn reset(&mut self) {
        self.index = self.default_index;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Scaled delta for one tick, or `None` while paused.
    pub fn tick_dt(&self, frame_dt: f64) -> Option<f64> {
        if self.paused {
            None
        } else {
            Some(frame_dt * self.scale())
        }
    }

    /// `tick_dt` for the configured fixed frame delta.
    pub fn fixed_dt(&self) -> Option<f64> {
        self.tick_dt(self.base_dt)
    }
}

impl Default for TimeController {
    fn default() -> Self {
        let settings = TimeSettings::default();
        Self {
            base_dt: settings.time_step,
            index: settings.default_scale_index,
            default_index: settings.default_scale_index,
            paused: settings.paused,
            steps: settings.scale_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_is_one() {
        let clock = TimeController::default();
        assert_eq!(clock.scale(), 1.0);
        assert_eq!(clock.tick_dt(0.5), Some(0.5));
    }

    #[test]
    fn stepping_saturates_at_both_ends() {
        let mut clock = TimeController::default();
        for _ in 0..20 {
            clock.step_forward();
        }
        assert_eq!(clock.scale(), 20.0);

        for _ in 0..20 {
            clock.step_backward();
        }
        assert_eq!(clock.scale(), 0.2);

        clock.reset();
        assert_eq!(clock.scale(), 1.0);

        clock.set_step(100);
        assert_eq!(clock.scale(), 20.0);
    }

    #[test]
    fn paused_clock_yields_no_tick() {
        let mut clock = TimeController::default();
        clock.toggle_pause();
        assert!(clock.is_paused());
        assert_eq!(clock.fixed_dt(), None);

        clock.toggle_pause();
        clock.step_forward();
        assert_eq!(clock.tick_dt(1.0), Some(1.2));
    }

    #[test]
    fn invalid_steps_are_rejected() {
        let empty = TimeSettings {
            scale_steps: Vec::new(),
            ..TimeSettings::default()
        };
        assert_eq!(TimeController::new(&empty).err(), Some(ConfigError::TimeScaleSteps));

        let out_of_range = TimeSettings {
            default_scale_index: 10,
            ..TimeSettings::default()
        };
        assert_eq!(
            TimeController::new(&out_of_range).err(),
            Some(ConfigError::TimeScaleIndex { index: 10, len: 10 })
        );
    }
}
