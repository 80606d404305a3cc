use crate::speedtest::session::Timing;
use crate::speedtest::tuning::Tuning;
use clap::ValueEnum;
use std::time::Duration;

pub const TICK_INTERVAL_RANGE: (u64, u64) = (10, 500);
pub const START_DELAY_RANGE: (u64, u64) = (0, 3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Skin {
    #[default]
    Card,
    Gauge,
}

impl Skin {
    pub fn toggle(self) -> Self {
        match self {
            Skin::Card => Skin::Gauge,
            Skin::Gauge => Skin::Card,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Skin::Card => "card",
            Skin::Gauge => "gauge",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub tick_interval_ms: u64,
    pub start_delay_ms: u64,
    pub skin: Skin,
    pub tuning: Tuning,
    pub seed: Option<u64>,
    pub server_label: String,
    pub client_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            start_delay_ms: 500,
            skin: Skin::default(),
            tuning: Tuning::default(),
            seed: None,
            server_label: "New York, US".to_string(),
            client_address: "192.168.1.1".to_string(),
        }
    }
}

impl Settings {
    pub fn timing(&self) -> Timing {
        Timing {
            start_delay: Duration::from_millis(self.start_delay_ms),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        }
    }

    pub fn increase(&mut self, field: SettingsField) {
        match field {
            SettingsField::TickInterval => {
                self.tick_interval_ms = (self.tick_interval_ms + 10).min(TICK_INTERVAL_RANGE.1);
            }
            SettingsField::StartDelay => {
                self.start_delay_ms = (self.start_delay_ms + 250).min(START_DELAY_RANGE.1);
            }
            SettingsField::Skin => self.skin = self.skin.toggle(),
        }
    }

    pub fn decrease(&mut self, field: SettingsField) {
        match field {
            SettingsField::TickInterval => {
                self.tick_interval_ms = self
                    .tick_interval_ms
                    .saturating_sub(10)
                    .max(TICK_INTERVAL_RANGE.0);
            }
            SettingsField::StartDelay => {
                self.start_delay_ms = self
                    .start_delay_ms
                    .saturating_sub(250)
                    .max(START_DELAY_RANGE.0);
            }
            SettingsField::Skin => self.skin = self.skin.toggle(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    TickInterval,
    StartDelay,
    Skin,
}

impl SettingsField {
    pub fn next(self) -> Self {
        match self {
            SettingsField::TickInterval => SettingsField::StartDelay,
            SettingsField::StartDelay => SettingsField::Skin,
            SettingsField::Skin => SettingsField::TickInterval,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SettingsField::TickInterval => SettingsField::Skin,
            SettingsField::StartDelay => SettingsField::TickInterval,
            SettingsField::Skin => SettingsField::StartDelay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pacing() {
        let timing = Settings::default().timing();
        assert_eq!(timing.tick_interval, Duration::from_millis(50));
        assert_eq!(timing.start_delay, Duration::from_millis(500));
    }

    #[test]
    fn adjustments_stay_in_range() {
        let mut settings = Settings::default();
        for _ in 0..100 {
            settings.increase(SettingsField::TickInterval);
            settings.increase(SettingsField::StartDelay);
        }
        assert_eq!(settings.tick_interval_ms, 500);
        assert_eq!(settings.start_delay_ms, 3000);

        for _ in 0..100 {
            settings.decrease(SettingsField::TickInterval);
            settings.decrease(SettingsField::StartDelay);
        }
        assert_eq!(settings.tick_interval_ms, 10);
        assert_eq!(settings.start_delay_ms, 0);
    }

    #[test]
    fn skin_field_toggles_both_ways() {
        let mut settings = Settings::default();
        settings.increase(SettingsField::Skin);
        assert_eq!(settings.skin, Skin::Gauge);
        settings.decrease(SettingsField::Skin);
        assert_eq!(settings.skin, Skin::Card);
    }

    #[test]
    fn fields_cycle() {
        let field = SettingsField::TickInterval;
        assert_eq!(field.next().next().next(), field);
        assert_eq!(field.prev(), SettingsField::Skin);
    }
}
