use crate::settings::{Settings, Skin, START_DELAY_RANGE, TICK_INTERVAL_RANGE};
use crate::speedtest::tuning::Tuning;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "fauxspeed", version, about = "A simulated internet speed test for the terminal")]
pub struct Cli {
    /// Layout to start with
    #[arg(long, value_enum, default_value_t = Skin::Card)]
    pub skin: Skin,

    /// Milliseconds between ticks
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 50,
        value_parser = clap::value_parser!(u64).range(TICK_INTERVAL_RANGE.0..=TICK_INTERVAL_RANGE.1)
    )]
    pub tick_ms: u64,

    /// Milliseconds to wait before the first latency tick
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 500,
        value_parser = clap::value_parser!(u64).range(START_DELAY_RANGE.0..=START_DELAY_RANGE.1)
    )]
    pub delay_ms: u64,

    /// TOML file overriding the per-phase ramp constants
    #[arg(long, value_name = "FILE")]
    pub tuning: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Server name shown in the footer
    #[arg(long, default_value = "New York, US")]
    pub server: String,

    /// Run once and print results instead of opening the UI
    #[arg(long)]
    pub plain: bool,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings> {
        let tuning = match &self.tuning {
            Some(path) => load_tuning(path)?,
            None => Tuning::default(),
        };

        Ok(Settings {
            tick_interval_ms: self.tick_ms,
            start_delay_ms: self.delay_ms,
            skin: self.skin,
            tuning,
            seed: self.seed,
            server_label: self.server.clone(),
            ..Settings::default()
        })
    }
}

pub fn load_tuning(path: &Path) -> Result<Tuning> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading tuning file {}", path.display()))?;
    Tuning::from_toml(&source).with_context(|| format!("loading tuning file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::try_parse_from(["fauxspeed"]).expect("parse");
        let settings = cli.settings().expect("settings");
        assert_eq!(settings.tick_interval_ms, 50);
        assert_eq!(settings.start_delay_ms, 500);
        assert_eq!(settings.skin, Skin::Card);
        assert_eq!(settings.tuning, Tuning::default());
        assert!(!cli.plain);
    }

    #[test]
    fn flags_flow_into_settings() {
        let cli = Cli::try_parse_from([
            "fauxspeed", "--skin", "gauge", "--tick-ms", "20", "--delay-ms", "0", "--seed", "9",
            "--server", "Lisbon, PT", "--plain",
        ])
        .expect("parse");
        let settings = cli.settings().expect("settings");
        assert_eq!(settings.skin, Skin::Gauge);
        assert_eq!(settings.tick_interval_ms, 20);
        assert_eq!(settings.start_delay_ms, 0);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.server_label, "Lisbon, PT");
        assert!(cli.plain);
    }

    #[test]
    fn pacing_flags_share_the_settings_bounds() {
        for bad in [["--tick-ms", "0"], ["--tick-ms", "5"], ["--tick-ms", "501"], ["--delay-ms", "3001"]] {
            let args = ["fauxspeed", bad[0], bad[1]];
            assert!(Cli::try_parse_from(args).is_err(), "{bad:?} accepted");
        }

        let cli = Cli::try_parse_from(["fauxspeed", "--tick-ms", "500", "--delay-ms", "3000"])
            .expect("parse");
        let settings = cli.settings().expect("settings");
        assert_eq!(settings.tick_interval_ms, TICK_INTERVAL_RANGE.1);
        assert_eq!(settings.start_delay_ms, START_DELAY_RANGE.1);
    }

    #[test]
    fn tuning_file_is_loaded_and_validated() {
        let mut good = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(good, "[upload]\nstep_max = 20.0\nthreshold = 400.0\nsnap_span = 10.0").expect("write");
        let tuning = load_tuning(good.path()).expect("load");
        assert_eq!(tuning.upload.threshold, 400.0);

        let mut bad = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(bad, "[upload]\nstep_max = 0.0\nthreshold = 400.0\nsnap_span = 10.0").expect("write");
        let err = load_tuning(bad.path()).unwrap_err();
        assert!(format!("{err:#}").contains("upload.step_max"));

        assert!(load_tuning(Path::new("/nonexistent/tuning.toml")).is_err());
    }
}
