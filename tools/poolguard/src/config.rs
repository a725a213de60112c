use crate::errors::PoolguardError;
use crate::logging::DEFAULT_DISK_BUDGET_BYTES;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MIN_FRAME_WIDTH: u16 = 40;
pub const MIN_FRAME_HEIGHT: u16 = 12;

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub paused: bool,
    pub render_once: bool,
    pub frame_width: Option<u16>,
    pub frame_height: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub monitoring: MonitoringConfig,
    pub occupancy: OccupancyConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitoringConfig {
    pub active_on_start: bool,
}

/// The occupancy card is a mock reading; the count comes from config rather
/// than a sensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OccupancyConfig {
    pub detected: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    pub frame_width: u16,
    pub frame_height: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub budget_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitoring: MonitoringConfig {
                active_on_start: true,
            },
            occupancy: OccupancyConfig { detected: 2 },
            ui: UiConfig {
                frame_width: 120,
                frame_height: 36,
            },
            logging: LoggingConfig {
                enabled: true,
                dir: PathBuf::from(".cache/poolguard"),
                budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAppConfig {
    monitoring: Option<PartialMonitoringConfig>,
    occupancy: Option<PartialOccupancyConfig>,
    ui: Option<PartialUiConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialMonitoringConfig {
    active_on_start: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialOccupancyConfig {
    detected: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialUiConfig {
    frame_width: Option<u16>,
    frame_height: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLoggingConfig {
    enabled: Option<bool>,
    dir: Option<PathBuf>,
    budget_bytes: Option<u64>,
}

/// Defaults, overlaid with the TOML file when one was given, overlaid with
/// CLI flags. CLI wins.
pub fn load_config(
    overrides: &CliOverrides,
    fs: &dyn FileSystem,
) -> Result<AppConfig, PoolguardError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        if !fs.exists(path) {
            return Err(PoolguardError::Io(format!(
                "missing config file {}",
                path.display()
            )));
        }
        let contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&contents)
            .map_err(|e| PoolguardError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(monitoring) = partial.monitoring {
        if let Some(active_on_start) = monitoring.active_on_start {
            cfg.monitoring.active_on_start = active_on_start;
        }
    }

    if let Some(occupancy) = partial.occupancy {
        if let Some(detected) = occupancy.detected {
            cfg.occupancy.detected = detected;
        }
    }

    if let Some(ui) = partial.ui {
        if let Some(frame_width) = ui.frame_width {
            cfg.ui.frame_width = frame_width;
        }
        if let Some(frame_height) = ui.frame_height {
            cfg.ui.frame_height = frame_height;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(enabled) = logging.enabled {
            cfg.logging.enabled = enabled;
        }
        if let Some(dir) = logging.dir {
            cfg.logging.dir = dir;
        }
        if let Some(budget_bytes) = logging.budget_bytes {
            cfg.logging.budget_bytes = budget_bytes;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if overrides.paused {
        cfg.monitoring.active_on_start = false;
    }
    if let Some(frame_width) = overrides.frame_width {
        cfg.ui.frame_width = frame_width;
    }
    if let Some(frame_height) = overrides.frame_height {
        cfg.ui.frame_height = frame_height;
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), PoolguardError> {
    if cfg.ui.frame_width < MIN_FRAME_WIDTH {
        return Err(PoolguardError::InvalidConfig(format!(
            "frame_width must be at least {MIN_FRAME_WIDTH}, got {}",
            cfg.ui.frame_width
        )));
    }
    if cfg.ui.frame_height < MIN_FRAME_HEIGHT {
        return Err(PoolguardError::InvalidConfig(format!(
            "frame_height must be at least {MIN_FRAME_HEIGHT}, got {}",
            cfg.ui.frame_height
        )));
    }
    if cfg.logging.enabled && cfg.logging.budget_bytes == 0 {
        return Err(PoolguardError::InvalidConfig(
            "logging.budget_bytes must be nonzero while logging is enabled".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, AppConfig, CliOverrides};
    use crate::errors::PoolguardError;
    use crate::runtime::FakeFileSystem;
    use std::path::PathBuf;

    fn overrides_with_config(path: &str) -> CliOverrides {
        CliOverrides {
            config_path: Some(PathBuf::from(path)),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let cfg = load_config(&CliOverrides::default(), &FakeFileSystem::default())
            .expect("defaults");
        assert_eq!(cfg, AppConfig::default());
        assert!(cfg.monitoring.active_on_start);
        assert_eq!(cfg.occupancy.detected, 2);
    }

    #[test]
    fn partial_file_overlays_only_named_keys() {
        let fs = FakeFileSystem::with_file(
            "/config.toml",
            "[occupancy]\ndetected = 5\n\n[logging]\nenabled = false\n",
        );
        let cfg = load_config(&overrides_with_config("/config.toml"), &fs).expect("overlay");
        assert_eq!(cfg.occupancy.detected, 5);
        assert!(!cfg.logging.enabled);
        assert_eq!(cfg.ui.frame_width, AppConfig::default().ui.frame_width);
    }

    #[test]
    fn cli_flags_win_over_the_file() {
        let fs = FakeFileSystem::with_file(
            "/config.toml",
            "[monitoring]\nactive_on_start = true\n\n[ui]\nframe_width = 100\n",
        );
        let overrides = CliOverrides {
            paused: true,
            frame_width: Some(80),
            ..overrides_with_config("/config.toml")
        };
        let cfg = load_config(&overrides, &fs).expect("cli overrides");
        assert!(!cfg.monitoring.active_on_start);
        assert_eq!(cfg.ui.frame_width, 80);
    }

    #[test]
    fn unparsable_config_is_a_parse_error() {
        let fs = FakeFileSystem::with_file("/config.toml", "not toml = = =");
        let err = load_config(&overrides_with_config("/config.toml"), &fs)
            .expect_err("must reject");
        assert!(matches!(err, PoolguardError::ConfigParse(_)));
    }

    #[test]
    fn undersized_frames_are_rejected() {
        let overrides = CliOverrides {
            frame_width: Some(10),
            ..CliOverrides::default()
        };
        let err = load_config(&overrides, &FakeFileSystem::default()).expect_err("must reject");
        assert!(matches!(err, PoolguardError::InvalidConfig(message) if message.contains("frame_width")));
    }

    #[test]
    fn zero_log_budget_is_rejected_only_when_logging_is_on() {
        let fs = FakeFileSystem::with_file("/config.toml", "[logging]\nbudget_bytes = 0\n");
        let err = load_config(&overrides_with_config("/config.toml"), &fs).expect_err("reject");
        assert!(matches!(err, PoolguardError::InvalidConfig(_)));

        let fs = FakeFileSystem::with_file(
            "/config.toml",
            "[logging]\nenabled = false\nbudget_bytes = 0\n",
        );
        load_config(&overrides_with_config("/config.toml"), &fs).expect("disabled logging");
    }
}
