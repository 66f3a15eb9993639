use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use engine_logging::engine_info;
use market_engine::EngineSettings;

use crate::cli::SearchArgs;

const APP_DIR: &str = "module_market";

/// Engine settings from an optional RON file; absent fields keep defaults.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<EngineSettings> {
    let Some(path) = path else {
        return Ok(EngineSettings::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings = ron::from_str(&content)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    engine_info!("Loaded engine settings from {:?}", path);
    Ok(settings)
}

/// Command-line flags win over the settings file.
pub fn apply_overrides(settings: &mut EngineSettings, args: &SearchArgs) {
    if args.show_browser {
        settings.headless = false;
    }
    if let Some(settle_ms) = args.settle_ms {
        settings.settle_delay_ms = settle_ms;
    }
    if let Some(poll_ms) = args.poll_ms {
        settings.poll_interval_ms = poll_ms;
    }
}

pub fn data_dir(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_settings_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(
            &path,
            r#"(settle_delay_ms: 2000, selectors: (listing: ".row"))"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.settle_delay_ms, 2000);
        assert_eq!(settings.poll_interval_ms, 700);
        assert_eq!(settings.selectors.listing, ".row");
        assert_eq!(settings.selectors.price, EngineSettings::default().selectors.price);
    }

    #[test]
    fn unreadable_settings_are_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(load_settings(Some(&temp.path().join("missing.ron"))).is_err());

        let path = temp.path().join("broken.ron");
        fs::write(&path, "(settle_delay_ms: ").unwrap();
        assert!(load_settings(Some(&path)).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let mut settings = EngineSettings::default();
        let args = SearchArgs {
            show_browser: true,
            settle_ms: Some(10),
            poll_ms: Some(20),
            ..SearchArgs::default()
        };
        apply_overrides(&mut settings, &args);
        assert!(!settings.headless);
        assert_eq!(settings.settle_delay_ms, 10);
        assert_eq!(settings.poll_interval_ms, 20);
    }

    #[test]
    fn explicit_data_dir_wins() {
        assert_eq!(
            data_dir(Some(Path::new("/tmp/profiles"))),
            PathBuf::from("/tmp/profiles")
        );
        assert!(data_dir(None).ends_with(APP_DIR));
    }
}
