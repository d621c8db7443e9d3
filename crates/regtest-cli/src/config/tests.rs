#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use crate::config::*;
    use clap::Parser;
    use regtest::CaptureFormat;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("regtest.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = RegtestConfig::default();
        assert_eq!(config.port, 8090);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert!(config.interpreter.is_none());
        assert!(config.tests.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
interpreter = "parchment/index.html"
port = 9001
timeout = 2.5
capture = "png"
tests = ["opening"]
"#,
        );
        let config = RegtestConfig::from_layers(Some(&path), &CliOverrides::default()).unwrap();
        assert_eq!(config.interpreter.as_deref(), Some("parchment/index.html"));
        assert_eq!(config.port, 9001);
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.capture, Some(CaptureFormat::Png));
        assert_eq!(config.tests, ["opening"]);
    }

    #[test]
    fn flags_override_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "port = 9001\ngame = \"old.ulx\"\nverbose = true\n");
        let cli = Cli::try_parse_from(["regtest", "-p", "9002", "-g", "new.ulx", "t.regtest"]).unwrap();

        let config = RegtestConfig::from_layers(Some(&path), &CliOverrides::from_cli(&cli)).unwrap();
        assert_eq!(config.port, 9002);
        assert_eq!(config.game.as_deref(), Some("new.ulx"));
        // An absent -v does not switch verbose back off.
        assert!(config.verbose);
    }

    #[test]
    fn pdf_flag_selects_pdf_capture() {
        let cli = Cli::try_parse_from(["regtest", "--pdf", "t.regtest"]).unwrap();
        let config = RegtestConfig::from_layers(None, &CliOverrides::from_cli(&cli)).unwrap();
        assert_eq!(config.capture, Some(CaptureFormat::Pdf));
    }

    #[test]
    fn visible_flag_disables_headless() {
        let cli = Cli::try_parse_from(["regtest", "--visible", "t.regtest"]).unwrap();
        let config = RegtestConfig::from_layers(None, &CliOverrides::from_cli(&cli)).unwrap();
        assert!(!config.headless);
    }

    #[test]
    fn invalid_timeouts_are_rejected() {
        for timeout in [0.0, -1.0, f64::NAN] {
            let overrides = CliOverrides {
                timeout: Some(timeout),
                ..CliOverrides::default()
            };
            let err = RegtestConfig::from_layers(None, &overrides).unwrap_err();
            assert!(err.to_string().contains("timeout"), "{err}");
        }
    }

    #[test]
    fn capture_path_needs_a_format() {
        let overrides = CliOverrides {
            capture_path: Some(PathBuf::from("shot.png")),
            ..CliOverrides::default()
        };
        assert!(RegtestConfig::from_layers(None, &overrides).is_err());
    }

    #[test]
    fn malformed_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "port = \"not a number\"\n");
        let err = RegtestConfig::from_layers(Some(&path), &CliOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("Hint:"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli::try_parse_from([
            "regtest",
            "--config",
            "/definitely/not/here/regtest.toml",
            "t.regtest",
        ])
        .unwrap();
        let err = RegtestConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here/regtest.toml"));
        assert!(!Path::new("/definitely/not/here/regtest.toml").exists());
    }
}
