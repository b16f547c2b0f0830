use std::io::Write;

use pretty_assertions::assert_eq;
use remap_config::{ConfigError, IndexConfig, LoggingConfig, RemapConfig};
use tempfile::{tempdir, NamedTempFile};

#[test]
fn loads_config_from_disk() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"
[logging]
level = "debug"
json = true

[index]
skip_jre_classes = false
"#
    )
    .expect("write config");

    let config = RemapConfig::load(file.path()).expect("config should load");
    assert_eq!(
        config,
        RemapConfig {
            logging: LoggingConfig {
                level: "debug".to_owned(),
                json: true,
                ..LoggingConfig::default()
            },
            index: IndexConfig {
                skip_jre_classes: false,
                ..IndexConfig::default()
            },
        }
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("remap.toml");

    let err = RemapConfig::load(&path).expect_err("missing file should fail");
    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn toml_errors_do_not_echo_input() {
    let err = RemapConfig::from_toml_str("[logging]\nlevel = 42\n").expect_err("bad type");
    let message = err.to_string();
    assert!(message.starts_with("failed to parse toml config"), "{message}");
    assert!(!message.contains("level = 42"), "{message}");
}
