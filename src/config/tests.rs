use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_ocular_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("OCULAR_PORT");
        env::remove_var("OCULAR_BIND_ADDR");
        env::remove_var("OCULAR_MODEL_PATH");
        env::remove_var("OCULAR_THRESHOLD");
        env::remove_var("OCULAR_DISTRACTORS");
        env::remove_var("OCULAR_DEFAULT_KEYWORD");
        env::remove_var("OCULAR_TASK_API_URL");
        env::remove_var("OCULAR_REWARD_POINTS");
        env::remove_var("OCULAR_INFERENCE_TIMEOUT_SECS");
        env::remove_var("OCULAR_MAX_UPLOAD_BYTES");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert!(config.model_path.is_none());
    assert_eq!(config.threshold, 0.80);
    assert_eq!(config.distractors.len(), 2);
    assert!(config.default_keyword.is_none());
    assert!(config.task_api_url.is_none());
    assert_eq!(config.reward_points, 10);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_ocular_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.threshold, 0.80);
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_ocular_env();

    with_env_vars(&[("OCULAR_PORT", "3000")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
    });
}

#[test]
#[serial]
fn test_from_env_rejects_port_zero() {
    clear_ocular_env();

    with_env_vars(&[("OCULAR_PORT", "0")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidPort { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_custom_threshold() {
    clear_ocular_env();

    with_env_vars(&[("OCULAR_THRESHOLD", "0.85")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.threshold, 0.85);
    });
}

#[test]
#[serial]
fn test_from_env_rejects_out_of_range_threshold() {
    clear_ocular_env();

    with_env_vars(&[("OCULAR_THRESHOLD", "1.5")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));
    });

    with_env_vars(&[("OCULAR_THRESHOLD", "0")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_distractor_list() {
    clear_ocular_env();

    with_env_vars(&[("OCULAR_DISTRACTORS", "a wall, an empty street ,a shoe")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(
            config.distractors,
            vec![
                "a wall".to_string(),
                "an empty street".to_string(),
                "a shoe".to_string()
            ]
        );
    });
}

#[test]
#[serial]
fn test_from_env_rejects_blank_distractor_list() {
    clear_ocular_env();

    with_env_vars(&[("OCULAR_DISTRACTORS", " , ,")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::EmptyDistractors { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_optional_strings_ignore_blank() {
    clear_ocular_env();

    with_env_vars(
        &[("OCULAR_DEFAULT_KEYWORD", "  "), ("OCULAR_TASK_API_URL", "")],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.default_keyword.is_none());
            assert!(config.task_api_url.is_none());
        },
    );
}

#[test]
#[serial]
fn test_from_env_task_api_url() {
    clear_ocular_env();

    with_env_vars(&[("OCULAR_TASK_API_URL", "http://game:8081")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.task_api_url.as_deref(), Some("http://game:8081"));
    });
}

#[test]
fn test_validate_rejects_missing_model_dir() {
    let config = Config {
        model_path: Some(std::path::PathBuf::from("/nonexistent/ocular/model")),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_rejects_file_as_model_dir() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config {
        model_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_accepts_defaults() {
    assert!(Config::default().validate().is_ok());
}
