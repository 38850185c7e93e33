use std::sync::OnceLock;

use techtweet_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

#[allow(dead_code)]
pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let dir = std::env::temp_dir().join("techtweet-tests");
        let config = LogConfig {
            app_name: "techtweet-tests".to_string(),
            log_dir: Some(dir),
            emit_stderr: true,
            format: std::env::var("TECHTWEET_LOG_FORMAT")
                .ok()
                .and_then(|raw| raw.parse::<LogFormat>().ok())
                .unwrap_or_default(),
            default_filter: "debug".to_string(),
        };

        techtweet_common::observability::init_logging(config).unwrap_or_default()
    });
}
