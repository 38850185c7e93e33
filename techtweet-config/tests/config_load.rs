use serial_test::serial;
use std::{fs, path::PathBuf};
use techtweet_config::{CounterKind, PromptStyleKind, ProviderKind, TechtweetConfigLoader};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const SECRETS: [(&str, Option<&str>); 6] = [
    ("APP_KEY", Some("ck")),
    ("APP_SECRET", Some("cs")),
    ("ACCESS_TOKEN", Some("at")),
    ("ACCESS_SECRET", Some("as")),
    ("GROQ_API_KEY", Some("gsk_test")),
    ("NEWS_API_KEY", Some("news")),
];

#[test]
#[serial]
fn defaults_pull_secrets_from_conventional_env_names() {
    temp_env::with_vars(SECRETS, || {
        let config = TechtweetConfigLoader::new()
            .with_defaults()
            .load()
            .expect("load defaults");

        assert_eq!(config.twitter.app_key, "ck");
        assert_eq!(config.twitter.access_secret, "as");
        assert_eq!(config.llm.api_key, "gsk_test");
        assert_eq!(config.llm.provider, ProviderKind::Groq);
        assert_eq!(config.news.api_key, "news");
        assert!(config.missing_secrets().is_empty());
    });
}

#[test]
#[serial]
fn unset_secrets_become_blank() {
    temp_env::with_vars(
        [
            ("APP_KEY", None::<&str>),
            ("APP_SECRET", None),
            ("ACCESS_TOKEN", None),
            ("ACCESS_SECRET", None),
            ("GROQ_API_KEY", None),
            ("NEWS_API_KEY", None),
        ],
        || {
            let config = TechtweetConfigLoader::new()
                .with_defaults()
                .load()
                .expect("load defaults");
            assert_eq!(config.twitter.app_key, "");
            assert_eq!(config.llm.api_key, "");
            assert!(config.missing_secrets().contains(&"twitter.app_key"));
        },
    );
}

#[test]
#[serial]
fn file_overrides_defaults_and_env_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
llm:
  provider: openai
  model: "gpt-4o-mini"
  api_key: "${OPENAI_API_KEY}"
  temperature: 0.2
pipeline:
  prompt_style: engaging
  fallback_images:
    - "https://images.example.com/a.jpg"
schedule:
  counter: clock
  total_days: 30
"#;
    let p = write_yaml(&tmp, "techtweet.yaml", file_yaml);

    let mut vars: Vec<(&str, Option<&str>)> = SECRETS.to_vec();
    vars.push(("OPENAI_API_KEY", Some("sk-test")));
    vars.push(("TECHTWEET__SCHEDULE__TOTAL_DAYS", Some("7")));
    vars.push(("TECHTWEET__SERVER__BIND", Some("127.0.0.1:8080")));

    temp_env::with_vars(vars, || {
        let config = TechtweetConfigLoader::new()
            .with_defaults()
            .with_file(&p)
            .load()
            .expect("load system config");

        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.max_tokens, 400);
        assert_eq!(config.pipeline.prompt_style, PromptStyleKind::Engaging);
        assert_eq!(config.pipeline.fallback_images.len(), 1);
        assert_eq!(config.schedule.counter, CounterKind::Clock);
        assert_eq!(config.schedule.total_days, 7);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    });
}

#[test]
#[serial]
fn numeric_looking_env_overrides_keep_their_field_types() {
    let mut vars: Vec<(&str, Option<&str>)> = SECRETS.to_vec();
    vars.push(("TECHTWEET__LLM__API_KEY", Some("1234567890")));
    vars.push(("TECHTWEET__TWITTER__ACCESS_TOKEN", Some("42")));
    vars.push(("TECHTWEET__LLM__TEMPERATURE", Some("0.25")));
    vars.push(("TECHTWEET__PIPELINE__ATTACH_IMAGES", Some("false")));

    temp_env::with_vars(vars, || {
        let config = TechtweetConfigLoader::new()
            .with_defaults()
            .load()
            .expect("digits are a valid secret");

        assert_eq!(config.llm.api_key, "1234567890");
        assert_eq!(config.twitter.access_token, "42");
        assert!((config.llm.temperature - 0.25).abs() < f32::EPSILON);
        assert!(!config.pipeline.attach_images);
    });
}

#[test]
#[serial]
fn missing_optional_file_is_fine() {
    let tmp = TempDir::new().unwrap();
    temp_env::with_vars(SECRETS, || {
        let config = TechtweetConfigLoader::new()
            .with_defaults()
            .with_optional_file(tmp.path().join("absent.yaml"))
            .load()
            .expect("optional file may be missing");
        assert_eq!(config.news.page_size, 5);
    });
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    let err = TechtweetConfigLoader::new()
        .with_defaults()
        .with_yaml_str("pipeline:\n  cycle_days: 0\n")
        .without_env()
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("cycle_days"));
}

#[test]
#[serial]
fn redacted_yaml_hides_secrets() {
    temp_env::with_vars(SECRETS, || {
        let config = TechtweetConfigLoader::new().with_defaults().load().unwrap();
        let yaml = config.to_redacted_yaml().unwrap();
        assert!(yaml.contains("<redacted>"));
        assert!(!yaml.contains("gsk_test"));
        assert!(yaml.contains("llama-3.3-70b-versatile"));
    });
}
