// tests/config_loading.rs
//
// Config resolution: env path, default path fallback, built-in defaults, and
// weight overrides flowing into the registry. Tests mutate process env, so they
// run serially.

use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use page_credibility::config::{CredibilityConfig, ENV_CONFIG_PATH};
use page_credibility::page::PageData;
use page_credibility::signals;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
#[serial]
fn env_path_is_loaded_and_sanitized() {
    let file = write_config(
        r#"
[evaluation]
min_text_length = 80
evaluator_timeout_ms = 0

[parser]
user_agent = "  "
timeout_secs = 30
"#,
    );
    std::env::set_var(ENV_CONFIG_PATH, file.path());
    let cfg = CredibilityConfig::load();
    std::env::remove_var(ENV_CONFIG_PATH);

    let cfg = cfg.expect("config loads");
    assert_eq!(cfg.evaluation.min_text_length, 80);
    assert_eq!(cfg.evaluation.evaluator_timeout_ms, 10_000, "zero timeout falls back");
    assert!(cfg.parser.user_agent.starts_with("page-credibility/"));
    assert_eq!(cfg.parser.timeout_secs, 30);
    assert_eq!(cfg.parser.connect_timeout_secs, 5);
}

#[test]
#[serial]
fn env_path_that_does_not_exist_is_an_error() {
    std::env::set_var(ENV_CONFIG_PATH, "/definitely/not/here/credibility.toml");
    let r = CredibilityConfig::load();
    std::env::remove_var(ENV_CONFIG_PATH);
    let err = r.expect_err("missing file must fail");
    assert!(format!("{err:#}").contains(ENV_CONFIG_PATH));
}

#[test]
#[serial]
fn malformed_toml_is_an_error_with_path_context() {
    let file = write_config("[evaluation\nmin_text_length = ");
    let err = CredibilityConfig::load_from(file.path()).expect_err("bad toml");
    assert!(format!("{err:#}").contains("parsing config at"));
}

#[test]
#[serial]
fn repo_default_file_matches_builtin_defaults() {
    std::env::remove_var(ENV_CONFIG_PATH);
    // tests run from the crate root, where config/credibility.toml lives
    let cfg = CredibilityConfig::load().expect("default config loads");
    let defaults = CredibilityConfig::default();
    assert_eq!(cfg.evaluation, defaults.evaluation);
    assert_eq!(cfg.parser.timeout_secs, defaults.parser.timeout_secs);
    assert_eq!(cfg.registry().expect("registry").len(), 18);
}

#[tokio::test]
#[serial]
async fn weight_override_changes_the_final_score() {
    let file = write_config(
        r#"
[weights.authors]
kind = "constant"
weight = 0.0

[weights.url_domain_ending]
kind = "at_points"
points = [1.0]
weight = 3.0
otherwise = 0.0
requires_host = true
"#,
    );
    let cfg = CredibilityConfig::load_from(file.path()).expect("config loads");
    let tuned = cfg.aggregator().expect("aggregator");
    let plain = CredibilityConfig::default().aggregator().expect("aggregator");

    let page = PageData::new(
        "https://www.agency.gov/press/transport",
        "<p></p>",
        "Agency publishes transport report",
        "The agency published its annual transport report on Monday. The report covers \
         rail, bus and ferry services across the region and lists planned investments.",
        vec![],
    );
    let tuned = tuned.evaluate(Some(page.clone())).await.expect("scored");
    let plain = plain.evaluate(Some(page)).await.expect("scored");

    assert_eq!(tuned.weights.get(signals::AUTHORS), Some(0.0));
    assert_eq!(tuned.weights.get(signals::URL_DOMAIN_ENDING), Some(3.0));
    assert!(tuned.score > plain.score, "{} vs {}", tuned.score, plain.score);
}

#[test]
#[serial]
fn malformed_weight_rule_is_rejected() {
    let cfg = CredibilityConfig::from_toml_str(
        r#"
[weights.clickbait]
kind = "constant"
weight = -1.0
"#,
    )
    .expect("toml parses");
    let err = cfg.aggregator().expect_err("negative constant weight");
    assert!(format!("{err:#}").contains("clickbait"));
}
