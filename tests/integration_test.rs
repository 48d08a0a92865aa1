use meish::config::Config;
use meish::request::{GenerateRequest, TopicChoice};

fn config_with_url(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        ..Config::default()
    }
}

#[test]
fn test_config_validation_allows_local_http_endpoint() {
    assert!(config_with_url("http://localhost:5000/generate").validate().is_ok());
    assert!(config_with_url("http://127.0.0.1:8080/generate").validate().is_ok());
}

#[test]
fn test_config_validation_rejects_remote_plain_http() {
    let mut config = config_with_url("http://news.example/generate");
    assert!(config.validate().is_err());

    config.allow_insecure = true;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_non_http_scheme() {
    assert!(config_with_url("ftp://news.example/generate").validate().is_err());
}

#[test]
fn test_request_requires_samples_unless_sample_style_is_used() {
    let error = GenerateRequest::new(TopicChoice::Preset("sports".to_string()), vec![], false)
        .expect_err("missing samples should be rejected");
    assert_eq!(error.to_string(), "Upload at least one writing sample");

    let request =
        GenerateRequest::new(TopicChoice::Preset("Sports".to_string()), vec![], true).unwrap();
    assert_eq!(request.topic_description(), "sports news");
}
