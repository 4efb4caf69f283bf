//! Model download tests against a local mock server

use sgm_core::NerConfig;
use sgm_extractor::model::fetch_model;
use sgm_extractor::{EntityExtractor, EntityLabel, NerModel, RuleBasedNer};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SMALL_MODEL: &str = r#"{
    "version": "mock-1",
    "persons": ["Katherine Johnson"],
    "organizations": ["NACA"],
    "geopolitical": ["Hampton"]
}"#;

#[tokio::test]
async fn test_missing_model_is_downloaded_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models/gazetteer.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SMALL_MODEL))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("models").join("gazetteer.json");
    let config = NerConfig {
        model_path: Some(model_path.clone()),
        model_url: Some(format!("{}/models/gazetteer.json", server.uri())),
        ..Default::default()
    };

    let model = NerModel::load(&config).await.unwrap();
    assert_eq!(model.version(), "mock-1");
    assert!(model_path.exists());

    // Second load reads the persisted copy; the mock expects a single hit
    let again = NerModel::load(&config).await.unwrap();
    assert_eq!(again.version(), "mock-1");
}

#[tokio::test]
async fn test_invalid_download_is_not_written() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a model</html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("gazetteer.json");

    let result = fetch_model(&format!("{}/gazetteer.json", server.uri()), &model_path).await;
    assert!(result.is_err());
    assert!(!model_path.exists());
}

#[tokio::test]
async fn test_download_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = NerConfig {
        model_path: None,
        model_url: Some(format!("{}/gazetteer.json", server.uri())),
        ..Default::default()
    };
    assert!(NerModel::load(&config).await.is_err());
}

#[tokio::test]
async fn test_downloaded_model_drives_recognizer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SMALL_MODEL))
        .mount(&server)
        .await;

    let config = NerConfig {
        model_path: None,
        model_url: Some(format!("{}/gazetteer.json", server.uri())),
        ..Default::default()
    };
    let model = Arc::new(NerModel::load(&config).await.unwrap());
    let ner = RuleBasedNer::new(model).unwrap();

    let mentions = ner
        .extract("Katherine Johnson computed trajectories for NACA in Hampton.")
        .unwrap();
    let labels: Vec<_> = mentions.iter().map(|m| (m.text.as_str(), m.label)).collect();
    assert_eq!(
        labels,
        vec![
            ("Katherine Johnson", EntityLabel::Person),
            ("NACA", EntityLabel::Organization),
            ("Hampton", EntityLabel::Gpe),
        ]
    );
}
