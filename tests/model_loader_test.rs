use crop_predict::app::server::build_state;
use crop_predict::core::{FeatureVector, Label};
use crop_predict::{ModelLoader, PredictError, TomlConfig};
use serde_json::json;
use tempfile::TempDir;

fn write_artifact(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn stump(feature: usize, threshold: f64, left: [f64; 2], right: [f64; 2]) -> serde_json::Value {
    json!({
        "children_left": [1, -1, -1],
        "children_right": [2, -1, -1],
        "feature": [feature, -2, -2],
        "threshold": [threshold, -2.0, -2.0],
        "value": [[1.0, 1.0], left, right]
    })
}

#[test]
fn test_loads_random_forest_export() {
    let dir = TempDir::new().unwrap();
    let artifact = json!({
        "algorithm": "random_forest",
        "classes": ["maize", "rice"],
        "estimators": [
            stump(6, 150.0, [9.0, 1.0], [1.0, 9.0]),
            stump(4, 70.0, [8.0, 2.0], [3.0, 7.0]),
            stump(3, 30.0, [4.0, 6.0], [6.0, 4.0])
        ]
    });
    let path = write_artifact(&dir, "forest.json", &artifact.to_string());

    let model = ModelLoader::load(&path).unwrap();
    assert_eq!(model.algorithm(), "random_forest");

    let wet = FeatureVector::new([90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9]);
    let dry = FeatureVector::new([90.0, 42.0, 43.0, 20.8, 40.0, 6.5, 60.0]);
    let labels = model.predict(&[wet, dry]).unwrap();
    assert_eq!(
        labels,
        vec![Label::Text("rice".to_string()), Label::Text("maize".to_string())]
    );
}

#[test]
fn test_loads_knn_export() {
    let dir = TempDir::new().unwrap();
    let artifact = json!({
        "algorithm": "knn",
        "classes": [11, 20],
        "k": 1,
        "points": [
            [80.0, 40.0, 20.0, 22.0, 65.0, 6.2, 80.0],
            [80.0, 45.0, 40.0, 23.0, 82.0, 6.4, 230.0]
        ],
        "targets": [0, 1]
    });
    let path = write_artifact(&dir, "knn.json", &artifact.to_string());

    let model = ModelLoader::load(&path).unwrap();
    let x = FeatureVector::new([90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9]);
    assert_eq!(model.predict(&[x]).unwrap(), vec![Label::Integer(20)]);
}

#[test]
fn test_unsupported_knn_params_are_fatal() {
    let dir = TempDir::new().unwrap();
    let artifact = json!({
        "algorithm": "knn",
        "classes": [11, 20],
        "k": 1,
        "weights": "distance",
        "metric": "manhattan",
        "points": [
            [80.0, 40.0, 20.0, 22.0, 65.0, 6.2, 80.0],
            [80.0, 45.0, 40.0, 23.0, 82.0, 6.4, 230.0]
        ],
        "targets": [0, 1]
    });
    let path = write_artifact(&dir, "knn.json", &artifact.to_string());

    let err = ModelLoader::load(&path).unwrap_err();
    assert!(matches!(err, PredictError::InvalidModelError { .. }));
    assert!(err.is_startup_failure());
}

#[test]
fn test_missing_artifact_is_fatal() {
    let err = ModelLoader::load("/definitely/not/here/model.json").unwrap_err();
    assert!(matches!(err, PredictError::ModelLoadError { .. }));
    assert!(err.is_startup_failure());
}

#[test]
fn test_corrupt_artifact_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(&dir, "model.json", "\u{80}\u{4}\u{95}pickle bytes");

    let err = ModelLoader::load(&path).unwrap_err();
    assert!(matches!(err, PredictError::ModelLoadError { .. }));
    assert!(err.to_string().contains("model.json"));
}

#[test]
fn test_incompatible_feature_order_is_fatal() {
    let dir = TempDir::new().unwrap();
    let artifact = json!({
        "algorithm": "knn",
        "classes": [0],
        "feature_names": ["N", "P", "K", "humidity", "temperature", "ph", "rainfall"],
        "k": 1,
        "points": [[0, 0, 0, 0, 0, 0, 0]],
        "targets": [0]
    });
    let path = write_artifact(&dir, "model.json", &artifact.to_string());

    let err = ModelLoader::load(&path).unwrap_err();
    assert!(matches!(err, PredictError::InvalidModelError { .. }));
    assert!(err.is_startup_failure());
}

#[test]
fn test_build_state_refuses_to_start_without_model() {
    let dir = TempDir::new().unwrap();
    let mut config = TomlConfig::default();
    config.model.path = dir.path().join("absent.json").to_string_lossy().to_string();

    let err = build_state(&config).err().unwrap();
    assert!(err.is_startup_failure());
}

#[test]
fn test_bundled_demo_artifact_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demo/model.json");
    let model = ModelLoader::load(path).unwrap();

    // Heavy rain and high humidity: rice.
    let x = FeatureVector::new([90.0, 42.0, 43.0, 20.8, 92.0, 6.5, 202.9]);
    assert_eq!(model.predict(&[x]).unwrap(), vec![Label::Integer(20)]);
}

#[test]
fn test_example_config_points_at_demo_artifact() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/crop-predict.example.toml");
    let config = TomlConfig::from_file(path).unwrap();

    assert_eq!(config.model.path, "demo/model.json");
    assert_eq!(config.server.port, 50001);
}
