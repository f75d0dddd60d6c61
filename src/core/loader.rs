use crate::core::classifiers::{
    DecisionTreeClassifier, KnnClassifier, RandomForestClassifier, TreeData,
};
use crate::domain::model::{Label, FEATURE_NAMES};
use crate::domain::ports::Classifier;
use crate::utils::error::{PredictError, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// On-disk model export, tagged by estimator type. Unknown keys are rejected so an
/// export carrying hyperparameters this crate does not implement fails to load.
#[derive(Debug, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case", deny_unknown_fields)]
pub enum ModelArtifact {
    DecisionTree {
        classes: Vec<Label>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        tree: TreeData,
    },
    RandomForest {
        classes: Vec<Label>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        estimators: Vec<TreeData>,
    },
    Knn {
        classes: Vec<Label>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        k: usize,
        #[serde(default)]
        weights: Option<String>,
        #[serde(default)]
        metric: Option<String>,
        #[serde(default)]
        p: Option<f64>,
        points: Vec<Vec<f64>>,
        targets: Vec<usize>,
    },
}

pub struct ModelLoader;

impl ModelLoader {
    /// Reads and validates the artifact at `path`. Called once at startup; any error
    /// here must stop the process before it serves requests.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Arc<dyn Classifier>> {
        let path_str = path.as_ref().display().to_string();
        tracing::info!("Loading model artifact from {}", path_str);

        let content =
            std::fs::read_to_string(&path).map_err(|e| PredictError::ModelLoadError {
                path: path_str.clone(),
                reason: e.to_string(),
            })?;

        let artifact: ModelArtifact =
            serde_json::from_str(&content).map_err(|e| PredictError::ModelLoadError {
                path: path_str.clone(),
                reason: format!("not a valid model export: {}", e),
            })?;

        let model = Self::build(artifact)?;
        tracing::info!(
            "Loaded {} model with {} classes",
            model.algorithm(),
            model.classes().len()
        );
        Ok(model)
    }

    pub fn from_json_str(content: &str) -> Result<Arc<dyn Classifier>> {
        let artifact: ModelArtifact =
            serde_json::from_str(content).map_err(|e| PredictError::InvalidModelError {
                message: format!("JSON parse failed: {}", e),
            })?;
        Self::build(artifact)
    }

    pub fn build(artifact: ModelArtifact) -> Result<Arc<dyn Classifier>> {
        let model: Arc<dyn Classifier> = match artifact {
            ModelArtifact::DecisionTree {
                classes,
                feature_names,
                tree,
            } => {
                check_header(&classes, feature_names.as_deref())?;
                Arc::new(DecisionTreeClassifier::new(classes, tree)?)
            }
            ModelArtifact::RandomForest {
                classes,
                feature_names,
                estimators,
            } => {
                check_header(&classes, feature_names.as_deref())?;
                Arc::new(RandomForestClassifier::new(classes, estimators)?)
            }
            ModelArtifact::Knn {
                classes,
                feature_names,
                k,
                weights,
                metric,
                p,
                points,
                targets,
            } => {
                check_header(&classes, feature_names.as_deref())?;
                check_knn_params(weights.as_deref(), metric.as_deref(), p)?;
                Arc::new(KnnClassifier::new(classes, k, points, targets)?)
            }
        };
        Ok(model)
    }
}

fn check_header(classes: &[Label], feature_names: Option<&[String]>) -> Result<()> {
    if classes.is_empty() {
        return Err(PredictError::InvalidModelError {
            message: "class table is empty".to_string(),
        });
    }
    if let Some(names) = feature_names {
        if !names.iter().map(String::as_str).eq(FEATURE_NAMES.iter().copied()) {
            return Err(PredictError::InvalidModelError {
                message: format!(
                    "model was trained on features {:?}, expected {:?}",
                    names, FEATURE_NAMES
                ),
            });
        }
    }
    Ok(())
}

/// Only uniform votes over Euclidean distance are implemented.
fn check_knn_params(weights: Option<&str>, metric: Option<&str>, p: Option<f64>) -> Result<()> {
    if let Some(w) = weights {
        if w != "uniform" {
            return Err(PredictError::InvalidModelError {
                message: format!("unsupported knn weights '{}', expected 'uniform'", w),
            });
        }
    }
    let euclidean = match metric {
        None | Some("euclidean") | Some("minkowski") => p.map_or(true, |p| p == 2.0),
        Some(_) => false,
    };
    if !euclidean {
        return Err(PredictError::InvalidModelError {
            message: format!(
                "unsupported knn metric {:?} (p = {:?}), expected euclidean",
                metric, p
            ),
        });
    }
    Ok(())
}
