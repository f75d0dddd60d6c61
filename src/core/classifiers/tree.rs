use super::argmax;
use crate::domain::model::{FeatureVector, Label, FEATURE_COUNT};
use crate::domain::ports::Classifier;
use crate::utils::error::{PredictError, Result};
use serde::{Deserialize, Serialize};

/// Marker used by scikit-learn for "no child".
const TREE_LEAF: i64 = -1;

/// Parallel node arrays as exported from a fitted scikit-learn `tree_`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeData {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

fn invalid(message: String) -> PredictError {
    PredictError::InvalidModelError { message }
}

impl DecisionTree {
    /// Builds a tree from exported arrays, rejecting anything that could index out of
    /// bounds or loop during traversal.
    pub fn from_data(data: TreeData, n_classes: usize) -> Result<Self> {
        let n = data.children_left.len();
        if n == 0 {
            return Err(invalid("tree has no nodes".to_string()));
        }
        if data.children_right.len() != n
            || data.feature.len() != n
            || data.threshold.len() != n
            || data.value.len() != n
        {
            return Err(invalid(format!(
                "tree arrays differ in length (children_left has {} nodes)",
                n
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for (i, value) in data.value.into_iter().enumerate() {
            let left = data.children_left[i];
            let right = data.children_right[i];

            if left == TREE_LEAF {
                if right != TREE_LEAF {
                    return Err(invalid(format!("node {} has only one child", i)));
                }
                if value.len() != n_classes {
                    return Err(invalid(format!(
                        "leaf {} has {} class weights, expected {}",
                        i,
                        value.len(),
                        n_classes
                    )));
                }
                if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(invalid(format!("leaf {} has invalid class weights", i)));
                }
                nodes.push(Node::Leaf { value });
                continue;
            }

            // Children always come after their parent in scikit-learn's layout, which
            // also guarantees traversal terminates.
            let child = |c: i64| -> Result<usize> {
                if c <= i as i64 || c >= n as i64 {
                    Err(invalid(format!("node {} has invalid child index {}", i, c)))
                } else {
                    Ok(c as usize)
                }
            };
            let feature = data.feature[i];
            if feature < 0 || feature >= FEATURE_COUNT as i64 {
                return Err(invalid(format!(
                    "node {} splits on feature {}, expected 0..{}",
                    i, feature, FEATURE_COUNT
                )));
            }
            let threshold = data.threshold[i];
            if !threshold.is_finite() {
                return Err(invalid(format!("node {} has non-finite threshold", i)));
            }

            nodes.push(Node::Split {
                feature: feature as usize,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    /// Class weights stored at the leaf reached by `features`.
    ///
    /// Inputs are narrowed to f32 before comparing, as scikit-learn does; exported
    /// thresholds are often f32 training values widened to f64.
    pub fn leaf_value(&self, features: &FeatureVector) -> &[f64] {
        let values = features.values();
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if (values[*feature] as f32) as f64 <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    classes: Vec<Label>,
    tree: DecisionTree,
}

impl DecisionTreeClassifier {
    pub fn new(classes: Vec<Label>, tree: TreeData) -> Result<Self> {
        let tree = DecisionTree::from_data(tree, classes.len())?;
        Ok(Self { classes, tree })
    }
}

impl Classifier for DecisionTreeClassifier {
    fn algorithm(&self) -> &'static str {
        "decision_tree"
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn predict_class(&self, features: &FeatureVector) -> Result<usize> {
        argmax(self.tree.leaf_value(features)).ok_or_else(|| PredictError::InferenceError {
            message: "leaf has no class weights".to_string(),
        })
    }
}
