use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::core::{PriceError, PriceResult};

/// Regression model scoring feature rows in log-price space.
pub trait Predictor: Send + Sync {
    /// Number of feature columns the model expects.
    fn n_features(&self) -> usize;

    /// One raw score per input row.
    fn predict(&self, features: ArrayView2<'_, f64>) -> PriceResult<Array1<f64>>;
}

/// Portable model artifact, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearArtifact),
    TreeEnsemble(TreeEnsembleArtifact),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleArtifact {
    pub n_features: usize,
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<TreeArtifact>,
}

/// A regression tree in flattened parallel-array form. Node `i` is a leaf
/// when `children_left[i] == -1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

/// How tree outputs combine into one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Average of tree outputs (bagged forests).
    Mean,
    /// `base_score + learning_rate * sum` (boosted ensembles).
    Sum,
}

fn default_learning_rate() -> f64 {
    1.0
}

const LEAF: i64 = -1;

impl ModelArtifact {
    pub fn from_json(content: &str) -> PriceResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| PriceError::ModelError(format!("invalid model artifact: {}", e)))
    }

    /// Validate the artifact and turn it into a ready predictor.
    pub fn into_predictor(self) -> PriceResult<Box<dyn Predictor>> {
        match self {
            ModelArtifact::Linear(artifact) => Ok(Box::new(LinearModel::try_from(artifact)?)),
            ModelArtifact::TreeEnsemble(artifact) => Ok(Box::new(TreeEnsemble::try_from(artifact)?)),
        }
    }
}

/// Read and validate a model artifact from disk.
pub fn load_model(path: &Path) -> PriceResult<Box<dyn Predictor>> {
    let content = fs::read_to_string(path).map_err(|e| {
        PriceError::ModelError(format!("failed to read {}: {}", path.display(), e))
    })?;
    let artifact = ModelArtifact::from_json(&content)?;
    let kind = match &artifact {
        ModelArtifact::Linear(_) => "linear",
        ModelArtifact::TreeEnsemble(_) => "tree_ensemble",
    };

    let predictor = artifact.into_predictor()?;
    info!(
        path = %path.display(),
        kind,
        n_features = predictor.n_features(),
        "Loaded model artifact"
    );
    Ok(predictor)
}

fn check_width(expected: usize, features: &ArrayView2<'_, f64>) -> PriceResult<()> {
    if features.ncols() != expected {
        return Err(PriceError::ModelError(format!(
            "expected {} features, got {}",
            expected,
            features.ncols()
        )));
    }
    Ok(())
}

/// Linear regression: `row . coefficients + intercept`.
#[derive(Debug, Clone)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl TryFrom<LinearArtifact> for LinearModel {
    type Error = PriceError;

    fn try_from(artifact: LinearArtifact) -> PriceResult<Self> {
        if artifact.coefficients.is_empty() {
            return Err(PriceError::ModelError("linear model has no coefficients".to_string()));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PriceError::ModelError(
                "linear model contains non-finite weights".to_string(),
            ));
        }

        Ok(Self {
            intercept: artifact.intercept,
            coefficients: Array1::from(artifact.coefficients),
        })
    }
}

impl Predictor for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> PriceResult<Array1<f64>> {
        check_width(self.n_features(), &features)?;
        Ok(features.dot(&self.coefficients) + self.intercept)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone)]
struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn from_artifact(artifact: TreeArtifact, n_features: usize, tree_id: usize) -> PriceResult<Self> {
        let invalid = |reason: String| PriceError::ModelError(format!("tree {}: {}", tree_id, reason));

        let len = artifact.children_left.len();
        if len == 0 {
            return Err(invalid("tree has no nodes".to_string()));
        }
        if [
            artifact.children_right.len(),
            artifact.feature.len(),
            artifact.threshold.len(),
            artifact.value.len(),
        ]
        .iter()
        .any(|l| *l != len)
        {
            return Err(invalid("node arrays differ in length".to_string()));
        }

        let mut nodes = Vec::with_capacity(len);
        for i in 0..len {
            let (left, right) = (artifact.children_left[i], artifact.children_right[i]);

            if left == LEAF {
                if right != LEAF {
                    return Err(invalid(format!("node {} has only one child", i)));
                }
                if !artifact.value[i].is_finite() {
                    return Err(invalid(format!("leaf {} has a non-finite value", i)));
                }
                nodes.push(TreeNode::Leaf(artifact.value[i]));
                continue;
            }

            // Children always follow their parent, which also rules out cycles.
            let child = |c: i64| -> PriceResult<usize> {
                if c > i as i64 && c < len as i64 {
                    Ok(c as usize)
                } else {
                    Err(invalid(format!("node {} has invalid child {}", i, c)))
                }
            };
            let feature = artifact.feature[i];
            if feature < 0 || feature >= n_features as i64 {
                return Err(invalid(format!("node {} splits on unknown feature {}", i, feature)));
            }
            if artifact.threshold[i].is_nan() {
                return Err(invalid(format!("node {} has a NaN threshold", i)));
            }

            nodes.push(TreeNode::Split {
                feature: feature as usize,
                threshold: artifact.threshold[i],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn score(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf(value) => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Ensemble of regression trees.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    n_features: usize,
    aggregation: Aggregation,
    base_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl TryFrom<TreeEnsembleArtifact> for TreeEnsemble {
    type Error = PriceError;

    fn try_from(artifact: TreeEnsembleArtifact) -> PriceResult<Self> {
        if artifact.n_features == 0 {
            return Err(PriceError::ModelError("ensemble declares zero features".to_string()));
        }
        if artifact.trees.is_empty() {
            return Err(PriceError::ModelError("ensemble has no trees".to_string()));
        }
        if !artifact.base_score.is_finite() || !artifact.learning_rate.is_finite() {
            return Err(PriceError::ModelError(
                "ensemble has non-finite base score or learning rate".to_string(),
            ));
        }

        let n_features = artifact.n_features;
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(id, tree)| RegressionTree::from_artifact(tree, n_features, id))
            .collect::<PriceResult<Vec<_>>>()?;

        Ok(Self {
            n_features,
            aggregation: artifact.aggregation,
            base_score: artifact.base_score,
            learning_rate: artifact.learning_rate,
            trees,
        })
    }
}

impl TreeEnsemble {
    fn score_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.score(row)).sum();
        match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + self.learning_rate * total,
        }
    }
}

impl Predictor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> PriceResult<Array1<f64>> {
        check_width(self.n_features, &features)?;
        Ok(features.rows().into_iter().map(|row| self.score_row(row)).collect())
    }
}
