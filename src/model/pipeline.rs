//! JSON export of a fitted scikit-learn pipeline: an optional
//! `StandardScaler` followed by a binary classifier.

use super::types::{Feature, FeatureRecord};
use crate::{Error, Result, error::PredictionError};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    feature_names: Vec<Feature>,
    #[serde(default)]
    scaler: Option<StandardScaler>,
    estimator: Estimator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression { coef: Vec<f64>, intercept: f64 },
    RandomForest { trees: Vec<DecisionTree> },
}

/// Flattened tree layout as exported from `sklearn.tree._tree.Tree`.
/// A node with `children_left == -1` is a leaf.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    /// Per-class sample counts for each node.
    value: Vec<[f64; 2]>,
}

const LEAF: i64 = -1;

impl Pipeline {
    pub fn from_json(json: &str) -> Result<Self> {
        let pipeline: Pipeline = serde_json::from_str(json)
            .map_err(|e| Error::model(format!("invalid pipeline artifact: {}", e)))?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    pub fn feature_names(&self) -> &[Feature] {
        &self.feature_names
    }

    pub fn estimator_kind(&self) -> &'static str {
        match self.estimator {
            Estimator::LogisticRegression { .. } => "logistic_regression",
            Estimator::RandomForest { .. } => "random_forest",
        }
    }

    /// Builds the input row in the column order the estimator was fitted on.
    pub fn feature_vector(&self, record: &FeatureRecord) -> Vec<f64> {
        let row: Vec<f64> = self
            .feature_names
            .iter()
            .map(|feature| record.get(*feature))
            .collect();

        match &self.scaler {
            Some(scaler) => scaler.transform(&row),
            None => row,
        }
    }

    pub fn predict_proba(
        &self,
        record: &FeatureRecord,
    ) -> std::result::Result<[f64; 2], PredictionError> {
        let row = self.feature_vector(record);
        let probabilities = self.estimator.predict_proba(&row)?;

        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(PredictionError::model(format!(
                "estimator produced non-finite probabilities {:?}",
                probabilities
            )));
        }
        Ok(probabilities)
    }

    fn validate(&self) -> Result<()> {
        let n_features = self.feature_names.len();
        if n_features == 0 {
            return Err(Error::model("pipeline declares no feature columns"));
        }

        let mut seen = HashSet::new();
        for feature in &self.feature_names {
            if !seen.insert(feature) {
                return Err(Error::model(format!("duplicate feature column '{}'", feature)));
            }
        }

        if let Some(scaler) = &self.scaler {
            scaler.validate(n_features)?;
        }
        self.estimator.validate(n_features)
    }
}

impl StandardScaler {
    fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                // zero-variance columns keep unit scale
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect()
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(Error::model(format!(
                "scaler expects {} mean / {} scale values, pipeline has {} columns",
                self.mean.len(),
                self.scale.len(),
                n_features
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(Error::model("scaler parameters must be finite"));
        }
        Ok(())
    }
}

impl Estimator {
    fn predict_proba(&self, row: &[f64]) -> std::result::Result<[f64; 2], PredictionError> {
        match self {
            Estimator::LogisticRegression { coef, intercept } => {
                let z: f64 = coef.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + intercept;
                if !z.is_finite() {
                    return Err(PredictionError::model(format!(
                        "non-finite decision score {}",
                        z
                    )));
                }
                let positive = sigmoid(z);
                Ok([1.0 - positive, positive])
            }
            Estimator::RandomForest { trees } => {
                let mut totals = [0.0; 2];
                for tree in trees {
                    let leaf = tree.predict_proba(row);
                    totals[0] += leaf[0];
                    totals[1] += leaf[1];
                }
                let n_trees = trees.len() as f64;
                Ok([totals[0] / n_trees, totals[1] / n_trees])
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        match self {
            Estimator::LogisticRegression { coef, intercept } => {
                if coef.len() != n_features {
                    return Err(Error::model(format!(
                        "logistic regression has {} coefficients, pipeline has {} columns",
                        coef.len(),
                        n_features
                    )));
                }
                if coef.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
                    return Err(Error::model("logistic regression parameters must be finite"));
                }
                Ok(())
            }
            Estimator::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(Error::model("random forest has no trees"));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|e| Error::model(format!("tree {}: {}", i, e)))?;
                }
                Ok(())
            }
        }
    }
}

impl DecisionTree {
    fn apply(&self, row: &[f64]) -> usize {
        let mut node = 0;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return node;
            }
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }

    fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        let [negative, positive] = self.value[self.apply(row)];
        let total = negative + positive;
        [negative / total, positive / total]
    }

    /// Children must point forward so traversal always terminates.
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        let n_nodes = self.children_left.len();
        if n_nodes == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n_nodes)
        {
            return Err("node arrays differ in length".to_string());
        }

        for node in 0..n_nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has exactly one child", node));
                }
                let [negative, positive] = self.value[node];
                if !(negative >= 0.0 && positive >= 0.0 && negative + positive > 0.0)
                    || !(negative + positive).is_finite()
                {
                    return Err(format!("leaf {} has invalid class counts", node));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n_nodes as i64 {
                    return Err(format!("node {} points to invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!("node {} splits on unknown column {}", node, feature));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("node {} has a non-finite threshold", node));
            }
        }
        Ok(())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
