use super::{
    pipeline::Pipeline,
    types::{FeatureRecord, Prediction},
};
use crate::{Error, Result, error::PredictionError};
use std::{path::Path, sync::Arc};
use tracing::{debug, info};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Anything that can score a single patient record.
pub trait Classifier: Send + Sync {
    /// Returns `[P(class 0), P(class 1)]`.
    fn predict_proba(
        &self,
        record: &FeatureRecord,
    ) -> std::result::Result<[f64; 2], PredictionError>;
}

impl Classifier for Pipeline {
    fn predict_proba(
        &self,
        record: &FeatureRecord,
    ) -> std::result::Result<[f64; 2], PredictionError> {
        Pipeline::predict_proba(self, record)
    }
}

/// Read-only handle to the classifier loaded at startup. Cloning shares the
/// same underlying model.
#[derive(Clone)]
pub struct ModelService {
    classifier: Arc<dyn Classifier>,
}

impl ModelService {
    pub fn new(classifier: impl Classifier + 'static) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading model pipeline from: {}", path.display());

        let artifact = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::model(format!("cannot read '{}': {}", path.display(), e)))?;
        let pipeline = Pipeline::from_json(&artifact)?;

        info!(
            "Model pipeline from '{}' loaded successfully ({} over {} columns)",
            path.display(),
            pipeline.estimator_kind(),
            pipeline.feature_names().len()
        );

        Ok(Self::new(pipeline))
    }

    pub fn predict(&self, record: &FeatureRecord) -> std::result::Result<Prediction, PredictionError> {
        let probabilities = self.classifier.predict_proba(record)?;

        if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(PredictionError::model(format!(
                "invalid class probabilities {:?}",
                probabilities
            )));
        }
        let total = probabilities[0] + probabilities[1];
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(PredictionError::model(format!(
                "class probabilities sum to {}",
                total
            )));
        }

        Ok(Prediction::from_probabilities(probabilities))
    }
}
