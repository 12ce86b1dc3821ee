use diabetes_api::{
    PredictionError,
    model::{Classifier, FeatureRecord},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Mock classifier returning canned probabilities or a canned failure
#[derive(Debug, Clone)]
pub struct MockClassifier {
    pub probabilities: [f64; 2],
    pub error: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl MockClassifier {
    pub fn new(probabilities: [f64; 2]) -> Self {
        Self {
            probabilities,
            error: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    fn predict_proba(&self, _record: &FeatureRecord) -> Result<[f64; 2], PredictionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(error) => Err(PredictionError::model(error.clone())),
            None => Ok(self.probabilities),
        }
    }
}
