mod pipeline;
mod service;
mod types;

pub use pipeline::{DecisionTree, Estimator, Pipeline, StandardScaler};
pub use service::{Classifier, ModelService};
pub use types::*;
