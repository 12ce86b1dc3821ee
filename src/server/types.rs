use crate::model::Prediction;
use serde::Serialize;
use serde_json::{Value, json};
use std::{collections::BTreeMap, fmt};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub prediction_label: String,
    pub confidence_scores: ConfidenceScores,
}

#[derive(Debug, Serialize)]
pub struct ConfidenceScores {
    #[serde(rename = "Non-Diabetic")]
    pub non_diabetic: f64,
    #[serde(rename = "Diabetic")]
    pub diabetic: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub message: String,
    pub description: String,
    pub endpoints: BTreeMap<String, EndpointDoc>,
}

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub method: String,
    pub description: String,
    pub example_payload: Value,
}

impl From<&Prediction> for PredictResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            prediction: prediction.predicted_class(),
            prediction_label: prediction.label().to_string(),
            confidence_scores: ConfidenceScores {
                non_diabetic: prediction.probabilities[0],
                diabetic: prediction.probabilities[1],
            },
        }
    }
}

/// Renders the exact JSON body sent to the client.
impl fmt::Display for PredictResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Integer-valued columns stay integers in the documented request.
fn example_payload() -> Value {
    json!({
        "Pregnancies": 6,
        "Glucose": 148,
        "BloodPressure": 72,
        "SkinThickness": 35,
        "Insulin": 0,
        "BMI": 33.6,
        "DiabetesPedigreeFunction": 0.627,
        "Age": 50
    })
}

impl InfoResponse {
    pub fn new() -> Self {
        let predict = EndpointDoc {
            method: "POST".to_string(),
            description: "Send patient data in JSON format to get a prediction.".to_string(),
            example_payload: example_payload(),
        };

        Self {
            message: "Welcome to the Diabetes Prediction API!".to_string(),
            description:
                "This is a machine learning service to predict the likelihood of diabetes."
                    .to_string(),
            endpoints: BTreeMap::from([("/predict".to_string(), predict)]),
        }
    }
}

impl Default for InfoResponse {
    fn default() -> Self {
        Self::new()
    }
}
