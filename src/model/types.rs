use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Input columns understood by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    #[serde(rename = "BMI")]
    Bmi,
    DiabetesPedigreeFunction,
    Age,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Pregnancies,
        Feature::Glucose,
        Feature::BloodPressure,
        Feature::SkinThickness,
        Feature::Insulin,
        Feature::Bmi,
        Feature::DiabetesPedigreeFunction,
        Feature::Age,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Pregnancies => "Pregnancies",
            Feature::Glucose => "Glucose",
            Feature::BloodPressure => "BloodPressure",
            Feature::SkinThickness => "SkinThickness",
            Feature::Insulin => "Insulin",
            Feature::Bmi => "BMI",
            Feature::DiabetesPedigreeFunction => "DiabetesPedigreeFunction",
            Feature::Age => "Age",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One patient row. Values are passed to the model without range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureRecord {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    pub diabetes_pedigree_function: f64,
    pub age: f64,
}

impl FeatureRecord {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Pregnancies => self.pregnancies,
            Feature::Glucose => self.glucose,
            Feature::BloodPressure => self.blood_pressure,
            Feature::SkinThickness => self.skin_thickness,
            Feature::Insulin => self.insulin,
            Feature::Bmi => self.bmi,
            Feature::DiabetesPedigreeFunction => self.diabetes_pedigree_function,
            Feature::Age => self.age,
        }
    }

    /// The sample patient used in the API documentation.
    pub fn example() -> Self {
        Self {
            pregnancies: 6.0,
            glucose: 148.0,
            blood_pressure: 72.0,
            skin_thickness: 35.0,
            insulin: 0.0,
            bmi: 33.6,
            diabetes_pedigree_function: 0.627,
            age: 50.0,
        }
    }
}

impl TryFrom<&Map<String, Value>> for FeatureRecord {
    type Error = PredictionError;

    /// Extracts every required feature. Keys outside the fixed schema are
    /// rejected, as the fitted pipeline has no column for them.
    fn try_from(object: &Map<String, Value>) -> Result<Self, Self::Error> {
        if let Some(unknown) = object
            .keys()
            .find(|key| !Feature::ALL.iter().any(|feature| feature.name() == key.as_str()))
        {
            return Err(PredictionError::UnknownField(unknown.clone()));
        }

        let value = |feature: Feature| numeric_field(object, feature);

        Ok(Self {
            pregnancies: value(Feature::Pregnancies)?,
            glucose: value(Feature::Glucose)?,
            blood_pressure: value(Feature::BloodPressure)?,
            skin_thickness: value(Feature::SkinThickness)?,
            insulin: value(Feature::Insulin)?,
            bmi: value(Feature::Bmi)?,
            diabetes_pedigree_function: value(Feature::DiabetesPedigreeFunction)?,
            age: value(Feature::Age)?,
        })
    }
}

fn numeric_field(object: &Map<String, Value>, feature: Feature) -> Result<f64, PredictionError> {
    let name = feature.name();
    match object.get(name) {
        None => Err(PredictionError::MissingField(name.to_string())),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| PredictionError::wrong_type(name, format!("number {}", n))),
        // Numeric strings and booleans are coerced the same way a dataframe column would be
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| PredictionError::wrong_type(name, format!("string {:?}", s))),
        Some(Value::Null) => Err(PredictionError::wrong_type(name, "null")),
        Some(Value::Array(_)) => Err(PredictionError::wrong_type(name, "an array")),
        Some(Value::Object(_)) => Err(PredictionError::wrong_type(name, "an object")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NonDiabetic,
    Diabetic,
}

impl Outcome {
    pub fn class(self) -> u8 {
        match self {
            Outcome::NonDiabetic => 0,
            Outcome::Diabetic => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::NonDiabetic => "Non-Diabetic",
            Outcome::Diabetic => "Diabetic",
        }
    }
}

/// Classifier output for a single record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub outcome: Outcome,
    /// Indexed by class: `[P(non-diabetic), P(diabetic)]`.
    pub probabilities: [f64; 2],
}

impl Prediction {
    /// Picks the most probable class; a tie goes to class 0.
    pub fn from_probabilities(probabilities: [f64; 2]) -> Self {
        let outcome = if probabilities[1] > probabilities[0] {
            Outcome::Diabetic
        } else {
            Outcome::NonDiabetic
        };
        Self {
            outcome,
            probabilities,
        }
    }

    pub fn predicted_class(&self) -> u8 {
        self.outcome.class()
    }

    pub fn label(&self) -> &'static str {
        self.outcome.label()
    }
}
