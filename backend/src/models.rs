use loan_inferences::FeatureFrame;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Column names in the order the models were fitted on.
pub const FEATURE_NAMES: [&str; 5] = [
    "Age",
    "Annual_Income",
    "Credit_Score",
    "Employment_Years",
    "Loan_Amount_Requested",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanApplication {
    pub age: i64,
    pub annual_income: i64,
    pub credit_score: i64,
    pub employment_years: i64,
    pub loan_amount_requested: i64,
}

impl LoanApplication {
    pub fn to_array(&self) -> [i64; 5] {
        [
            self.age,
            self.annual_income,
            self.credit_score,
            self.employment_years,
            self.loan_amount_requested,
        ]
    }

    /// Single-row frame with the columns in [`FEATURE_NAMES`] order.
    pub fn to_frame(&self) -> FeatureFrame {
        FeatureFrame::single_row(
            FEATURE_NAMES
                .iter()
                .zip(self.to_array())
                .map(|(name, value)| (*name, value as f64)),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ModelPrediction {
    #[serde(rename = "Loan_Default")]
    pub loan_default: i64,
    #[serde(rename = "Probability_of_Default")]
    pub probability_of_default: f64,
}

/// Per-model results keyed by model name, serialized in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predictions(Vec<(String, ModelPrediction)>);

impl Predictions {
    pub fn with_capacity(capacity: usize) -> Self {
        Predictions(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, model: impl Into<String>, prediction: ModelPrediction) {
        self.0.push((model.into(), prediction));
    }

    pub fn get(&self, model: &str) -> Option<&ModelPrediction> {
        self.0
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, prediction)| prediction)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelPrediction)> {
        self.0.iter().map(|(name, prediction)| (name.as_str(), prediction))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Predictions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, prediction) in &self.0 {
            map.serialize_entry(name, prediction)?;
        }
        map.end()
    }
}

/// Body of every 500 response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorDetail {
    pub detail: String,
}

/// One rejected request field, in the shape form validators report them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: String,
    pub loc: Vec<String>,
    pub msg: String,
    pub input: serde_json::Value,
}

impl FieldError {
    pub fn field(
        field: &str,
        kind: &str,
        msg: &str,
        input: serde_json::Value,
    ) -> Self {
        FieldError {
            kind: kind.to_string(),
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.to_string(),
            input,
        }
    }

    pub fn body(kind: &str, msg: &str) -> Self {
        FieldError {
            kind: kind.to_string(),
            loc: vec!["body".to_string()],
            msg: msg.to_string(),
            input: serde_json::Value::Null,
        }
    }
}

/// Body of every 422 response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ValidationDetail {
    pub detail: Vec<FieldError>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub models: Vec<String>,
}
