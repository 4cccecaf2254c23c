use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::constants::{CYCLONE_STATUS_DESCRIPTIONS, UNKNOWN_STATUS_DESCRIPTION};
use crate::error::{CycloneError, CycloneResult};
use crate::scheduler::ObservedCache;
use crate::types::{ObservedPrediction, Prediction};

/// Trained cyclone classifier. Feature order is fixed by the model.
pub trait Classifier: Send + Sync {
    fn feature_names(&self) -> &[String];
    fn predict(&self, features: &[f64]) -> Result<i64>;
}

pub fn describe_category(category: i64) -> &'static str {
    usize::try_from(category)
        .ok()
        .and_then(|idx| CYCLONE_STATUS_DESCRIPTIONS.get(idx).copied())
        .unwrap_or(UNKNOWN_STATUS_DESCRIPTION)
}

#[derive(Clone)]
pub struct PredictionGateway {
    classifier: Arc<dyn Classifier>,
}

impl PredictionGateway {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn predict(&self, features: &BTreeMap<String, f64>) -> CycloneResult<Prediction> {
        let expected = self.classifier.feature_names();
        let missing: Vec<String> = expected
            .iter()
            .filter(|name| !features.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(CycloneError::MissingFeatures(missing));
        }

        let ordered: Vec<f64> = expected.iter().map(|name| features[name.as_str()]).collect();
        let category = self.classifier.predict(&ordered).map_err(|error| {
            warn!("Classifier failed: {error:#}");
            CycloneError::Unavailable(format!("Prediction failed: {error:#}"))
        })?;

        Ok(Prediction {
            category,
            description: describe_category(category).to_string(),
        })
    }

    pub async fn predict_from_latest_observed(
        &self,
        observed: &ObservedCache,
    ) -> CycloneResult<ObservedPrediction> {
        let snapshot = observed
            .latest()
            .await
            .ok_or_else(|| CycloneError::Unavailable("No weather data available.".to_string()))?;
        let prediction = self.predict(&snapshot.weather.features())?;
        Ok(ObservedPrediction {
            observed_at: snapshot.observed_at,
            weather: snapshot.weather,
            prediction,
        })
    }
}
