use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::serde_ext;

/// Nutrition facts as read off a label or estimated from a photo.
///
/// Unknown keys are kept in `extra` so newer backends do not lose data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub total_fat: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub trans_fat: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub total_carbohydrates: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub dietary_fiber: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    #[serde(default)]
    pub sugar_score: f64,
    #[serde(default)]
    pub fat_score: f64,
    #[serde(default)]
    pub sodium_score: f64,
    #[serde(default)]
    pub calorie_score: f64,
}

/// Category label chosen by the backend. Kept separate from the local
/// color tier, which is always derived from the numeric score.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScoreCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub overall_score: f64,
    #[serde(default)]
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub category: ScoreCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiAdvice {
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub healthy_alternatives: Vec<String>,
    #[serde(default)]
    pub detailed_advice: String,
}

/// A validated scan outcome, ready for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub nutrition_data: NutritionData,
    pub health_score: HealthScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_advice: Option<AiAdvice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_context: Option<Value>,
}

/// Wire shape of `/scan/*` and `/history/{id}` payloads before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawScanResponse {
    #[serde(default)]
    pub nutrition_data: Option<NutritionData>,
    #[serde(default)]
    pub health_score: Option<Value>,
    #[serde(default)]
    pub ai_advice: Option<AiAdvice>,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default, alias = "confidenceLevel")]
    pub confidence: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub food_context: Option<Value>,
}
