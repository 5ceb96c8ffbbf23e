use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::results::dto::{HealthScore, RawScanResponse, ScanResult};

/// Presentation tier derived from a 0..=100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreTier {
    VeryPoor,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreTier::Excellent
        } else if score >= 60.0 {
            ScoreTier::Good
        } else if score >= 40.0 {
            ScoreTier::Fair
        } else if score >= 20.0 {
            ScoreTier::Poor
        } else {
            ScoreTier::VeryPoor
        }
    }

    pub fn color_hex(self) -> &'static str {
        match self {
            ScoreTier::Excellent => "#4CAF50",
            ScoreTier::Good => "#8BC34A",
            ScoreTier::Fair => "#FFC107",
            ScoreTier::Poor => "#FF9800",
            ScoreTier::VeryPoor => "#F44336",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent",
            ScoreTier::Good => "Good",
            ScoreTier::Fair => "Fair",
            ScoreTier::Poor => "Poor",
            ScoreTier::VeryPoor => "Very Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownBar {
    pub label: &'static str,
    pub score: f64,
    pub tier: ScoreTier,
}

impl ScanResult {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.health_score.overall_score)
    }

    /// Sub-scores in display order, each tiered on the same scale as the
    /// overall score.
    pub fn breakdown_view(&self) -> Vec<BreakdownBar> {
        let b = &self.health_score.breakdown;
        [
            ("Sugar", b.sugar_score),
            ("Fat", b.fat_score),
            ("Sodium", b.sodium_score),
            ("Calories", b.calorie_score),
        ]
        .into_iter()
        .map(|(label, score)| BreakdownBar {
            label,
            score,
            tier: ScoreTier::from_score(score),
        })
        .collect()
    }
}

/// Parse and validate a raw backend body.
pub fn project(body: &str) -> ClientResult<ScanResult> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
    project_value(value)
}

pub fn project_value(value: Value) -> ClientResult<ScanResult> {
    let raw: RawScanResponse =
        serde_json::from_value(value).map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

    let nutrition_data = raw
        .nutrition_data
        .ok_or_else(|| ClientError::MalformedResponse("missing nutritionData".into()))?;
    let health_score = raw
        .health_score
        .ok_or_else(|| ClientError::MalformedResponse("missing healthScore".into()))?;
    let health_score: HealthScore = serde_json::from_value(health_score)
        .map_err(|e| ClientError::MalformedResponse(format!("healthScore: {}", e)))?;

    let score = health_score.overall_score;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(ClientError::MalformedResponse(format!(
            "overallScore {} outside 0..=100",
            score
        )));
    }

    Ok(ScanResult {
        nutrition_data,
        health_score,
        ai_advice: raw.ai_advice,
        scan_type: raw.scan_type,
        food_name: raw.food_name,
        confidence: raw.confidence,
        disclaimer: raw.disclaimer,
        food_context: raw.food_context,
    })
}

#[cfg(test)]
pub(crate) mod projector_tests {
    use serde_json::json;

    use super::*;
    use crate::results::dto::ScoreCategory;

    pub(crate) fn sample() -> Value {
        json!({
            "nutritionData": { "calories": 250, "sugars": "12.5", "servingSize": "1 cup", "potassium": 300 },
            "healthScore": {
                "overallScore": 72,
                "breakdown": { "sugarScore": 60, "fatScore": 80, "sodiumScore": 70, "calorieScore": 75 },
                "warnings": [],
                "recommendations": ["Pair with fibre"],
                "category": "Good"
            }
        })
    }

    #[test]
    fn projects_minimal_response() {
        let result = project_value(sample()).unwrap();
        assert_eq!(result.health_score.overall_score, 72.0);
        assert_eq!(result.health_score.category, ScoreCategory::Good);
        assert_eq!(result.nutrition_data.sugars, Some(12.5));
        assert_eq!(result.nutrition_data.serving_size.as_deref(), Some("1 cup"));
        assert_eq!(result.nutrition_data.extra.get("potassium"), Some(&json!(300)));
        assert!(result.ai_advice.is_none());
        assert_eq!(result.tier(), ScoreTier::Good);
    }

    #[test]
    fn optional_fields_pass_through() {
        let mut v = sample();
        v["aiAdvice"] = json!({ "explanation": "ok", "healthyAlternatives": ["apple"] });
        v["scanType"] = json!("enhanced");
        v["foodName"] = json!("Granola");
        v["confidence"] = json!("high");
        v["disclaimer"] = json!("Estimates only");
        v["foodContext"] = json!({ "cuisine": "breakfast" });

        let result = project_value(v).unwrap();
        let advice = result.ai_advice.unwrap();
        assert_eq!(advice.healthy_alternatives, vec!["apple".to_string()]);
        assert_eq!(advice.detailed_advice, "");
        assert_eq!(result.scan_type.as_deref(), Some("enhanced"));
        assert_eq!(result.food_name.as_deref(), Some("Granola"));
        assert_eq!(result.confidence.as_deref(), Some("high"));
        assert_eq!(result.disclaimer.as_deref(), Some("Estimates only"));
        assert_eq!(result.food_context, Some(json!({ "cuisine": "breakfast" })));
    }

    #[test]
    fn missing_health_score_is_malformed() {
        let mut v = sample();
        v.as_object_mut().unwrap().remove("healthScore");
        let err = project_value(v).unwrap_err();
        assert_eq!(err, ClientError::MalformedResponse("missing healthScore".into()));
    }

    #[test]
    fn missing_nutrition_data_is_malformed() {
        let mut v = sample();
        v.as_object_mut().unwrap().remove("nutritionData");
        assert!(matches!(project_value(v), Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn out_of_range_score_is_malformed() {
        for bad in [json!(-1), json!(100.5), json!("high")] {
            let mut v = sample();
            v["healthScore"]["overallScore"] = bad;
            assert!(matches!(project_value(v), Err(ClientError::MalformedResponse(_))));
        }
        let mut v = sample();
        v["healthScore"]["overallScore"] = json!(100);
        assert!(project_value(v).is_ok());
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(project("<html>"), Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn unknown_category_does_not_fail() {
        let mut v = sample();
        v["healthScore"]["category"] = json!("Superb");
        let result = project_value(v).unwrap();
        assert_eq!(result.health_score.category, ScoreCategory::Unknown);
        v = sample();
        v["healthScore"]["category"] = json!("Very Poor");
        assert_eq!(project_value(v).unwrap().health_score.category, ScoreCategory::VeryPoor);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(ScoreTier::from_score(80.0), ScoreTier::Excellent);
        assert_eq!(ScoreTier::from_score(79.9), ScoreTier::Good);
        assert_eq!(ScoreTier::from_score(60.0), ScoreTier::Good);
        assert_eq!(ScoreTier::from_score(40.0), ScoreTier::Fair);
        assert_eq!(ScoreTier::from_score(39.9), ScoreTier::Poor);
        assert_eq!(ScoreTier::from_score(20.0), ScoreTier::Poor);
        assert_eq!(ScoreTier::from_score(19.9), ScoreTier::VeryPoor);
        assert_eq!(ScoreTier::from_score(0.0).color_hex(), "#F44336");
        assert_eq!(ScoreTier::from_score(95.0).label(), "Excellent");
    }

    #[test]
    fn breakdown_bars_use_score_tiers() {
        let result = project_value(sample()).unwrap();
        let bars = result.breakdown_view();
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].label, "Sugar");
        assert_eq!(bars[0].tier, ScoreTier::Good);
        assert_eq!(bars[1].tier, ScoreTier::Excellent);
        assert_eq!(bars[3].label, "Calories");
    }
}
