//! Derived metrics and clinical risk tiers.
//!
//! Everything in here is pure: no I/O, no clocks, no locale. Identical
//! inputs give bit-identical outputs.

use serde::{Deserialize, Serialize};

use crate::profile::dto::{BiometricProfile, Metric};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub bmi: Option<f64>,
    pub bmi_category: BmiCategory,
    pub is_healthy: bool,
}

/// BMI rounded to one decimal place; `None` when either input is missing or
/// not strictly positive.
pub fn compute_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let (w, h) = (weight_kg?, height_cm?);
    if !(w > 0.0 && h > 0.0) || !w.is_finite() || !h.is_finite() {
        return None;
    }
    let meters = h / 100.0;
    let bmi = w / (meters * meters);
    Some((bmi * 10.0).round() / 10.0)
}

pub fn categorize_bmi(bmi: Option<f64>) -> BmiCategory {
    match bmi {
        None => BmiCategory::Unknown,
        Some(b) if b.is_nan() => BmiCategory::Unknown,
        Some(b) if b < 18.5 => BmiCategory::Underweight,
        Some(b) if b < 25.0 => BmiCategory::Normal,
        Some(b) if b < 30.0 => BmiCategory::Overweight,
        Some(_) => BmiCategory::Obese,
    }
}

/// Only known risk factors count: a set condition flag, or a BMI that is
/// known and outside the normal bracket. Missing data never marks unhealthy.
pub fn is_healthy(profile: &BiometricProfile, derived: &DerivedMetrics) -> bool {
    if profile.has_condition() {
        return false;
    }
    matches!(
        derived.bmi_category,
        BmiCategory::Normal | BmiCategory::Unknown
    )
}

pub fn derive(profile: &BiometricProfile) -> DerivedMetrics {
    let bmi = compute_bmi(profile.weight_kg, profile.height_cm);
    let mut derived = DerivedMetrics {
        bmi,
        bmi_category: categorize_bmi(bmi),
        is_healthy: false,
    };
    derived.is_healthy = is_healthy(profile, &derived);
    derived
}

/// Named clinical bucket for a single measurement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTier {
    Low,
    Optimal,
    Normal,
    NearOptimal,
    Protective,
    Borderline,
    Elevated,
    PreDiabetic,
    Diabetic,
    High,
    VeryHigh,
    Stage1Hypertension,
    Stage2Hypertension,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Optimal => "Optimal",
            RiskTier::Normal => "Normal",
            RiskTier::NearOptimal => "Near optimal",
            RiskTier::Protective => "Protective",
            RiskTier::Borderline => "Borderline",
            RiskTier::Elevated => "Elevated",
            RiskTier::PreDiabetic => "Pre-diabetic",
            RiskTier::Diabetic => "Diabetic",
            RiskTier::High => "High",
            RiskTier::VeryHigh => "Very high",
            RiskTier::Stage1Hypertension => "Hypertension stage 1",
            RiskTier::Stage2Hypertension => "Hypertension stage 2",
        }
    }

    /// 0 = no concern, 1 = watch, 2 = risk, 3 = severe.
    pub fn severity(self) -> u8 {
        match self {
            RiskTier::Optimal | RiskTier::Normal | RiskTier::Protective => 0,
            RiskTier::NearOptimal | RiskTier::Borderline | RiskTier::Elevated => 1,
            RiskTier::PreDiabetic => 1,
            RiskTier::Low | RiskTier::High | RiskTier::Diabetic => 2,
            RiskTier::Stage1Hypertension => 2,
            RiskTier::VeryHigh | RiskTier::Stage2Hypertension => 3,
        }
    }
}

// Lower bound inclusive, ascending. The first band starts at zero.
const GLUCOSE: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Normal),
    (100.0, RiskTier::PreDiabetic),
    (126.0, RiskTier::Diabetic),
];
const HBA1C: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Normal),
    (5.7, RiskTier::PreDiabetic),
    (6.5, RiskTier::Diabetic),
];
const LDL: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Optimal),
    (100.0, RiskTier::NearOptimal),
    (130.0, RiskTier::Borderline),
    (160.0, RiskTier::High),
    (190.0, RiskTier::VeryHigh),
];
const HDL: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Low),
    (40.0, RiskTier::Normal),
    (60.0, RiskTier::Protective),
];
const TRIGLYCERIDES: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Normal),
    (150.0, RiskTier::Borderline),
    (200.0, RiskTier::High),
    (500.0, RiskTier::VeryHigh),
];
const SYSTOLIC: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Normal),
    (120.0, RiskTier::Elevated),
    (130.0, RiskTier::Stage1Hypertension),
    (140.0, RiskTier::Stage2Hypertension),
];
const DIASTOLIC: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Normal),
    (80.0, RiskTier::Stage1Hypertension),
    (90.0, RiskTier::Stage2Hypertension),
];
const ALT: &[(f64, RiskTier)] = &[(0.0, RiskTier::Normal), (56.0, RiskTier::Elevated)];
const AST: &[(f64, RiskTier)] = &[(0.0, RiskTier::Normal), (40.0, RiskTier::Elevated)];
const GGT: &[(f64, RiskTier)] = &[(0.0, RiskTier::Normal), (60.0, RiskTier::Elevated)];
const CREATININE: &[(f64, RiskTier)] = &[(0.0, RiskTier::Normal), (1.3, RiskTier::Elevated)];
const CRP: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Optimal),
    (1.0, RiskTier::Borderline),
    (3.0, RiskTier::High),
];
const URIC_ACID: &[(f64, RiskTier)] = &[(0.0, RiskTier::Normal), (7.0, RiskTier::High)];
const WAIST: &[(f64, RiskTier)] = &[
    (0.0, RiskTier::Normal),
    (94.0, RiskTier::Elevated),
    (102.0, RiskTier::High),
];

/// Breakpoint table for a metric; `None` for metrics with no clinical tiers
/// (weight, height, age).
pub fn breakpoints(metric: Metric) -> Option<&'static [(f64, RiskTier)]> {
    match metric {
        Metric::Glucose => Some(GLUCOSE),
        Metric::Hba1c => Some(HBA1C),
        Metric::Ldl => Some(LDL),
        Metric::Hdl => Some(HDL),
        Metric::Triglycerides => Some(TRIGLYCERIDES),
        Metric::Systolic => Some(SYSTOLIC),
        Metric::Diastolic => Some(DIASTOLIC),
        Metric::Alt => Some(ALT),
        Metric::Ast => Some(AST),
        Metric::Ggt => Some(GGT),
        Metric::Creatinine => Some(CREATININE),
        Metric::Crp => Some(CRP),
        Metric::UricAcid => Some(URIC_ACID),
        Metric::Waist => Some(WAIST),
        Metric::WeightKg | Metric::HeightCm | Metric::Age => None,
    }
}

pub fn classify(metric: Metric, value: f64) -> Option<RiskTier> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    breakpoints(metric)?
        .iter()
        .rev()
        .find(|(floor, _)| value >= *floor)
        .map(|(_, tier)| *tier)
}

/// `None` for negative or non-finite readings.
pub fn classify_glucose(value: f64) -> Option<RiskTier> {
    classify(Metric::Glucose, value)
}

pub fn classify_hba1c(value: f64) -> Option<RiskTier> {
    classify(Metric::Hba1c, value)
}

pub fn classify_ldl(value: f64) -> Option<RiskTier> {
    classify(Metric::Ldl, value)
}

/// Worse of the systolic and diastolic tiers. "Elevated" only arises from a
/// systolic reading with a normal diastolic.
pub fn classify_blood_pressure(systolic: Option<f64>, diastolic: Option<f64>) -> Option<RiskTier> {
    let s = systolic.and_then(|v| classify(Metric::Systolic, v));
    let d = diastolic.and_then(|v| classify(Metric::Diastolic, v));
    match (s, d) {
        (Some(a), Some(b)) => Some(if b.severity() > a.severity() { b } else { a }),
        (a, b) => a.or(b),
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MetricAssessment {
    pub metric: Metric,
    pub value: f64,
    pub tier: RiskTier,
}

/// Tiers for every present metric that has a breakpoint table.
pub fn assess(profile: &BiometricProfile) -> Vec<MetricAssessment> {
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let value = profile.get(metric)?;
            let tier = classify(metric, value)?;
            Some(MetricAssessment { metric, value, tier })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bmi_is_rounded_to_one_decimal() {
        assert_eq!(compute_bmi(Some(70.0), Some(175.0)), Some(22.9));
        assert_eq!(compute_bmi(Some(90.0), Some(180.0)), Some(27.8));
    }

    #[test]
    fn bmi_missing_or_non_positive_is_none() {
        assert_eq!(compute_bmi(None, Some(175.0)), None);
        assert_eq!(compute_bmi(Some(70.0), None), None);
        assert_eq!(compute_bmi(Some(0.0), Some(175.0)), None);
        assert_eq!(compute_bmi(Some(70.0), Some(-1.0)), None);
        assert_eq!(compute_bmi(Some(f64::NAN), Some(175.0)), None);
    }

    #[test]
    fn bmi_category_boundaries() {
        assert_eq!(categorize_bmi(Some(18.4)), BmiCategory::Underweight);
        assert_eq!(categorize_bmi(Some(18.5)), BmiCategory::Normal);
        assert_eq!(categorize_bmi(Some(24.9)), BmiCategory::Normal);
        assert_eq!(categorize_bmi(Some(25.0)), BmiCategory::Overweight);
        assert_eq!(categorize_bmi(Some(29.9)), BmiCategory::Overweight);
        assert_eq!(categorize_bmi(Some(30.0)), BmiCategory::Obese);
        assert_eq!(categorize_bmi(None), BmiCategory::Unknown);
    }

    #[test]
    fn glucose_tiers() {
        assert_eq!(classify_glucose(99.9), Some(RiskTier::Normal));
        assert_eq!(classify_glucose(100.0), Some(RiskTier::PreDiabetic));
        assert_eq!(classify_glucose(125.9), Some(RiskTier::PreDiabetic));
        assert_eq!(classify_glucose(126.0), Some(RiskTier::Diabetic));
    }

    #[test]
    fn ldl_and_hba1c_tiers() {
        assert_eq!(classify_ldl(99.0), Some(RiskTier::Optimal));
        assert_eq!(classify_ldl(130.0), Some(RiskTier::Borderline));
        assert_eq!(classify_ldl(190.0), Some(RiskTier::VeryHigh));
        assert_eq!(classify_hba1c(5.6), Some(RiskTier::Normal));
        assert_eq!(classify_hba1c(5.7), Some(RiskTier::PreDiabetic));
        assert_eq!(classify_hba1c(6.5), Some(RiskTier::Diabetic));
    }

    #[test]
    fn blood_pressure_takes_worse_reading() {
        assert_eq!(classify_blood_pressure(Some(118.0), Some(76.0)), Some(RiskTier::Normal));
        assert_eq!(classify_blood_pressure(Some(125.0), Some(76.0)), Some(RiskTier::Elevated));
        assert_eq!(
            classify_blood_pressure(Some(125.0), Some(85.0)),
            Some(RiskTier::Stage1Hypertension)
        );
        assert_eq!(
            classify_blood_pressure(Some(118.0), Some(92.0)),
            Some(RiskTier::Stage2Hypertension)
        );
        assert_eq!(classify_blood_pressure(None, Some(70.0)), Some(RiskTier::Normal));
        assert_eq!(classify_blood_pressure(None, None), None);
    }

    #[test]
    fn unclassified_metrics_and_bad_values_yield_none() {
        assert_eq!(classify(Metric::Age, 40.0), None);
        assert_eq!(classify(Metric::Glucose, -3.0), None);
        assert_eq!(classify(Metric::Glucose, f64::NAN), None);
        assert_eq!(classify_glucose(f64::NAN), None);
        assert_eq!(classify_ldl(f64::INFINITY), None);
        assert_eq!(classify_hba1c(-0.5), None);
    }

    #[test]
    fn assessments_serialize_with_wire_names() {
        let p = BiometricProfile {
            glucose: Some(130.0),
            uric_acid: Some(5.0),
            ..Default::default()
        };
        let v = serde_json::to_value(assess(&p)).unwrap();
        assert_eq!(
            v,
            serde_json::json!([
                { "metric": "glucose", "value": 130.0, "tier": "diabetic" },
                { "metric": "uric_acid", "value": 5.0, "tier": "normal" }
            ])
        );
        for metric in Metric::ALL {
            assert_eq!(serde_json::to_value(metric).unwrap(), metric.key());
        }
    }

    #[test]
    fn healthy_requires_no_flags_and_normal_or_unknown_bmi() {
        let normal = BiometricProfile {
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            ..Default::default()
        };
        assert!(derive(&normal).is_healthy);

        let obese = BiometricProfile {
            weight_kg: Some(120.0),
            ..normal.clone()
        };
        assert!(!derive(&obese).is_healthy);

        // Nothing known, nothing penalised.
        assert!(derive(&BiometricProfile::default()).is_healthy);
    }

    #[test]
    fn any_condition_flag_is_unhealthy() {
        // Normal, unknown, obese, underweight.
        let bodies = [
            (Some(70.0), Some(175.0)),
            (None, None),
            (Some(120.0), Some(175.0)),
            (Some(45.0), Some(175.0)),
        ];
        for (weight_kg, height_cm) in bodies {
            for flag in 0..3 {
                let mut p = BiometricProfile {
                    weight_kg,
                    height_cm,
                    ..Default::default()
                };
                match flag {
                    0 => p.diabetes = true,
                    1 => p.high_cholesterol = true,
                    _ => p.high_blood_pressure = true,
                }
                assert!(!derive(&p).is_healthy, "{:?} {:?} flag {}", weight_kg, height_cm, flag);
            }
        }
    }

    #[test]
    fn assess_lists_present_classified_metrics_in_order() {
        let p = BiometricProfile {
            weight_kg: Some(70.0),
            glucose: Some(110.0),
            hdl: Some(35.0),
            age: Some(50.0),
            ..Default::default()
        };
        let tiers: Vec<_> = assess(&p).into_iter().map(|a| (a.metric, a.tier)).collect();
        assert_eq!(
            tiers,
            vec![
                (Metric::Glucose, RiskTier::PreDiabetic),
                (Metric::Hdl, RiskTier::Low)
            ]
        );
    }

    #[test]
    fn derive_is_deterministic() {
        let p = BiometricProfile {
            weight_kg: Some(81.3),
            height_cm: Some(177.7),
            ..Default::default()
        };
        let a = derive(&p);
        let b = derive(&p);
        assert_eq!(a.bmi.map(f64::to_bits), b.bmi.map(f64::to_bits));
    }

    proptest! {
        #[test]
        fn bmi_monotonic_in_weight(w in 20.0f64..300.0, dw in 0.0f64..50.0, h in 100.0f64..220.0) {
            let a = compute_bmi(Some(w), Some(h)).unwrap();
            let b = compute_bmi(Some(w + dw), Some(h)).unwrap();
            prop_assert!(b >= a);
        }

        #[test]
        fn bmi_monotonic_decreasing_in_height(w in 20.0f64..300.0, h in 100.0f64..220.0, dh in 0.0f64..50.0) {
            let a = compute_bmi(Some(w), Some(h)).unwrap();
            let b = compute_bmi(Some(w), Some(h + dh)).unwrap();
            prop_assert!(b <= a);
        }

        #[test]
        fn condition_flag_is_unhealthy_for_any_bmi(
            w in proptest::option::of(1.0f64..400.0),
            h in proptest::option::of(50.0f64..250.0),
            flag in 0usize..3,
        ) {
            let mut p = BiometricProfile { weight_kg: w, height_cm: h, ..Default::default() };
            match flag {
                0 => p.diabetes = true,
                1 => p.high_cholesterol = true,
                _ => p.high_blood_pressure = true,
            }
            prop_assert!(!derive(&p).is_healthy);
        }

        #[test]
        fn bmi_invariant_under_unit_consistent_scaling(w in 20.0f64..300.0, h in 100.0f64..220.0, k in 0.5f64..2.0) {
            let a = compute_bmi(Some(w), Some(h)).unwrap();
            let b = compute_bmi(Some(w * k * k), Some(h * k)).unwrap();
            // Rounding can land either side of a .x5 boundary.
            prop_assert!((a - b).abs() <= 0.1 + 1e-9);
        }
    }
}
