use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};
use crate::profile::biometrics::{self, BmiCategory, DerivedMetrics};
use crate::serde_ext;

/// How the backend should normalise nutrient amounts before scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ScoringMode {
    #[default]
    #[serde(rename = "portion-aware")]
    PortionAware,
    #[serde(rename = "per-100g")]
    Per100g,
}

/// Numeric biometric inputs, in the order the profile screen lists them.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WeightKg,
    HeightCm,
    Glucose,
    Hba1c,
    Ldl,
    Hdl,
    Triglycerides,
    Systolic,
    Diastolic,
    Age,
    Waist,
    Alt,
    Ast,
    Ggt,
    Creatinine,
    Crp,
    UricAcid,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::WeightKg,
        Metric::HeightCm,
        Metric::Glucose,
        Metric::Hba1c,
        Metric::Ldl,
        Metric::Hdl,
        Metric::Triglycerides,
        Metric::Systolic,
        Metric::Diastolic,
        Metric::Age,
        Metric::Waist,
        Metric::Alt,
        Metric::Ast,
        Metric::Ggt,
        Metric::Creatinine,
        Metric::Crp,
        Metric::UricAcid,
    ];

    /// Wire name, identical to the serde field name.
    pub fn key(self) -> &'static str {
        match self {
            Metric::WeightKg => "weight_kg",
            Metric::HeightCm => "height_cm",
            Metric::Glucose => "glucose",
            Metric::Hba1c => "hba1c",
            Metric::Ldl => "ldl",
            Metric::Hdl => "hdl",
            Metric::Triglycerides => "triglycerides",
            Metric::Systolic => "systolic",
            Metric::Diastolic => "diastolic",
            Metric::Age => "age",
            Metric::Waist => "waist",
            Metric::Alt => "alt",
            Metric::Ast => "ast",
            Metric::Ggt => "ggt",
            Metric::Creatinine => "creatinine",
            Metric::Crp => "crp",
            Metric::UricAcid => "uric_acid",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::WeightKg => "kg",
            Metric::HeightCm | Metric::Waist => "cm",
            Metric::Glucose | Metric::Ldl | Metric::Hdl | Metric::Triglycerides => "mg/dL",
            Metric::Creatinine | Metric::UricAcid => "mg/dL",
            Metric::Hba1c => "%",
            Metric::Systolic | Metric::Diastolic => "mmHg",
            Metric::Age => "years",
            Metric::Alt | Metric::Ast | Metric::Ggt => "U/L",
            Metric::Crp => "mg/L",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        match key {
            "blood_sugar_mg_dl" => Some(Metric::Glucose),
            "ldl_cholesterol_mg_dl" => Some(Metric::Ldl),
            _ => Metric::ALL.into_iter().find(|m| m.key() == key),
        }
    }
}

/// Locally edited health profile. Every field is independently optional and
/// absence means "unknown", never zero.
///
/// The condition flags are always serialized, so a `PUT` can clear them;
/// only the numeric fields are sparse.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BiometricProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hba1c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triglycerides: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ast: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ggt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creatinine: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uric_acid: Option<f64>,

    pub diabetes: bool,
    pub high_cholesterol: bool,
    pub high_blood_pressure: bool,

    #[serde(rename = "scoringMode", skip_serializing_if = "Option::is_none")]
    pub scoring_mode: Option<ScoringMode>,
}

/// Older backends used these names for glucose and LDL.
const LEGACY_KEYS: [(Metric, &str); 2] = [
    (Metric::Glucose, "blood_sugar_mg_dl"),
    (Metric::Ldl, "ldl_cholesterol_mg_dl"),
];

/// Hand-written so that a record carrying both a current and a legacy name
/// still loads. The current name wins unless it is null or missing.
impl<'de> Deserialize<'de> for BiometricProfile {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let mut raw = Map::<String, Value>::deserialize(d)?;
        let mut take = |key: &str| raw.remove(key).filter(|v| !v.is_null());

        let mut profile = BiometricProfile::default();
        for metric in Metric::ALL {
            let mut value = take(metric.key());
            for (_, legacy_key) in LEGACY_KEYS.iter().filter(|(m, _)| *m == metric) {
                let legacy = take(*legacy_key);
                value = value.or(legacy);
            }
            if let Some(value) = value {
                let parsed = serde_ext::opt_f64(value)
                    .map_err(|e| D::Error::custom(format!("{}: {}", metric.key(), e)))?;
                profile.set(metric, parsed);
            }
        }

        let mut flag = |key: &str| -> Result<bool, D::Error> {
            take(key)
                .map(serde_json::from_value::<bool>)
                .transpose()
                .map(Option::unwrap_or_default)
                .map_err(|e| D::Error::custom(format!("{}: {}", key, e)))
        };
        profile.diabetes = flag("diabetes")?;
        profile.high_cholesterol = flag("high_cholesterol")?;
        profile.high_blood_pressure = flag("high_blood_pressure")?;

        profile.scoring_mode = take("scoringMode")
            .map(serde_json::from_value::<ScoringMode>)
            .transpose()
            .map_err(|e| D::Error::custom(format!("scoringMode: {}", e)))?;
        Ok(profile)
    }
}

impl BiometricProfile {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        *self.slot(metric)
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        *self.slot_mut(metric) = value;
    }

    fn slot(&self, metric: Metric) -> &Option<f64> {
        match metric {
            Metric::WeightKg => &self.weight_kg,
            Metric::HeightCm => &self.height_cm,
            Metric::Glucose => &self.glucose,
            Metric::Hba1c => &self.hba1c,
            Metric::Ldl => &self.ldl,
            Metric::Hdl => &self.hdl,
            Metric::Triglycerides => &self.triglycerides,
            Metric::Systolic => &self.systolic,
            Metric::Diastolic => &self.diastolic,
            Metric::Age => &self.age,
            Metric::Waist => &self.waist,
            Metric::Alt => &self.alt,
            Metric::Ast => &self.ast,
            Metric::Ggt => &self.ggt,
            Metric::Creatinine => &self.creatinine,
            Metric::Crp => &self.crp,
            Metric::UricAcid => &self.uric_acid,
        }
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::WeightKg => &mut self.weight_kg,
            Metric::HeightCm => &mut self.height_cm,
            Metric::Glucose => &mut self.glucose,
            Metric::Hba1c => &mut self.hba1c,
            Metric::Ldl => &mut self.ldl,
            Metric::Hdl => &mut self.hdl,
            Metric::Triglycerides => &mut self.triglycerides,
            Metric::Systolic => &mut self.systolic,
            Metric::Diastolic => &mut self.diastolic,
            Metric::Age => &mut self.age,
            Metric::Waist => &mut self.waist,
            Metric::Alt => &mut self.alt,
            Metric::Ast => &mut self.ast,
            Metric::Ggt => &mut self.ggt,
            Metric::Creatinine => &mut self.creatinine,
            Metric::Crp => &mut self.crp,
            Metric::UricAcid => &mut self.uric_acid,
        }
    }

    pub fn has_condition(&self) -> bool {
        self.diabetes || self.high_cholesterol || self.high_blood_pressure
    }

    /// Present values must be finite and non-negative.
    pub fn validate(&self) -> ClientResult<()> {
        for metric in Metric::ALL {
            if let Some(v) = self.get(metric) {
                if !v.is_finite() || v < 0.0 {
                    return Err(ClientError::Validation(format!(
                        "{} must be a finite non-negative number",
                        metric.key()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// User record as returned by `/user/profile` and cached under `user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "serde_ext::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub biometrics: BiometricProfile,
    #[serde(default, deserialize_with = "serde_ext::opt_f64", skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(default, rename = "bmiCategory", skip_serializing_if = "Option::is_none")]
    pub bmi_category: Option<BmiCategory>,
    #[serde(default, rename = "isHealthy", skip_serializing_if = "Option::is_none")]
    pub is_healthy: Option<bool>,
}

impl UserProfile {
    /// Backend-precomputed values when all three are present, else the local
    /// evaluator's result.
    pub fn derived(&self) -> DerivedMetrics {
        match (self.bmi, self.bmi_category, self.is_healthy) {
            (Some(bmi), Some(bmi_category), Some(is_healthy)) => DerivedMetrics {
                bmi: Some(bmi),
                bmi_category,
                is_healthy,
            },
            _ => biometrics::derive(&self.biometrics),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileUpdateResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: UserProfile,
}
