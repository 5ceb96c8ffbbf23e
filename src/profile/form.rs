use std::collections::BTreeMap;

use crate::error::{ClientError, ClientResult};
use crate::profile::dto::{BiometricProfile, Metric, ScoringMode};

/// Raw text typed into the profile screen, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    fields: BTreeMap<Metric, String>,
    pub diabetes: bool,
    pub high_cholesterol: bool,
    pub high_blood_pressure: bool,
    pub scoring_mode: Option<ScoringMode>,
}

impl ProfileForm {
    /// Prefill from a stored profile; absent values become empty inputs.
    pub fn from_profile(profile: &BiometricProfile) -> Self {
        let fields = Metric::ALL
            .into_iter()
            .filter_map(|m| profile.get(m).map(|v| (m, v.to_string())))
            .collect();
        Self {
            fields,
            diabetes: profile.diabetes,
            high_cholesterol: profile.high_cholesterol,
            high_blood_pressure: profile.high_blood_pressure,
            scoring_mode: profile.scoring_mode,
        }
    }

    pub fn set(&mut self, metric: Metric, text: impl Into<String>) {
        self.fields.insert(metric, text.into());
    }

    pub fn text(&self, metric: Metric) -> &str {
        self.fields.get(&metric).map(String::as_str).unwrap_or("")
    }

    /// Parse every field; the first invalid input fails the whole form.
    pub fn parse(&self) -> ClientResult<BiometricProfile> {
        let mut profile = BiometricProfile {
            diabetes: self.diabetes,
            high_cholesterol: self.high_cholesterol,
            high_blood_pressure: self.high_blood_pressure,
            scoring_mode: self.scoring_mode,
            ..Default::default()
        };
        for (metric, text) in &self.fields {
            profile.set(*metric, parse_metric(*metric, text)?);
        }
        Ok(profile)
    }
}

/// Empty input is "unknown". Anything else must be a finite, non-negative
/// decimal using `.` as separator.
pub fn parse_metric(metric: Metric, text: &str) -> ClientResult<Option<f64>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = trimmed.parse::<f64>().map_err(|_| {
        ClientError::Validation(format!("{}: {:?} is not a number", metric.key(), trimmed))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ClientError::Validation(format!(
            "{} must be a finite non-negative number",
            metric.key()
        )));
    }
    Ok(Some(value))
}
