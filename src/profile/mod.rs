pub mod biometrics;
pub mod dto;
pub mod form;
pub mod services;

pub use biometrics::{BmiCategory, DerivedMetrics, RiskTier};
pub use dto::{BiometricProfile, Metric, ScoringMode, UserProfile};
pub use form::ProfileForm;
pub use services::ProfileService;
