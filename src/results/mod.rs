pub mod dto;
pub mod projector;

pub use dto::{AiAdvice, HealthScore, NutritionData, ScanResult, ScoreBreakdown, ScoreCategory};
pub use projector::{project, project_value, BreakdownBar, ScoreTier};
