pub mod image;
pub mod mode;
pub mod orchestrator;
pub mod upload;

pub use image::ImageRef;
pub use mode::{ModeDescriptor, ScanMode};
pub use orchestrator::{PendingScan, ScanOrchestrator, ScanPhase};
pub use upload::build_scan_request;
