use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Capture strategy chosen before taking photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanMode {
    Label,
    Food,
    #[default]
    Enhanced,
}

/// Per-mode upload wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    pub field: &'static str,
    pub endpoint: &'static str,
    pub max_images: usize,
    pub file_stem: &'static str,
}

const LABEL: ModeDescriptor = ModeDescriptor {
    field: "image",
    endpoint: "/scan/analyze",
    max_images: 1,
    file_stem: "nutrition-label",
};

const FOOD: ModeDescriptor = ModeDescriptor {
    field: "image",
    endpoint: "/scan/food-photo",
    max_images: 1,
    file_stem: "nutrition-label",
};

const ENHANCED: ModeDescriptor = ModeDescriptor {
    field: "images",
    endpoint: "/scan/enhanced",
    max_images: 3,
    file_stem: "food-image",
};

impl ScanMode {
    pub const ALL: [ScanMode; 3] = [ScanMode::Label, ScanMode::Food, ScanMode::Enhanced];

    pub fn descriptor(self) -> &'static ModeDescriptor {
        match self {
            ScanMode::Label => &LABEL,
            ScanMode::Food => &FOOD,
            ScanMode::Enhanced => &ENHANCED,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanMode::Label => "label",
            ScanMode::Food => "food",
            ScanMode::Enhanced => "enhanced",
        }
    }

    pub fn is_multi_image(self) -> bool {
        self.descriptor().max_images > 1
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "label" => Ok(ScanMode::Label),
            "food" | "food-photo" => Ok(ScanMode::Food),
            "enhanced" => Ok(ScanMode::Enhanced),
            other => Err(ClientError::Validation(format!("unknown scan mode {:?}", other))),
        }
    }
}
