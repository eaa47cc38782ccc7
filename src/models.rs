use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the seven blood cell categories the classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Neutrophil,
    Lymphocyte,
    Monocyte,
    Eosinophil,
    Basophil,
    #[serde(rename = "Red Blood Cell")]
    RedBloodCell,
    Platelet,
}

impl CellType {
    /// All labels in table order. Ties in the ranked output fall back to this order.
    pub const ALL: [CellType; 7] = [
        CellType::Neutrophil,
        CellType::Lymphocyte,
        CellType::Monocyte,
        CellType::Eosinophil,
        CellType::Basophil,
        CellType::RedBloodCell,
        CellType::Platelet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CellType::Neutrophil => "Neutrophil",
            CellType::Lymphocyte => "Lymphocyte",
            CellType::Monocyte => "Monocyte",
            CellType::Eosinophil => "Eosinophil",
            CellType::Basophil => "Basophil",
            CellType::RedBloodCell => "Red Blood Cell",
            CellType::Platelet => "Platelet",
        }
    }

    pub fn from_name(name: &str) -> Option<CellType> {
        CellType::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Clinical text for this label.
    pub fn info(self) -> &'static CellTypeInfo {
        &CELL_TYPES[self as usize]
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static clinical reference for a cell type.
#[derive(Debug, PartialEq, Eq)]
pub struct CellTypeInfo {
    pub cell_type: CellType,
    pub clinical_info: &'static str,
    pub normal_range: &'static str,
}

impl CellTypeInfo {
    pub fn lookup(name: &str) -> Option<&'static CellTypeInfo> {
        CELL_TYPES.iter().find(|info| info.cell_type.name() == name)
    }
}

/// Label table, indexed in the same order as [`CellType::ALL`].
pub static CELL_TYPES: [CellTypeInfo; 7] = [
    CellTypeInfo {
        cell_type: CellType::Neutrophil,
        clinical_info: "Most abundant white blood cell, part of innate immune system. First responders to bacterial infections with multilobed nucleus.",
        normal_range: "50-70% of total WBC count (2,500-7,000 cells/μL)",
    },
    CellTypeInfo {
        cell_type: CellType::Lymphocyte,
        clinical_info: "Key component of adaptive immunity. Includes T-cells, B-cells, and NK cells. Large nucleus with minimal cytoplasm.",
        normal_range: "20-40% of total WBC count (1,000-4,000 cells/μL)",
    },
    CellTypeInfo {
        cell_type: CellType::Monocyte,
        clinical_info: "Largest white blood cells that differentiate into macrophages and dendritic cells. Kidney-shaped nucleus.",
        normal_range: "2-8% of total WBC count (200-800 cells/μL)",
    },
    CellTypeInfo {
        cell_type: CellType::Eosinophil,
        clinical_info: "Involved in allergic reactions and parasitic infections. Contains bright orange-red granules and bilobed nucleus.",
        normal_range: "1-4% of total WBC count (50-400 cells/μL)",
    },
    CellTypeInfo {
        cell_type: CellType::Basophil,
        clinical_info: "Least common WBC, releases histamine and heparin during allergic reactions. Dark blue-purple granules obscure nucleus.",
        normal_range: "0.5-1% of total WBC count (25-100 cells/μL)",
    },
    CellTypeInfo {
        cell_type: CellType::RedBloodCell,
        clinical_info: "Oxygen-carrying cells containing hemoglobin. Biconcave disc shape maximizes surface area for gas exchange.",
        normal_range: "Males: 4.7-6.1 million cells/μL, Females: 4.2-5.4 million cells/μL",
    },
    CellTypeInfo {
        cell_type: CellType::Platelet,
        clinical_info: "Cell fragments essential for blood clotting and wound healing. Small, irregularly shaped with no nucleus.",
        normal_range: "150,000-450,000 platelets/μL",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "class")]
    pub cell_type: CellType,
    /// Percentage, one decimal place.
    pub confidence: f64,
}

/// Result of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub predicted_class: CellType,
    pub confidence: f64,
    /// One entry per label, sorted by descending confidence.
    pub all_predictions: Vec<Prediction>,
    pub clinical_info: String,
    pub normal_range: String,
    pub model_version: String,
    pub processing_time: String,
}

impl ClassificationResult {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_percent(self.confidence)
    }
}

/// Coarse bucket for a confidence percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 80.0 {
            ConfidenceLevel::High
        } else if percent >= 60.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

pub const MODEL_VERSION: &str = "2.1.0";
pub const PROCESSING_TIME: &str = "1.3s";

/// Descriptive metadata for the model shown alongside results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub architecture: String,
    pub training_images: u32,
    pub validation_accuracy: f64,
    pub classes: usize,
    pub version: String,
    pub last_trained: String,
    pub framework: String,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            architecture: "MobileNetV2".to_string(),
            training_images: 12047,
            validation_accuracy: 97.3,
            classes: CELL_TYPES.len(),
            version: MODEL_VERSION.to_string(),
            last_trained: "2024-06-15".to_string(),
            framework: "TensorFlow.js".to_string(),
        }
    }
}
