//! Inference case selection

use std::fmt;

/// Selects which of the three fixed inference tasks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    /// Case 1: astronomical object classification
    ObjectClassification,
    /// Case 2: photometric redshift binning
    RedshiftBinning,
    /// Case 3: satellite observation anomaly detection
    AnomalyDetection,
}

impl Case {
    /// Parse the raw selector as submitted by a form field or console input.
    ///
    /// Only the exact strings "1", "2" and "3" select a case; anything else
    /// is rejected by the dispatch boundary.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(Case::ObjectClassification),
            "2" => Some(Case::RedshiftBinning),
            "3" => Some(Case::AnomalyDetection),
            _ => None,
        }
    }

    /// Case selector digit, for logging.
    pub fn selector(&self) -> u8 {
        match self {
            Case::ObjectClassification => 1,
            Case::RedshiftBinning => 2,
            Case::AnomalyDetection => 3,
        }
    }

    /// Short name used for model slots, metrics keys and log fields.
    pub fn slot_name(&self) -> &'static str {
        match self {
            Case::ObjectClassification => "classification",
            Case::RedshiftBinning => "redshift",
            Case::AnomalyDetection => "anomaly",
        }
    }

    /// All cases, in selector order.
    pub fn all() -> [Case; 3] {
        [
            Case::ObjectClassification,
            Case::RedshiftBinning,
            Case::AnomalyDetection,
        ]
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Case::ObjectClassification => "Object Classification",
            Case::RedshiftBinning => "Photometric Redshift Binning",
            Case::AnomalyDetection => "Satellite Anomaly Detection",
        };
        f.write_str(name)
    }
}
