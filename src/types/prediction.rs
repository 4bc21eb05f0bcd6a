//! Label mappings for raw model outputs

use std::fmt;

/// Named redshift category mapped from the redshift model's integer class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedshiftBin {
    Low,
    Medium,
    High,
}

impl RedshiftBin {
    /// Map a predicted integer class to its bin.
    ///
    /// Returns `None` for classes outside the trained 0/1/2 range; the
    /// dispatcher renders those as "Unknown".
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(RedshiftBin::Low),
            1 => Some(RedshiftBin::Medium),
            2 => Some(RedshiftBin::High),
            _ => None,
        }
    }
}

impl fmt::Display for RedshiftBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RedshiftBin::Low => "Low Redshift",
            RedshiftBin::Medium => "Medium Redshift",
            RedshiftBin::High => "High Redshift",
        };
        f.write_str(label)
    }
}

/// Binary verdict of the satellite anomaly model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyStatus {
    Anomalous,
    Normal,
}

impl AnomalyStatus {
    /// Class 1 is anomalous; any other output is treated as normal.
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            AnomalyStatus::Anomalous
        } else {
            AnomalyStatus::Normal
        }
    }
}

impl fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnomalyStatus::Anomalous => "Anomalous",
            AnomalyStatus::Normal => "Normal",
        };
        f.write_str(label)
    }
}
