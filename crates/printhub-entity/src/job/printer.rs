//! Printer (resource type) enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A physical printer that runs at most one job at a time.
///
/// New printers are added as variants; every variant must also be listed in
/// [`PrinterType::ALL`] so snapshots and startup dispatch cover it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "printer_type")]
pub enum PrinterType {
    /// Bambu Lab H2S.
    #[serde(rename = "H2S")]
    #[sqlx(rename = "H2S")]
    H2s,
    /// Bambu Lab P1S.
    #[serde(rename = "P1S")]
    #[sqlx(rename = "P1S")]
    P1s,
}

impl PrinterType {
    /// Every printer, in display order.
    pub const ALL: [PrinterType; 2] = [PrinterType::H2s, PrinterType::P1s];

    /// Printer code used in configuration keys and the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H2s => "H2S",
            Self::P1s => "P1S",
        }
    }
}

impl fmt::Display for PrinterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrinterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|printer| printer.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|p| p.as_str()).collect();
                format!(
                    "Unknown printer '{code}'. Expected one of: {}",
                    known.join(", ")
                )
            })
    }
}
