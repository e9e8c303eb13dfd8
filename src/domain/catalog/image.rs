//! OS image catalog entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// CPU architecture an image is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "x64")]
    X64,
    #[serde(rename = "Arm64")]
    Arm64,
}

impl Architecture {
    pub const ALL: [Architecture; 2] = [Architecture::X64, Architecture::Arm64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X64 => "x64",
            Architecture::Arm64 => "Arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hyper-V VM generation.
///
/// Ordered so that `Gen2` compares greater than `Gen1`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Generation {
    Gen1,
    #[default]
    Gen2,
}

impl Generation {
    pub const ALL: [Generation; 2] = [Generation::Gen1, Generation::Gen2];

    /// The newest generation; the only one that accepts an explicit disk controller type.
    pub const HIGHEST: Generation = Generation::Gen2;

    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Gen1 => "Gen1",
            Generation::Gen2 => "Gen2",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marketplace coordinates of an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl ImageRef {
    /// Case-insensitive match on publisher, offer and sku (version ignored).
    pub fn matches(&self, publisher: &str, offer: &str, sku: &str) -> bool {
        self.publisher.eq_ignore_ascii_case(publisher)
            && self.offer.eq_ignore_ascii_case(offer)
            && self.sku.eq_ignore_ascii_case(sku)
    }
}

/// One entry of the image catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCatalogEntry {
    pub key: String,
    pub arch: Architecture,
    #[serde(rename = "gen")]
    pub generation: Generation,
    pub nvme_capable: bool,
    pub scsi_capable: bool,
    pub label: String,
    #[serde(rename = "ref")]
    pub image_ref: ImageRef,
}
