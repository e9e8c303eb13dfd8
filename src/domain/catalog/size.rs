//! Machine size catalog entries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::image::{Architecture, Generation};

/// Storage controller presented to the guest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DiskController {
    #[default]
    #[serde(rename = "SCSI")]
    Scsi,
    #[serde(rename = "NVMe")]
    Nvme,
}

impl DiskController {
    pub const ALL: [DiskController; 2] = [DiskController::Scsi, DiskController::Nvme];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskController::Scsi => "SCSI",
            DiskController::Nvme => "NVMe",
        }
    }
}

impl fmt::Display for DiskController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskController {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiskController::ALL
            .into_iter()
            .find(|controller| controller.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown disk controller '{}'", s))
    }
}

/// Managed disk SKU. The set is closed; catalogs must state support for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiskSku {
    #[serde(rename = "Standard_LRS")]
    Standard,
    #[serde(rename = "StandardSSD_LRS")]
    StandardSsd,
    #[serde(rename = "Premium_LRS")]
    Premium,
    #[serde(rename = "PremiumV2_LRS")]
    PremiumV2,
    #[serde(rename = "UltraSSD_LRS")]
    Ultra,
}

impl DiskSku {
    pub const ALL: [DiskSku; 5] = [
        DiskSku::Standard,
        DiskSku::StandardSsd,
        DiskSku::Premium,
        DiskSku::PremiumV2,
        DiskSku::Ultra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskSku::Standard => "Standard_LRS",
            DiskSku::StandardSsd => "StandardSSD_LRS",
            DiskSku::Premium => "Premium_LRS",
            DiskSku::PremiumV2 => "PremiumV2_LRS",
            DiskSku::Ultra => "UltraSSD_LRS",
        }
    }

    /// Largest data disk, in GB, that can be provisioned with this SKU.
    pub fn max_size_gb(&self) -> u32 {
        match self {
            DiskSku::Standard | DiskSku::StandardSsd | DiskSku::Premium => 32_767,
            DiskSku::PremiumV2 | DiskSku::Ultra => 65_536,
        }
    }

    /// Whether disks of this SKU can only be deployed pinned to an availability zone.
    pub fn is_zonal_only(&self) -> bool {
        matches!(self, DiskSku::PremiumV2 | DiskSku::Ultra)
    }

    /// Support assumed when a size does not mention the SKU.
    pub fn default_support(&self) -> bool {
        matches!(self, DiskSku::Standard | DiskSku::StandardSsd | DiskSku::Premium)
    }
}

impl fmt::Display for DiskSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskSku {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiskSku::ALL
            .into_iter()
            .find(|sku| sku.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown disk SKU '{}'", s))
    }
}

/// Accelerated networking capability of a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelNetMode {
    Required,
    Optional,
    Unsupported,
}

impl AccelNetMode {
    pub const ALL: [AccelNetMode; 3] =
        [AccelNetMode::Required, AccelNetMode::Optional, AccelNetMode::Unsupported];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccelNetMode::Required => "required",
            AccelNetMode::Optional => "optional",
            AccelNetMode::Unsupported => "unsupported",
        }
    }
}

/// Capability tags of a size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeTags {
    pub architectures: Vec<Architecture>,
    pub generations: Vec<Generation>,
    pub disk_controllers_by_gen: BTreeMap<Generation, Vec<DiskController>>,
    pub disk_sku_support: BTreeMap<DiskSku, bool>,
    pub accel_net_mode: AccelNetMode,
    pub max_nics: u32,
    pub max_data_disks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_os_disk_supported: Option<bool>,
    /// Curated by hand; automated capability probes report this unreliably.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_disk_supported: Option<bool>,
}

/// One entry of the size catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeCatalogEntry {
    pub name: String,
    pub tags: SizeTags,
}

impl SizeCatalogEntry {
    pub fn supports_shared_disks(&self) -> bool {
        self.tags.shared_disk_supported == Some(true)
    }

    pub fn supports_ephemeral_os_disk(&self) -> bool {
        self.tags.ephemeral_os_disk_supported == Some(true)
    }
}
