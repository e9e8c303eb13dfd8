//! Optional Azure Files add-on shared by the whole deployment.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileShareProtocol {
    Smb,
    Nfs,
}

impl FileShareProtocol {
    pub const ALL: [FileShareProtocol; 2] = [FileShareProtocol::Smb, FileShareProtocol::Nfs];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileShareProtocol::Smb => "SMB",
            FileShareProtocol::Nfs => "NFS",
        }
    }

    /// Lowercase token used in resource and output names.
    pub fn slug(&self) -> &'static str {
        match self {
            FileShareProtocol::Smb => "smb",
            FileShareProtocol::Nfs => "nfs",
        }
    }
}

impl fmt::Display for FileShareProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileShareOption {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub share_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOptions {
    #[serde(default)]
    pub smb: FileShareOption,
    #[serde(default)]
    pub nfs: FileShareOption,
}

impl StorageOptions {
    pub fn share(&self, protocol: FileShareProtocol) -> &FileShareOption {
        match protocol {
            FileShareProtocol::Smb => &self.smb,
            FileShareProtocol::Nfs => &self.nfs,
        }
    }

    /// Enabled protocols with their share names, SMB first.
    pub fn enabled(&self) -> impl Iterator<Item = (FileShareProtocol, &str)> {
        FileShareProtocol::ALL.into_iter().filter_map(|protocol| {
            let share = self.share(protocol);
            share.enabled.then_some((protocol, share.share_name.as_str()))
        })
    }

    pub fn any_enabled(&self) -> bool {
        self.smb.enabled || self.nfs.enabled
    }
}
