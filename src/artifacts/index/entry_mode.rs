use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, Eq, Hash, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

/// Mode bits recorded for index entries and tree entries
#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    Symlink,
    Directory,
    Gitlink,
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode::File(FileMode::Regular)
    }
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "40000",
            EntryMode::Gitlink => "160000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o40000,
            EntryMode::Gitlink => 0o160000,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Parse the octal text used inside tree objects
    pub fn from_octal_str(mode: &str) -> Result<Self> {
        if mode.is_empty() {
            return Err(Error::malformed("empty entry mode"));
        }

        let mode = u32::from_str_radix(mode, 8)
            .map_err(|_| Error::malformed(format!("entry mode is not octal: {mode:?}")))?;

        EntryMode::try_from(mode)
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = Error;

    fn try_from(mode: u32) -> Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::File(FileMode::Regular)),
            0o100755 => Ok(EntryMode::File(FileMode::Executable)),
            0o120000 => Ok(EntryMode::Symlink),
            0o40000 => Ok(EntryMode::Directory),
            0o160000 => Ok(EntryMode::Gitlink),
            _ => Err(Error::malformed(format!("invalid entry mode {mode:o}"))),
        }
    }
}

impl From<EntryMode> for u32 {
    fn from(mode: EntryMode) -> Self {
        mode.as_u32()
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0>6}", self.as_str())
    }
}
