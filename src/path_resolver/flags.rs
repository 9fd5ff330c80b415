use bitflags::bitflags;
use clap::ValueEnum;

bitflags! {
    /// Requested access rights. Empty means a query-only handle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DesiredAccess: u32 {
        const GENERIC_READ = 0x8000_0000;
        const GENERIC_WRITE = 0x4000_0000;
        const GENERIC_EXECUTE = 0x2000_0000;
        const GENERIC_ALL = 0x1000_0000;
    }
}

impl DesiredAccess {
    pub fn reads(self) -> bool {
        self.intersects(Self::GENERIC_READ | Self::GENERIC_ALL)
    }

    pub fn writes(self) -> bool {
        self.intersects(Self::GENERIC_WRITE | Self::GENERIC_ALL)
    }
}

bitflags! {
    /// Which concurrent opens the handle tolerates. Only Windows enforces it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShareMode: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
        const DELETE = 0x4;
    }
}

/// Open-vs-create policy. Exactly one applies per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[repr(u32)]
pub enum CreationDisposition {
    /// Create, fail if present.
    CreateNew = 1,
    /// Create, truncating anything present.
    CreateAlways = 2,
    /// Fail if absent.
    OpenExisting = 3,
    /// Open, creating if absent.
    OpenAlways = 4,
    /// Open and truncate, fail if absent. Needs write access.
    TruncateExisting = 5,
}

impl CreationDisposition {
    pub fn creates(self) -> bool {
        matches!(
            self,
            Self::CreateNew | Self::CreateAlways | Self::OpenAlways
        )
    }

    pub fn truncates(self) -> bool {
        matches!(self, Self::CreateAlways | Self::TruncateExisting)
    }
}

bitflags! {
    /// Object attributes and behavioral hints, bit-compatible with Win32.
    ///
    /// Combinations are not validated here beyond what the platform backend
    /// cannot express.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlagsAndAttributes: u32 {
        const FILE_ATTRIBUTE_READONLY = 0x1;
        const FILE_ATTRIBUTE_HIDDEN = 0x2;
        const FILE_ATTRIBUTE_SYSTEM = 0x4;
        const FILE_ATTRIBUTE_ARCHIVE = 0x20;
        const FILE_ATTRIBUTE_NORMAL = 0x80;
        const FILE_ATTRIBUTE_TEMPORARY = 0x100;
        const FILE_ATTRIBUTE_OFFLINE = 0x1000;
        const FILE_ATTRIBUTE_ENCRYPTED = 0x4000;
        const FILE_FLAG_OPEN_NO_RECALL = 0x10_0000;
        /// Open the link itself instead of following it.
        const FILE_FLAG_OPEN_REPARSE_POINT = 0x20_0000;
        const FILE_FLAG_SESSION_AWARE = 0x80_0000;
        const FILE_FLAG_POSIX_SEMANTICS = 0x100_0000;
        /// Required to open directories.
        const FILE_FLAG_BACKUP_SEMANTICS = 0x200_0000;
        const FILE_FLAG_DELETE_ON_CLOSE = 0x400_0000;
        const FILE_FLAG_SEQUENTIAL_SCAN = 0x800_0000;
        const FILE_FLAG_RANDOM_ACCESS = 0x1000_0000;
        const FILE_FLAG_NO_BUFFERING = 0x2000_0000;
        const FILE_FLAG_OVERLAPPED = 0x4000_0000;
        const FILE_FLAG_WRITE_THROUGH = 0x8000_0000;
    }
}

/// Volume part of a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
#[repr(u32)]
pub enum VolumeName {
    /// Drive-letter form, the normal absolute path elsewhere.
    #[default]
    Dos = 0x0,
    /// `\\?\Volume{GUID}\` form.
    Guid = 0x1,
    /// NT namespace form, `\Device\HarddiskVolumeN\`.
    Nt = 0x2,
    /// Path without any volume prefix.
    None = 0x4,
}

/// Textual form requested from `resolve_final_path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NameForm {
    pub volume: VolumeName,
    /// Return the name as it was when the handle was opened.
    pub opened: bool,
}

impl NameForm {
    pub const FILE_NAME_OPENED: u32 = 0x8;

    pub const fn new(volume: VolumeName) -> Self {
        Self {
            volume,
            opened: false,
        }
    }

    pub const fn opened(mut self) -> Self {
        self.opened = true;
        self
    }

    /// Flag word as `GetFinalPathNameByHandleW` expects it.
    pub fn bits(self) -> u32 {
        let opened = if self.opened {
            Self::FILE_NAME_OPENED
        } else {
            0
        };
        self.volume as u32 | opened
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        let volume = match bits & !Self::FILE_NAME_OPENED {
            0x0 => VolumeName::Dos,
            0x1 => VolumeName::Guid,
            0x2 => VolumeName::Nt,
            0x4 => VolumeName::None,
            _ => return None,
        };
        Some(Self {
            volume,
            opened: bits & Self::FILE_NAME_OPENED != 0,
        })
    }
}

/// Everything `open` needs besides the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRequest {
    pub access: DesiredAccess,
    pub share: ShareMode,
    pub disposition: CreationDisposition,
    pub flags: FlagsAndAttributes,
}

impl OpenRequest {
    /// Query-only open of an existing file or directory, sharing everything.
    pub fn query() -> Self {
        Self {
            access: DesiredAccess::empty(),
            share: ShareMode::all(),
            disposition: CreationDisposition::OpenExisting,
            flags: FlagsAndAttributes::FILE_FLAG_BACKUP_SEMANTICS,
        }
    }

    pub fn new(access: DesiredAccess, disposition: CreationDisposition) -> Self {
        Self {
            access,
            share: ShareMode::READ | ShareMode::WRITE,
            disposition,
            flags: FlagsAndAttributes::FILE_ATTRIBUTE_NORMAL,
        }
    }

    pub fn share(mut self, share: ShareMode) -> Self {
        self.share = share;
        self
    }

    pub fn flags(mut self, flags: FlagsAndAttributes) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_flag(mut self, flag: FlagsAndAttributes) -> Self {
        self.flags |= flag;
        self
    }
}
