use core::fmt;
use core2::io::Error as IoError;
use thiserror_no_std::Error;

/// A component of a boot image, named in errors and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    ProgramHeaders,
    Kernel,
    Ramdisk,
    Second,
    DeviceTree,
    Cmdline,
    Ipl,
    Rpm,
    Appsbl,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::ProgramHeaders => "program header table",
            Self::Kernel => "kernel",
            Self::Ramdisk => "ramdisk",
            Self::Second => "second bootloader",
            Self::DeviceTree => "device tree",
            Self::Cmdline => "cmdline",
            Self::Ipl => "ipl",
            Self::Rpm => "rpm",
            Self::Appsbl => "appsbl",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No boot image header found.")]
    HeaderNotFound,
    #[error("Invalid page size: {0}.")]
    InvalidPageSize(u32),
    #[error("The {segment} exceeds the image size by {overrun} bytes.")]
    SegmentOverrun { segment: Segment, overrun: usize },
    #[error("Unknown ELF segment (type: {p_type:#x}, flags: {p_flags:#x}).")]
    UnknownSegmentDescriptor { p_type: u32, p_flags: u32 },
    #[error("MTK ramdisk wrapper declares {declared} bytes, but {actual} bytes follow it.")]
    RamdiskWrapperSizeMismatch { declared: u32, actual: usize },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Invalid page size: {0}.")]
    InvalidPageSize(u32),
    #[error("The {segment} is too large to encode ({size} bytes).")]
    ComponentTooLarge { segment: Segment, size: usize },
    #[error("IO error whilst writing boot image: {0}")]
    Io(IoError),
}

impl From<IoError> for EncodeError {
    fn from(error: IoError) -> Self {
        Self::Io(error)
    }
}

/// Recoverable oddities found while decoding. Each one is also logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    #[error("Device tree declares {declared} bytes, but only {available} are left; truncating.")]
    DeviceTreeTruncated { declared: usize, available: usize },
    #[error("MTK kernel wrapper declares {declared} bytes, but {actual} bytes follow it.")]
    KernelWrapperSizeMismatch { declared: u32, actual: usize },
}
