use super::consts::mtk::*;
use super::{put_u32, take_array, take_u32, HeaderTrait};
use core2::io::{Error as IoError, Read, Write};

/// The 512-byte wrapper some MediaTek devices prepend to the kernel and/or
/// ramdisk inside an otherwise stock Android image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtkHeader {
    pub magic: [u8; MTK_MAGIC_SIZE],
    /// Size of the payload that follows the wrapper.
    pub size: u32,
    /// NUL-padded payload type, e.g. `KERNEL` or `ROOTFS`.
    pub type_name: [u8; MTK_TYPE_SIZE],
    pub unused: [u8; MTK_UNUSED_SIZE],
}

impl MtkHeader {
    /// Creates a wrapper for a payload of the given type.
    pub fn new(type_name: &str, size: u32) -> Self {
        let mut header = Self {
            size,
            ..Self::default()
        };
        let len = type_name.len().min(MTK_TYPE_SIZE - 1);
        header.type_name[..len].copy_from_slice(&type_name.as_bytes()[..len]);
        header
    }

    pub fn parse(src: &[u8; MTK_HEADER_SIZE]) -> Self {
        let mut src = &src[..];

        Self {
            magic: take_array(&mut src),
            size: take_u32(&mut src),
            type_name: take_array(&mut src),
            unused: take_array(&mut src),
        }
    }

    /// Whether `blob` starts with an MTK wrapper.
    pub fn is_wrapped(blob: &[u8]) -> bool {
        blob.len() >= MTK_HEADER_SIZE && blob.starts_with(&MTK_MAGIC)
    }

    /// Splits a wrapped blob into its wrapper and payload.
    pub fn split(blob: &[u8]) -> Option<(Self, &[u8])> {
        if blob.len() < MTK_HEADER_SIZE {
            return None;
        }
        let (raw, payload) = blob.split_at(MTK_HEADER_SIZE);
        let header = Self::parse(raw.try_into().ok()?);
        header.has_correct_magic().then_some((header, payload))
    }

    /// The payload type with its NUL padding removed.
    pub fn type_str(&self) -> &str {
        let end = self
            .type_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MTK_TYPE_SIZE);
        core::str::from_utf8(&self.type_name[..end]).unwrap_or("")
    }
}

impl HeaderTrait for MtkHeader {
    fn header_size(&self) -> usize {
        MTK_HEADER_SIZE
    }

    fn has_correct_magic(&self) -> bool {
        self.magic == MTK_MAGIC
    }

    fn read_from<R>(src: &mut R) -> Result<Self, IoError>
    where
        Self: Sized,
        R: Read,
    {
        let mut buffer = [0; MTK_HEADER_SIZE];
        src.read_exact(&mut buffer)?;
        Ok(Self::parse(&buffer))
    }

    fn write_to<W>(&self, dst: &mut W) -> Result<usize, IoError>
    where
        Self: Sized,
        W: Write,
    {
        dst.write_all(&self.magic)?;
        put_u32(dst, self.size)?;
        dst.write_all(&self.type_name)?;
        dst.write_all(&self.unused)?;
        Ok(MTK_HEADER_SIZE)
    }
}

impl Default for MtkHeader {
    /// MediaTek tooling fills the reserved area with 0xff.
    fn default() -> Self {
        Self {
            magic: MTK_MAGIC,
            size: 0,
            type_name: [0; MTK_TYPE_SIZE],
            unused: [0xff; MTK_UNUSED_SIZE],
        }
    }
}
