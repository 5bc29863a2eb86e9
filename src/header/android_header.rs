use super::consts::*;
use super::{put_u32, take_array, take_u32, HeaderTrait};
use core2::io::{Error as IoError, Read, Write};

/// The fixed header at the front of every Android-family boot image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidHeader {
    /// Header magic. Used to make sure this is in fact a header.
    pub magic: [u8; BOOT_MAGIC_SIZE],
    /// Kernel size, in bytes.
    pub kernel_size: u32,
    /// Address the kernel should be loaded to.
    pub kernel_addr: u32,
    /// Ramdisk size, in bytes.
    pub ramdisk_size: u32,
    /// Address the ramdisk should be loaded to.
    pub ramdisk_addr: u32,
    /// Size of an optional second bootloader.
    pub second_size: u32,
    /// Address the optional second bootloader should be loaded to.
    pub second_addr: u32,
    /// Physical address of the kernel tags.
    pub tags_addr: u32,
    /// The page size.
    pub page_size: u32,
    /// The size of the device tree, in bytes. 0 when there is none.
    pub dt_size: u32,
    /// Reserved, echoed through untouched.
    pub unused: u32,
    /// Name of the board. This is a null-terminated ASCII string.
    pub name: [u8; BOOT_NAME_SIZE],
    /// Arguments to pass to the kernel during boot.
    pub cmdline: [u8; BOOT_ARGS_SIZE],
    /// Content digest. Only the first 20 bytes are used.
    pub id: [u8; BOOT_ID_SIZE],
}

impl AndroidHeader {
    /// Reads a header from the supplied source. This does not perform the
    /// magic check, and as a result cannot error.
    pub fn parse(src: &[u8; BOOT_HEADER_SIZE]) -> Self {
        let mut src = &src[..];

        Self {
            magic: take_array(&mut src),
            kernel_size: take_u32(&mut src),
            kernel_addr: take_u32(&mut src),
            ramdisk_size: take_u32(&mut src),
            ramdisk_addr: take_u32(&mut src),
            second_size: take_u32(&mut src),
            second_addr: take_u32(&mut src),
            tags_addr: take_u32(&mut src),
            page_size: take_u32(&mut src),
            dt_size: take_u32(&mut src),
            unused: take_u32(&mut src),
            name: take_array(&mut src),
            cmdline: take_array(&mut src),
            id: take_array(&mut src),
        }
    }
}

impl HeaderTrait for AndroidHeader {
    fn header_size(&self) -> usize {
        BOOT_HEADER_SIZE
    }

    fn has_correct_magic(&self) -> bool {
        self.magic == BOOT_MAGIC
    }

    fn read_from<R>(src: &mut R) -> Result<Self, IoError>
    where
        Self: Sized,
        R: Read,
    {
        let mut buffer = [0; BOOT_HEADER_SIZE];
        src.read_exact(&mut buffer)?;
        Ok(Self::parse(&buffer))
    }

    fn write_to<W>(&self, dst: &mut W) -> Result<usize, IoError>
    where
        Self: Sized,
        W: Write,
    {
        dst.write_all(&self.magic)?;
        put_u32(dst, self.kernel_size)?;
        put_u32(dst, self.kernel_addr)?;
        put_u32(dst, self.ramdisk_size)?;
        put_u32(dst, self.ramdisk_addr)?;
        put_u32(dst, self.second_size)?;
        put_u32(dst, self.second_addr)?;
        put_u32(dst, self.tags_addr)?;
        put_u32(dst, self.page_size)?;
        put_u32(dst, self.dt_size)?;
        put_u32(dst, self.unused)?;
        dst.write_all(&self.name)?;
        dst.write_all(&self.cmdline)?;
        dst.write_all(&self.id)?;
        Ok(BOOT_HEADER_SIZE)
    }
}

impl Default for AndroidHeader {
    fn default() -> Self {
        Self {
            magic: BOOT_MAGIC,
            kernel_size: 0,
            kernel_addr: DEFAULT_BASE + DEFAULT_KERNEL_OFFSET,
            ramdisk_size: 0,
            ramdisk_addr: DEFAULT_BASE + DEFAULT_RAMDISK_OFFSET,
            second_size: 0,
            second_addr: DEFAULT_BASE + DEFAULT_SECOND_OFFSET,
            tags_addr: DEFAULT_BASE + DEFAULT_TAGS_OFFSET,
            page_size: DEFAULT_PAGE_SIZE,
            dt_size: 0,
            unused: 0,
            name: [0; BOOT_NAME_SIZE],
            cmdline: [0; BOOT_ARGS_SIZE],
            id: [0; BOOT_ID_SIZE],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn header_is_608_bytes() {
        assert_eq!(BOOT_HEADER_SIZE, 608);
        assert_eq!(AndroidHeader::default().header_size(), 608);
    }

    #[test]
    fn field_offsets_match_layout() {
        let header = AndroidHeader {
            kernel_size: 0x11,
            page_size: 4096,
            dt_size: 0x22,
            unused: 0xdead_beef,
            ..AndroidHeader::default()
        };
        let mut out = Vec::new();
        assert_eq!(header.write_to(&mut out).unwrap(), BOOT_HEADER_SIZE);
        assert_eq!(out.len(), BOOT_HEADER_SIZE);
        assert_eq!(&out[..8], b"ANDROID!");
        assert_eq!(&out[8..12], &[0x11, 0, 0, 0]);
        assert_eq!(&out[36..40], &4096u32.to_le_bytes());
        assert_eq!(&out[40..44], &[0x22, 0, 0, 0]);
        assert_eq!(&out[44..48], &0xdead_beefu32.to_le_bytes());
    }

    #[test]
    fn read_back_what_was_written() {
        let mut header = AndroidHeader::default();
        header.name[..4].copy_from_slice(b"mako");
        header.cmdline[..7].copy_from_slice(b"quiet=1");
        header.id[0] = 0xaa;

        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        let parsed = AndroidHeader::read_from(&mut &out[..]).unwrap();
        assert!(parsed.has_correct_magic());
        assert_eq!(parsed, header);
    }

    #[test]
    fn short_source_is_an_io_error() {
        let data = [0u8; 100];
        assert!(AndroidHeader::read_from(&mut &data[..]).is_err());
    }
}
