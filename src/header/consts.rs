pub use self::android::*;

/// How far into a buffer the Android-family magic may sit. Some vendors
/// prepend a signing header before the real container.
pub const HEADER_SEARCH_RANGE: usize = 512;

/// Page sizes accepted by the Android-family header.
pub const VALID_PAGE_SIZES: [u32; 7] = [2048, 4096, 8192, 16384, 32768, 65536, 131072];

mod android {
    pub const BOOT_MAGIC: [u8; BOOT_MAGIC_SIZE] = *b"ANDROID!";
    pub const BOOT_MAGIC_SIZE: usize = 8;
    pub const BOOT_NAME_SIZE: usize = 16;
    pub const BOOT_ARGS_SIZE: usize = 512;
    pub const BOOT_ID_SIZE: usize = 32;
    /// magic + 10 words + name + cmdline + id.
    pub const BOOT_HEADER_SIZE: usize =
        BOOT_MAGIC_SIZE + 10 * 4 + BOOT_NAME_SIZE + BOOT_ARGS_SIZE + BOOT_ID_SIZE;

    pub const DEFAULT_BASE: u32 = 0x1000_0000;
    pub const DEFAULT_KERNEL_OFFSET: u32 = 0x0000_8000;
    pub const DEFAULT_RAMDISK_OFFSET: u32 = 0x0100_0000;
    pub const DEFAULT_SECOND_OFFSET: u32 = 0x00f0_0000;
    pub const DEFAULT_TAGS_OFFSET: u32 = 0x0000_0100;
    pub const DEFAULT_PAGE_SIZE: u32 = 2048;
}

pub mod mtk {
    pub const MTK_MAGIC: [u8; MTK_MAGIC_SIZE] = [0x88, 0x16, 0x88, 0x58];
    pub const MTK_MAGIC_SIZE: usize = 4;
    pub const MTK_TYPE_SIZE: usize = 32;
    pub const MTK_UNUSED_SIZE: usize = 472;
    pub const MTK_HEADER_SIZE: usize = MTK_MAGIC_SIZE + 4 + MTK_TYPE_SIZE + MTK_UNUSED_SIZE;
}

pub mod sony_elf {
    pub const ELF_MAGIC: [u8; ELF_MAGIC_SIZE] = [0x7f, b'E', b'L', b'F'];
    pub const ELF_MAGIC_SIZE: usize = 4;
    pub const EI_NIDENT: usize = 16;
    /// Identification bytes written by the Sony tooling: ELF32, little
    /// endian, version 1, vendor ABI 0x61.
    pub const SONY_E_IDENT: [u8; 8] = [0x7f, b'E', b'L', b'F', 0x01, 0x01, 0x01, 0x61];

    pub const ELF32_EHDR_SIZE: usize = 52;
    pub const ELF32_PHDR_SIZE: usize = 32;

    pub const SONY_E_TYPE: u16 = 2;
    pub const SONY_E_MACHINE: u16 = 40;
    pub const SONY_E_VERSION: u32 = 1;

    /// Payload bytes always start here, whatever the size of the tables.
    pub const SONY_PAYLOAD_OFFSET: usize = 4096;

    pub const PT_LOAD: u32 = 1;
    pub const PT_NOTE: u32 = 4;
    /// "\0NIS"
    pub const PT_SIN: u32 = 0x5349_4e00;

    pub const SONY_FLAGS_KERNEL: u32 = 0x0000_0000;
    pub const SONY_FLAGS_RAMDISK: u32 = 0x8000_0000;
    pub const SONY_FLAGS_IPL: u32 = 0x4000_0000;
    pub const SONY_FLAGS_RPM: u32 = 0x0100_0000;
    pub const SONY_FLAGS_APPSBL: u32 = 0x0200_0000;
    pub const SONY_FLAGS_CMDLINE: u32 = 0x0200_0000;
    pub const SONY_FLAGS_SIN: u32 = 0x0000_0000;
}
