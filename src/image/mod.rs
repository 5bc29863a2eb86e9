mod android;
mod checksum;
mod mtk;
mod sony_elf;

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use crate::errors::{DecodeError, DecodeWarning, EncodeError};
use crate::header::consts::*;
use crate::header::MtkHeader;
use log::debug;

pub use self::checksum::compute_id;

/// The boot image container shapes this crate understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Stock `ANDROID!` image.
    #[default]
    Android,
    /// Android layout, with MediaTek wrappers around the kernel and/or
    /// ramdisk.
    Mtk,
    /// ELF32-based image used by some Sony devices.
    SonyElf,
}

impl Format {
    /// Works out which format `data` is in, without decoding it.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if sony_elf::is_sony_elf(data) {
            return Some(Self::SonyElf);
        }
        let offset = android::find_android_header(data)?;
        if mtk::has_wrapper(data, offset) {
            Some(Self::Mtk)
        } else {
            Some(Self::Android)
        }
    }

    /// Decodes `data` as this format. Recoverable problems are pushed onto
    /// `warnings`.
    pub fn decode(
        self,
        data: &[u8],
        warnings: &mut Vec<DecodeWarning>,
    ) -> Result<(BootImage, usize), DecodeError> {
        match self {
            Self::Android => android::decode(data, android::SubHeader::None, warnings),
            Self::Mtk => android::decode(data, android::SubHeader::Mtk, warnings),
            Self::SonyElf => sony_elf::decode(data).map(|image| (image, 0)),
        }
    }

    /// Encodes `image` as this format, whatever format it was read from.
    pub fn encode(self, image: &BootImage) -> Result<Vec<u8>, EncodeError> {
        match self {
            Self::Android => android::encode(image, android::SubHeader::None),
            Self::Mtk => android::encode(image, android::SubHeader::Mtk),
            Self::SonyElf => sony_elf::encode(image),
        }
    }
}

/// The result of a successful decode.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub format: Format,
    /// Where the container header was found. Non-zero when a vendor
    /// signature was prepended.
    pub header_offset: usize,
    pub image: BootImage,
    pub warnings: Vec<DecodeWarning>,
}

/// Detects the format of `data` and decodes it, reporting any warnings.
pub fn decode_with_warnings(data: &[u8]) -> Result<Decoded, DecodeError> {
    let format = Format::detect(data).ok_or(DecodeError::HeaderNotFound)?;
    debug!("detected {:?} boot image", format);

    let mut warnings = Vec::new();
    let (image, header_offset) = format.decode(data, &mut warnings)?;
    Ok(Decoded {
        format,
        header_offset,
        image,
        warnings,
    })
}

/// Detects the format of `data` and decodes it.
pub fn decode(data: &[u8]) -> Result<BootImage, DecodeError> {
    decode_with_warnings(data).map(|decoded| decoded.image)
}

/// Encodes `image` in the format it was decoded from.
pub fn encode(image: &BootImage) -> Result<Vec<u8>, EncodeError> {
    image.format.encode(image)
}

/// Whether `page_size` is one the Android-family header allows.
pub fn is_valid_page_size(page_size: u32) -> bool {
    VALID_PAGE_SIZES.contains(&page_size)
}

/// Number of zero bytes needed after `size` bytes to reach the next
/// `page_size` boundary. `page_size` must be a power of two.
pub fn padding(size: usize, page_size: usize) -> usize {
    let mask = page_size - 1;
    (page_size - (size & mask)) & mask
}

/// Helper function to calculate how big something would be in pages, given
/// the size and the page size.
pub fn size_in_pages(size: usize, page_size: usize) -> usize {
    size.div_ceil(page_size)
}

/// A boot image in memory, independent of the container it came from. Used
/// to modify the boot image through a convenient interface.
///
/// The `hdr_*` fields echo what the container header declared; they are
/// informational and are recomputed from the blobs on encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootImage {
    /// The format this image was decoded from, and will be encoded to.
    pub format: Format,
    pub page_size: u32,
    pub kernel_addr: u32,
    pub ramdisk_addr: u32,
    pub second_addr: u32,
    pub tags_addr: u32,
    pub ipl_addr: u32,
    pub rpm_addr: u32,
    pub appsbl_addr: u32,
    /// Sony ELF entry point. Encode falls back to the kernel address (0
    /// without a kernel) when unset, and decode leaves it unset when the
    /// stored value equals that fallback.
    pub entrypoint: Option<u32>,
    /// Board name bytes, without NUL padding. Not necessarily UTF-8.
    pub board_name: Vec<u8>,
    /// Kernel command line bytes, without NUL padding. Not necessarily
    /// UTF-8.
    pub cmdline: Vec<u8>,

    pub hdr_kernel_size: u32,
    pub hdr_ramdisk_size: u32,
    pub hdr_second_size: u32,
    pub hdr_dt_size: u32,
    pub hdr_unused: u32,
    pub hdr_id: [u8; BOOT_ID_SIZE],

    /// MTK wrapper stripped from the kernel, if any.
    pub mtk_kernel_header: Option<MtkHeader>,
    /// MTK wrapper stripped from the ramdisk, if any.
    pub mtk_ramdisk_header: Option<MtkHeader>,

    kernel: Vec<u8>,
    ramdisk: Vec<u8>,
    second: Vec<u8>,
    device_tree: Vec<u8>,
    ipl: Vec<u8>,
    rpm: Vec<u8>,
    appsbl: Vec<u8>,
    // Caller-owned. No codec here fills or emits these, and SIN segments
    // are skipped on decode.
    aboot: Vec<u8>,
    sin: Vec<u8>,
    sin_header: Vec<u8>,
}

impl BootImage {
    /// Inserts a kernel into this boot image, returning the old one.
    pub fn insert_kernel(&mut self, mut new_kernel: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.kernel, &mut new_kernel);
        new_kernel
    }

    /// Inserts a ramdisk into this boot image, returning the old one.
    pub fn insert_ramdisk(&mut self, mut new_ramdisk: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.ramdisk, &mut new_ramdisk);
        new_ramdisk
    }

    /// Inserts a second bootloader into this boot image, returning the old
    /// one.
    pub fn insert_second(&mut self, mut new_second: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.second, &mut new_second);
        new_second
    }

    /// Inserts a device tree into this boot image, returning the old one.
    pub fn insert_device_tree(&mut self, mut new_device_tree: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.device_tree, &mut new_device_tree);
        new_device_tree
    }

    /// Stores an aboot image alongside this one, returning the old one.
    /// It is carried for the caller and never written by [`encode`].
    pub fn insert_aboot(&mut self, mut new_aboot: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.aboot, &mut new_aboot);
        new_aboot
    }

    pub fn insert_ipl(&mut self, mut new_ipl: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.ipl, &mut new_ipl);
        new_ipl
    }

    pub fn insert_rpm(&mut self, mut new_rpm: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.rpm, &mut new_rpm);
        new_rpm
    }

    pub fn insert_appsbl(&mut self, mut new_appsbl: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.appsbl, &mut new_appsbl);
        new_appsbl
    }

    /// Stores a SIN payload alongside this image. Like the aboot slot, it
    /// is never filled by [`decode`] or written by [`encode`].
    pub fn insert_sin(&mut self, mut new_sin: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.sin, &mut new_sin);
        new_sin
    }

    pub fn insert_sin_header(&mut self, mut new_sin_header: Vec<u8>) -> Vec<u8> {
        core::mem::swap(&mut self.sin_header, &mut new_sin_header);
        new_sin_header
    }

    /// Returns a reference to the kernel.
    pub fn kernel(&self) -> &[u8] {
        &self.kernel
    }

    /// Returns a reference to the ramdisk.
    pub fn ramdisk(&self) -> &[u8] {
        &self.ramdisk
    }

    /// Returns a reference to the second bootloader. Empty when absent.
    pub fn second(&self) -> &[u8] {
        &self.second
    }

    /// Returns a reference to the device tree. Empty when absent.
    pub fn device_tree(&self) -> &[u8] {
        &self.device_tree
    }

    pub fn aboot(&self) -> &[u8] {
        &self.aboot
    }

    pub fn ipl(&self) -> &[u8] {
        &self.ipl
    }

    pub fn rpm(&self) -> &[u8] {
        &self.rpm
    }

    pub fn appsbl(&self) -> &[u8] {
        &self.appsbl
    }

    pub fn sin(&self) -> &[u8] {
        &self.sin
    }

    pub fn sin_header(&self) -> &[u8] {
        &self.sin_header
    }

    /// The board name as text, with invalid UTF-8 replaced.
    pub fn board_name_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.board_name)
    }

    /// The kernel command line as text, with invalid UTF-8 replaced.
    pub fn cmdline_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.cmdline)
    }

    /// Returns the size of a single page.
    pub fn page_size(&self) -> usize {
        self.page_size as usize
    }

    /// Parses `data`, see [`decode`].
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode(data)
    }

    /// Serializes this image, see [`encode`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode(self)
    }
}

impl Default for BootImage {
    /// Creates a new default boot image, with no sections at all.
    fn default() -> Self {
        Self {
            format: Format::Android,
            page_size: DEFAULT_PAGE_SIZE,
            kernel_addr: DEFAULT_BASE + DEFAULT_KERNEL_OFFSET,
            ramdisk_addr: DEFAULT_BASE + DEFAULT_RAMDISK_OFFSET,
            second_addr: DEFAULT_BASE + DEFAULT_SECOND_OFFSET,
            tags_addr: DEFAULT_BASE + DEFAULT_TAGS_OFFSET,
            ipl_addr: 0,
            rpm_addr: 0,
            appsbl_addr: 0,
            entrypoint: None,
            board_name: Vec::new(),
            cmdline: Vec::new(),
            hdr_kernel_size: 0,
            hdr_ramdisk_size: 0,
            hdr_second_size: 0,
            hdr_dt_size: 0,
            hdr_unused: 0,
            hdr_id: [0; BOOT_ID_SIZE],
            mtk_kernel_header: None,
            mtk_ramdisk_header: None,
            kernel: Vec::new(),
            ramdisk: Vec::new(),
            second: Vec::new(),
            device_tree: Vec::new(),
            ipl: Vec::new(),
            rpm: Vec::new(),
            appsbl: Vec::new(),
            aboot: Vec::new(),
            sin: Vec::new(),
            sin_header: Vec::new(),
        }
    }
}

/// Returns the bytes of a fixed-width field up to its first NUL.
fn bytes_from_field(field: &[u8]) -> Vec<u8> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    field[..end].to_vec()
}

/// Copies `value` into a zeroed field of `N` bytes, keeping at least one
/// trailing NUL. Longer values are silently truncated.
fn bytes_to_field<const N: usize>(value: &[u8]) -> [u8; N] {
    let mut field = [0u8; N];
    let len = value.len().min(N - 1);
    field[..len].copy_from_slice(&value[..len]);
    field
}
