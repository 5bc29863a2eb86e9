use byteorder::{ByteOrder, LittleEndian};
use core::fmt::Debug;
use core2::io::{Error, Read, Write};

pub mod consts;
mod android_header;
mod mtk_header;
mod sony_elf_header;

pub use self::android_header::AndroidHeader;
pub use self::mtk_header::MtkHeader;
pub use self::sony_elf_header::{ElfHeader, ProgramHeader};

/// A fixed-width record that lives somewhere inside a boot image.
pub trait HeaderTrait: Debug {
    fn header_size(&self) -> usize;
    fn has_correct_magic(&self) -> bool;
    fn read_from<R>(src: &mut R) -> Result<Self, Error>
    where
        Self: Sized,
        R: Read;
    fn write_to<W>(&self, dst: &mut W) -> Result<usize, Error>
    where
        Self: Sized,
        W: Write;
}

/// Scans `data[0..=search_range]` for `magic` and returns the first offset
/// it starts at.
///
/// Returns `None` when the buffer is too small to hold `header_size` bytes
/// past the end of the search window, or when the magic is nowhere to be
/// found.
pub fn find_header(
    data: &[u8],
    magic: &[u8],
    header_size: usize,
    search_range: usize,
) -> Option<usize> {
    if data.len() < search_range + header_size {
        return None;
    }

    (0..=search_range).find(|&offset| data[offset..].starts_with(magic))
}

// Cursor helpers over fixed-size records. Callers always hand in a slice
// at least as long as the record being parsed.

pub(crate) fn take_u16(src: &mut &[u8]) -> u16 {
    let value = LittleEndian::read_u16(src);
    *src = &src[2..];
    value
}

pub(crate) fn take_u32(src: &mut &[u8]) -> u32 {
    let value = LittleEndian::read_u32(src);
    *src = &src[4..];
    value
}

pub(crate) fn take_array<const N: usize>(src: &mut &[u8]) -> [u8; N] {
    let mut buffer = [0u8; N];
    buffer.copy_from_slice(&src[..N]);
    *src = &src[N..];
    buffer
}

pub(crate) fn put_u16<W: Write>(dst: &mut W, value: u16) -> Result<(), Error> {
    let mut buffer = [0u8; 2];
    LittleEndian::write_u16(&mut buffer, value);
    dst.write_all(&buffer)
}

pub(crate) fn put_u32<W: Write>(dst: &mut W, value: u32) -> Result<(), Error> {
    let mut buffer = [0u8; 4];
    LittleEndian::write_u32(&mut buffer, value);
    dst.write_all(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const MAGIC: &[u8] = b"ANDROID!";

    #[test]
    fn finds_magic_at_start() {
        let mut data = vec![0u8; 2048];
        data[..8].copy_from_slice(MAGIC);
        assert_eq!(find_header(&data, MAGIC, 608, 512), Some(0));
    }

    #[test]
    fn finds_magic_behind_signing_prefix() {
        let mut data = vec![0u8; 2048];
        data[300..308].copy_from_slice(MAGIC);
        assert_eq!(find_header(&data, MAGIC, 608, 512), Some(300));
    }

    #[test]
    fn returns_lowest_match() {
        let mut data = vec![0u8; 2048];
        data[40..48].copy_from_slice(MAGIC);
        data[100..108].copy_from_slice(MAGIC);
        data[512..520].copy_from_slice(MAGIC);
        assert_eq!(find_header(&data, MAGIC, 608, 512), Some(40));
    }

    #[test]
    fn partial_magic_does_not_match() {
        let mut data = vec![0u8; 2048];
        data[10..17].copy_from_slice(b"ANDROID");
        data[64..72].copy_from_slice(MAGIC);
        assert_eq!(find_header(&data, MAGIC, 608, 512), Some(64));
    }

    #[test]
    fn magic_past_window_is_ignored() {
        let mut data = vec![0u8; 4096];
        data[513..521].copy_from_slice(MAGIC);
        assert_eq!(find_header(&data, MAGIC, 608, 512), None);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut data = vec![0u8; 512 + 607];
        data[..8].copy_from_slice(MAGIC);
        assert_eq!(find_header(&data, MAGIC, 608, 512), None);
    }

    #[test]
    fn cursor_helpers_advance() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00, b'a', b'b'];
        let mut src = &data[..];
        assert_eq!(take_u16(&mut src), 1);
        assert_eq!(take_u32(&mut src), 2);
        assert_eq!(take_array::<2>(&mut src), *b"ab");
        assert!(src.is_empty());
    }
}
