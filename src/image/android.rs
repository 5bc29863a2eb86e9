use super::{bytes_from_field, bytes_to_field, is_valid_page_size, mtk, padding, size_in_pages};
use super::{compute_id, BootImage, Format};
use crate::errors::{DecodeError, DecodeWarning, EncodeError, Segment};
use crate::header::consts::*;
use crate::header::{find_header, AndroidHeader, HeaderTrait, MtkHeader};
use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;
use core2::io::{Error as IoError, Write};
use log::{debug, trace, warn};

/// What, if anything, may be wrapped around the kernel and ramdisk inside
/// the Android layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SubHeader {
    None,
    Mtk,
}

impl SubHeader {
    fn format(self) -> Format {
        match self {
            Self::None => Format::Android,
            Self::Mtk => Format::Mtk,
        }
    }

    /// Returns the bytes that go into the image for one component.
    fn wrap<'a>(
        self,
        wrapper: Option<&MtkHeader>,
        payload: &'a [u8],
        segment: Segment,
    ) -> Result<Cow<'a, [u8]>, EncodeError> {
        match (self, wrapper) {
            (Self::Mtk, Some(wrapper)) => mtk::wrap(wrapper, payload, segment).map(Cow::Owned),
            _ => Ok(Cow::Borrowed(payload)),
        }
    }
}

pub(super) fn find_android_header(data: &[u8]) -> Option<usize> {
    find_header(data, &BOOT_MAGIC, BOOT_HEADER_SIZE, HEADER_SEARCH_RANGE)
}

/// Reads the header at `offset`, as returned by [`find_android_header`].
pub(super) fn read_header(data: &[u8], offset: usize) -> Result<AndroidHeader, DecodeError> {
    let mut src = data.get(offset..).ok_or(DecodeError::HeaderNotFound)?;
    let header = AndroidHeader::read_from(&mut src).map_err(|_| DecodeError::HeaderNotFound)?;
    if !header.has_correct_magic() {
        return Err(DecodeError::HeaderNotFound);
    }
    Ok(header)
}

/// Offset of the first payload byte: the header, padded to a page.
pub(super) fn kernel_offset(header_offset: usize, page_size: usize) -> usize {
    header_offset + BOOT_HEADER_SIZE + padding(BOOT_HEADER_SIZE, page_size)
}

/// Takes `size` bytes at `pos` and moves `pos` past them and their padding.
fn take_segment<'a>(
    data: &'a [u8],
    pos: &mut usize,
    size: u32,
    page_size: usize,
    segment: Segment,
) -> Result<&'a [u8], DecodeError> {
    let size = size as usize;
    if size == 0 {
        return Ok(&[]);
    }

    let start = *pos;
    let end = start.saturating_add(size);
    if end > data.len() {
        return Err(DecodeError::SegmentOverrun {
            segment,
            overrun: end - data.len(),
        });
    }

    *pos = end + padding(size, page_size);
    Ok(&data[start..end])
}

pub(super) fn decode(
    data: &[u8],
    sub_header: SubHeader,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<(BootImage, usize), DecodeError> {
    let offset = find_android_header(data).ok_or(DecodeError::HeaderNotFound)?;
    debug!("found Android header at offset {}", offset);

    let header = read_header(data, offset)?;
    if !is_valid_page_size(header.page_size) {
        return Err(DecodeError::InvalidPageSize(header.page_size));
    }
    let page_size = header.page_size as usize;

    let mut pos = kernel_offset(offset, page_size);
    let kernel = take_segment(data, &mut pos, header.kernel_size, page_size, Segment::Kernel)?;
    let ramdisk = take_segment(data, &mut pos, header.ramdisk_size, page_size, Segment::Ramdisk)?;
    let second = take_segment(data, &mut pos, header.second_size, page_size, Segment::Second)?;

    // Some vendors ship images whose device tree runs off the end of the
    // file. Keep what is there.
    let declared = header.dt_size as usize;
    let start = pos.min(data.len());
    let available = data.len() - start;
    let device_tree = if declared > available {
        let warning = DecodeWarning::DeviceTreeTruncated {
            declared,
            available,
        };
        warn!("{}", warning);
        warnings.push(warning);
        &data[start..]
    } else {
        &data[start..start + declared]
    };

    let mut image = BootImage {
        format: sub_header.format(),
        page_size: header.page_size,
        kernel_addr: header.kernel_addr,
        ramdisk_addr: header.ramdisk_addr,
        second_addr: header.second_addr,
        tags_addr: header.tags_addr,
        board_name: bytes_from_field(&header.name),
        cmdline: bytes_from_field(&header.cmdline),
        hdr_kernel_size: header.kernel_size,
        hdr_ramdisk_size: header.ramdisk_size,
        hdr_second_size: header.second_size,
        hdr_dt_size: header.dt_size,
        hdr_unused: header.unused,
        hdr_id: header.id,
        ..BootImage::default()
    };
    image.insert_kernel(kernel.to_vec());
    image.insert_ramdisk(ramdisk.to_vec());
    image.insert_second(second.to_vec());
    image.insert_device_tree(device_tree.to_vec());

    if sub_header == SubHeader::Mtk {
        mtk::unwrap(&mut image, warnings)?;
    }

    Ok((image, offset))
}

fn size_field(data: &[u8], segment: Segment) -> Result<u32, EncodeError> {
    u32::try_from(data.len()).map_err(|_| EncodeError::ComponentTooLarge {
        segment,
        size: data.len(),
    })
}

fn write_padding<W: Write>(dst: &mut W, size: usize, page_size: usize) -> Result<(), IoError> {
    let count = padding(size, page_size);
    if count > 0 {
        dst.write_all(&vec![0u8; count])?;
    }
    Ok(())
}

fn write_segment<W: Write>(dst: &mut W, data: &[u8], page_size: usize) -> Result<(), IoError> {
    dst.write_all(data)?;
    write_padding(dst, data.len(), page_size)
}

pub(super) fn encode(image: &BootImage, sub_header: SubHeader) -> Result<Vec<u8>, EncodeError> {
    if !is_valid_page_size(image.page_size) {
        return Err(EncodeError::InvalidPageSize(image.page_size));
    }
    let page_size = image.page_size();

    let kernel = sub_header.wrap(
        image.mtk_kernel_header.as_ref(),
        image.kernel(),
        Segment::Kernel,
    )?;
    let ramdisk = sub_header.wrap(
        image.mtk_ramdisk_header.as_ref(),
        image.ramdisk(),
        Segment::Ramdisk,
    )?;
    let second = image.second();
    let device_tree = image.device_tree();

    let mut header = AndroidHeader {
        kernel_size: size_field(&kernel, Segment::Kernel)?,
        kernel_addr: image.kernel_addr,
        ramdisk_size: size_field(&ramdisk, Segment::Ramdisk)?,
        ramdisk_addr: image.ramdisk_addr,
        second_size: size_field(second, Segment::Second)?,
        second_addr: image.second_addr,
        tags_addr: image.tags_addr,
        page_size: image.page_size,
        dt_size: size_field(device_tree, Segment::DeviceTree)?,
        unused: image.hdr_unused,
        name: bytes_to_field(&image.board_name),
        cmdline: bytes_to_field(&image.cmdline),
        ..AndroidHeader::default()
    };
    header.id = compute_id(&header, &kernel, &ramdisk, second, device_tree);

    let header_size = header.header_size();
    let pages: usize = [header_size, kernel.len(), ramdisk.len(), second.len(), device_tree.len()]
        .iter()
        .map(|&size| size_in_pages(size, page_size))
        .sum();
    let mut out = Vec::with_capacity(pages * page_size);

    header.write_to(&mut out)?;
    write_padding(&mut out, header_size, page_size)?;
    trace!("kernel at {:#x}, {} bytes", out.len(), kernel.len());
    write_segment(&mut out, &kernel, page_size)?;
    trace!("ramdisk at {:#x}, {} bytes", out.len(), ramdisk.len());
    write_segment(&mut out, &ramdisk, page_size)?;
    if !second.is_empty() {
        trace!("second at {:#x}, {} bytes", out.len(), second.len());
        write_segment(&mut out, second, page_size)?;
    }
    if !device_tree.is_empty() {
        trace!("device tree at {:#x}, {} bytes", out.len(), device_tree.len());
        write_segment(&mut out, device_tree, page_size)?;
    }

    Ok(out)
}
