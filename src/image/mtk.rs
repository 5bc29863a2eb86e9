use super::android::{kernel_offset, read_header};
use super::{is_valid_page_size, padding, BootImage};
use crate::errors::{DecodeError, DecodeWarning, EncodeError, Segment};
use crate::header::consts::mtk::MTK_HEADER_SIZE;
use crate::header::{HeaderTrait, MtkHeader};
use alloc::vec::Vec;
use log::warn;

/// Whether the Android image whose header sits at `header_offset` has an MTK
/// wrapper around its kernel or ramdisk.
pub(super) fn has_wrapper(data: &[u8], header_offset: usize) -> bool {
    let header = match read_header(data, header_offset) {
        Ok(header) => header,
        Err(_) => return false,
    };
    if !is_valid_page_size(header.page_size) {
        return false;
    }
    let page_size = header.page_size as usize;
    let kernel_size = header.kernel_size as usize;
    let ramdisk_size = header.ramdisk_size as usize;

    let kernel_start = kernel_offset(header_offset, page_size);
    let ramdisk_start = match kernel_start
        .checked_add(kernel_size)
        .and_then(|end| end.checked_add(padding(kernel_size, page_size)))
    {
        Some(start) => start,
        None => return false,
    };

    [(kernel_start, kernel_size), (ramdisk_start, ramdisk_size)]
        .iter()
        .filter_map(|&(start, size)| data.get(start..start.saturating_add(size)))
        .any(MtkHeader::is_wrapped)
}

/// Moves MTK wrappers out of the kernel and ramdisk blobs into their own
/// fields.
///
/// A kernel whose wrapper disagrees with the payload length is kept with a
/// warning. The same mismatch on the ramdisk is fatal.
pub(super) fn unwrap(
    image: &mut BootImage,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<(), DecodeError> {
    let kernel = MtkHeader::split(image.kernel()).map(|(header, payload)| (header, payload.to_vec()));
    if let Some((header, payload)) = kernel {
        if header.size as usize != payload.len() {
            let warning = DecodeWarning::KernelWrapperSizeMismatch {
                declared: header.size,
                actual: payload.len(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
        image.insert_kernel(payload);
        image.mtk_kernel_header = Some(header);
    }

    let ramdisk = MtkHeader::split(image.ramdisk()).map(|(header, payload)| (header, payload.to_vec()));
    if let Some((header, payload)) = ramdisk {
        if header.size as usize != payload.len() {
            return Err(DecodeError::RamdiskWrapperSizeMismatch {
                declared: header.size,
                actual: payload.len(),
            });
        }
        image.insert_ramdisk(payload);
        image.mtk_ramdisk_header = Some(header);
    }

    Ok(())
}

/// Prepends `wrapper` to `payload`, with its size rewritten to match.
pub(super) fn wrap(
    wrapper: &MtkHeader,
    payload: &[u8],
    segment: Segment,
) -> Result<Vec<u8>, EncodeError> {
    let mut wrapper = wrapper.clone();
    wrapper.size = u32::try_from(payload.len()).map_err(|_| EncodeError::ComponentTooLarge {
        segment,
        size: payload.len(),
    })?;

    let mut out = Vec::with_capacity(MTK_HEADER_SIZE + payload.len());
    wrapper.write_to(&mut out)?;
    out.extend_from_slice(payload);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::android::{self, SubHeader};
    use super::super::{compute_id, Format};
    use super::*;
    use alloc::vec;

    fn wrapped(type_name: &str, declared: u32, payload: &[u8]) -> Vec<u8> {
        let mut blob = Vec::new();
        MtkHeader::new(type_name, declared).write_to(&mut blob).unwrap();
        blob.extend_from_slice(payload);
        blob
    }

    /// Builds an image with the given raw kernel and ramdisk blobs, wrappers
    /// included, exactly as they should appear on disk.
    fn raw_image(kernel: Vec<u8>, ramdisk: Vec<u8>) -> Vec<u8> {
        let mut image = BootImage::default();
        image.insert_kernel(kernel);
        image.insert_ramdisk(ramdisk);
        android::encode(&image, SubHeader::None).unwrap()
    }

    fn decode_mtk(data: &[u8]) -> Result<(BootImage, Vec<DecodeWarning>), DecodeError> {
        let mut warnings = Vec::new();
        android::decode(data, SubHeader::Mtk, &mut warnings).map(|(image, _)| (image, warnings))
    }

    #[test]
    fn wrappers_are_detected_and_stripped() {
        let data = raw_image(
            wrapped("KERNEL", 700, &[0x11; 700]),
            wrapped("ROOTFS", 300, &[0x22; 300]),
        );
        assert!(has_wrapper(&data, 0));
        assert_eq!(Format::detect(&data), Some(Format::Mtk));

        let (image, warnings) = decode_mtk(&data).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(image.format, Format::Mtk);
        assert_eq!(image.kernel(), &[0x11; 700][..]);
        assert_eq!(image.ramdisk(), &[0x22; 300][..]);
        assert_eq!(image.mtk_kernel_header.as_ref().unwrap().type_str(), "KERNEL");
        assert_eq!(image.mtk_ramdisk_header.as_ref().unwrap().type_str(), "ROOTFS");
        assert!(!MtkHeader::is_wrapped(image.kernel()));
        assert!(!MtkHeader::is_wrapped(image.ramdisk()));
    }

    #[test]
    fn wrapper_may_cover_only_the_ramdisk() {
        let data = raw_image(vec![0x11; 700], wrapped("ROOTFS", 300, &[0x22; 300]));
        assert_eq!(Format::detect(&data), Some(Format::Mtk));

        let (image, _) = decode_mtk(&data).unwrap();
        assert!(image.mtk_kernel_header.is_none());
        assert!(image.mtk_ramdisk_header.is_some());
        assert_eq!(image.kernel(), &[0x11; 700][..]);
    }

    #[test]
    fn plain_android_image_is_not_mtk() {
        let data = raw_image(vec![0x11; 700], vec![0x22; 300]);
        assert!(!has_wrapper(&data, 0));
        assert_eq!(Format::detect(&data), Some(Format::Android));

        let (image, _) = decode_mtk(&data).unwrap();
        assert!(image.mtk_kernel_header.is_none());
        assert!(image.mtk_ramdisk_header.is_none());
    }

    #[test]
    fn oversized_kernel_size_is_not_mtk() {
        let mut data = raw_image(vec![0x11; 700], vec![0x22; 300]);
        data[8..12].copy_from_slice(&0xffff_f900u32.to_le_bytes());
        assert!(!has_wrapper(&data, 0));
        assert_eq!(Format::detect(&data), Some(Format::Android));

        data[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(!has_wrapper(&data, 0));
    }

    #[test]
    fn kernel_size_mismatch_is_a_warning() {
        let data = raw_image(wrapped("KERNEL", 100, &[0x11; 90]), vec![0x22; 300]);
        let (image, warnings) = decode_mtk(&data).unwrap();
        assert_eq!(
            warnings,
            vec![DecodeWarning::KernelWrapperSizeMismatch {
                declared: 100,
                actual: 90,
            }]
        );
        assert_eq!(image.kernel(), &[0x11; 90][..]);
        assert_eq!(image.mtk_kernel_header.as_ref().unwrap().size, 100);

        let reencoded = android::encode(&image, SubHeader::Mtk).unwrap();
        let header = read_header(&reencoded, 0).unwrap();
        assert_eq!(header.kernel_size, 512 + 90);
        let kernel = &reencoded[2048..2048 + 512 + 90];
        assert_eq!(MtkHeader::split(kernel).unwrap().0.size, 90);
    }

    #[test]
    fn ramdisk_size_mismatch_is_fatal() {
        let data = raw_image(vec![0x11; 700], wrapped("ROOTFS", 300, &[0x22; 200]));
        assert_eq!(
            decode_mtk(&data).unwrap_err(),
            DecodeError::RamdiskWrapperSizeMismatch {
                declared: 300,
                actual: 200,
            }
        );
    }

    #[test]
    fn wrappers_count_towards_sizes_and_id() {
        let mut image = BootImage {
            format: Format::Mtk,
            mtk_kernel_header: Some(MtkHeader::new("KERNEL", 0)),
            mtk_ramdisk_header: Some(MtkHeader::new("ROOTFS", 0)),
            ..BootImage::default()
        };
        image.insert_kernel(vec![0x11; 1000]);
        image.insert_ramdisk(vec![0x22; 400]);

        let data = android::encode(&image, SubHeader::Mtk).unwrap();
        let header = read_header(&data, 0).unwrap();
        assert_eq!(header.kernel_size, 1512);
        assert_eq!(header.ramdisk_size, 912);

        let kernel = &data[2048..2048 + 1512];
        let ramdisk = &data[4096..4096 + 912];
        assert_eq!(MtkHeader::split(kernel).unwrap().0.size, 1000);
        assert_eq!(MtkHeader::split(ramdisk).unwrap().0.size, 400);
        assert_eq!(header.id, compute_id(&header, kernel, ramdisk, &[], &[]));

        let (decoded, warnings) = decode_mtk(&data).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(decoded.kernel(), image.kernel());
        assert_eq!(decoded.ramdisk(), image.ramdisk());
    }

    #[test]
    fn android_format_drops_wrappers() {
        let mut image = BootImage {
            mtk_kernel_header: Some(MtkHeader::new("KERNEL", 0)),
            ..BootImage::default()
        };
        image.insert_kernel(vec![0x11; 1000]);

        let data = android::encode(&image, SubHeader::None).unwrap();
        assert_eq!(read_header(&data, 0).unwrap().kernel_size, 1000);
    }
}
