use crate::header::consts::BOOT_ID_SIZE;
use crate::header::AndroidHeader;
use byteorder::{ByteOrder, LittleEndian};
use sha1::{Digest, Sha1};

fn size_field(size: u32) -> [u8; 4] {
    let mut buffer = [0u8; 4];
    LittleEndian::write_u32(&mut buffer, size);
    buffer
}

/// Computes the id stored in an Android-family header.
///
/// This follows mkbootimg exactly, quirks included: the second bootloader
/// size is hashed even when it is zero, while the device tree size is only
/// hashed when a device tree is present. The size fields are taken from
/// `header`, the bytes from the slices, so for MTK images the slices must
/// include the wrappers.
pub fn compute_id(
    header: &AndroidHeader,
    kernel: &[u8],
    ramdisk: &[u8],
    second: &[u8],
    device_tree: &[u8],
) -> [u8; BOOT_ID_SIZE] {
    let mut hasher = Sha1::new();

    hasher.update(kernel);
    hasher.update(size_field(header.kernel_size));
    hasher.update(ramdisk);
    hasher.update(size_field(header.ramdisk_size));
    if !second.is_empty() {
        hasher.update(second);
    }
    hasher.update(size_field(header.second_size));
    if !device_tree.is_empty() {
        hasher.update(device_tree);
        hasher.update(size_field(header.dt_size));
    }

    let digest = hasher.finalize();
    let mut id = [0u8; BOOT_ID_SIZE];
    id[..digest.len()].copy_from_slice(&digest);
    id
}
