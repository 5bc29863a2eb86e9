use super::{bytes_from_field, BootImage, Format};
use crate::errors::{DecodeError, EncodeError, Segment};
use crate::header::consts::sony_elf::*;
use crate::header::{find_header, ElfHeader, HeaderTrait, ProgramHeader};
use alloc::vec::Vec;
use log::{debug, trace};

/// What a program header carries, going by its `(p_type, p_flags)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Kernel,
    Ramdisk,
    Cmdline,
    Ipl,
    Rpm,
    Appsbl,
}

impl Role {
    fn from_descriptor(p_type: u32, p_flags: u32) -> Option<Self> {
        match (p_type, p_flags) {
            (PT_LOAD, SONY_FLAGS_KERNEL) => Some(Self::Kernel),
            (PT_LOAD, SONY_FLAGS_RAMDISK) => Some(Self::Ramdisk),
            (PT_LOAD, SONY_FLAGS_IPL) => Some(Self::Ipl),
            (PT_LOAD, SONY_FLAGS_RPM) => Some(Self::Rpm),
            (PT_LOAD, SONY_FLAGS_APPSBL) => Some(Self::Appsbl),
            (PT_NOTE, SONY_FLAGS_CMDLINE) => Some(Self::Cmdline),
            _ => None,
        }
    }

    fn descriptor(self) -> (u32, u32) {
        match self {
            Self::Kernel => (PT_LOAD, SONY_FLAGS_KERNEL),
            Self::Ramdisk => (PT_LOAD, SONY_FLAGS_RAMDISK),
            Self::Ipl => (PT_LOAD, SONY_FLAGS_IPL),
            Self::Rpm => (PT_LOAD, SONY_FLAGS_RPM),
            Self::Appsbl => (PT_LOAD, SONY_FLAGS_APPSBL),
            Self::Cmdline => (PT_NOTE, SONY_FLAGS_CMDLINE),
        }
    }

    fn segment(self) -> Segment {
        match self {
            Self::Kernel => Segment::Kernel,
            Self::Ramdisk => Segment::Ramdisk,
            Self::Cmdline => Segment::Cmdline,
            Self::Ipl => Segment::Ipl,
            Self::Rpm => Segment::Rpm,
            Self::Appsbl => Segment::Appsbl,
        }
    }
}

fn is_sin(phdr: &ProgramHeader) -> bool {
    phdr.p_type == PT_SIN && phdr.p_flags == SONY_FLAGS_SIN
}

pub(super) fn is_sony_elf(data: &[u8]) -> bool {
    find_header(data, &ELF_MAGIC, ELF32_EHDR_SIZE, 0).is_some()
}

/// Returns `data[start..start + size]`, or the overrun if it does not fit.
fn slice_at(data: &[u8], start: usize, size: usize, segment: Segment) -> Result<&[u8], DecodeError> {
    let end = start.saturating_add(size);
    if end > data.len() {
        return Err(DecodeError::SegmentOverrun {
            segment,
            overrun: end - data.len(),
        });
    }
    Ok(&data[start..end])
}

/// The entry point written when the image does not name one.
fn default_entrypoint(image: &BootImage) -> u32 {
    if image.kernel().is_empty() {
        0
    } else {
        image.kernel_addr
    }
}

pub(super) fn decode(data: &[u8]) -> Result<BootImage, DecodeError> {
    let header = ElfHeader::read_from(&mut &data[..]).map_err(|_| DecodeError::HeaderNotFound)?;
    if !header.has_correct_magic() {
        return Err(DecodeError::HeaderNotFound);
    }

    let mut image = BootImage {
        format: Format::SonyElf,
        ..BootImage::default()
    };

    let table_start = header.e_phoff as usize;
    for index in 0..header.e_phnum as usize {
        let start = table_start.saturating_add(index * ELF32_PHDR_SIZE);
        let mut raw = slice_at(data, start, ELF32_PHDR_SIZE, Segment::ProgramHeaders)?;
        let phdr = ProgramHeader::read_from(&mut raw).map_err(|_| DecodeError::SegmentOverrun {
            segment: Segment::ProgramHeaders,
            overrun: ELF32_PHDR_SIZE,
        })?;

        if is_sin(&phdr) {
            debug!("ignoring SIN segment {}", index);
            continue;
        }
        let role = Role::from_descriptor(phdr.p_type, phdr.p_flags).ok_or(
            DecodeError::UnknownSegmentDescriptor {
                p_type: phdr.p_type,
                p_flags: phdr.p_flags,
            },
        )?;
        let payload = slice_at(
            data,
            phdr.p_offset as usize,
            phdr.p_filesz as usize,
            role.segment(),
        )?;

        match role {
            Role::Kernel => {
                image.insert_kernel(payload.to_vec());
                image.kernel_addr = phdr.p_vaddr;
            }
            Role::Ramdisk => {
                image.insert_ramdisk(payload.to_vec());
                image.ramdisk_addr = phdr.p_vaddr;
            }
            Role::Cmdline => image.cmdline = bytes_from_field(payload),
            Role::Ipl => {
                image.insert_ipl(payload.to_vec());
                image.ipl_addr = phdr.p_vaddr;
            }
            Role::Rpm => {
                image.insert_rpm(payload.to_vec());
                image.rpm_addr = phdr.p_vaddr;
            }
            Role::Appsbl => {
                image.insert_appsbl(payload.to_vec());
                image.appsbl_addr = phdr.p_vaddr;
            }
        }
    }

    if header.e_entry != default_entrypoint(&image) {
        image.entrypoint = Some(header.e_entry);
    }

    Ok(image)
}

pub(super) fn encode(image: &BootImage) -> Result<Vec<u8>, EncodeError> {
    let components = [
        (Role::Kernel, image.kernel(), image.kernel_addr),
        (Role::Ramdisk, image.ramdisk(), image.ramdisk_addr),
        (Role::Cmdline, &image.cmdline[..], 0),
        (Role::Ipl, image.ipl(), image.ipl_addr),
        (Role::Rpm, image.rpm(), image.rpm_addr),
        (Role::Appsbl, image.appsbl(), image.appsbl_addr),
    ];
    let present: Vec<_> = components
        .iter()
        .filter(|(_, data, _)| !data.is_empty())
        .collect();

    let header = ElfHeader {
        e_entry: image.entrypoint.unwrap_or_else(|| default_entrypoint(image)),
        e_phnum: present.len() as u16,
        ..ElfHeader::default()
    };

    let mut out = Vec::new();
    header.write_to(&mut out)?;

    let mut offset = SONY_PAYLOAD_OFFSET;
    for &&(role, data, addr) in &present {
        let too_large = || EncodeError::ComponentTooLarge {
            segment: role.segment(),
            size: data.len(),
        };
        let size = u32::try_from(data.len()).map_err(|_| too_large())?;
        let p_offset = u32::try_from(offset).map_err(|_| too_large())?;
        let (p_type, p_flags) = role.descriptor();

        trace!("{} at {:#x}, {} bytes", role.segment(), offset, data.len());
        ProgramHeader {
            p_type,
            p_offset,
            p_vaddr: addr,
            p_paddr: addr,
            p_filesz: size,
            p_memsz: size,
            p_flags,
            p_align: 0,
        }
        .write_to(&mut out)?;
        offset += data.len();
    }

    out.resize(SONY_PAYLOAD_OFFSET, 0);
    for &&(_, data, _) in &present {
        out.extend_from_slice(data);
    }

    Ok(out)
}
