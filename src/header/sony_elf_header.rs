use super::consts::sony_elf::*;
use super::{put_u16, put_u32, take_array, take_u16, take_u32, HeaderTrait};
use core2::io::{Error as IoError, Read, Write};

/// ELF32 file header as used by Sony boot images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElfHeader {
    pub e_ident: [u8; EI_NIDENT],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    /// Entry point. Usually the kernel load address.
    pub e_entry: u32,
    pub e_phoff: u32,
    pub e_shoff: u32,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl ElfHeader {
    pub fn parse(src: &[u8; ELF32_EHDR_SIZE]) -> Self {
        let mut src = &src[..];

        Self {
            e_ident: take_array(&mut src),
            e_type: take_u16(&mut src),
            e_machine: take_u16(&mut src),
            e_version: take_u32(&mut src),
            e_entry: take_u32(&mut src),
            e_phoff: take_u32(&mut src),
            e_shoff: take_u32(&mut src),
            e_flags: take_u32(&mut src),
            e_ehsize: take_u16(&mut src),
            e_phentsize: take_u16(&mut src),
            e_phnum: take_u16(&mut src),
            e_shentsize: take_u16(&mut src),
            e_shnum: take_u16(&mut src),
            e_shstrndx: take_u16(&mut src),
        }
    }
}

impl HeaderTrait for ElfHeader {
    fn header_size(&self) -> usize {
        ELF32_EHDR_SIZE
    }

    fn has_correct_magic(&self) -> bool {
        self.e_ident.starts_with(&ELF_MAGIC)
    }

    fn read_from<R>(src: &mut R) -> Result<Self, IoError>
    where
        Self: Sized,
        R: Read,
    {
        let mut buffer = [0; ELF32_EHDR_SIZE];
        src.read_exact(&mut buffer)?;
        Ok(Self::parse(&buffer))
    }

    fn write_to<W>(&self, dst: &mut W) -> Result<usize, IoError>
    where
        Self: Sized,
        W: Write,
    {
        dst.write_all(&self.e_ident)?;
        put_u16(dst, self.e_type)?;
        put_u16(dst, self.e_machine)?;
        put_u32(dst, self.e_version)?;
        put_u32(dst, self.e_entry)?;
        put_u32(dst, self.e_phoff)?;
        put_u32(dst, self.e_shoff)?;
        put_u32(dst, self.e_flags)?;
        put_u16(dst, self.e_ehsize)?;
        put_u16(dst, self.e_phentsize)?;
        put_u16(dst, self.e_phnum)?;
        put_u16(dst, self.e_shentsize)?;
        put_u16(dst, self.e_shnum)?;
        put_u16(dst, self.e_shstrndx)?;
        Ok(ELF32_EHDR_SIZE)
    }
}

impl Default for ElfHeader {
    fn default() -> Self {
        let mut e_ident = [0; EI_NIDENT];
        e_ident[..SONY_E_IDENT.len()].copy_from_slice(&SONY_E_IDENT);

        Self {
            e_ident,
            e_type: SONY_E_TYPE,
            e_machine: SONY_E_MACHINE,
            e_version: SONY_E_VERSION,
            e_entry: 0,
            e_phoff: ELF32_EHDR_SIZE as u32,
            e_shoff: 0,
            e_flags: 0,
            e_ehsize: ELF32_EHDR_SIZE as u16,
            e_phentsize: ELF32_PHDR_SIZE as u16,
            e_phnum: 0,
            e_shentsize: 0,
            e_shnum: 0,
            e_shstrndx: 0,
        }
    }
}

/// ELF32 program header. Sony images tag each one with a `(p_type, p_flags)`
/// pair naming the component it carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramHeader {
    pub p_type: u32,
    pub p_offset: u32,
    pub p_vaddr: u32,
    pub p_paddr: u32,
    pub p_filesz: u32,
    pub p_memsz: u32,
    pub p_flags: u32,
    pub p_align: u32,
}

impl ProgramHeader {
    pub fn parse(src: &[u8; ELF32_PHDR_SIZE]) -> Self {
        let mut src = &src[..];

        Self {
            p_type: take_u32(&mut src),
            p_offset: take_u32(&mut src),
            p_vaddr: take_u32(&mut src),
            p_paddr: take_u32(&mut src),
            p_filesz: take_u32(&mut src),
            p_memsz: take_u32(&mut src),
            p_flags: take_u32(&mut src),
            p_align: take_u32(&mut src),
        }
    }
}

impl HeaderTrait for ProgramHeader {
    fn header_size(&self) -> usize {
        ELF32_PHDR_SIZE
    }

    /// Program headers carry no magic of their own.
    fn has_correct_magic(&self) -> bool {
        true
    }

    fn read_from<R>(src: &mut R) -> Result<Self, IoError>
    where
        Self: Sized,
        R: Read,
    {
        let mut buffer = [0; ELF32_PHDR_SIZE];
        src.read_exact(&mut buffer)?;
        Ok(Self::parse(&buffer))
    }

    fn write_to<W>(&self, dst: &mut W) -> Result<usize, IoError>
    where
        Self: Sized,
        W: Write,
    {
        put_u32(dst, self.p_type)?;
        put_u32(dst, self.p_offset)?;
        put_u32(dst, self.p_vaddr)?;
        put_u32(dst, self.p_paddr)?;
        put_u32(dst, self.p_filesz)?;
        put_u32(dst, self.p_memsz)?;
        put_u32(dst, self.p_flags)?;
        put_u32(dst, self.p_align)?;
        Ok(ELF32_PHDR_SIZE)
    }
}
