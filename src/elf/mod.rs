//! # ELF64 Executable Writer
//!
//! Emits a minimal, freestanding ELF64 executable directly — no external
//! assembler or linker — grounded in `executable_format_generator.py`'s
//! `ELF64Writer` and `compilation_pipeline.py`'s relocation patcher.
//!
//! Layout: a 64-byte ELF header, one or two 56-byte program headers, padding
//! out to the first page, a 16-byte `_start` stub, the user code, and the
//! rodata (string literals) — all in one `PT_LOAD` segment. A second
//! `PT_LOAD` segment, with no file content, maps the BSS page that holds the
//! one-byte `_read_failed` flag when a read builtin is used.

use crate::error::AxisResult;
use std::collections::HashMap;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const EV_CURRENT: u8 = 1;
const ELFOSABI_SYSV: u8 = 0;
const ET_EXEC: u16 = 2;
const EM_X86_64: u16 = 0x3E;

const PT_LOAD: u32 = 1;
const PF_X: u32 = 1;
const PF_W: u32 = 2;
const PF_R: u32 = 4;

pub const BASE_VADDR: u64 = 0x400000;
pub const PAGE_SIZE: u64 = 0x1000;

const ELF_HEADER_SIZE: u64 = 64;
const PROGRAM_HEADER_SIZE: u64 = 56;

/// `(offset_into_code, label)` pairs produced by the encoder for each
/// `movabs reg, @label` that needs its 8-byte immediate patched once section
/// addresses are known.
pub type Relocations = Vec<(usize, String)>;

pub struct ElfImage {
    pub bytes: Vec<u8>,
    pub rodata_vaddr: u64,
    pub bss_vaddr: u64,
}

/// Builds the 16-byte `_start` stub:
/// ```text
/// xor edi, edi      ; argc = 0
/// call main         ; main follows immediately after this stub
/// mov edi, eax      ; exit code = main's return value
/// mov eax, 60       ; sys_exit
/// syscall
/// ```
fn generate_start_stub() -> Vec<u8> {
    let mut stub = Vec::with_capacity(16);
    stub.extend([0x31, 0xFF]); // xor edi, edi
    stub.push(0xE8);
    stub.extend(9i32.to_le_bytes()); // call main: main starts at offset 16, call ends at offset 7
    stub.extend([0x89, 0xC7]); // mov edi, eax
    stub.push(0xB8);
    stub.extend(60i32.to_le_bytes()); // mov eax, 60
    stub.extend([0x0F, 0x05]); // syscall
    stub
}

fn build_elf_header(entry_point: u64, program_header_offset: u64, num_phdrs: u16) -> [u8; 64] {
    let mut h = [0u8; 64];
    h[0..4].copy_from_slice(&ELF_MAGIC);
    h[4] = ELFCLASS64;
    h[5] = ELFDATA2LSB;
    h[6] = EV_CURRENT;
    h[7] = ELFOSABI_SYSV;
    h[16..18].copy_from_slice(&ET_EXEC.to_le_bytes());
    h[18..20].copy_from_slice(&EM_X86_64.to_le_bytes());
    h[20..24].copy_from_slice(&(EV_CURRENT as u32).to_le_bytes());
    h[24..32].copy_from_slice(&entry_point.to_le_bytes());
    h[32..40].copy_from_slice(&program_header_offset.to_le_bytes());
    h[40..48].copy_from_slice(&0u64.to_le_bytes()); // e_shoff
    h[48..52].copy_from_slice(&0u32.to_le_bytes()); // e_flags
    h[52..54].copy_from_slice(&(ELF_HEADER_SIZE as u16).to_le_bytes());
    h[54..56].copy_from_slice(&(PROGRAM_HEADER_SIZE as u16).to_le_bytes());
    h[56..58].copy_from_slice(&num_phdrs.to_le_bytes());
    h[58..60].copy_from_slice(&0u16.to_le_bytes()); // e_shentsize
    h[60..62].copy_from_slice(&0u16.to_le_bytes()); // e_shnum
    h[62..64].copy_from_slice(&0u16.to_le_bytes()); // e_shstrndx
    h
}

fn build_program_header(flags: u32, file_offset: u64, vaddr: u64, file_size: u64, mem_size: u64) -> [u8; 56] {
    let mut h = [0u8; 56];
    h[0..4].copy_from_slice(&PT_LOAD.to_le_bytes());
    h[4..8].copy_from_slice(&flags.to_le_bytes());
    h[8..16].copy_from_slice(&file_offset.to_le_bytes());
    h[16..24].copy_from_slice(&vaddr.to_le_bytes());
    h[24..32].copy_from_slice(&vaddr.to_le_bytes()); // p_paddr
    h[32..40].copy_from_slice(&file_size.to_le_bytes());
    h[40..48].copy_from_slice(&mem_size.to_le_bytes());
    h[48..56].copy_from_slice(&PAGE_SIZE.to_le_bytes());
    h
}

/// Generates a complete ELF64 executable from assembled machine code plus
/// its string-literal rodata. Relocations are patched in-place once the
/// rodata/BSS virtual addresses are known — never through a relocation
/// section, matching `patch_relocations`.
pub fn generate(
    user_code: &[u8],
    rodata: &[u8],
    relocations: &Relocations,
    string_offsets: &HashMap<String, u64>,
    needs_bss: bool,
) -> AxisResult<ElfImage> {
    let bss_size: u64 = if needs_bss { 8 } else { 0 };
    let num_phdrs: u16 = if bss_size > 0 { 2 } else { 1 };

    let start_stub = generate_start_stub();
    let headers_size = ELF_HEADER_SIZE + PROGRAM_HEADER_SIZE * num_phdrs as u64;
    let code_offset = PAGE_SIZE;
    let padding_size = code_offset - headers_size;

    let total_code_size = start_stub.len() as u64 + user_code.len() as u64;
    let rodata_offset = code_offset + total_code_size;
    let rodata_vaddr = BASE_VADDR + rodata_offset;
    let total_file_size = rodata_offset + rodata.len() as u64;

    let bss_vaddr = if bss_size > 0 {
        let candidate = rodata_vaddr + rodata.len() as u64;
        (candidate + PAGE_SIZE - 1) / PAGE_SIZE * PAGE_SIZE
    } else {
        0
    };

    let entry_point = BASE_VADDR + code_offset;

    let elf_header = build_elf_header(entry_point, ELF_HEADER_SIZE, num_phdrs);
    let program_header = build_program_header(PF_R | PF_X, 0, BASE_VADDR, total_file_size, total_file_size);
    let bss_program_header = if bss_size > 0 {
        build_program_header(PF_R | PF_W, 0, bss_vaddr, 0, bss_size).to_vec()
    } else {
        Vec::new()
    };

    let mut out = Vec::with_capacity(total_file_size as usize);
    out.extend(elf_header);
    out.extend(program_header);
    out.extend(bss_program_header);
    out.extend(vec![0u8; padding_size as usize]);
    out.extend(&start_stub);
    out.extend(user_code);
    out.extend(rodata);

    debug_assert_eq!(out.len() as u64, total_file_size);

    patch_relocations(&mut out, relocations, string_offsets, rodata_vaddr, bss_vaddr);

    Ok(ElfImage { bytes: out, rodata_vaddr, bss_vaddr })
}

/// `_start` is 16 bytes, immediately after the page-aligned code offset;
/// relocation offsets recorded by the encoder are relative to the start of
/// `user_code`, so the file offset to patch is `0x1000 + 16 + offset`.
fn patch_relocations(
    data: &mut [u8],
    relocations: &Relocations,
    string_offsets: &HashMap<String, u64>,
    rodata_vaddr: u64,
    bss_vaddr: u64,
) {
    let code_file_offset = (PAGE_SIZE + 16) as usize;
    for (offset, label) in relocations {
        let addr = if label == "_read_failed" {
            bss_vaddr
        } else if let Some(rodata_offset) = string_offsets.get(label) {
            rodata_vaddr + rodata_offset
        } else {
            continue;
        };
        let patch_offset = code_file_offset + offset;
        data[patch_offset..patch_offset + 8].copy_from_slice(&addr.to_le_bytes());
    }
}

#[cfg(test)]
mod tests;
