use super::*;

fn minimal_code() -> Vec<u8> {
    // mov eax, 0 ; ret
    vec![0xB8, 0x00, 0x00, 0x00, 0x00, 0xC3]
}

#[test]
fn generates_valid_elf_header() {
    let image = generate(&minimal_code(), &[], &Vec::new(), &HashMap::new(), false).unwrap();
    assert_eq!(&image.bytes[0..4], &ELF_MAGIC);
    assert_eq!(image.bytes[4], ELFCLASS64);
    assert_eq!(image.bytes.len() as u64 % 1, 0);
}

#[test]
fn single_segment_without_bss() {
    let image = generate(&minimal_code(), &[], &Vec::new(), &HashMap::new(), false).unwrap();
    // e_phnum at offset 0x38
    let phnum = u16::from_le_bytes([image.bytes[0x38], image.bytes[0x39]]);
    assert_eq!(phnum, 1);
    assert_eq!(image.bss_vaddr, 0);
}

#[test]
fn two_segments_with_bss() {
    let image = generate(&minimal_code(), &[], &Vec::new(), &HashMap::new(), true).unwrap();
    let phnum = u16::from_le_bytes([image.bytes[0x38], image.bytes[0x39]]);
    assert_eq!(phnum, 2);
    assert!(image.bss_vaddr > BASE_VADDR);
}

#[test]
fn code_is_placed_at_page_offset_plus_start_stub() {
    let code = minimal_code();
    let image = generate(&code, &[], &Vec::new(), &HashMap::new(), false).unwrap();
    let code_offset = (PAGE_SIZE + 16) as usize;
    assert_eq!(&image.bytes[code_offset..code_offset + code.len()], code.as_slice());
}

#[test]
fn patches_string_relocation_to_rodata_address() {
    let code = vec![0x48, 0xB8, 0, 0, 0, 0, 0, 0, 0, 0]; // movabs rax, <placeholder>
    let rodata = b"hello\0".to_vec();
    let mut offsets = HashMap::new();
    offsets.insert("str0".to_string(), 0u64);
    let relocations = vec![(2usize, "str0".to_string())];
    let image = generate(&code, &rodata, &relocations, &offsets, false).unwrap();
    let patch_offset = (PAGE_SIZE + 16) as usize + 2;
    let patched = u64::from_le_bytes(image.bytes[patch_offset..patch_offset + 8].try_into().unwrap());
    assert_eq!(patched, image.rodata_vaddr);
}

#[test]
fn patches_read_failed_relocation_to_bss_address() {
    let code = vec![0x49, 0xBB, 0, 0, 0, 0, 0, 0, 0, 0]; // movabs r11, <placeholder>
    let relocations = vec![(2usize, "_read_failed".to_string())];
    let image = generate(&code, &[], &relocations, &HashMap::new(), true).unwrap();
    let patch_offset = (PAGE_SIZE + 16) as usize + 2;
    let patched = u64::from_le_bytes(image.bytes[patch_offset..patch_offset + 8].try_into().unwrap());
    assert_eq!(patched, image.bss_vaddr);
}
