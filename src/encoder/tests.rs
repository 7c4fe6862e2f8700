use super::*;

#[test]
fn mov_reg_imm32() {
    let asm = "mov eax, 10\n";
    let result = assemble_code(asm).unwrap();
    // B8 0A 00 00 00
    assert_eq!(result.machine_code, vec![0xB8, 0x0A, 0x00, 0x00, 0x00]);
}

#[test]
fn mov_reg_reg() {
    let asm = "mov eax, ecx\n";
    let result = assemble_code(asm).unwrap();
    assert_eq!(result.machine_code, vec![0x89, 0xC8]);
}

#[test]
fn add_reg_imm8_uses_sign_extended_form() {
    let asm = "add eax, 5\n";
    let result = assemble_code(asm).unwrap();
    assert_eq!(result.machine_code, vec![0x83, 0xC0, 0x05]);
}

#[test]
fn ret_is_single_byte() {
    let result = assemble_code("ret\n").unwrap();
    assert_eq!(result.machine_code, vec![0xC3]);
}

#[test]
fn push_pop_extended_register_gets_rex() {
    let result = assemble_code("push r12\npop r12\n").unwrap();
    assert_eq!(result.machine_code, vec![0x41, 0x54, 0x41, 0x5C]);
}

#[test]
fn short_jump_forward_resolves_relative_displacement() {
    let asm = "jmp @.end\nnop\n.end:\nret\n";
    let result = assemble_code(asm).unwrap();
    // jmp short is 2 bytes (EB disp8), then 1 byte nop, then ret.
    assert_eq!(result.machine_code[0], 0xEB);
    assert_eq!(result.machine_code[1], 0x01);
}

#[test]
fn movabs_records_a_relocation_two_bytes_in() {
    let asm = "movabs r11, @msg\n";
    let result = assemble_code(asm).unwrap();
    assert_eq!(result.machine_code.len(), 10);
    assert_eq!(result.relocations, vec![(2, "msg".to_string())]);
}

#[test]
fn conditional_jump_backward() {
    let asm = ".top:\nnop\nje @.top\n";
    let result = assemble_code(asm).unwrap();
    // nop (1 byte) then je short (2 bytes): disp should be -3.
    assert_eq!(result.machine_code[1], 0x74);
    assert_eq!(result.machine_code[2] as i8, -3);
}

#[test]
fn undefined_label_is_an_error() {
    let asm = "jmp @.nowhere\n";
    assert!(assemble_code(asm).is_err());
}

#[test]
fn forward_jump_past_127_bytes_relaxes_to_near_form() {
    let mut asm = String::from("jmp @.end\n");
    for _ in 0..200 {
        asm.push_str("nop\n");
    }
    asm.push_str(".end:\nret\n");
    let result = assemble_code(&asm).unwrap();
    // near jmp is E9 + rel32, 5 bytes total.
    assert_eq!(result.machine_code[0], 0xE9);
    assert_eq!(result.machine_code.len(), 5 + 200 + 1);
}

#[test]
fn relaxation_is_idempotent_on_an_already_converged_program() {
    let mut asm = String::from("jmp @.end\n");
    for _ in 0..200 {
        asm.push_str("nop\n");
    }
    asm.push_str(".end:\nret\n");
    let first = assemble_code(&asm).unwrap();
    let second = assemble_code(&asm).unwrap();
    assert_eq!(first.machine_code, second.machine_code);
}
