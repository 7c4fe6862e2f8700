//! # x86-64 Encoder
//!
//! Assembles the textual assembly IR produced by [`crate::codegen`] into raw
//! machine code, grounded in the instruction encodings and the iterative
//! branch-relaxation algorithm of `assembler.py`.
//!
//! Branch relaxation: jumps/conditional jumps start out assumed *short*
//! (rel8). Each iteration lays out the whole instruction stream using the
//! current guesses, then re-checks every jump's displacement; any jump whose
//! target no longer fits in a signed byte is promoted to its *near* (rel32)
//! form. Promotion is monotonic — once near, never short again — so the
//! loop is guaranteed to reach a fixed point, and is capped at
//! [`MAX_RELAX_ITERATIONS`] as a defensive bound.

pub mod regs;

use crate::error::{AxisError, AxisResult};
use regs::{build_rex, encode_modrm, parse_register, Reg, Width};
use std::collections::HashMap;

pub const MAX_RELAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone)]
enum Operand {
    Register(Reg),
    Immediate(i64),
    Memory { base: Reg, disp: i32 },
    Label(String),
}

#[derive(Debug, Clone)]
enum Item {
    Label(String),
    Instr { mnemonic: String, operands: Vec<Operand> },
}

/// Result of assembling a full program: the machine code bytes plus any
/// `(offset, label)` relocations left for the linker step (ELF writer) to
/// patch once section addresses are known.
pub struct AssembleResult {
    pub machine_code: Vec<u8>,
    pub relocations: Vec<(usize, String)>,
}

pub fn assemble_code(asm: &str) -> AxisResult<AssembleResult> {
    let items = parse_items(asm)?;
    let mut jump_forms: HashMap<usize, bool> = HashMap::new(); // index -> is_short
    for (i, item) in items.iter().enumerate() {
        if is_branch(item) {
            jump_forms.insert(i, true);
        }
    }

    let mut label_addresses: HashMap<String, usize> = HashMap::new();
    let mut converged = false;
    for _ in 0..MAX_RELAX_ITERATIONS {
        label_addresses.clear();
        let mut addr = 0usize;
        for (i, item) in items.iter().enumerate() {
            match item {
                Item::Label(name) => {
                    label_addresses.insert(name.clone(), addr);
                }
                Item::Instr { .. } => {
                    addr += instr_size(item, &jump_forms, i)?;
                }
            }
        }

        let old_forms = jump_forms.clone();
        let mut addr = 0usize;
        for (i, item) in items.iter().enumerate() {
            match item {
                Item::Label(_) => {}
                Item::Instr { operands, .. } => {
                    let size = instr_size(item, &jump_forms, i)?;
                    if is_branch(item) {
                        if let Some(Operand::Label(target)) = operands.last() {
                            if let Some(&target_addr) = label_addresses.get(target) {
                                let rel = target_addr as i64 - (addr + size) as i64;
                                if jump_forms[&i] && !(-128..=127).contains(&rel) {
                                    jump_forms.insert(i, false);
                                }
                            }
                        }
                    }
                    addr += size;
                }
            }
        }

        if jump_forms == old_forms {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(AxisError::Relaxation(MAX_RELAX_ITERATIONS));
    }

    // Final layout pass, using the converged jump_forms.
    label_addresses.clear();
    let mut addr = 0usize;
    for (i, item) in items.iter().enumerate() {
        match item {
            Item::Label(name) => {
                label_addresses.insert(name.clone(), addr);
            }
            Item::Instr { .. } => addr += instr_size(item, &jump_forms, i)?,
        }
    }

    let mut machine_code = Vec::new();
    let mut relocations = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if let Item::Instr { .. } = item {
            let base = machine_code.len();
            let (bytes, reloc) = encode_instr(item, base, &label_addresses, &jump_forms, i)?;
            if let Some(label) = reloc {
                relocations.push((base + 2, label));
            }
            machine_code.extend(bytes);
        }
    }

    Ok(AssembleResult { machine_code, relocations })
}

fn is_branch(item: &Item) -> bool {
    matches!(item, Item::Instr { mnemonic, .. } if mnemonic == "jmp" || is_conditional_jump(mnemonic))
}

fn is_conditional_jump(mnemonic: &str) -> bool {
    matches!(
        mnemonic,
        "je" | "jne" | "jl" | "jle" | "jg" | "jge" | "jb" | "jbe" | "ja" | "jae" | "jz" | "jnz" | "js" | "jns"
    )
}

fn condition_code(mnemonic: &str) -> u8 {
    match mnemonic {
        "jo" => 0x0,
        "jno" => 0x1,
        "jb" => 0x2,
        "jae" => 0x3,
        "je" | "jz" => 0x4,
        "jne" | "jnz" => 0x5,
        "jbe" => 0x6,
        "ja" => 0x7,
        "js" => 0x8,
        "jns" => 0x9,
        "jl" => 0xC,
        "jge" => 0xD,
        "jle" => 0xE,
        "jg" => 0xF,
        _ => unreachable!("unknown conditional jump mnemonic {mnemonic}"),
    }
}

fn parse_items(asm: &str) -> AxisResult<Vec<Item>> {
    let mut items = Vec::new();
    for raw_line in asm.lines() {
        let line = raw_line.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if let Some(label) = line.strip_suffix(':') {
            items.push(Item::Label(label.trim().to_string()));
            continue;
        }
        let (mnemonic, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let operands = rest
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_operand)
            .collect::<AxisResult<Vec<_>>>()?;
        items.push(Item::Instr { mnemonic: mnemonic.to_string(), operands });
    }
    Ok(items)
}

fn parse_operand(text: &str) -> AxisResult<Operand> {
    let mut text = text.trim();
    for prefix in ["byte ", "word ", "dword ", "qword "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim();
            break;
        }
    }
    if let Some(label) = text.strip_prefix('@') {
        return Ok(Operand::Label(label.to_string()));
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let inner = inner.trim();
        let (base_name, disp) = if let Some(idx) = inner.find(['+', '-']) {
            let (b, d) = inner.split_at(idx);
            (b.trim(), d.trim().parse::<i32>().map_err(|_| AxisError::encoding(format!("bad displacement '{d}'")))?)
        } else {
            (inner, 0)
        };
        let base = parse_register(base_name).ok_or_else(|| AxisError::encoding(format!("unknown base register '{base_name}'")))?;
        return Ok(Operand::Memory { base, disp });
    }
    if let Some(reg) = parse_register(text) {
        return Ok(Operand::Register(reg));
    }
    if matches!(text, "word" | "dword" | "qword" | "byte") {
        // size-prefix keyword preceding a memory operand; the actual width
        // is inferred from the paired register operand, so this is a no-op.
        return Ok(Operand::Label(String::new()));
    }
    if let Some(target) = text.strip_prefix('.') {
        return Ok(Operand::Label(format!(".{target}")));
    }
    let value = parse_immediate(text)?;
    Ok(Operand::Immediate(value))
}

fn parse_immediate(text: &str) -> AxisResult<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).map_err(|_| AxisError::encoding(format!("bad hex literal '{text}'")));
    }
    text.parse::<i64>().map_err(|_| AxisError::encoding(format!("not an operand: '{text}'")))
}

fn instr_size(item: &Item, jump_forms: &HashMap<usize, bool>, index: usize) -> AxisResult<usize> {
    let Item::Instr { mnemonic, operands } = item else { return Ok(0) };
    if mnemonic == "jmp" {
        return Ok(if *jump_forms.get(&index).unwrap_or(&true) { 2 } else { 5 });
    }
    if is_conditional_jump(mnemonic) {
        return Ok(if *jump_forms.get(&index).unwrap_or(&true) { 2 } else { 6 });
    }
    Ok(encode_instr(item, 0, &HashMap::new(), jump_forms, index)?.0.len())
}

fn rex_for(reg_a: Option<&Reg>, reg_b: Option<&Reg>, force_w: bool) -> Option<u8> {
    let w = force_w || reg_a.map_or(false, |r| r.width.needs_rex_w()) || reg_b.map_or(false, |r| r.width.needs_rex_w());
    let r = reg_a.map_or(false, |r| r.is_extended());
    let b = reg_b.map_or(false, |r| r.is_extended());
    let needs_byte_rex = reg_a.map_or(false, |r| r.needs_rex_for_byte()) || reg_b.map_or(false, |r| r.needs_rex_for_byte());
    if w || r || b || needs_byte_rex {
        Some(build_rex(w, r, false, b))
    } else {
        None
    }
}

fn push_disp(out: &mut Vec<u8>, disp: i32) {
    if (-128..=127).contains(&disp) {
        out.push(disp as i8 as u8);
    } else {
        out.extend((disp).to_le_bytes());
    }
}

fn mem_mod(disp: i32) -> u8 {
    if disp == 0 {
        0b01 // always force disp8 form (0) for rbp-relative locals, matching the teacher's rbp+disp-only memory operand support
    } else if (-128..=127).contains(&disp) {
        0b01
    } else {
        0b10
    }
}

/// Encodes a single instruction, returning its bytes and an optional
/// `(label)` relocation (for `movabs reg, @label`) anchored 2 bytes into the
/// instruction, matching `assemble_movabs`'s `(current_address+2, label)`.
fn encode_instr(
    item: &Item,
    addr: usize,
    labels: &HashMap<String, usize>,
    jump_forms: &HashMap<usize, bool>,
    index: usize,
) -> AxisResult<(Vec<u8>, Option<String>)> {
    let Item::Instr { mnemonic, operands } = item else {
        return Ok((Vec::new(), None));
    };
    let mut out = Vec::new();

    match mnemonic.as_str() {
        "mov" => encode_mov(&mut out, operands)?,
        "movabs" => return encode_movabs(operands),
        "add" | "sub" | "and" | "or" | "xor" | "cmp" => encode_alu(&mut out, mnemonic, operands)?,
        "push" => encode_push_pop(&mut out, operands, 0x50)?,
        "pop" => encode_push_pop(&mut out, operands, 0x58)?,
        "jmp" => encode_jmp(&mut out, addr, operands, labels, jump_forms, index)?,
        m if is_conditional_jump(m) => encode_jcc(&mut out, addr, m, operands, labels, jump_forms, index)?,
        "call" => encode_call(&mut out, addr, operands, labels)?,
        "ret" => out.push(0xC3),
        "leave" => out.push(0xC9),
        "syscall" => out.extend([0x0F, 0x05]),
        "cdq" => out.push(0x99),
        "cqo" => out.extend([0x48, 0x99]),
        "nop" => out.push(0x90),
        "pushf" => out.push(0x9C),
        "popf" => out.push(0x9D),
        "int3" => out.push(0xCC),
        "neg" => encode_unary_f7(&mut out, operands, 3)?,
        "not" => encode_unary_f7(&mut out, operands, 2)?,
        "inc" => encode_unary_ff(&mut out, operands, 0)?,
        "dec" => encode_unary_ff(&mut out, operands, 1)?,
        "test" => encode_test(&mut out, operands)?,
        "div" => encode_unary_f7(&mut out, operands, 6)?,
        "idiv" => encode_unary_f7(&mut out, operands, 7)?,
        "sar" => encode_shift(&mut out, operands, 7)?,
        "shr" => encode_shift(&mut out, operands, 5)?,
        "shl" | "sal" => encode_shift(&mut out, operands, 4)?,
        "imul" => encode_imul(&mut out, operands)?,
        "movzx" => encode_movx(&mut out, operands, true)?,
        "movsx" => encode_movx(&mut out, operands, false)?,
        "movsxd" => encode_movsxd(&mut out, operands)?,
        m if m.starts_with("set") => encode_setcc(&mut out, m, operands)?,
        other => return Err(AxisError::encoding(format!("unsupported mnemonic '{other}'"))),
    }

    Ok((out, None))
}

fn operand_regs(operands: &[Operand]) -> Vec<&Operand> {
    operands.iter().filter(|o| !matches!(o, Operand::Label(l) if l.is_empty())).collect()
}

fn encode_mov(out: &mut Vec<u8>, operands: &[Operand]) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match (&ops[0], &ops[1]) {
        (Operand::Register(dst), Operand::Register(src)) => {
            if let Some(rex) = rex_for(Some(src), Some(dst), false) {
                out.push(rex);
            }
            if dst.width.has_operand_size_prefix() {
                out.insert(0, 0x66);
            }
            out.push(if dst.width == Width::W8 { 0x88 } else { 0x89 });
            out.push(encode_modrm(0b11, src.num, dst.num));
        }
        (Operand::Register(dst), Operand::Immediate(imm)) => {
            if let Some(rex) = rex_for(None, Some(dst), false) {
                out.push(rex);
            }
            if dst.width.has_operand_size_prefix() {
                out.insert(0, 0x66);
            }
            match dst.width {
                Width::W8 => {
                    out.push(0xB0 + dst.low3());
                    out.push(*imm as u8);
                }
                Width::W16 => {
                    out.push(0xB8 + dst.low3());
                    out.extend((*imm as i16).to_le_bytes());
                }
                Width::W32 | Width::W64 => {
                    out.push(0xB8 + dst.low3());
                    out.extend((*imm as i32).to_le_bytes());
                }
            }
        }
        (Operand::Register(dst), Operand::Memory { base, disp }) => {
            if let Some(rex) = rex_for(Some(dst), Some(base), false) {
                out.push(rex);
            }
            if dst.width.has_operand_size_prefix() {
                out.insert(0, 0x66);
            }
            out.push(if dst.width == Width::W8 { 0x8A } else { 0x8B });
            out.push(encode_modrm(mem_mod(*disp), dst.num, base.low3()));
            push_disp(out, *disp);
        }
        (Operand::Memory { base, disp }, Operand::Register(src)) => {
            if let Some(rex) = rex_for(Some(src), Some(base), false) {
                out.push(rex);
            }
            if src.width.has_operand_size_prefix() {
                out.insert(0, 0x66);
            }
            out.push(if src.width == Width::W8 { 0x88 } else { 0x89 });
            out.push(encode_modrm(mem_mod(*disp), src.num, base.low3()));
            push_disp(out, *disp);
        }
        (Operand::Memory { base, disp }, Operand::Immediate(imm)) => {
            if let Some(rex) = rex_for(None, Some(base), false) {
                out.push(rex);
            }
            out.push(0xC7);
            out.push(encode_modrm(mem_mod(*disp), 0, base.low3()));
            push_disp(out, *disp);
            out.extend((*imm as i32).to_le_bytes());
        }
        _ => return Err(AxisError::encoding("unsupported mov operand combination")),
    }
    Ok(())
}

fn encode_movabs(operands: &[Operand]) -> AxisResult<(Vec<u8>, Option<String>)> {
    let ops = operand_regs(operands);
    let (dst, label) = match (&ops[0], &ops[1]) {
        (Operand::Register(dst), Operand::Label(l)) => (*dst, l.clone()),
        _ => return Err(AxisError::encoding("movabs requires 'reg, @label'")),
    };
    let mut out = vec![build_rex(true, false, false, dst.is_extended()), 0xB8 + dst.low3()];
    out.extend([0u8; 8]);
    Ok((out, Some(label)))
}

fn alu_opcode_index(mnemonic: &str) -> u8 {
    match mnemonic {
        "add" => 0,
        "or" => 1,
        "and" => 4,
        "sub" => 5,
        "xor" => 6,
        "cmp" => 7,
        _ => unreachable!(),
    }
}

fn encode_alu(out: &mut Vec<u8>, mnemonic: &str, operands: &[Operand]) -> AxisResult<()> {
    let ops = operand_regs(operands);
    let op_index = alu_opcode_index(mnemonic);
    match (&ops[0], &ops[1]) {
        (Operand::Register(dst), Operand::Register(src)) => {
            if let Some(rex) = rex_for(Some(src), Some(dst), false) {
                out.push(rex);
            }
            out.push(if dst.width == Width::W8 { op_index * 8 } else { op_index * 8 + 1 });
            out.push(encode_modrm(0b11, src.num, dst.num));
        }
        (Operand::Register(dst), Operand::Immediate(imm)) => {
            if let Some(rex) = rex_for(None, Some(dst), false) {
                out.push(rex);
            }
            if dst.width == Width::W8 {
                out.push(0x80);
                out.push(encode_modrm(0b11, op_index, dst.num));
                out.push(*imm as u8);
            } else if (-128..=127).contains(imm) {
                out.push(0x83);
                out.push(encode_modrm(0b11, op_index, dst.num));
                out.push(*imm as i8 as u8);
            } else {
                out.push(0x81);
                out.push(encode_modrm(0b11, op_index, dst.num));
                out.extend((*imm as i32).to_le_bytes());
            }
        }
        _ => return Err(AxisError::encoding(format!("unsupported '{mnemonic}' operand combination"))),
    }
    Ok(())
}

fn encode_push_pop(out: &mut Vec<u8>, operands: &[Operand], base_opcode: u8) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match ops[0] {
        Operand::Register(r) => {
            if r.is_extended() {
                out.push(build_rex(false, false, false, true));
            }
            out.push(base_opcode + r.low3());
        }
        _ => return Err(AxisError::encoding("push/pop requires a register operand")),
    }
    Ok(())
}

fn rel_target(labels: &HashMap<String, usize>, operands: &[Operand]) -> AxisResult<usize> {
    match operands.last() {
        Some(Operand::Label(l)) => labels
            .get(l)
            .copied()
            .ok_or_else(|| AxisError::encoding(format!("undefined label '{l}'"))),
        _ => Err(AxisError::encoding("jump/call requires a label operand")),
    }
}

fn encode_jmp(
    out: &mut Vec<u8>,
    addr: usize,
    operands: &[Operand],
    labels: &HashMap<String, usize>,
    jump_forms: &HashMap<usize, bool>,
    index: usize,
) -> AxisResult<()> {
    let short = *jump_forms.get(&index).unwrap_or(&true);
    if labels.is_empty() {
        // size-only query during layout: return worst-case placeholder bytes.
        out.extend(vec![0u8; if short { 2 } else { 5 }]);
        return Ok(());
    }
    let target = rel_target(labels, operands)?;
    if short {
        out.push(0xEB);
        let rel = target as i64 - (addr + 2) as i64;
        out.push(rel as i8 as u8);
    } else {
        out.push(0xE9);
        let rel = target as i64 - (addr + 5) as i64;
        out.extend((rel as i32).to_le_bytes());
    }
    Ok(())
}

fn encode_jcc(
    out: &mut Vec<u8>,
    addr: usize,
    mnemonic: &str,
    operands: &[Operand],
    labels: &HashMap<String, usize>,
    jump_forms: &HashMap<usize, bool>,
    index: usize,
) -> AxisResult<()> {
    let short = *jump_forms.get(&index).unwrap_or(&true);
    let cc = condition_code(mnemonic);
    if labels.is_empty() {
        out.extend(vec![0u8; if short { 2 } else { 6 }]);
        return Ok(());
    }
    let target = rel_target(labels, operands)?;
    if short {
        out.push(0x70 + cc);
        let rel = target as i64 - (addr + 2) as i64;
        out.push(rel as i8 as u8);
    } else {
        out.extend([0x0F, 0x80 + cc]);
        let rel = target as i64 - (addr + 6) as i64;
        out.extend((rel as i32).to_le_bytes());
    }
    Ok(())
}

fn encode_call(out: &mut Vec<u8>, addr: usize, operands: &[Operand], labels: &HashMap<String, usize>) -> AxisResult<()> {
    out.push(0xE8);
    if labels.is_empty() {
        out.extend([0u8; 4]);
    } else {
        let target = rel_target(labels, operands)?;
        let rel = target as i64 - (addr + 5) as i64;
        out.extend((rel as i32).to_le_bytes());
    }
    Ok(())
}

fn encode_unary_f7(out: &mut Vec<u8>, operands: &[Operand], ext: u8) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match ops[0] {
        Operand::Register(r) => {
            if let Some(rex) = rex_for(None, Some(r), false) {
                out.push(rex);
            }
            out.push(if r.width == Width::W8 { 0xF6 } else { 0xF7 });
            out.push(encode_modrm(0b11, ext, r.num));
        }
        _ => return Err(AxisError::encoding("expected a register operand")),
    }
    Ok(())
}

fn encode_unary_ff(out: &mut Vec<u8>, operands: &[Operand], ext: u8) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match ops[0] {
        Operand::Register(r) => {
            if let Some(rex) = rex_for(None, Some(r), false) {
                out.push(rex);
            }
            out.push(if r.width == Width::W8 { 0xFE } else { 0xFF });
            out.push(encode_modrm(0b11, ext, r.num));
        }
        _ => return Err(AxisError::encoding("expected a register operand")),
    }
    Ok(())
}

fn encode_test(out: &mut Vec<u8>, operands: &[Operand]) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match (&ops[0], &ops[1]) {
        (Operand::Register(a), Operand::Register(b)) => {
            if let Some(rex) = rex_for(Some(b), Some(a), false) {
                out.push(rex);
            }
            out.push(if a.width == Width::W8 { 0x84 } else { 0x85 });
            out.push(encode_modrm(0b11, b.num, a.num));
        }
        _ => return Err(AxisError::encoding("test requires two register operands")),
    }
    Ok(())
}

fn encode_shift(out: &mut Vec<u8>, operands: &[Operand], ext: u8) -> AxisResult<()> {
    let ops = operand_regs(operands);
    let dst = match ops[0] {
        Operand::Register(r) => *r,
        _ => return Err(AxisError::encoding("shift requires a register destination")),
    };
    if let Some(rex) = rex_for(None, Some(&dst), false) {
        out.push(rex);
    }
    match &ops[1] {
        Operand::Immediate(1) => {
            out.push(if dst.width == Width::W8 { 0xD0 } else { 0xD1 });
            out.push(encode_modrm(0b11, ext, dst.num));
        }
        Operand::Immediate(n) => {
            out.push(if dst.width == Width::W8 { 0xC0 } else { 0xC1 });
            out.push(encode_modrm(0b11, ext, dst.num));
            out.push(*n as u8);
        }
        Operand::Register(r) if r.num == 1 => {
            // shift by cl
            out.push(if dst.width == Width::W8 { 0xD2 } else { 0xD3 });
            out.push(encode_modrm(0b11, ext, dst.num));
        }
        _ => return Err(AxisError::encoding("shift count must be an immediate or cl")),
    }
    Ok(())
}

fn encode_imul(out: &mut Vec<u8>, operands: &[Operand]) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match (&ops[0], &ops[1]) {
        (Operand::Register(dst), Operand::Register(src)) => {
            if let Some(rex) = rex_for(Some(dst), Some(src), false) {
                out.push(rex);
            }
            out.extend([0x0F, 0xAF]);
            out.push(encode_modrm(0b11, dst.num, src.num));
        }
        _ => return Err(AxisError::encoding("two-operand imul requires register, register")),
    }
    Ok(())
}

fn encode_movx(out: &mut Vec<u8>, operands: &[Operand], zero_extend: bool) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match (&ops[0], &ops[1]) {
        (Operand::Register(dst), Operand::Register(src)) => {
            if let Some(rex) = rex_for(Some(dst), Some(src), false) {
                out.push(rex);
            }
            let op = match (zero_extend, src.width) {
                (true, Width::W8) => 0xB6,
                (true, Width::W16) => 0xB7,
                (false, Width::W8) => 0xBE,
                (false, Width::W16) => 0xBF,
                _ => return Err(AxisError::encoding("movzx/movsx source must be 8 or 16 bits")),
            };
            out.extend([0x0F, op]);
            out.push(encode_modrm(0b11, dst.num, src.num));
        }
        (Operand::Register(dst), Operand::Memory { base, disp }) => {
            if let Some(rex) = rex_for(Some(dst), Some(base), false) {
                out.push(rex);
            }
            let op = match (zero_extend, base) {
                _ => if zero_extend { 0xB6 } else { 0xBE },
            };
            out.extend([0x0F, op]);
            out.push(encode_modrm(mem_mod(*disp), dst.num, base.low3()));
            push_disp(out, *disp);
        }
        _ => return Err(AxisError::encoding("unsupported movzx/movsx operand combination")),
    }
    Ok(())
}

fn setcc_condition_code(mnemonic: &str) -> u8 {
    match mnemonic {
        "sete" => 0x4,
        "setne" => 0x5,
        "setl" => 0xC,
        "setle" => 0xE,
        "setg" => 0xF,
        "setge" => 0xD,
        "setb" => 0x2,
        "setbe" => 0x6,
        "seta" => 0x7,
        "setae" => 0x3,
        _ => unreachable!("unknown setcc mnemonic {mnemonic}"),
    }
}

fn encode_setcc(out: &mut Vec<u8>, mnemonic: &str, operands: &[Operand]) -> AxisResult<()> {
    let ops = operand_regs(operands);
    let dst = match ops[0] {
        Operand::Register(r) => *r,
        _ => return Err(AxisError::encoding("setcc requires a register operand")),
    };
    if let Some(rex) = rex_for(None, Some(&dst), false) {
        out.push(rex);
    }
    let cc = setcc_condition_code(mnemonic);
    out.extend([0x0F, 0x90 + cc]);
    out.push(encode_modrm(0b11, 0, dst.num));
    Ok(())
}

fn encode_movsxd(out: &mut Vec<u8>, operands: &[Operand]) -> AxisResult<()> {
    let ops = operand_regs(operands);
    match (&ops[0], &ops[1]) {
        (Operand::Register(dst), Operand::Register(src)) => {
            out.push(build_rex(true, dst.is_extended(), false, src.is_extended()));
            out.push(0x63);
            out.push(encode_modrm(0b11, dst.num, src.num));
        }
        _ => return Err(AxisError::encoding("movsxd requires register, register")),
    }
    Ok(())
}

#[cfg(test)]
mod tests;
