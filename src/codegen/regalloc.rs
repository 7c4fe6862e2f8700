//! # Register Allocator
//!
//! A register allocator modeled as plain data: a stack of free callee-saved
//! temporary registers. `allocate` pops the stack (or reports a spill is
//! needed when it's empty); `release` pushes back. There's no liveness
//! analysis — expressions are small enough that a simple stack discipline
//! never needs one, matching `RegisterAllocator` in `code_generator.py`.

pub const TEMP_REGS_64: [&str; 5] = ["r12", "r13", "r14", "r15", "rbx"];

pub fn reg32(reg64: &str) -> &'static str {
    match reg64 {
        "r12" => "r12d",
        "r13" => "r13d",
        "r14" => "r14d",
        "r15" => "r15d",
        "rbx" => "ebx",
        other => panic!("not a temp register: {other}"),
    }
}

pub struct RegisterAllocator {
    free: Vec<&'static str>,
    /// Every register handed out at least once, in first-allocation order —
    /// exactly the set the function prologue/epilogue must save/restore.
    ever_allocated: Vec<&'static str>,
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self { free: TEMP_REGS_64.iter().rev().copied().collect(), ever_allocated: Vec::new() }
    }

    /// Returns `Some(reg)` when a temp register is free, `None` when the
    /// caller should spill to the stack instead (push/pop around the value).
    pub fn allocate(&mut self) -> Option<&'static str> {
        let reg = self.free.pop()?;
        if !self.ever_allocated.contains(&reg) {
            self.ever_allocated.push(reg);
        }
        Some(reg)
    }

    pub fn release(&mut self, reg: &'static str) {
        self.free.push(reg);
    }

    /// Registers to save in the prologue / restore in the epilogue, sorted
    /// for deterministic output.
    pub fn save_restore_regs(&self) -> Vec<&'static str> {
        let mut regs = self.ever_allocated.clone();
        regs.sort();
        regs
    }
}

impl Default for RegisterAllocator {
    fn default() -> Self {
        Self::new()
    }
}
