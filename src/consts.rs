//! VM parameters

use static_assertions::const_assert_eq;

/* REGISTER FILE */

/// Register count for checking constraints.
pub const VM_REGISTER_COUNT: usize = 13;

/// Return-address register; Ψ_M seeds it with the halt sentinel so a
/// conventional return through the jump table terminates the invocation.
pub const REG_RA: usize = 0;

/// Stack-pointer register, seeded with the top of the stack region.
pub const REG_SP: usize = 1;

/// First argument register: address of the encoded arguments on entry,
/// address of the result blob on halt.
pub const REG_A0: usize = 7;

/// Second argument register: argument length on entry, result length on
/// halt.
pub const REG_A1: usize = 8;

/* MEMORY MAP */

/// Page size in bytes; the granularity of access rights.
pub const PAGE_SIZE: u32 = 4096;

/// Zone size: data regions begin on zone boundaries, and the lowest zone is
/// the unmapped guard.
pub const ZONE_SIZE: u32 = 1 << 16;

/// Reserved space for the argument region.
pub const INPUT_ZONE_SIZE: u32 = 1 << 24;

/// One past the highest addressable byte.
pub const ADDRESS_SPACE: u64 = 1 << 32;

/// Accesses below this address panic rather than fault.
pub const GUARD_ZONE_SIZE: u32 = ZONE_SIZE;

/// Base of the read-only data region.
pub const RO_BASE: u32 = ZONE_SIZE;

/// Base of the read-write data region for an image without read-only data.
pub const RW_BASE_MIN: u32 = 2 * ZONE_SIZE;

/// Top of the stack region (exclusive); the initial stack pointer.
pub const STACK_TOP: u32 =
    (ADDRESS_SPACE - 2 * ZONE_SIZE as u64 - INPUT_ZONE_SIZE as u64) as u32;

/// Base of the argument region.
pub const ARGS_BASE: u32 = (ADDRESS_SPACE - ZONE_SIZE as u64 - INPUT_ZONE_SIZE as u64) as u32;

/// Indirect-jump target that terminates the invocation successfully.
pub const HALT_ADDRESS: u32 = (ADDRESS_SPACE - ZONE_SIZE as u64) as u32;

/// Dynamic jump-table addresses must be multiples of this.
pub const JUMP_ALIGNMENT: u64 = 2;

const_assert_eq!(STACK_TOP, 0xfefe_0000);
const_assert_eq!(ARGS_BASE, 0xfeff_0000);
const_assert_eq!(HALT_ADDRESS, 0xffff_0000);
const_assert_eq!(ZONE_SIZE % PAGE_SIZE, 0);
const_assert_eq!(ARGS_BASE % PAGE_SIZE, 0);
