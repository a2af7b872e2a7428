use jam_pvm::prelude::*;

fn r(index: u8) -> RegId {
    RegId::new(index)
}

/// Machine with one writable page at 0x1_0000 (just above the guard zone)
/// and gas to spare.
fn machine(builder: ProgramBuilder) -> Interpreter<(), HostFn<()>> {
    let mut vm = Interpreter::new(builder.program(), no_host as HostFn<()>, ());
    vm.memory_mut()
        .map_region(0x1_0000, PAGE_SIZE as u64, AccessRights::WRITE);
    vm.set_gas(1_000);
    vm
}

fn run_to_halt(builder: ProgramBuilder) -> Interpreter<(), HostFn<()>> {
    let mut vm = machine(builder);
    assert_eq!(vm.run(), ExitReason::Halt);
    vm
}

#[test]
fn store_then_load_roundtrip() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::load_imm_64(r(1), 0xdead_beef));
    builder.push(&op::store_u32(r(1), 0x1_0000));
    builder.push(&op::load_u32(r(2), 0x1_0000));
    builder.push(&op::jump_ind(r(0), HALT_ADDRESS as u64));

    let vm = run_to_halt(builder);
    assert_eq!(vm.registers()[2], 0xdead_beef);
    assert_eq!(
        vm.memory().read(0x1_0000, 4).unwrap(),
        0xdead_beef_u32.to_le_bytes()
    );
}

#[test]
fn stores_below_the_guard_zone_panic() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::load_imm_64(r(1), 0xdead_beef));
    builder.push(&op::store_u32(r(1), 0x0fff));

    let mut vm = machine(builder);
    assert_eq!(vm.run(), ExitReason::Panic(PanicReason::GuardZoneAccess));
}

#[test]
fn the_guard_applies_to_every_addressing_form() {
    let cases: Vec<Vec<u8>> = vec![
        op::load_u8(r(1), 0x10),
        op::load_ind_u16(r(1), r(2), 0x20),
        op::store_imm_u32(0x30, 1),
        op::store_imm_ind_u64(r(2), 0x40, 1),
        op::store_ind_u8(r(1), r(2), 0x50),
    ];
    for instruction in cases {
        let mut builder = ProgramBuilder::new();
        builder.push(&instruction);
        let mut vm = machine(builder);
        assert_eq!(
            vm.run(),
            ExitReason::Panic(PanicReason::GuardZoneAccess),
            "instruction {instruction:?}"
        );
    }
}

#[test]
fn unmapped_accesses_fault_with_the_address() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::load_u64(r(1), 0x2_0008));
    let mut vm = machine(builder);
    assert_eq!(vm.run(), ExitReason::PageFault(0x2_0008));

    // Writes that straddle into an unmapped page report the page edge.
    let mut builder = ProgramBuilder::new();
    builder.push(&op::load_imm_64(r(1), u64::MAX));
    builder.push(&op::store_u64(r(1), 0x1_0ffc));
    let mut vm = machine(builder);
    assert_eq!(vm.run(), ExitReason::PageFault(0x1_1000));
    // And the readable half stayed untouched.
    assert_eq!(vm.memory().read(0x1_0ffc, 4).unwrap(), vec![0; 4]);
}

#[test]
fn indirect_addressing_wraps_modulo_2_pow_32() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::load_imm_64(r(2), 0xffff_ffff));
    builder.push(&op::store_ind_u8(r(1), r(2), 0x1_0001)); // wraps to 0x1_0000
    builder.push(&op::load_imm_64(r(1), 0x2a));
    builder.push(&op::store_ind_u8(r(1), r(2), 0x1_0003)); // wraps to 0x1_0002
    builder.push(&op::load_ind_u8(r(3), r(2), 0x1_0003));
    builder.push(&op::jump_ind(r(0), HALT_ADDRESS as u64));

    let vm = run_to_halt(builder);
    assert_eq!(vm.registers()[3], 0x2a);
}

#[test]
fn signed_loads_extend_and_unsigned_loads_do_not() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::store_imm_u16(0x1_0000, 0x8001));
    builder.push(&op::load_i16(r(1), 0x1_0000));
    builder.push(&op::load_u16(r(2), 0x1_0000));
    builder.push(&op::load_i8(r(3), 0x1_0001));
    builder.push(&op::jump_ind(r(0), HALT_ADDRESS as u64));

    let vm = run_to_halt(builder);
    assert_eq!(vm.registers()[1], 0xffff_ffff_ffff_8001);
    assert_eq!(vm.registers()[2], 0x8001);
    assert_eq!(vm.registers()[3], 0xffff_ffff_ffff_ff80);
}

#[test]
fn immediate_stores_in_all_widths() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::store_imm_u8(0x1_0000, 0x11));
    builder.push(&op::store_imm_u16(0x1_0002, 0x2222));
    builder.push(&op::store_imm_u32(0x1_0004, 0x3333_3333));
    // The immediate is sign-extended to the full store width.
    builder.push(&op::store_imm_u64(0x1_0008, -2i64 as u64));
    builder.push(&op::jump_ind(r(0), HALT_ADDRESS as u64));

    let vm = run_to_halt(builder);
    assert_eq!(vm.memory().read(0x1_0000, 1).unwrap(), vec![0x11]);
    assert_eq!(vm.memory().read(0x1_0002, 2).unwrap(), vec![0x22; 2]);
    assert_eq!(vm.memory().read(0x1_0004, 4).unwrap(), vec![0x33; 4]);
    assert_eq!(
        vm.memory().read(0x1_0008, 8).unwrap(),
        (-2i64).to_le_bytes()
    );
}

#[test]
fn stores_truncate_to_their_width() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::load_imm_64(r(1), 0x1234_5678_9abc_def0));
    builder.push(&op::store_u8(r(1), 0x1_0000));
    builder.push(&op::store_u16(r(1), 0x1_0002));
    builder.push(&op::jump_ind(r(0), HALT_ADDRESS as u64));

    let vm = run_to_halt(builder);
    assert_eq!(vm.memory().read(0x1_0000, 1).unwrap(), vec![0xf0]);
    assert_eq!(vm.memory().read(0x1_0002, 2).unwrap(), vec![0xf0, 0xde]);
}

#[test]
fn sbrk_returns_the_new_break_and_maps_pages() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::load_imm_64(r(1), 12));
    builder.push(&op::sbrk(r(2), r(1)));
    builder.push(&op::sbrk(r(3), r(0))); // r0 = 0: query the pointer
    builder.push(&op::jump_ind(r(0), HALT_ADDRESS as u64));

    let mut vm = Interpreter::new(builder.program(), no_host as HostFn<()>, ());
    vm.memory_mut().init_layout(&[], &[], &[], 0, 0);
    vm.set_gas(100);
    assert_eq!(vm.run(), ExitReason::Halt);

    let base = RW_BASE_MIN as u64;
    assert_eq!(vm.registers()[2], base + 12);
    assert_eq!(vm.registers()[3], base + 12);
    assert_eq!(vm.memory().heap_pointer() as u64, base + 12);
    // The page spanned by the growth is writable now.
    assert_eq!(
        vm.memory().rights_at(base as u32),
        Some(AccessRights::WRITE)
    );
}

#[test]
fn reads_of_write_pages_are_allowed() {
    let mut builder = ProgramBuilder::new();
    builder.push(&op::store_imm_u8(0x1_0010, 7));
    builder.push(&op::load_u8(r(1), 0x1_0010));
    builder.push(&op::jump_ind(r(0), HALT_ADDRESS as u64));

    let vm = run_to_halt(builder);
    assert_eq!(vm.registers()[1], 7);
}
