//! Paged linear memory.
//!
//! A sparse table of 4 KiB pages, each carrying access rights. Reads and
//! writes are checked against the rights of every touched page before any
//! byte moves, so a faulting write never partially lands. The heap grows
//! upward in page units through [`Memory::sbrk`].

use std::collections::BTreeMap;

use crate::consts::*;

bitflags::bitflags! {
    /// Access rights of one page. Writable pages are always readable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessRights: u8 {
        /// Loads are allowed.
        const READ = 0b01;
        /// Stores (and loads) are allowed.
        const WRITE = 0b11;
    }
}

#[derive(Debug, Clone)]
struct Page {
    data: Box<[u8; PAGE_SIZE as usize]>,
    rights: AccessRights,
}

impl Page {
    fn new(rights: AccessRights) -> Self {
        Self {
            data: Box::new([0; PAGE_SIZE as usize]),
            rights,
        }
    }
}

/// A denied access; carries the first offending byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("page fault at address {0:#x}")]
pub struct MemoryFault(pub u32);

/// Sparse paged address space with a heap pointer.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    pages: BTreeMap<u32, Page>,
    heap_pointer: u32,
}

impl Memory {
    /// Empty address space; every access faults until pages are mapped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out the standard invocation memory map: read-only data, heap
    /// (read-write data plus zero padding), stack and argument regions.
    /// The guard zone stays unmapped.
    pub fn init_layout(
        &mut self,
        args: &[u8],
        ro_data: &[u8],
        rw_data: &[u8],
        stack_size: u32,
        heap_pad: u32,
    ) {
        self.pages.clear();

        self.map_region(RO_BASE, ro_data.len() as u64, AccessRights::READ);
        self.copy_in(RO_BASE, ro_data);

        let rw_base = RW_BASE_MIN + zone_align(ro_data.len() as u64) as u32;
        let heap_len = rw_data.len() as u64 + heap_pad as u64;
        self.map_region(rw_base, heap_len, AccessRights::WRITE);
        self.copy_in(rw_base, rw_data);
        self.heap_pointer = rw_base + page_align(heap_len) as u32;

        let stack_len = page_align(stack_size as u64) as u32;
        self.map_region(STACK_TOP - stack_len, stack_len as u64, AccessRights::WRITE);

        self.map_region(ARGS_BASE, args.len() as u64, AccessRights::READ);
        self.copy_in(ARGS_BASE, args);
    }

    /// Map `len` bytes from `base` (page-aligned up) with the given rights,
    /// replacing whatever was there. Zero length maps nothing.
    pub fn map_region(&mut self, base: u32, len: u64, rights: AccessRights) {
        let first = base / PAGE_SIZE;
        let last = (base as u64 + page_align(len)) / PAGE_SIZE as u64;
        for index in first..last as u32 {
            self.pages.insert(index, Page::new(rights));
        }
    }

    /// Rights of the page containing `address`, if mapped.
    pub fn rights_at(&self, address: u32) -> Option<AccessRights> {
        self.pages.get(&(address / PAGE_SIZE)).map(|p| p.rights)
    }

    /// Current heap pointer.
    pub fn heap_pointer(&self) -> u32 {
        self.heap_pointer
    }

    /// Read `len` bytes from `address`.
    ///
    /// Fails without copying if any touched byte lies in a page without
    /// read rights; the fault carries the first such byte.
    pub fn read(&self, address: u32, len: usize) -> Result<Vec<u8>, MemoryFault> {
        self.check(address, len as u64, AccessRights::READ)?;

        let mut out = Vec::with_capacity(len);
        let mut at = address as u64;
        let end = address as u64 + len as u64;
        while at < end {
            let page = &self.pages[&((at / PAGE_SIZE as u64) as u32)];
            let offset = (at % PAGE_SIZE as u64) as usize;
            let take = ((PAGE_SIZE as u64 - offset as u64).min(end - at)) as usize;
            out.extend_from_slice(&page.data[offset..offset + take]);
            at += take as u64;
        }
        Ok(out)
    }

    /// Write `bytes` at `address`, atomically per call: on a fault no byte
    /// is written.
    pub fn write(&mut self, address: u32, bytes: &[u8]) -> Result<(), MemoryFault> {
        self.check(address, bytes.len() as u64, AccessRights::WRITE)?;
        self.copy_in(address, bytes);
        Ok(())
    }

    /// Grow the heap by `delta` bytes.
    ///
    /// Zero leaves everything unchanged and returns the current pointer.
    /// Growth past the end of the address space returns 0 without
    /// advancing. Newly spanned pages become writable.
    pub fn sbrk(&mut self, delta: u64) -> u64 {
        if delta == 0 {
            return self.heap_pointer as u64;
        }

        let new_pointer = self.heap_pointer as u64 + delta;
        if new_pointer > ADDRESS_SPACE - 1 {
            return 0;
        }

        let first = self.heap_pointer / PAGE_SIZE + u32::from(self.heap_pointer % PAGE_SIZE != 0);
        let last = (page_align(new_pointer) / PAGE_SIZE as u64) as u32;
        for index in first..last {
            self.pages
                .entry(index)
                .or_insert_with(|| Page::new(AccessRights::WRITE));
        }

        self.heap_pointer = new_pointer as u32;
        new_pointer
    }

    fn check(&self, address: u32, len: u64, needed: AccessRights) -> Result<(), MemoryFault> {
        if len == 0 {
            return Ok(());
        }

        let end = address as u64 + len;
        let mut page_base = address as u64 - (address as u64 % PAGE_SIZE as u64);
        while page_base < end {
            let allowed = page_base < ADDRESS_SPACE
                && self
                    .pages
                    .get(&((page_base / PAGE_SIZE as u64) as u32))
                    .is_some_and(|page| page.rights.contains(needed));
            if !allowed {
                let first_denied = page_base.max(address as u64).min(ADDRESS_SPACE - 1);
                return Err(MemoryFault(first_denied as u32));
            }
            page_base += PAGE_SIZE as u64;
        }
        Ok(())
    }

    /// Copy bytes in without a rights check; pages must already be mapped.
    /// Used while building the initial layout.
    fn copy_in(&mut self, address: u32, bytes: &[u8]) {
        let mut at = address as u64;
        let end = address as u64 + bytes.len() as u64;
        let mut copied = 0usize;
        while at < end {
            let page = self
                .pages
                .get_mut(&((at / PAGE_SIZE as u64) as u32))
                .unwrap_or_else(|| unreachable!("layout maps pages before filling them"));
            let offset = (at % PAGE_SIZE as u64) as usize;
            let take = ((PAGE_SIZE as u64 - offset as u64).min(end - at)) as usize;
            page.data[offset..offset + take].copy_from_slice(&bytes[copied..copied + take]);
            at += take as u64;
            copied += take;
        }
    }
}

fn page_align(len: u64) -> u64 {
    len.div_ceil(PAGE_SIZE as u64) * PAGE_SIZE as u64
}

fn zone_align(len: u64) -> u64 {
    len.div_ceil(ZONE_SIZE as u64) * ZONE_SIZE as u64
}
