//! Guest CPU memory as seen by the surface cache.
//!
//! The emulator core provides the real implementation. Surfaces are loaded from and flushed to
//! guest CPU addresses after GPU address translation (see [`crate::GpuAddressSpace`]).

use std::cell::{Ref, RefCell, RefMut};

use thiserror::Error;
use tegra_hw::VAddr;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("guest memory access out of bounds: addr=0x{addr:x}, len=0x{len:x}")]
pub struct GuestMemoryError {
    pub addr: VAddr,
    pub len: usize,
}

/// Minimal guest memory interface.
pub trait GuestMemory {
    fn read(&self, addr: VAddr, dst: &mut [u8]) -> Result<(), GuestMemoryError>;
    fn write(&self, addr: VAddr, src: &[u8]) -> Result<(), GuestMemoryError>;
}

impl<M: GuestMemory + ?Sized> GuestMemory for &M {
    fn read(&self, addr: VAddr, dst: &mut [u8]) -> Result<(), GuestMemoryError> {
        (**self).read(addr, dst)
    }

    fn write(&self, addr: VAddr, src: &[u8]) -> Result<(), GuestMemoryError> {
        (**self).write(addr, src)
    }
}

/// Contiguous guest RAM starting at CPU address 0.
#[derive(Clone, Debug)]
pub struct VecGuestMemory {
    mem: RefCell<Vec<u8>>,
}

impl VecGuestMemory {
    pub fn new(size_bytes: usize) -> Self {
        Self {
            mem: RefCell::new(vec![0u8; size_bytes]),
        }
    }

    pub fn len(&self) -> usize {
        self.mem.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> Ref<'_, [u8]> {
        Ref::map(self.mem.borrow(), |v| v.as_slice())
    }

    pub fn as_mut_slice(&self) -> RefMut<'_, [u8]> {
        RefMut::map(self.mem.borrow_mut(), |v| v.as_mut_slice())
    }

    fn range(&self, addr: VAddr, len: usize) -> Result<std::ops::Range<usize>, GuestMemoryError> {
        let err = GuestMemoryError { addr, len };
        let start = usize::try_from(addr).map_err(|_| err.clone())?;
        let end = start.checked_add(len).ok_or_else(|| err.clone())?;
        if end > self.len() {
            return Err(err);
        }
        Ok(start..end)
    }
}

impl GuestMemory for VecGuestMemory {
    fn read(&self, addr: VAddr, dst: &mut [u8]) -> Result<(), GuestMemoryError> {
        let range = self.range(addr, dst.len())?;
        dst.copy_from_slice(&self.mem.borrow()[range]);
        Ok(())
    }

    fn write(&self, addr: VAddr, src: &[u8]) -> Result<(), GuestMemoryError> {
        let range = self.range(addr, src.len())?;
        self.mem.borrow_mut()[range].copy_from_slice(src);
        Ok(())
    }
}
