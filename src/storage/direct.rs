//! Off-heap aligned f64 buffer

use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc, handle_alloc_error};
use std::fmt;
use std::ptr::NonNull;

/// AVX-512 alignment, also satisfies AVX2 and NEON
const ALIGN: usize = 64;

/// Zero-initialised, 64-byte aligned buffer of `f64` outside the `Vec` heap
///
/// The pointer is stable for the buffer's lifetime and can be handed to native
/// code without copying.
pub struct DirectBuffer {
    ptr: NonNull<f64>,
    len: usize,
}

// SAFETY: DirectBuffer owns its allocation exclusively, like Vec<f64>.
unsafe impl Send for DirectBuffer {}
unsafe impl Sync for DirectBuffer {}

impl DirectBuffer {
    fn alloc_layout(len: usize) -> AllocLayout {
        let size = len
            .checked_mul(std::mem::size_of::<f64>())
            .expect("DirectBuffer size overflow");
        AllocLayout::from_size_align(size, ALIGN).expect("Invalid allocation layout")
    }

    /// Allocate `len` zeroed elements
    pub fn zeroed(len: usize) -> Self {
        if len == 0 {
            return Self {
                ptr: NonNull::dangling(),
                len: 0,
            };
        }

        let layout = Self::alloc_layout(len);
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc_zeroed(layout) } as *mut f64;
        let Some(ptr) = NonNull::new(raw) else {
            handle_alloc_error(layout);
        };
        Self { ptr, len }
    }

    /// Allocate a buffer holding a copy of `data`
    pub fn from_slice(data: &[f64]) -> Self {
        let mut buf = Self::zeroed(data.len());
        buf.as_mut_slice().copy_from_slice(data);
        buf
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        // SAFETY: ptr is valid for len initialised elements (or dangling with len 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_ptr(&self) -> *const f64 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut f64 {
        self.ptr.as_ptr()
    }

    /// View the elements as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl Drop for DirectBuffer {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        let layout = Self::alloc_layout(self.len);
        // SAFETY: allocated in `zeroed` with the same layout.
        unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
    }
}

impl Clone for DirectBuffer {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl PartialEq for DirectBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for DirectBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectBuffer")
            .field("len", &self.len)
            .field("ptr", &self.ptr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_and_aligned() {
        let buf = DirectBuffer::zeroed(13);
        assert_eq!(buf.len(), 13);
        assert!(buf.as_slice().iter().all(|&x| x == 0.0));
        assert_eq!(buf.as_ptr() as usize % ALIGN, 0);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = DirectBuffer::from_slice(&[1.0, 2.0]);
        let b = a.clone();
        a.as_mut_slice()[0] = 9.0;
        assert_eq!(b.as_slice(), &[1.0, 2.0]);
        assert_ne!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn test_empty() {
        let buf = DirectBuffer::zeroed(0);
        assert!(buf.is_empty());
        assert!(buf.as_bytes().is_empty());
    }

    #[test]
    fn test_bytes() {
        let buf = DirectBuffer::from_slice(&[1.0]);
        assert_eq!(buf.as_bytes(), &1.0f64.to_ne_bytes());
    }
}
