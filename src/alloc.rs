//! The allocation seam every tree node, string and parse buffer goes through.

#![allow(unsafe_code)]

#[cfg(test)]
#[path = "./alloc_tests.rs"]
mod tests;

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

const MIN_CAP: u32 = 4;

/// A source of memory for parsed trees.
///
/// The parser never touches the platform allocator for tree memory directly;
/// every table, array, string and key buffer is obtained from, and later
/// returned to, the allocator handed to [`parse_in`](crate::parse_in). The
/// tree keeps a reference to that allocator and hands its memory back when
/// dropped, so the allocator must outlive the tree.
///
/// Zero-sized requests are never made, and `release` is only ever called with
/// a pointer previously returned by `allocate` on the same allocator.
///
/// # Safety
///
/// A pointer returned by `allocate` must be valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and must stay valid
/// until it is passed back to `release`.
pub unsafe trait Allocator: Sync {
    /// Allocates a block for `layout`, returning `None` when no memory is
    /// available. Failures are not retried.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`Allocator::allocate`] on this
    /// allocator with the same `layout`, and must not have been released yet.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The platform allocator, used by the entry points that take no allocator.
#[derive(Copy, Clone, Debug, Default)]
pub struct Global;

pub(crate) static GLOBAL: Global = Global;

unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return NonNull::new(layout.align() as *mut u8);
        }
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }
}

/// An [`Allocator`] refused a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocError {
    /// Size in bytes of the request that failed.
    pub size: usize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory allocation of {} bytes failed", self.size)
    }
}

impl std::error::Error for AllocError {}

/// Growable buffer with 32-bit length and capacity whose memory comes from an
/// [`Allocator`].
///
/// Growth never panics: a refused allocation or a capacity overflow is
/// reported as [`AllocError`] and the buffer is left untouched.
pub(crate) struct RawVec<'a, T> {
    ptr: NonNull<T>,
    len: u32,
    cap: u32,
    alloc: &'a dyn Allocator,
}

// The allocator is `Sync`, so the shared reference may cross threads; the
// buffer itself owns its elements.
unsafe impl<T: Send> Send for RawVec<'_, T> {}
unsafe impl<T: Sync> Sync for RawVec<'_, T> {}

impl<'a, T> RawVec<'a, T> {
    #[inline]
    pub(crate) fn new_in(alloc: &'a dyn Allocator) -> Self {
        debug_assert!(size_of::<T>() != 0);
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value`, dropping it if the buffer cannot grow.
    #[inline]
    pub(crate) fn try_push(&mut self, value: T) -> Result<(), AllocError> {
        if self.len == self.cap {
            self.grow(1)?;
        }
        unsafe {
            self.ptr.as_ptr().add(self.len as usize).write(value);
        }
        self.len += 1;
        Ok(())
    }

    /// Drops every element, keeping the allocation for reuse.
    pub(crate) fn clear(&mut self) {
        let len = self.len as usize;
        self.len = 0;
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), len));
        }
    }

    #[inline]
    pub(crate) fn last_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len as usize) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len as usize) }
    }

    /// Ensures room for at least `additional` more elements.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        if (self.cap - self.len) as usize >= additional {
            return Ok(());
        }
        self.grow(additional)
    }

    #[cold]
    fn grow(&mut self, additional: usize) -> Result<(), AllocError> {
        let overflow = AllocError { size: usize::MAX };
        let required = (self.len as usize)
            .checked_add(additional)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(overflow)?;
        let doubled = self.cap.saturating_mul(2);
        self.grow_to(required.max(doubled).max(MIN_CAP))
    }

    fn grow_to(&mut self, new_cap: u32) -> Result<(), AllocError> {
        let new_layout = Layout::array::<T>(new_cap as usize)
            .map_err(|_| AllocError { size: usize::MAX })?;
        let Some(raw) = self.alloc.allocate(new_layout) else {
            return Err(AllocError {
                size: new_layout.size(),
            });
        };
        let new_ptr = raw.cast::<T>();
        if self.cap != 0 {
            unsafe {
                std::ptr::copy_nonoverlapping(
                    self.ptr.as_ptr(),
                    new_ptr.as_ptr(),
                    self.len as usize,
                );
                self.release_buffer();
            }
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// # Safety
    ///
    /// The live elements must already have been moved out or dropped.
    unsafe fn release_buffer(&mut self) {
        if self.cap == 0 {
            return;
        }
        // The layout was valid when this capacity was allocated.
        let layout = unsafe {
            Layout::from_size_align_unchecked(
                size_of::<T>() * self.cap as usize,
                align_of::<T>(),
            )
        };
        unsafe { self.alloc.release(self.ptr.cast(), layout) }
    }
}

impl<'a> RawVec<'a, u8> {
    pub(crate) fn try_extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), AllocError> {
        self.try_reserve(bytes.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.ptr.as_ptr().add(self.len as usize),
                bytes.len(),
            );
        }
        // `try_reserve` guarantees the new length fits in the capacity.
        self.len += bytes.len() as u32;
        Ok(())
    }

    /// Grows the buffer to `len` zeroed bytes.
    pub(crate) fn try_zeroed(&mut self, len: usize) -> Result<(), AllocError> {
        if len <= self.len as usize {
            return Ok(());
        }
        let additional = len - self.len as usize;
        self.try_reserve(additional)?;
        unsafe {
            std::ptr::write_bytes(self.ptr.as_ptr().add(self.len as usize), 0, additional);
        }
        self.len = len as u32;
        Ok(())
    }
}

impl<T> Drop for RawVec<'_, T> {
    fn drop(&mut self) {
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len as usize,
            ));
            self.release_buffer();
        }
    }
}

/// Consuming iterator over a [`RawVec`].
pub(crate) struct IntoIter<'a, T> {
    buf: RawVec<'a, T>,
    index: u32,
}

impl<T> Iterator for IntoIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.index < self.buf.len {
            let value = unsafe { self.buf.ptr.as_ptr().add(self.index as usize).read() };
            self.index += 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.buf.len - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<'_, T> {}

impl<T> Drop for IntoIter<'_, T> {
    fn drop(&mut self) {
        let start = self.index as usize;
        let remaining = (self.buf.len - self.index) as usize;
        // Elements before `index` were moved out.
        self.buf.len = 0;
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.buf.ptr.as_ptr().add(start),
                remaining,
            ));
        }
    }
}

impl<'a, T> IntoIterator for RawVec<'a, T> {
    type Item = T;
    type IntoIter = IntoIter<'a, T>;

    fn into_iter(self) -> IntoIter<'a, T> {
        IntoIter {
            buf: self,
            index: 0,
        }
    }
}
