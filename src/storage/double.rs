//! Primitive-double storage in Heap or Direct mode

use super::{DirectBuffer, Layout, MatrixView, Storage, assert_index, check_index};
use crate::error::{Error, Result};
use std::any::Any;

/// Ownership mode of a primitive-double buffer
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BufferMode {
    /// Process-owned `Vec<f64>`
    #[default]
    Heap,
    /// 64-byte aligned [`DirectBuffer`] with a stable address for native code
    Direct,
}

#[derive(Clone, Debug, PartialEq)]
enum Buffer {
    Heap(Vec<f64>),
    Direct(DirectBuffer),
}

impl Buffer {
    fn new(data: Vec<f64>, mode: BufferMode) -> Self {
        match mode {
            BufferMode::Heap => Buffer::Heap(data),
            BufferMode::Direct => Buffer::Direct(DirectBuffer::from_slice(&data)),
        }
    }

    #[inline]
    fn as_slice(&self) -> &[f64] {
        match self {
            Buffer::Heap(v) => v,
            Buffer::Direct(d) => d.as_slice(),
        }
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [f64] {
        match self {
            Buffer::Heap(v) => v,
            Buffer::Direct(d) => d.as_mut_slice(),
        }
    }
}

/// Row-major `f64` matrix storage
///
/// Both modes share the same read/write contract; only [`raw_buffer`]
/// observes the difference.
///
/// [`raw_buffer`]: DoubleStorage::raw_buffer
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleStorage {
    rows: usize,
    cols: usize,
    buffer: Buffer,
}

impl DoubleStorage {
    /// Wrap row-major data whose length is `rows * cols`
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`. Use [`try_from_vec`] for
    /// unchecked input.
    ///
    /// [`try_from_vec`]: DoubleStorage::try_from_vec
    pub fn from_buffer(rows: usize, cols: usize, data: Vec<f64>, mode: BufferMode) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "buffer length does not match {}x{}",
            rows,
            cols
        );
        Self {
            rows,
            cols,
            buffer: Buffer::new(data, mode),
        }
    }

    /// Wrap row-major data, validating its length
    pub fn try_from_vec(rows: usize, cols: usize, data: Vec<f64>, mode: BufferMode) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::invalid_argument(
                "data",
                format!(
                    "expected {} elements for {}x{}, got {}",
                    rows * cols,
                    rows,
                    cols,
                    data.len()
                ),
            ));
        }
        Ok(Self::from_buffer(rows, cols, data, mode))
    }

    /// All-zero storage
    pub fn zeros(rows: usize, cols: usize, mode: BufferMode) -> Self {
        let buffer = match mode {
            BufferMode::Heap => Buffer::Heap(vec![0.0; rows * cols]),
            BufferMode::Direct => Buffer::Direct(DirectBuffer::zeroed(rows * cols)),
        };
        Self { rows, cols, buffer }
    }

    /// Copy any f64 storage into a primitive buffer
    pub fn from_storage(src: &dyn Storage<f64>, mode: BufferMode) -> Self {
        if let Some(double) = src.as_any().downcast_ref::<DoubleStorage>() {
            return double.clone().into_mode(mode);
        }
        Self::from_buffer(src.rows(), src.cols(), src.to_row_major(), mode)
    }

    /// Current ownership mode
    pub fn mode(&self) -> BufferMode {
        match self.buffer {
            Buffer::Heap(_) => BufferMode::Heap,
            Buffer::Direct(_) => BufferMode::Direct,
        }
    }

    /// Convert to `mode`, copying only if the mode changes
    pub fn into_mode(self, mode: BufferMode) -> Self {
        if self.mode() == mode {
            return self;
        }
        let buffer = match (self.buffer, mode) {
            (Buffer::Heap(v), BufferMode::Direct) => Buffer::Direct(DirectBuffer::from_slice(&v)),
            (Buffer::Direct(d), BufferMode::Heap) => Buffer::Heap(d.as_slice().to_vec()),
            (buffer, _) => buffer,
        };
        Self {
            rows: self.rows,
            cols: self.cols,
            buffer,
        }
    }

    /// Unboxed read
    #[inline]
    pub fn get_double(&self, row: usize, col: usize) -> f64 {
        assert_index(self.rows, self.cols, row, col);
        self.buffer.as_slice()[row * self.cols + col]
    }

    /// Unboxed write
    #[inline]
    pub fn set_double(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        check_index(self.rows, self.cols, row, col)?;
        let cols = self.cols;
        self.buffer.as_mut_slice()[row * cols + col] = value;
        Ok(())
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        self.buffer.as_slice()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.buffer.as_mut_slice()
    }

    /// Contiguous buffer for native interop
    ///
    /// Direct storage lends its own memory; writes through the returned view
    /// are visible in this storage and the borrow ends with it. Heap storage
    /// is copied into a fresh [`DirectBuffer`] owned by the caller.
    pub fn raw_buffer(&mut self) -> RawBuffer<'_> {
        match &mut self.buffer {
            Buffer::Direct(d) => RawBuffer::Shared(d.as_mut_slice()),
            Buffer::Heap(v) => RawBuffer::Copied(DirectBuffer::from_slice(v)),
        }
    }
}

impl MatrixView<f64> for DoubleStorage {
    #[inline]
    fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        self.get_double(row, col)
    }

    fn to_row_major(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }
}

impl Storage<f64> for DoubleStorage {
    fn layout(&self) -> Layout {
        Layout::Double(self.mode())
    }

    fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.set_double(row, col, value)
    }

    fn stored_len(&self) -> usize {
        self.rows * self.cols
    }

    fn clone_box(&self) -> Box<dyn Storage<f64>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Contiguous f64 view handed to native code
#[derive(Debug)]
pub enum RawBuffer<'a> {
    /// The storage's own Direct memory
    Shared(&'a mut [f64]),
    /// A fresh copy of Heap memory
    Copied(DirectBuffer),
}

impl RawBuffer<'_> {
    /// Returns true if writes reach the originating storage
    pub fn is_zero_copy(&self) -> bool {
        matches!(self, RawBuffer::Shared(_))
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            RawBuffer::Shared(s) => s,
            RawBuffer::Copied(d) => d.as_slice(),
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        match self {
            RawBuffer::Shared(s) => s,
            RawBuffer::Copied(d) => d.as_mut_slice(),
        }
    }

    pub fn as_ptr(&self) -> *const f64 {
        self.as_slice().as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut f64 {
        self.as_mut_slice().as_mut_ptr()
    }
}
