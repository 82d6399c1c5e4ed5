//! Dense N-dimensional storage for sample values and control points.
//!
//! Values are stored in C order (z(x0, y0), z(x0, y1), ..., z(x0, yn), z(x1, y0), ...),
//! so the last axis is contiguous. A fiber is the 1D slice obtained by fixing every
//! index except one; fibers are exposed as strided views so that per-axis solves
//! can work in place without copying.
use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::Error;

/// Extents of an N-dimensional mesh and the strides derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDimension<const N: usize> {
    dims: [usize; N],

    /// Distance in storage between neighbours along each axis
    strides: [usize; N],

    size: usize,
}

impl<const N: usize> MeshDimension<N> {
    pub fn new(dims: [usize; N]) -> Self {
        let mut strides = [0_usize; N];
        let size = fill_strides(&dims, &mut strides);
        Self {
            dims,
            strides,
            size,
        }
    }

    /// Total number of entries.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn dims(&self) -> [usize; N] {
        self.dims
    }

    #[inline]
    pub fn dim_size(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    #[inline]
    pub fn stride(&self, axis: usize) -> usize {
        self.strides[axis]
    }

    /// Linear storage index of a multi-index.
    #[inline]
    pub fn index_of(&self, indices: &[usize; N]) -> usize {
        let mut i = 0;
        for d in 0..N {
            i += indices[d] * self.strides[d];
        }
        i
    }

    /// Multi-index of a linear storage index, which must be less than `size()`.
    #[inline]
    pub fn indices_of(&self, linear: usize) -> [usize; N] {
        let mut rem = linear;
        let mut indices = [0_usize; N];
        for d in 0..N {
            indices[d] = rem / self.strides[d];
            rem %= self.strides[d];
        }
        indices
    }

    pub fn resize(&mut self, dims: [usize; N]) {
        *self = Self::new(dims);
    }

    /// Storage offsets of the first entry of every fiber along `axis`.
    ///
    /// The iterator owns its state, so a mesh can be mutated fiber by fiber
    /// while iterating over the offsets of a copy of its dimension.
    pub fn fiber_offsets(&self, axis: usize) -> FiberOffsets {
        let len = self.dims[axis];
        let inner = self.strides[axis];
        let count = if len == 0 { 0 } else { self.size / len };
        FiberOffsets {
            block: len * inner,
            inner,
            next: 0,
            count,
        }
    }
}

/// Populate row-major strides, returning the total size.
fn fill_strides<const N: usize>(dims: &[usize; N], strides: &mut [usize; N]) -> usize {
    let mut acc = 1;
    for i in 0..N {
        strides[N - i - 1] = acc;
        acc *= dims[N - i - 1];
    }
    acc
}

/// Iterator over the starting offsets of the fibers along one axis.
#[derive(Debug, Clone)]
pub struct FiberOffsets {
    /// Storage span of one full run of the fiber axis
    block: usize,

    /// Number of fibers interleaved within one block
    inner: usize,

    next: usize,
    count: usize,
}

impl Iterator for FiberOffsets {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.next >= self.count {
            return None;
        }
        let k = self.next;
        self.next += 1;
        Some((k / self.inner) * self.block + k % self.inner)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FiberOffsets {}

/// A dense N-dimensional array in C order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<T, const N: usize> {
    storage: Vec<T>,
    dimension: MeshDimension<N>,
}

impl<T: Clone + Default, const N: usize> Mesh<T, N> {
    /// A mesh of the given extents filled with `T::default()`.
    pub fn new(dims: [usize; N]) -> Self {
        let dimension = MeshDimension::new(dims);
        Self {
            storage: vec![T::default(); dimension.size()],
            dimension,
        }
    }
}

impl<T, const N: usize> Mesh<T, N> {
    /// Wrap C-ordered data.
    ///
    /// # Errors
    /// * If `data.len()` is not the product of `dims`
    pub fn from_vec(dims: [usize; N], data: Vec<T>) -> Result<Self, Error> {
        let dimension = MeshDimension::new(dims);
        if data.len() != dimension.size() {
            return Err(Error::DimensionMismatch);
        }
        Ok(Self {
            storage: data,
            dimension,
        })
    }

    /// Build a mesh by evaluating `f` at every multi-index, in storage order.
    pub fn from_fn<F>(dims: [usize; N], mut f: F) -> Self
    where
        F: FnMut([usize; N]) -> T,
    {
        let dimension = MeshDimension::new(dims);
        let storage = (0..dimension.size())
            .map(|i| f(dimension.indices_of(i)))
            .collect();
        Self { storage, dimension }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn dim_size(&self, axis: usize) -> usize {
        self.dimension.dim_size(axis)
    }

    #[inline]
    pub fn dims(&self) -> [usize; N] {
        self.dimension.dims()
    }

    #[inline]
    pub fn dimension(&self) -> &MeshDimension<N> {
        &self.dimension
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage
    }

    pub fn into_vec(self) -> Vec<T> {
        self.storage
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.storage.iter()
    }

    /// Iterate over `(multi-index, value)` pairs in storage order.
    pub fn indexed_iter(&self) -> impl Iterator<Item = ([usize; N], &T)> + '_ {
        let dimension = self.dimension;
        self.storage
            .iter()
            .enumerate()
            .map(move |(i, v)| (dimension.indices_of(i), v))
    }

    /// Checked element access.
    pub fn get(&self, indices: &[usize; N]) -> Option<&T> {
        if self.in_bounds(indices) {
            Some(&self.storage[self.dimension.index_of(indices)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, indices: &[usize; N]) -> Option<&mut T> {
        if self.in_bounds(indices) {
            let i = self.dimension.index_of(indices);
            Some(&mut self.storage[i])
        } else {
            None
        }
    }

    fn in_bounds(&self, indices: &[usize; N]) -> bool {
        (0..N).all(|d| indices[d] < self.dimension.dim_size(d))
    }

    /// Read-only view of the fiber along `axis` starting at storage `offset`.
    ///
    /// Valid offsets are produced by [`MeshDimension::fiber_offsets`].
    pub fn fiber(&self, axis: usize, offset: usize) -> Fiber<'_, T> {
        Fiber {
            data: &self.storage,
            offset,
            stride: self.dimension.stride(axis),
            len: self.dimension.dim_size(axis),
        }
    }

    /// Mutable view of the fiber along `axis` starting at storage `offset`.
    pub fn fiber_mut(&mut self, axis: usize, offset: usize) -> FiberMut<'_, T> {
        FiberMut {
            stride: self.dimension.stride(axis),
            len: self.dimension.dim_size(axis),
            data: &mut self.storage,
            offset,
        }
    }
}

impl<T, const N: usize> Index<[usize; N]> for Mesh<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, indices: [usize; N]) -> &T {
        &self.storage[self.dimension.index_of(&indices)]
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Mesh<T, N> {
    #[inline]
    fn index_mut(&mut self, indices: [usize; N]) -> &mut T {
        let i = self.dimension.index_of(&indices);
        &mut self.storage[i]
    }
}

impl<T> From<Vec<T>> for Mesh<T, 1> {
    fn from(data: Vec<T>) -> Self {
        let dimension = MeshDimension::new([data.len()]);
        Self {
            storage: data,
            dimension,
        }
    }
}

/// Strided read-only view of one fiber.
#[derive(Debug, Clone, Copy)]
pub struct Fiber<'a, T> {
    data: &'a [T],
    offset: usize,
    stride: usize,
    len: usize,
}

impl<'a, T> Fiber<'a, T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + 'a {
        let (data, offset, stride) = (self.data, self.offset, self.stride);
        (0..self.len).map(move |i| &data[offset + i * stride])
    }
}

impl<T> Index<usize> for Fiber<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        assert!(i < self.len, "fiber index {i} out of bounds for length {}", self.len);
        &self.data[self.offset + i * self.stride]
    }
}

/// Strided mutable view of one fiber.
#[derive(Debug)]
pub struct FiberMut<'a, T> {
    data: &'a mut [T],
    offset: usize,
    stride: usize,
    len: usize,
}

impl<T> FiberMut<'_, T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Index<usize> for FiberMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        assert!(i < self.len, "fiber index {i} out of bounds for length {}", self.len);
        &self.data[self.offset + i * self.stride]
    }
}

impl<T> IndexMut<usize> for FiberMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        assert!(i < self.len, "fiber index {i} out of bounds for length {}", self.len);
        &mut self.data[self.offset + i * self.stride]
    }
}
