// FixedArray - Ring-indexed table with a power-of-two capacity
// Principle: Bounded memory, accesses never fail (indices wrap modulo capacity)

use std::fmt;

/// Fixed-capacity array whose capacity `N` is a power of two.
///
/// Every index is masked with `N - 1` before use, so `get(i)` and `get(i + N)`
/// address the same slot. This mirrors how the contract stores its state and
/// must be preserved: an out-of-range index silently aliases a slot, it is
/// never rejected.
///
/// Storage lives on the heap; the lock table alone is several hundred MB.
#[derive(Clone, PartialEq, Eq)]
pub struct FixedArray<T, const N: usize> {
    values: Box<[T]>,
}

impl<T, const N: usize> FixedArray<T, N> {
    /// Evaluated on every construction, so a bad `N` fails the build.
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        N.is_power_of_two(),
        "The capacity of the array must be 2^N."
    );

    const MASK: u64 = N as u64 - 1;

    /// Array with every slot set to `value`
    pub fn filled(value: T) -> Self
    where
        T: Clone,
    {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;

        Self {
            values: vec![value; N].into_boxed_slice(),
        }
    }

    /// Array with every slot set to `T::default()`
    pub fn new() -> Self
    where
        T: Clone + Default,
    {
        Self::filled(T::default())
    }

    /// Number of slots (always `N`, regardless of occupancy)
    pub const fn capacity() -> u64 {
        N as u64
    }

    #[inline]
    fn slot(index: u64) -> usize {
        (index & Self::MASK) as usize
    }

    /// Element at `index` modulo capacity
    #[inline]
    pub fn get(&self, index: u64) -> &T {
        &self.values[Self::slot(index)]
    }

    /// Overwrite the element at `index` modulo capacity
    #[inline]
    pub fn set(&mut self, index: u64, value: T) {
        self.values[Self::slot(index)] = value;
    }

    /// Overwrite every slot
    pub fn set_all(&mut self, value: T)
    where
        T: Clone,
    {
        self.values.fill(value);
    }

    /// Overwrite every raw index in `[begin, end)`, each one masked.
    ///
    /// A range longer than `N` keeps wrapping and rewrites slots.
    pub fn set_range(&mut self, begin: u64, end: u64, value: T)
    where
        T: Clone,
    {
        for index in begin..end {
            self.values[Self::slot(index)] = value.clone();
        }
    }

    /// `true` iff every slot in `[begin, end)` equals `value`.
    ///
    /// No wrapping here: a range with `end > N` or `begin > end` is reported as
    /// `false` rather than an error.
    pub fn range_equals(&self, begin: u64, end: u64, value: &T) -> bool
    where
        T: PartialEq,
    {
        if end > Self::capacity() || begin > end {
            return false;
        }
        self.values[begin as usize..end as usize]
            .iter()
            .all(|slot| slot == value)
    }

    /// All slots in index order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }
}

impl<T: Clone + Default, const N: usize> Default for FixedArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

// Dumping millions of slots is never useful
impl<T, const N: usize> fmt::Debug for FixedArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedArray")
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}
