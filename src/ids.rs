//! Process-wide user-facing ID namespaces.
//!
//! Every entity kind owns one allocator, except lattices, which draw from
//! the universe allocator because a cell's `fill` ID may name either. IDs
//! handed out by [`allocate`] are never reused until they are explicitly
//! returned with [`release`].

use std::collections::BTreeSet;

use parking_lot::{const_mutex, Mutex};

/// The entity kinds that carry user-facing IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpace {
    Universe,
    Cell,
    Material,
    Lattice,
    Surface,
}

impl IdSpace {
    /// Lower-case label used in diagnostics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Universe => "universe",
            Self::Cell => "cell",
            Self::Material => "material",
            Self::Lattice => "lattice",
            Self::Surface => "surface",
        }
    }

    fn allocator(self) -> &'static Mutex<IdAllocator> {
        match self {
            Self::Universe | Self::Lattice => &UNIVERSES,
            Self::Cell => &CELLS,
            Self::Material => &MATERIALS,
            Self::Surface => &SURFACES,
        }
    }
}

static UNIVERSES: Mutex<IdAllocator> = const_mutex(IdAllocator::new());
static CELLS: Mutex<IdAllocator> = const_mutex(IdAllocator::new());
static MATERIALS: Mutex<IdAllocator> = const_mutex(IdAllocator::new());
static SURFACES: Mutex<IdAllocator> = const_mutex(IdAllocator::new());

/// Monotonic counter plus the set of IDs currently in use.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_id: u32,
    used: BTreeSet<u32>,
}

impl IdAllocator {
    /// Creates an allocator whose first automatic ID is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 1,
            used: BTreeSet::new(),
        }
    }

    /// Returns the lowest unused ID at or above the counter. Past
    /// `u32::MAX` the search wraps around to 1.
    pub fn allocate(&mut self) -> u32 {
        while self.used.contains(&self.next_id) {
            self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        }
        let id = self.next_id;
        self.used.insert(id);
        id
    }

    /// Marks `id` as used. Returns `false` if it was already taken.
    pub fn reserve(&mut self, id: u32) -> bool {
        self.used.insert(id)
    }

    /// Returns `id` to the pool.
    pub fn release(&mut self, id: u32) {
        self.used.remove(&id);
        if id < self.next_id {
            self.next_id = id.max(1);
        }
    }

    /// Returns `true` if `id` is currently in use.
    #[must_use]
    pub fn is_used(&self, id: u32) -> bool {
        self.used.contains(&id)
    }
}

/// Allocates a fresh ID in `space`.
pub fn allocate(space: IdSpace) -> u32 {
    space.allocator().lock().allocate()
}

/// Assigns a caller-chosen ID in `space`, or allocates one if `None`.
///
/// A collision with an ID already in use is reported as a warning and the ID
/// is still returned, leaving the duplicate for the caller to resolve.
pub fn assign(space: IdSpace, requested: Option<u32>) -> u32 {
    let mut allocator = space.allocator().lock();
    match requested {
        None => allocator.allocate(),
        Some(id) => {
            if !allocator.reserve(id) {
                tracing::warn!(
                    "another {} instance already exists with id={id}",
                    space.label()
                );
            }
            id
        }
    }
}

/// Returns `id` to the pool of `space`.
pub fn release(space: IdSpace, id: u32) {
    space.allocator().lock().release(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_skips_reserved_ids() {
        let mut ids = IdAllocator::new();
        assert!(ids.reserve(1));
        assert!(ids.reserve(2));
        assert_eq!(ids.allocate(), 3);
        assert_eq!(ids.allocate(), 4);
    }

    #[test]
    fn counter_wraps_after_the_largest_id() {
        let mut ids = IdAllocator::new();
        assert!(ids.reserve(1));
        assert!(ids.reserve(u32::MAX - 1));
        assert!(ids.reserve(u32::MAX));
        ids.next_id = u32::MAX - 1;
        assert_eq!(ids.allocate(), 2);
    }

    #[test]
    fn reserve_reports_collisions() {
        let mut ids = IdAllocator::new();
        assert!(ids.reserve(7));
        assert!(!ids.reserve(7));
    }

    #[test]
    fn released_ids_become_available_again() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        ids.release(a);
        assert!(!ids.is_used(a));
        assert!(ids.is_used(b));
        assert_eq!(ids.allocate(), a);
        assert_eq!(ids.allocate(), b + 1);
    }

    #[test]
    fn global_allocations_are_unique() {
        let a = allocate(IdSpace::Lattice);
        let b = allocate(IdSpace::Lattice);
        assert_ne!(a, b);
        release(IdSpace::Lattice, a);
        release(IdSpace::Lattice, b);
    }

    #[test]
    fn lattices_and_universes_share_ids() {
        let u = allocate(IdSpace::Universe);
        let l = allocate(IdSpace::Lattice);
        assert_ne!(u, l);
        assert!(IdSpace::Universe.allocator().lock().is_used(l));
        release(IdSpace::Universe, u);
        release(IdSpace::Lattice, l);
    }
}
