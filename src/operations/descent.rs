use std::collections::HashSet;

use crate::error::{ModelError, Result};
use crate::model::{GeometryStore, UniverseId};

/// Universes on the current path of a recursive walk through fills.
#[derive(Debug, Default)]
pub(crate) struct Descent {
    path: HashSet<UniverseId>,
}

impl Descent {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks `universe` as entered.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::CyclicGeometry`] if `universe` is already on
    /// the path.
    pub(crate) fn enter(&mut self, store: &GeometryStore, universe: UniverseId) -> Result<()> {
        if self.path.insert(universe) {
            return Ok(());
        }
        Err(ModelError::CyclicGeometry(store.universe(universe)?.id).into())
    }

    pub(crate) fn leave(&mut self, universe: UniverseId) {
        self.path.remove(&universe);
    }
}
