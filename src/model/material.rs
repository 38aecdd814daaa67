use crate::ids::{self, IdSpace};

slotmap::new_key_type! {
    /// Unique identifier for a material in the geometry store.
    pub struct MaterialId;
}

/// Data associated with a material.
#[derive(Debug, Clone)]
pub struct MaterialData {
    /// User-facing ID.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Nuclide names paired with their atom fractions.
    pub nuclides: Vec<(String, f64)>,
    /// Number of physical occurrences, written by [`InstanceMap::apply`].
    ///
    /// [`InstanceMap::apply`]: crate::operations::instances::InstanceMap::apply
    pub num_instances: usize,
    /// Instance paths, written alongside `num_instances`.
    pub paths: Vec<String>,
}

impl MaterialData {
    /// Creates an empty material, allocating an ID if none is given.
    #[must_use]
    pub fn new(id: Option<u32>) -> Self {
        Self {
            id: ids::assign(IdSpace::Material, id),
            name: String::new(),
            nuclides: Vec::new(),
            num_instances: 0,
            paths: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a nuclide with the given atom fraction.
    #[must_use]
    pub fn with_nuclide(mut self, nuclide: impl Into<String>, fraction: f64) -> Self {
        self.nuclides.push((nuclide.into(), fraction));
        self
    }

    /// Nuclide names in insertion order.
    pub fn nuclide_names(&self) -> impl Iterator<Item = &str> {
        self.nuclides.iter().map(|(name, _)| name.as_str())
    }
}
