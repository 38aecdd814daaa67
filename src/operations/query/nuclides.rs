use crate::error::{DomainError, Result};
use crate::model::{CellId, Fill, GeometryStore, UniverseId};
use crate::operations::descent::Descent;

/// Lists the nuclides present anywhere in a universe, in first-seen order.
pub struct GetNuclides {
    universe: UniverseId,
}

impl GetNuclides {
    /// Creates a new `GetNuclides` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self { universe }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities or a
    /// universe contains itself.
    pub fn execute(&self, store: &GeometryStore) -> Result<Vec<String>> {
        let mut out = Vec::new();
        universe_nuclides(store, self.universe, &mut Descent::new(), &mut out)?;
        Ok(out)
    }
}

fn universe_nuclides(
    store: &GeometryStore,
    universe: UniverseId,
    descent: &mut Descent,
    out: &mut Vec<String>,
) -> Result<()> {
    descent.enter(store, universe)?;
    let result = cells_nuclides(store, universe, descent, out);
    descent.leave(universe);
    result
}

fn cells_nuclides(
    store: &GeometryStore,
    universe: UniverseId,
    descent: &mut Descent,
    out: &mut Vec<String>,
) -> Result<()> {
    let Some(cells) = store.universe(universe)?.cells() else {
        return Ok(());
    };
    for cell in cells.values() {
        cell_nuclides(store, cell, descent, out)?;
    }
    Ok(())
}

fn cell_nuclides(
    store: &GeometryStore,
    cell: CellId,
    descent: &mut Descent,
    out: &mut Vec<String>,
) -> Result<()> {
    let fill = &store.cell(cell)?.fill;
    match fill {
        Fill::Universe(u) => universe_nuclides(store, *u, descent, out)?,
        Fill::Lattice(l) => {
            for u in store.lattice(*l)?.unique_universes() {
                universe_nuclides(store, u, descent, out)?;
            }
        }
        _ => {
            for material in fill.materials() {
                for name in store.material(material)?.nuclide_names() {
                    if !out.iter().any(|seen| seen == name) {
                        out.push(name.to_owned());
                    }
                }
            }
        }
    }
    Ok(())
}

/// Converts the atom counts of a universe's last volume calculation into
/// number densities in atom/b-cm.
pub struct NuclideDensities {
    universe: UniverseId,
}

impl NuclideDensities {
    /// Creates a new `NuclideDensities` query.
    #[must_use]
    pub fn new(universe: UniverseId) -> Self {
        Self { universe }
    }

    /// Executes the query, returning `(nuclide, density)` pairs in the
    /// order the volume calculation reported them.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is missing or has no volume or
    /// atom information.
    pub fn execute(&self, store: &GeometryStore) -> Result<Vec<(String, f64)>> {
        let universe = store.universe(self.universe)?;
        let volume = match universe.volume() {
            Some(v) if !universe.atoms().is_empty() => v,
            _ => {
                return Err(DomainError::MissingVolume {
                    universe: universe.id,
                }
                .into())
            }
        };
        Ok(universe
            .atoms()
            .iter()
            .map(|(name, atoms)| (name.clone(), 1.0e-24 * atoms.value / volume))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{CsgError, ModelError};
    use crate::model::{CellData, LatticeData, MaterialData, Measurement, UniverseData};

    #[test]
    fn nuclides_are_deduplicated_in_first_seen_order() {
        let mut store = GeometryStore::new();
        let fuel = store.insert_material(
            MaterialData::new(None)
                .with_nuclide("U235", 0.05)
                .with_nuclide("U238", 0.95),
        );
        let clad = store.insert_material(
            MaterialData::new(None)
                .with_nuclide("Zr90", 1.0)
                .with_nuclide("U238", 1e-6),
        );
        let inner = store.insert_universe(UniverseData::csg(None));
        let c1 = store.insert_cell(CellData::new(None).with_fill(Fill::Material(clad)));
        store.add_cell(inner, c1).unwrap();

        let root = store.insert_universe(UniverseData::csg(None));
        let c2 = store.insert_cell(CellData::new(None).with_fill(Fill::Material(fuel)));
        let c3 = store.insert_cell(CellData::new(None).with_fill(Fill::Universe(inner)));
        store.add_cells(root, [c2, c3]).unwrap();

        let nuclides = GetNuclides::new(root).execute(&store).unwrap();
        assert_eq!(nuclides, ["U235", "U238", "Zr90"]);
    }

    #[test]
    fn nested_cycle_is_an_error() {
        let mut store = GeometryStore::new();
        let outer = store.insert_universe(UniverseData::csg(None));
        let inner = store.insert_universe(UniverseData::csg(None));
        let lattice = store.insert_lattice(
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![outer]]).unwrap(),
        );
        let down = store.insert_cell(CellData::new(None).with_fill(Fill::Universe(inner)));
        let back = store.insert_cell(CellData::new(None).with_fill(Fill::Lattice(lattice)));
        store.add_cell(outer, down).unwrap();
        store.add_cell(inner, back).unwrap();

        let err = GetNuclides::new(outer).execute(&store).unwrap_err();
        assert!(matches!(err, CsgError::Model(ModelError::CyclicGeometry(_))));
    }

    #[test]
    fn densities_divide_atoms_by_volume() {
        let mut store = GeometryStore::new();
        let mut data = UniverseData::csg(None);
        data.set_volume(Some(2.0)).unwrap();
        data.atoms = vec![("H1".into(), Measurement::new(4.0e24, 1.0e22))];
        let u = store.insert_universe(data);

        let densities = NuclideDensities::new(u).execute(&store).unwrap();
        assert_eq!(densities.len(), 1);
        assert_eq!(densities[0].0, "H1");
        assert_relative_eq!(densities[0].1, 2.0);
    }

    #[test]
    fn densities_require_a_volume_calculation() {
        let mut store = GeometryStore::new();
        let u = store.insert_universe(UniverseData::csg(None));
        let err = NuclideDensities::new(u).execute(&store).unwrap_err();
        assert!(matches!(err, CsgError::Domain(DomainError::MissingVolume { .. })));
        assert!(err.to_string().contains("stochastic volume calculation"));
    }
}
