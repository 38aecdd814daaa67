use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::Result;
use crate::geometry::BoundaryType;
use crate::model::{
    CellData, CellId, Fill, GeometryStore, LatticeData, MeshUniverse, Rotation, SurfaceId,
    UniverseId, UniverseKind,
};
use crate::operations::query::GetAllUniverses;

use super::{escape, join};

/// Entities already written to a document, so shared ones appear once.
#[derive(Debug, Default, Clone)]
pub struct XmlMemo {
    cells: Vec<CellId>,
    seen_cells: HashSet<CellId>,
    universes: HashSet<UniverseId>,
}

impl XmlMemo {
    /// Creates an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells written so far, in document order.
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }
}

/// Writes universes as `<geometry>` XML.
#[derive(Debug, Default, Clone)]
pub struct GeometryXmlWriter;

impl GeometryXmlWriter {
    /// Creates a writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Writes a complete document for `root` and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities.
    pub fn write(&self, store: &GeometryStore, root: UniverseId) -> Result<String> {
        let mut universes = vec![root];
        universes.extend(GetAllUniverses::new(root).execute(store)?.values());

        let mut body = String::new();
        let mut memo = XmlMemo::new();
        for universe in universes {
            self.write_universe(store, universe, &mut memo, &mut body)?;
        }

        let mut lattices = Vec::new();
        let mut surfaces: Vec<SurfaceId> = Vec::new();
        for cell in memo.cells() {
            let data = store.cell(*cell)?;
            if let Fill::Lattice(lattice) = data.fill {
                if !lattices.contains(&lattice) {
                    lattices.push(lattice);
                }
            }
            if let Some(region) = &data.region {
                for surface in region.surfaces() {
                    if !surfaces.contains(&surface) {
                        surfaces.push(surface);
                    }
                }
            }
        }
        for lattice in lattices {
            write_lattice(store, store.lattice(lattice)?, &mut body)?;
        }
        for surface in surfaces {
            let data = store.surface(surface)?;
            write!(
                body,
                "  <surface id=\"{}\" type=\"{}\" coeffs=\"{}\"",
                data.id,
                data.quadric.type_name(),
                join(data.quadric.coefficients())
            )?;
            if !data.name.is_empty() {
                write!(body, " name=\"{}\"", escape(&data.name))?;
            }
            if data.boundary != BoundaryType::Transmission {
                write!(body, " boundary=\"{}\"", data.boundary)?;
            }
            writeln!(body, "/>")?;
        }

        let mut out = String::with_capacity(body.len() + 64);
        writeln!(out, "<?xml version=\"1.0\" encoding=\"utf-8\"?>")?;
        writeln!(out, "<geometry>")?;
        out.push_str(&body);
        writeln!(out, "</geometry>")?;
        Ok(out)
    }

    /// Appends the elements describing one universe to `out`.
    ///
    /// A CSG universe becomes one `<cell>` per cell, each carrying the
    /// universe ID, preceded by a `<universe>` element when the universe is
    /// named or empty. A mesh-backed universe becomes one
    /// `<dagmc_universe>` element. Cells and universes already in `memo`
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph references missing entities.
    pub fn write_universe(
        &self,
        store: &GeometryStore,
        universe: UniverseId,
        memo: &mut XmlMemo,
        out: &mut String,
    ) -> Result<()> {
        if !memo.universes.insert(universe) {
            return Ok(());
        }
        let data = store.universe(universe)?;
        match &data.kind {
            UniverseKind::Mesh(mesh) => write_mesh_universe(data.id, data.name(), mesh, out),
            UniverseKind::Csg { cells } => {
                if !data.name().is_empty() || cells.is_empty() {
                    write!(out, "  <universe id=\"{}\"", data.id)?;
                    if !data.name().is_empty() {
                        write!(out, " name=\"{}\"", escape(data.name()))?;
                    }
                    writeln!(out, "/>")?;
                }
                for cell in cells.values() {
                    if memo.seen_cells.insert(cell) {
                        memo.cells.push(cell);
                        write_cell(store, store.cell(cell)?, data.id, out)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn write_mesh_universe(id: u32, name: &str, mesh: &MeshUniverse, out: &mut String) -> Result<()> {
    write!(out, "  <dagmc_universe id=\"{id}\"")?;
    if !name.is_empty() {
        write!(out, " name=\"{}\"", escape(name))?;
    }
    if mesh.auto_geom_ids() {
        write!(out, " auto_geom_ids=\"true\"")?;
    }
    if mesh.auto_mat_ids() {
        write!(out, " auto_mat_ids=\"true\"")?;
    }
    let filename = mesh.filename().to_string_lossy();
    writeln!(out, " filename=\"{}\"/>", escape(&filename))?;
    Ok(())
}

fn write_cell(
    store: &GeometryStore,
    cell: &CellData,
    universe: u32,
    out: &mut String,
) -> Result<()> {
    write!(out, "  <cell id=\"{}\"", cell.id)?;
    if !cell.name.is_empty() {
        write!(out, " name=\"{}\"", escape(&cell.name))?;
    }
    match &cell.fill {
        Fill::Void => write!(out, " material=\"void\"")?,
        Fill::Material(m) => write!(out, " material=\"{}\"", store.material(*m)?.id)?,
        Fill::Distributed(list) => {
            let mut ids = Vec::with_capacity(list.len());
            for entry in list {
                ids.push(match entry {
                    Some(m) => store.material(*m)?.id.to_string(),
                    None => "void".to_owned(),
                });
            }
            write!(out, " material=\"{}\"", ids.join(" "))?;
        }
        Fill::Universe(u) => write!(out, " fill=\"{}\"", store.universe(*u)?.id)?,
        Fill::Lattice(l) => write!(out, " fill=\"{}\"", store.lattice(*l)?.id)?,
    }
    if let Some(region) = &cell.region {
        write!(out, " region=\"{}\"", escape(&region.to_expression(store)?))?;
    }
    if let Some(t) = &cell.translation {
        write!(out, " translation=\"{}\"", join(t.iter()))?;
    }
    match &cell.rotation {
        Some(Rotation::Angles(a)) => write!(out, " rotation=\"{}\"", join(a.iter()))?,
        Some(Rotation::Matrix(m)) => {
            // Row-major, the way the matrix reads.
            let values = (0..3).flat_map(|r| (0..3).map(move |c| m[(r, c)]));
            write!(out, " rotation=\"{}\"", join(values))?;
        }
        None => {}
    }
    if let Some(v) = cell.volume {
        write!(out, " volume=\"{v}\"")?;
    }
    writeln!(out, " universe=\"{universe}\"/>")?;
    Ok(())
}

fn write_lattice(store: &GeometryStore, lattice: &LatticeData, out: &mut String) -> Result<()> {
    write!(out, "  <lattice id=\"{}\"", lattice.id)?;
    if !lattice.name.is_empty() {
        write!(out, " name=\"{}\"", escape(&lattice.name))?;
    }
    write!(
        out,
        " dimension=\"{}\" lower_left=\"{}\" pitch=\"{}\"",
        join(lattice.shape()),
        join(lattice.lower_left()),
        join(lattice.pitch())
    )?;
    if let Some(outer) = lattice.outer {
        write!(out, " outer=\"{}\"", store.universe(outer)?.id)?;
    }
    writeln!(out, ">")?;
    writeln!(out, "    <universes>")?;

    let shape = lattice.shape();
    let nx = shape[0];
    let ny = shape[1];
    let nz = shape.get(2).copied().unwrap_or(1);
    let universes = lattice.universes();
    for iz in 0..nz {
        for iy in (0..ny).rev() {
            let start = (iz * ny + iy) * nx;
            let mut ids = Vec::with_capacity(nx);
            for u in &universes[start..start + nx] {
                ids.push(store.universe(*u)?.id);
            }
            writeln!(out, "      {}", join(ids))?;
        }
    }
    writeln!(out, "    </universes>")?;
    writeln!(out, "  </lattice>")?;
    Ok(())
}
