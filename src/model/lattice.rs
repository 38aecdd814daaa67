use std::fmt;

use crate::error::{Result, ValidationError};
use crate::ids::{self, IdSpace};
use crate::math::{Point3, Vector3};

use super::universe::UniverseId;

slotmap::new_key_type! {
    /// Unique identifier for a lattice in the geometry store.
    pub struct LatticeId;
}

/// Integer coordinates of a lattice element, `(x, y)` or `(x, y, z)`.
///
/// Coordinates are signed because point location may land outside the
/// lattice, in which case the outer universe applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeIndex {
    coords: [i64; 3],
    ndim: usize,
}

impl LatticeIndex {
    /// A 2D index.
    #[must_use]
    pub fn new_2d(x: i64, y: i64) -> Self {
        Self {
            coords: [x, y, 0],
            ndim: 2,
        }
    }

    /// A 3D index.
    #[must_use]
    pub fn new_3d(x: i64, y: i64, z: i64) -> Self {
        Self {
            coords: [x, y, z],
            ndim: 3,
        }
    }

    /// The coordinates, two or three of them.
    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.coords[..self.ndim]
    }
}

impl fmt::Display for LatticeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.as_slice().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// A rectangular lattice of universes, in two or three dimensions.
///
/// Universes are supplied the way they read on paper: rows top first, and
/// for 3D lattices one such grid per axial layer, bottom layer first. They
/// are stored in natural order, x varying fastest, then y from the bottom,
/// then z.
#[derive(Debug, Clone)]
pub struct LatticeData {
    /// User-facing ID.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Universe used for points outside the lattice elements.
    pub outer: Option<UniverseId>,
    pitch: Vector3,
    lower_left: Point3,
    shape: [usize; 3],
    ndim: usize,
    universes: Vec<UniverseId>,
}

impl LatticeData {
    /// Creates a 2D lattice from rows of universes, top row first.
    ///
    /// # Errors
    ///
    /// Returns an error if the pitch is not positive or the rows are empty
    /// or ragged.
    pub fn new_2d(
        id: Option<u32>,
        pitch: [f64; 2],
        lower_left: [f64; 2],
        rows: Vec<Vec<UniverseId>>,
    ) -> Result<Self> {
        let pitch = Vector3::new(pitch[0], pitch[1], 1.0);
        let lower_left = Point3::new(lower_left[0], lower_left[1], 0.0);
        Self::build(id, pitch, lower_left, vec![rows], 2)
    }

    /// Creates a 3D lattice from axial layers (bottom first) of rows (top
    /// row first).
    ///
    /// # Errors
    ///
    /// Returns an error if the pitch is not positive or the layers are empty
    /// or ragged.
    pub fn new_3d(
        id: Option<u32>,
        pitch: [f64; 3],
        lower_left: [f64; 3],
        layers: Vec<Vec<Vec<UniverseId>>>,
    ) -> Result<Self> {
        let pitch = Vector3::from(pitch);
        let lower_left = Point3::from(lower_left);
        Self::build(id, pitch, lower_left, layers, 3)
    }

    fn build(
        id: Option<u32>,
        pitch: Vector3,
        lower_left: Point3,
        layers: Vec<Vec<Vec<UniverseId>>>,
        ndim: usize,
    ) -> Result<Self> {
        if pitch.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
            return Err(ValidationError::InvalidValue {
                parameter: "lattice pitch",
                reason: format!("every component must be positive, got {pitch:?}"),
            }
            .into());
        }
        let nz = layers.len();
        let ny = layers.first().map_or(0, Vec::len);
        let nx = layers
            .first()
            .and_then(|rows| rows.first())
            .map_or(0, Vec::len);
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(ValidationError::InvalidValue {
                parameter: "lattice universes",
                reason: "lattice must contain at least one element".into(),
            }
            .into());
        }
        let rectangular = layers
            .iter()
            .all(|rows| rows.len() == ny && rows.iter().all(|row| row.len() == nx));
        if !rectangular {
            return Err(ValidationError::InvalidValue {
                parameter: "lattice universes",
                reason: "every row and layer must have the same length".into(),
            }
            .into());
        }

        let mut universes = Vec::with_capacity(nx * ny * nz);
        for rows in &layers {
            for row in rows.iter().rev() {
                universes.extend_from_slice(row);
            }
        }

        Ok(Self {
            id: ids::assign(IdSpace::Lattice, id),
            name: String::new(),
            outer: None,
            pitch,
            lower_left,
            shape: [nx, ny, nz],
            ndim,
            universes,
        })
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the outer universe.
    #[must_use]
    pub fn with_outer(mut self, outer: UniverseId) -> Self {
        self.outer = Some(outer);
        self
    }

    /// Number of dimensions, 2 or 3.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Element counts along x, y and (for 3D) z.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape[..self.ndim]
    }

    /// Element widths along x, y and (for 3D) z.
    #[must_use]
    pub fn pitch(&self) -> &[f64] {
        &self.pitch.as_slice()[..self.ndim]
    }

    /// Lower-left corner, two or three coordinates.
    #[must_use]
    pub fn lower_left(&self) -> &[f64] {
        &self.lower_left.coords.as_slice()[..self.ndim]
    }

    /// Universes in natural order.
    #[must_use]
    pub fn universes(&self) -> &[UniverseId] {
        &self.universes
    }

    /// Mutable view of the universes in natural order.
    pub fn universes_mut(&mut self) -> &mut [UniverseId] {
        &mut self.universes
    }

    /// Distinct universes referenced by the lattice, outer universe last.
    #[must_use]
    pub fn unique_universes(&self) -> Vec<UniverseId> {
        let mut out: Vec<UniverseId> = Vec::new();
        for u in self.universes.iter().chain(self.outer.iter()) {
            if !out.contains(u) {
                out.push(*u);
            }
        }
        out
    }

    /// Every element index, x varying fastest, then y, then z.
    pub fn natural_indices(&self) -> impl Iterator<Item = LatticeIndex> + '_ {
        let [nx, ny, nz] = self.shape;
        (0..nz).flat_map(move |iz| {
            (0..ny).flat_map(move |iy| {
                (0..nx).map(move |ix| self.make_index(ix, iy, iz))
            })
        })
    }

    #[allow(clippy::cast_possible_wrap)]
    fn make_index(&self, ix: usize, iy: usize, iz: usize) -> LatticeIndex {
        if self.ndim == 2 {
            LatticeIndex::new_2d(ix as i64, iy as i64)
        } else {
            LatticeIndex::new_3d(ix as i64, iy as i64, iz as i64)
        }
    }

    /// Returns `true` if `index` addresses an element of the lattice.
    #[must_use]
    pub fn is_valid_index(&self, index: &LatticeIndex) -> bool {
        self.offset(index).is_some()
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn offset(&self, index: &LatticeIndex) -> Option<usize> {
        if index.ndim != self.ndim {
            return None;
        }
        let [nx, ny, nz] = self.shape;
        let [x, y, z] = index.coords;
        let in_range = |v: i64, n: usize| v >= 0 && (v as usize) < n;
        if !(in_range(x, nx) && in_range(y, ny) && in_range(z, nz)) {
            return None;
        }
        Some((z as usize * ny + y as usize) * nx + x as usize)
    }

    /// The universe at `index`, or `None` if it is out of range.
    #[must_use]
    pub fn get_universe(&self, index: &LatticeIndex) -> Option<UniverseId> {
        self.offset(index).map(|i| self.universes[i])
    }

    /// Finds the element containing `point` and the point expressed
    /// relative to that element's center.
    ///
    /// The index may be out of range; check it with
    /// [`LatticeData::is_valid_index`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn find_element(&self, point: &Point3) -> (LatticeIndex, Point3) {
        let cell = |axis: usize| {
            ((point[axis] - self.lower_left[axis]) / self.pitch[axis]).floor() as i64
        };
        let index = if self.ndim == 2 {
            LatticeIndex::new_2d(cell(0), cell(1))
        } else {
            LatticeIndex::new_3d(cell(0), cell(1), cell(2))
        };
        (index, self.local_coordinates(point, &index))
    }

    #[allow(clippy::cast_precision_loss)]
    fn local_coordinates(&self, point: &Point3, index: &LatticeIndex) -> Point3 {
        let mut local = *point;
        for axis in 0..self.ndim {
            let center =
                self.lower_left[axis] + (index.coords[axis] as f64 + 0.5) * self.pitch[axis];
            local[axis] = point[axis] - center;
        }
        local
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    use super::*;

    fn keys(n: usize) -> Vec<UniverseId> {
        let mut map: SlotMap<UniverseId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn rows_are_read_top_first() {
        let u = keys(4);
        let lat = LatticeData::new_2d(
            None,
            [1.0, 1.0],
            [0.0, 0.0],
            vec![vec![u[0], u[1]], vec![u[2], u[3]]],
        )
        .unwrap();
        // Bottom-left element is the first entry of the last row.
        assert_eq!(lat.get_universe(&LatticeIndex::new_2d(0, 0)), Some(u[2]));
        assert_eq!(lat.get_universe(&LatticeIndex::new_2d(1, 1)), Some(u[1]));
        assert_eq!(lat.get_universe(&LatticeIndex::new_2d(2, 0)), None);
    }

    #[test]
    fn natural_indices_vary_x_fastest() {
        let u = keys(1);
        let lat = LatticeData::new_3d(
            None,
            [1.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
            vec![vec![vec![u[0]; 2]; 2]; 2],
        )
        .unwrap();
        let labels: Vec<String> = lat.natural_indices().map(|i| i.to_string()).collect();
        assert_eq!(
            labels,
            ["0,0,0", "1,0,0", "0,1,0", "1,1,0", "0,0,1", "1,0,1", "0,1,1", "1,1,1"]
        );
    }

    #[test]
    fn find_element_returns_local_coordinates() {
        let u = keys(1);
        let lat = LatticeData::new_2d(None, [2.0, 2.0], [-2.0, -2.0], vec![vec![u[0]; 2]; 2])
            .unwrap();
        let (index, local) = lat.find_element(&Point3::new(1.5, -0.5, 7.0));
        assert_eq!(index, LatticeIndex::new_2d(1, 0));
        assert_relative_eq!(local, Point3::new(0.5, 0.5, 7.0), epsilon = 1e-12);

        let (outside, _) = lat.find_element(&Point3::new(-3.0, 0.0, 0.0));
        assert!(!lat.is_valid_index(&outside));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let u = keys(3);
        let result =
            LatticeData::new_2d(None, [1.0, 1.0], [0.0, 0.0], vec![vec![u[0], u[1]], vec![u[2]]]);
        assert!(result.is_err());
        let result = LatticeData::new_2d(None, [0.0, 1.0], [0.0, 0.0], vec![vec![u[0]]]);
        assert!(result.is_err());
    }
}
