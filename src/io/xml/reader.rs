use std::collections::HashMap;
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::error::{CsgError, IoError, Result};
use crate::geometry::{BoundaryType, Quadric};
use crate::math::{Matrix3, Vector3};
use crate::model::{
    CellData, CellId, Fill, GeometryStore, IdMap, LatticeData, LatticeId, MaterialId,
    MeshUniverse, Region, Rotation, SurfaceData, SurfaceId, UniverseData, UniverseId,
};

/// Entities created by [`GeometryXmlReader::read`], keyed by the IDs in the
/// document.
#[derive(Debug, Clone, Default)]
pub struct XmlGeometry {
    pub universes: IdMap<UniverseId>,
    pub cells: IdMap<CellId>,
    pub lattices: IdMap<LatticeId>,
    pub surfaces: IdMap<SurfaceId>,
}

/// Reads `<geometry>` XML into a [`GeometryStore`].
///
/// Materials are not part of the geometry document; cells refer to them by
/// ID, resolved through the map registered with
/// [`GeometryXmlReader::with_material`]. Cells without a `universe`
/// attribute belong to universe 0.
#[derive(Debug, Default, Clone)]
pub struct GeometryXmlReader {
    materials: HashMap<u32, MaterialId>,
}

impl GeometryXmlReader {
    /// Creates a reader that knows no materials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the material cells refer to as `id`.
    #[must_use]
    pub fn with_material(mut self, id: u32, material: MaterialId) -> Self {
        self.materials.insert(id, material);
        self
    }

    /// Reads a complete document, inserting fresh entities into `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed, an element lacks a
    /// required attribute, or a reference cannot be resolved.
    pub fn read(&self, xml: &str, store: &mut GeometryStore) -> Result<XmlGeometry> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        if !root.has_tag_name("geometry") {
            return Err(IoError::UnexpectedElement {
                expected: "geometry",
                found: root.tag_name().name().to_owned(),
            }
            .into());
        }
        let elements = |tag: &'static str| root.children().filter(move |n| n.has_tag_name(tag));
        let mut out = XmlGeometry::default();

        for node in elements("surface") {
            let (id, key) = read_surface(node, store)?;
            out.surfaces.upsert(id, key);
        }
        for node in elements("dagmc_universe") {
            let data = Self::read_mesh_universe(node)?;
            let id = data.id;
            out.universes.upsert(id, store.insert_universe(data));
        }
        for node in elements("universe") {
            let id: u32 = required(node, "universe", "id")?;
            let key = universe_key(store, &mut out, id);
            if let Some(name) = node.attribute("name") {
                store.universe_mut(key)?.set_name(Some(name));
            }
        }
        for node in elements("cell") {
            let id = optional(node, "cell", "universe")?.unwrap_or(0);
            universe_key(store, &mut out, id);
        }
        for node in elements("lattice") {
            let (id, key) = read_lattice(node, store, &mut out)?;
            out.lattices.upsert(id, key);
        }
        for node in elements("cell") {
            let (id, key) = self.read_cell(node, store, &mut out)?;
            out.cells.upsert(id, key);
        }

        tracing::debug!(
            universes = out.universes.len(),
            cells = out.cells.len(),
            "read geometry XML"
        );
        Ok(out)
    }

    /// Builds a mesh-backed universe from a `<dagmc_universe>` element.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or `filename` is missing or an attribute
    /// value is invalid.
    pub fn read_mesh_universe(node: Node<'_, '_>) -> Result<UniverseData> {
        const TAG: &str = "dagmc_universe";
        if !node.has_tag_name(TAG) {
            return Err(IoError::UnexpectedElement {
                expected: TAG,
                found: node.tag_name().name().to_owned(),
            }
            .into());
        }
        let id: u32 = required(node, TAG, "id")?;
        let filename = node.attribute("filename").ok_or(IoError::MissingAttribute {
            element: TAG,
            name: "filename",
        })?;
        let mut mesh = MeshUniverse::new(filename)?;
        mesh.set_auto_geom_ids(flag(node, TAG, "auto_geom_ids")?);
        mesh.set_auto_mat_ids(flag(node, TAG, "auto_mat_ids")?);
        let mut data = UniverseData::mesh(Some(id), mesh);
        data.set_name(node.attribute("name"));
        Ok(data)
    }

    fn read_cell(
        &self,
        node: Node<'_, '_>,
        store: &mut GeometryStore,
        out: &mut XmlGeometry,
    ) -> Result<(u32, CellId)> {
        const TAG: &str = "cell";
        let id: u32 = required(node, TAG, "id")?;
        let mut cell = CellData::new(Some(id));
        if let Some(name) = node.attribute("name") {
            cell.name = name.to_owned();
        }

        cell.fill = match (node.attribute("material"), node.attribute("fill")) {
            (Some(material), None) => self.material_fill(material)?,
            (None, Some(fill)) => {
                let fill_id: u32 = parse_value(TAG, "fill", fill)?;
                match (out.universes.get(fill_id), out.lattices.get(fill_id)) {
                    (Some(u), None) => Fill::Universe(u),
                    (None, Some(l)) => Fill::Lattice(l),
                    (None, None) => Fill::Universe(universe_key(store, out, fill_id)),
                    (Some(_), Some(_)) => {
                        return Err(IoError::InvalidAttribute {
                            element: TAG,
                            name: "fill",
                            value: format!("{fill} (both a universe and a lattice)"),
                        }
                        .into())
                    }
                }
            }
            (None, None) => Fill::Void,
            (Some(_), Some(value)) => {
                return Err(IoError::InvalidAttribute {
                    element: TAG,
                    name: "fill",
                    value: format!("{value} (cell also has a material)"),
                }
                .into())
            }
        };

        if let Some(expression) = node.attribute("region") {
            let surfaces = &out.surfaces;
            cell.region = Some(Region::parse(expression, |sid| surfaces.get(sid))?);
        }
        if let Some(value) = node.attribute("translation") {
            let t: Vec<f64> = parse_list(TAG, "translation", value)?;
            let &[x, y, z] = t.as_slice() else {
                return Err(invalid(TAG, "translation", value));
            };
            cell.translation = Some(Vector3::new(x, y, z));
        }
        if let Some(value) = node.attribute("rotation") {
            let r: Vec<f64> = parse_list(TAG, "rotation", value)?;
            cell.rotation = Some(match r.len() {
                3 => Rotation::Angles(Vector3::new(r[0], r[1], r[2])),
                9 => Rotation::Matrix(Matrix3::from_row_slice(&r)),
                _ => return Err(invalid(TAG, "rotation", value)),
            });
        }
        cell.volume = optional(node, TAG, "volume")?;

        let universe_id = optional(node, TAG, "universe")?.unwrap_or(0);
        let universe = universe_key(store, out, universe_id);
        let key = store.insert_cell(cell);
        store.add_cell(universe, key)?;
        Ok((id, key))
    }

    fn material_fill(&self, value: &str) -> Result<Fill> {
        let mut entries = Vec::new();
        for token in value.split_whitespace() {
            entries.push(if token == "void" {
                None
            } else {
                let id: u32 = parse_value("cell", "material", token)?;
                Some(
                    *self
                        .materials
                        .get(&id)
                        .ok_or_else(|| invalid("cell", "material", token))?,
                )
            });
        }
        Ok(match entries.as_slice() {
            [] | [None] => Fill::Void,
            [Some(m)] => Fill::Material(*m),
            _ => Fill::Distributed(entries),
        })
    }
}

fn universe_key(store: &mut GeometryStore, out: &mut XmlGeometry, id: u32) -> UniverseId {
    if let Some(key) = out.universes.get(id) {
        return key;
    }
    let key = store.insert_universe(UniverseData::csg(Some(id)));
    out.universes.insert(id, key);
    key
}

fn read_surface(node: Node<'_, '_>, store: &mut GeometryStore) -> Result<(u32, SurfaceId)> {
    const TAG: &str = "surface";
    let id: u32 = required(node, TAG, "id")?;
    let kind = node.attribute("type").ok_or(IoError::MissingAttribute {
        element: TAG,
        name: "type",
    })?;
    let coeffs_text = node.attribute("coeffs").unwrap_or("");
    let coeffs: Vec<f64> = parse_list(TAG, "coeffs", coeffs_text)?;
    let quadric =
        Quadric::from_coefficients(kind, &coeffs).ok_or_else(|| invalid(TAG, "type", kind))?;
    let boundary: BoundaryType = optional(node, TAG, "boundary")?.unwrap_or_default();
    let mut data = SurfaceData::new(Some(id), quadric).with_boundary(boundary);
    if let Some(name) = node.attribute("name") {
        data.name = name.to_owned();
    }
    Ok((id, store.insert_surface(data)))
}

fn read_lattice(
    node: Node<'_, '_>,
    store: &mut GeometryStore,
    out: &mut XmlGeometry,
) -> Result<(u32, LatticeId)> {
    const TAG: &str = "lattice";
    let id: u32 = required(node, TAG, "id")?;
    let shape: Vec<usize> = required_list(node, TAG, "dimension")?;
    let pitch: Vec<f64> = required_list(node, TAG, "pitch")?;
    let lower_left: Vec<f64> = required_list(node, TAG, "lower_left")?;

    let text = node
        .children()
        .find(|n| n.has_tag_name("universes"))
        .and_then(|n| n.text())
        .unwrap_or("");
    let ids: Vec<u32> = parse_list(TAG, "universes", text)?;
    let mut keys = Vec::with_capacity(ids.len());
    for uid in ids {
        keys.push(universe_key(store, out, uid));
    }

    let dims_match = |n: usize| shape.len() == n && pitch.len() == n && lower_left.len() == n;
    if !(dims_match(2) || dims_match(3)) {
        return Err(invalid(TAG, "dimension", &super::join(&shape)));
    }
    let count: usize = shape.iter().product();
    if keys.len() != count || count == 0 {
        return Err(invalid(TAG, "universes", text.trim()));
    }
    let nx = shape[0];
    let rows: Vec<Vec<UniverseId>> = keys.chunks(nx).map(<[UniverseId]>::to_vec).collect();
    let mut lattice = if dims_match(2) {
        LatticeData::new_2d(
            Some(id),
            [pitch[0], pitch[1]],
            [lower_left[0], lower_left[1]],
            rows,
        )?
    } else {
        let layers = rows.chunks(shape[1]).map(<[Vec<UniverseId>]>::to_vec).collect();
        LatticeData::new_3d(
            Some(id),
            [pitch[0], pitch[1], pitch[2]],
            [lower_left[0], lower_left[1], lower_left[2]],
            layers,
        )?
    };

    if let Some(name) = node.attribute("name") {
        lattice.name = name.to_owned();
    }
    if let Some(outer) = optional::<u32>(node, TAG, "outer")? {
        lattice.outer = Some(universe_key(store, out, outer));
    }
    Ok((id, store.insert_lattice(lattice)))
}

fn invalid(element: &'static str, name: &'static str, value: &str) -> CsgError {
    IoError::InvalidAttribute {
        element,
        name,
        value: value.to_owned(),
    }
    .into()
}

fn parse_value<T: FromStr>(element: &'static str, name: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid(element, name, value))
}

fn parse_list<T: FromStr>(
    element: &'static str,
    name: &'static str,
    value: &str,
) -> Result<Vec<T>> {
    value
        .split_whitespace()
        .map(|token| token.parse().map_err(|_| invalid(element, name, value)))
        .collect()
}

fn optional<T: FromStr>(
    node: Node<'_, '_>,
    element: &'static str,
    name: &'static str,
) -> Result<Option<T>> {
    node.attribute(name)
        .map(|value| parse_value(element, name, value))
        .transpose()
}

fn required<T: FromStr>(
    node: Node<'_, '_>,
    element: &'static str,
    name: &'static str,
) -> Result<T> {
    optional(node, element, name)?
        .ok_or_else(|| IoError::MissingAttribute { element, name }.into())
}

fn required_list<T: FromStr>(
    node: Node<'_, '_>,
    element: &'static str,
    name: &'static str,
) -> Result<Vec<T>> {
    let value = node
        .attribute(name)
        .ok_or(IoError::MissingAttribute { element, name })?;
    parse_list(element, name, value)
}

/// Boolean attributes: absent means `false`.
fn flag(node: Node<'_, '_>, element: &'static str, name: &'static str) -> Result<bool> {
    match node.attribute(name).map(str::trim) {
        None | Some("false" | "0") => Ok(false),
        Some("true" | "1") => Ok(true),
        Some(other) => Err(invalid(element, name, other)),
    }
}
