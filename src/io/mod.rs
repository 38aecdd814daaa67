pub mod mesh_file;
pub mod xml;

pub use mesh_file::{decode_tag, encode_tag, MemoryMeshReader, MeshFileContents, MeshFileReader};
pub use xml::{GeometryXmlReader, GeometryXmlWriter, XmlGeometry, XmlMemo};
