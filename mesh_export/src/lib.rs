//! Binary glTF export of a single static mesh.

mod error;
pub mod glb;
mod gltf_json;
mod normals;

use log::debug;

pub use error::{ExportErr, Result};
pub use normals::vertex_normals;

use gltf_json::{
    ARRAY_BUFFER, Accessor, Asset, Attributes, Buffer, BufferView, ELEMENT_ARRAY_BUFFER, FLOAT,
    Material, Mesh, Node, PbrMetallicRoughness, Primitive, Root, Scene, TRIANGLES,
    UNSIGNED_BYTE, UNSIGNED_INT,
};

pub const DEFAULT_GENERATOR: &str = concat!("bodymesh ", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_COLOR: [u8; 4] = [200, 200, 200, 255];
pub const DEFAULT_ROUGHNESS: f32 = 0.8;

/// Writes meshes as GLB with positions, smooth normals, a flat vertex color and one
/// material.
#[derive(Debug, Clone)]
pub struct GlbExporter {
    generator: String,
    color: [u8; 4],
    roughness: f32,
}

impl Default for GlbExporter {
    fn default() -> Self {
        Self {
            generator: DEFAULT_GENERATOR.to_string(),
            color: DEFAULT_COLOR,
            roughness: DEFAULT_ROUGHNESS,
        }
    }
}

impl GlbExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generator<S: Into<String>>(mut self, generator: S) -> Self {
        self.generator = generator.into();
        self
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    /// Encodes a triangle mesh.
    ///
    /// # Arguments
    /// * `vertices` - Positions in metres.
    /// * `faces` - Counter clockwise triangles indexing into `vertices`.
    ///
    /// # Errors
    /// On an empty mesh, a face index out of bounds or a non finite position.
    pub fn export(&self, vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> Result<Vec<u8>> {
        let (min, max) = check(vertices, faces)?;
        let normals = vertex_normals(vertices, faces);
        let colors = vec![self.color; vertices.len()];

        let sections: [&[u8]; 4] = [
            bytemuck::cast_slice(vertices),
            bytemuck::cast_slice(&normals),
            bytemuck::cast_slice(&colors),
            bytemuck::cast_slice(faces),
        ];
        let targets = [ARRAY_BUFFER, ARRAY_BUFFER, ARRAY_BUFFER, ELEMENT_ARRAY_BUFFER];

        let mut bin = Vec::with_capacity(sections.iter().map(|s| s.len()).sum());
        let mut buffer_views = Vec::with_capacity(sections.len());
        for (section, target) in sections.iter().zip(targets) {
            buffer_views.push(BufferView {
                buffer: 0,
                byte_offset: bin.len(),
                byte_length: section.len(),
                target,
            });
            bin.extend_from_slice(section);
        }

        let n = vertices.len();
        let accessors = vec![
            Accessor {
                buffer_view: 0,
                component_type: FLOAT,
                normalized: false,
                count: n,
                kind: "VEC3",
                min: Some(min.to_vec()),
                max: Some(max.to_vec()),
            },
            Accessor {
                buffer_view: 1,
                component_type: FLOAT,
                normalized: false,
                count: n,
                kind: "VEC3",
                min: None,
                max: None,
            },
            Accessor {
                buffer_view: 2,
                component_type: UNSIGNED_BYTE,
                normalized: true,
                count: n,
                kind: "VEC4",
                min: None,
                max: None,
            },
            Accessor {
                buffer_view: 3,
                component_type: UNSIGNED_INT,
                normalized: false,
                count: faces.len() * 3,
                kind: "SCALAR",
                min: None,
                max: None,
            },
        ];

        let root = Root {
            asset: Asset {
                version: "2.0",
                generator: self.generator.clone(),
            },
            scene: 0,
            scenes: vec![Scene { nodes: vec![0] }],
            nodes: vec![Node {
                name: "body",
                mesh: 0,
            }],
            meshes: vec![Mesh {
                name: "body",
                primitives: vec![Primitive {
                    attributes: Attributes {
                        position: 0,
                        normal: 1,
                        color_0: 2,
                    },
                    indices: 3,
                    material: 0,
                    mode: TRIANGLES,
                }],
            }],
            materials: vec![Material {
                name: "skin",
                pbr_metallic_roughness: PbrMetallicRoughness {
                    base_color_factor: [1.0, 1.0, 1.0, 1.0],
                    metallic_factor: 0.0,
                    roughness_factor: self.roughness,
                },
                double_sided: true,
            }],
            accessors,
            buffer_views,
            buffers: vec![Buffer {
                byte_length: bin.len(),
            }],
        };

        let json = serde_json::to_vec(&root)?;
        let out = glb::assemble(&json, &bin);
        debug!(vertices = n, faces = faces.len(), bytes = out.len(); "exported glb");

        Ok(out)
    }
}

fn check(vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> Result<([f32; 3], [f32; 3])> {
    if vertices.is_empty() || faces.is_empty() {
        return Err(ExportErr::EmptyMesh {
            vertices: vertices.len(),
            faces: faces.len(),
        });
    }

    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for (vertex, v) in vertices.iter().enumerate() {
        if !v.iter().all(|c| c.is_finite()) {
            return Err(ExportErr::NonFinite { vertex });
        }
        for axis in 0..3 {
            min[axis] = min[axis].min(v[axis]);
            max[axis] = max[axis].max(v[axis]);
        }
    }

    for (face, tri) in faces.iter().enumerate() {
        if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(ExportErr::FaceOutOfBounds {
                face,
                index,
                vertices: vertices.len(),
            });
        }
    }

    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    const VERTICES: [[f32; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 2.0, 0.0],
        [0.0, 0.0, 3.0],
    ];
    const FACES: [[u32; 3]; 4] = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

    fn u32_at(bytes: &[u8], at: usize) -> usize {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
    }

    fn split(glb: &[u8]) -> (Value, &[u8]) {
        let json_len = u32_at(glb, 12);
        let json = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
        let bin_start = 20 + json_len;
        let bin_len = u32_at(glb, bin_start);
        (json, &glb[bin_start + 8..bin_start + 8 + bin_len])
    }

    #[test]
    fn header_and_chunks_are_consistent() {
        let glb = GlbExporter::new().export(&VERTICES, &FACES).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32_at(&glb, 4), 2);
        assert_eq!(u32_at(&glb, 8), glb.len());
        assert_eq!(glb.len() % 4, 0);
        assert_eq!(u32_at(&glb, 12) % 4, 0);

        let (json, bin) = split(&glb);
        assert_eq!(json["asset"]["version"], "2.0");
        assert_eq!(json["buffers"][0]["byteLength"].as_u64().unwrap() as usize, bin.len());
        // 4 positions, 4 normals, 4 colors, 12 indices
        assert_eq!(bin.len(), 48 + 48 + 16 + 48);
    }

    #[test]
    fn accessors_describe_the_mesh() {
        let glb = GlbExporter::new().export(&VERTICES, &FACES).unwrap();
        let (json, bin) = split(&glb);

        let accessors = json["accessors"].as_array().unwrap();
        assert_eq!(accessors[0]["count"], 4);
        assert_eq!(accessors[0]["min"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(accessors[0]["max"], serde_json::json!([1.0, 2.0, 3.0]));
        assert_eq!(accessors[2]["componentType"], UNSIGNED_BYTE);
        assert_eq!(accessors[2]["normalized"], true);
        assert!(accessors[0].get("normalized").is_none());
        assert_eq!(accessors[3]["count"], 12);

        let primitive = &json["meshes"][0]["primitives"][0];
        assert_eq!(primitive["attributes"]["COLOR_0"], 2);
        assert_eq!(
            json["materials"][0]["pbrMetallicRoughness"]["roughnessFactor"]
                .as_f64()
                .unwrap() as f32,
            0.8
        );

        let colors_at = json["bufferViews"][2]["byteOffset"].as_u64().unwrap() as usize;
        assert_eq!(&bin[colors_at..colors_at + 4], &[200, 200, 200, 255]);
    }

    #[test]
    fn rejects_broken_meshes() {
        let exporter = GlbExporter::new();
        assert!(matches!(
            exporter.export(&[], &FACES),
            Err(ExportErr::EmptyMesh { vertices: 0, .. })
        ));
        assert!(matches!(
            exporter.export(&VERTICES, &[]),
            Err(ExportErr::EmptyMesh { faces: 0, .. })
        ));
        assert!(matches!(
            exporter.export(&VERTICES, &[[0, 1, 4]]),
            Err(ExportErr::FaceOutOfBounds { face: 0, index: 4, vertices: 4 })
        ));
        assert!(matches!(
            exporter.export(&[[f32::NAN, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[[0, 1, 2]]),
            Err(ExportErr::NonFinite { vertex: 0 })
        ));
    }
}
