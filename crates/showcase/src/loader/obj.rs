use std::{io::BufRead, path::Path};

use anyhow::Context;
use glam::Vec3;

use super::MeshData;

fn load_options() -> tobj::LoadOptions {
    let mut options = tobj::GPU_LOAD_OPTIONS;
    options.single_index = true;
    options
}

/// Loads every model of an OBJ file into one mesh. Materials are ignored.
pub fn load_obj(path: impl AsRef<Path>) -> anyhow::Result<MeshData> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())
        .with_context(|| format!("failed to load OBJ file {}", path.display()))?;
    let mesh = merge_models(models)?;
    log::info!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.positions.len(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

/// Same as [load_obj] for OBJ text already in memory.
pub fn parse_obj(mut reader: impl BufRead) -> anyhow::Result<MeshData> {
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .context("failed to parse OBJ data")?;
    merge_models(models)
}

fn merge_models(models: Vec<tobj::Model>) -> anyhow::Result<MeshData> {
    let mut mesh = MeshData::default();
    let mut normals = Vec::new();
    let mut has_normals = true;

    for model in models {
        let m = model.mesh;
        log::debug!("reading model {}", model.name);
        anyhow::ensure!(
            m.positions.len() % 3 == 0 && m.indices.len() % 3 == 0,
            "model {} is not a triangle soup",
            model.name
        );

        let base = u32::try_from(mesh.positions.len()).context("mesh too large")?;
        let vertex_count = m.positions.len() / 3;
        mesh.positions
            .extend(bytemuck::cast_slice::<f32, [f32; 3]>(&m.positions).iter().map(|&p| Vec3::from(p)));

        if m.normals.len() == m.positions.len() && has_normals {
            normals.extend(
                bytemuck::cast_slice::<f32, [f32; 3]>(&m.normals)
                    .iter()
                    .map(|&n| Vec3::from(n)),
            );
        } else {
            has_normals = false;
        }

        for t in bytemuck::cast_slice::<u32, [u32; 3]>(&m.indices) {
            if let Some(&i) = t.iter().find(|&&i| i as usize >= vertex_count) {
                anyhow::bail!("model {} references vertex {i} of {vertex_count}", model.name);
            }
            mesh.triangles.push(t.map(|i| i + base));
        }
    }

    anyhow::ensure!(!mesh.triangles.is_empty(), "no triangle found");
    if has_normals {
        mesh.normals = Some(normals);
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUADS: &str = "\
o first
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
o second
v 0 0 1
v 1 0 1
v 0 1 1
f 5 6 7
";

    #[test]
    fn merges_models_and_triangulates() {
        let mesh = parse_obj(QUADS.as_bytes()).unwrap();
        assert_eq!(mesh.positions.len(), 7);
        assert_eq!(mesh.triangles.len(), 3);
        assert!(mesh.triangles[2].iter().all(|&i| i >= 4));
        // second model has no normals, so the merged mesh has none
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn keeps_normals_when_complete() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n".as_bytes(),
        )
        .unwrap();
        let normals = mesh.normals.unwrap();
        assert_eq!(normals, vec![Vec3::Z; 3]);
    }

    #[test]
    fn rejects_empty_and_missing() {
        assert!(parse_obj("# nothing\n".as_bytes()).is_err());
        assert!(load_obj("/definitely/not/here.obj").is_err());
    }
}
