/// Wavefront OBJ subset parser (`v`, `vn`, `vt`, triangular `f`)
use std::path::Path;

use log::info;
use nalgebra::{Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, map},
    multi::separated_list0,
    number::complete::float,
    sequence::{delimited, preceded, separated_pair, tuple},
    IResult,
};

use crate::error::{IndexKind, MeshError, MeshResult};
use crate::geometry::{BoundingBox, Mesh, Vertex};
use crate::normals::{face_normal, NormalAccumulator};

/// One face corner as written in the file (1-based indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawCorner {
    vertex: i64,
    texture: Option<i64>,
    normal: Option<i64>,
}

/// One face corner resolved to 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub vertex: usize,
    pub texture: Option<usize>,
    pub normal: Option<usize>,
}

/// A triangle as read from the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub corners: [FaceCorner; 3],
}

/// Read and parse an OBJ file from disk.
pub fn load_obj<P: AsRef<Path>>(path: P) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("loading mesh from {}", path.display());
    parse_obj(&text)
}

/// Parse OBJ text into a triangle-list mesh with per-vertex normals.
///
/// Every face corner becomes one output vertex, in file order. Corners that
/// reference an explicit normal pin it on their vertex; other faces add a
/// derived face normal to their vertices (see [`crate::normals`]).
pub fn parse_obj(input: &str) -> MeshResult<Mesh> {
    let mut positions: Vec<Point3<f32>> = Vec::new();
    let mut normals: Vec<Vector3<f32>> = Vec::new();
    let mut texture_count = 0usize;
    let mut faces: Vec<Face> = Vec::new();
    let mut accumulator = NormalAccumulator::new();

    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let Ok((rest, keyword)) = parse_keyword(raw) else {
            continue;
        };

        match keyword {
            "v" => {
                let [x, y, z] = parse_coords::<3>(rest, line, "v")?;
                positions.push(Point3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_coords::<3>(rest, line, "vn")?;
                normals.push(Vector3::new(x, y, z));
            }
            "vt" => {
                let values = parse_numbers(rest, line)?;
                if !(2..=3).contains(&values.len()) {
                    return Err(MeshError::Parse {
                        line,
                        message: format!(
                            "vt expects 2 or 3 coordinates, found {}",
                            values.len()
                        ),
                    });
                }
                texture_count += 1;
            }
            "f" => {
                let face = parse_face(rest, line, positions.len(), texture_count, normals.len())?;
                add_face_normals(&mut accumulator, &face, &positions, &normals);
                faces.push(face);
            }
            _ => {}
        }
    }

    let bbox = BoundingBox::from_points(&positions).ok_or(MeshError::Empty)?;
    let vertex_normals = accumulator.finish();

    let vertices = faces
        .iter()
        .flat_map(|face| face.corners.iter())
        .map(|corner| {
            let normal = vertex_normals
                .get(&corner.vertex)
                .copied()
                .unwrap_or_else(Vector3::zeros);
            Vertex::new(positions[corner.vertex], normal)
        })
        .collect();

    info!(
        "parsed {} vertices, {} normals, {} faces; bounds {:?} .. {:?}",
        positions.len(),
        normals.len(),
        faces.len(),
        bbox.min,
        bbox.max
    );

    Ok(Mesh::new(vertices, bbox))
}

fn add_face_normals(
    accumulator: &mut NormalAccumulator,
    face: &Face,
    positions: &[Point3<f32>],
    normals: &[Vector3<f32>],
) {
    let mut derived = Vec::with_capacity(3);
    for corner in &face.corners {
        match corner.normal {
            Some(n) => accumulator.assign(corner.vertex, normals[n]),
            None => derived.push(corner.vertex),
        }
    }

    if !derived.is_empty() {
        let [a, b, c] = face.corners.map(|corner| positions[corner.vertex]);
        accumulator.accumulate(&derived, face_normal(&a, &b, &c));
    }
}

/// First whitespace-delimited token of a line and the remainder.
fn parse_keyword(input: &str) -> IResult<&str, &str> {
    preceded(space0, take_till1(|c: char| c.is_whitespace()))(input)
}

/// Whitespace-separated floats filling the rest of the line.
fn float_list(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(delimited(space0, separated_list0(space1, float), space0))(input)
}

fn parse_numbers(rest: &str, line: usize) -> MeshResult<Vec<f32>> {
    float_list(rest)
        .map(|(_, values)| values)
        .map_err(|_| MeshError::Parse {
            line,
            message: format!("invalid number in {:?}", rest.trim()),
        })
}

fn parse_coords<const N: usize>(rest: &str, line: usize, keyword: &str) -> MeshResult<[f32; N]> {
    let values = parse_numbers(rest, line)?;
    values.try_into().map_err(|values: Vec<f32>| MeshError::Parse {
        line,
        message: format!(
            "{keyword} expects {N} coordinates, found {}",
            values.len()
        ),
    })
}

/// `v`, `v/t`, `v//n` or `v/t/n`.
fn corner(input: &str) -> IResult<&str, RawCorner> {
    alt((
        map(separated_pair(integer, tag("//"), integer), |(vertex, normal)| RawCorner {
            vertex,
            texture: None,
            normal: Some(normal),
        }),
        map(
            tuple((integer, preceded(char('/'), integer), preceded(char('/'), integer))),
            |(vertex, texture, normal)| RawCorner {
                vertex,
                texture: Some(texture),
                normal: Some(normal),
            },
        ),
        map(separated_pair(integer, char('/'), integer), |(vertex, texture)| RawCorner {
            vertex,
            texture: Some(texture),
            normal: None,
        }),
        map(integer, |vertex| RawCorner {
            vertex,
            texture: None,
            normal: None,
        }),
    ))(input)
}

fn parse_face(
    rest: &str,
    line: usize,
    vertex_count: usize,
    texture_count: usize,
    normal_count: usize,
) -> MeshResult<Face> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(MeshError::Parse {
            line,
            message: format!("f expects 3 corners, found {}", tokens.len()),
        });
    }

    let mut corners = [FaceCorner {
        vertex: 0,
        texture: None,
        normal: None,
    }; 3];

    for (slot, token) in corners.iter_mut().zip(tokens) {
        let (_, raw) = all_consuming(corner)(token).map_err(|_| MeshError::Parse {
            line,
            message: format!("invalid face corner {token:?}"),
        })?;

        *slot = FaceCorner {
            vertex: resolve(raw.vertex, vertex_count, IndexKind::Vertex, line)?,
            texture: raw
                .texture
                .map(|t| resolve(t, texture_count, IndexKind::Texture, line))
                .transpose()?,
            normal: raw
                .normal
                .map(|n| resolve(n, normal_count, IndexKind::Normal, line))
                .transpose()?,
        };
    }

    Ok(Face { corners })
}

/// Convert a 1-based file index into a 0-based one, checking it exists.
fn resolve(index: i64, len: usize, kind: IndexKind, line: usize) -> MeshResult<usize> {
    if index >= 1 && (index as u64) <= len as u64 {
        Ok(index as usize - 1)
    } else {
        Err(MeshError::IndexOutOfRange {
            line,
            kind,
            index,
            len,
        })
    }
}
