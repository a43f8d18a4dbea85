//! Wavefront OBJ reader.
//!
//! Only the geometry records are read: `v`, `vt`, `vn` and `f`. Everything else (groups,
//! materials, smoothing) is skipped. Polygons are fan-triangulated around their first corner.

use alloc::vec::Vec;

use crate::{Error, Face, Geometry, Result};

/// Parses the first `N` floats following the record keyword. Shorter records are rejected,
/// extra trailing values (such as a `w` or vertex colors) are ignored.
fn parse_floats<const N: usize>(tokens: &[&str]) -> Option<[f32; N]> {
    if tokens.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (o, t) in out.iter_mut().zip(tokens) {
        *o = t.parse().ok()?;
    }
    Some(out)
}

/// Resolves a 1-based, possibly negative (relative to the end) index to a 0-based one.
///
/// Positive indices are not range checked here, [`Mesh::load`](crate::Mesh::load) does that.
fn resolve(token: &str, len: usize, line: usize) -> Result<usize> {
    let idx: i64 = token.parse().map_err(|_| Error::Obj {
        line,
        reason: "face index is not an integer",
    })?;

    match idx {
        0 => Err(Error::Obj {
            line,
            reason: "face indices start at 1",
        }),
        i if i > 0 => Ok(i as usize - 1),
        i => {
            let back = i.unsigned_abs() as usize;
            len.checked_sub(back).ok_or(Error::Obj {
                line,
                reason: "relative face index points before the first record",
            })
        }
    }
}

/// One `v/vt/vn` corner, with `-1` for absent attributes.
fn parse_corner(token: &str, data: &Geometry, line: usize) -> Result<(usize, i64, i64)> {
    let mut parts = token.split('/');

    let vertex = match parts.next() {
        Some(v) if !v.is_empty() => resolve(v, data.positions.len(), line)?,
        _ => {
            return Err(Error::Obj {
                line,
                reason: "face corner without a position index",
            })
        }
    };

    let mut optional = |len: usize| -> Result<i64> {
        match parts.next() {
            Some(t) if !t.is_empty() => resolve(t, len, line).map(|i| i as i64),
            _ => Ok(-1),
        }
    };

    let tex_coord = optional(data.tex_coords.len())?;
    let normal = optional(data.normals.len())?;

    Ok((vertex, tex_coord, normal))
}

/// Fan-triangulates one `f` record into `faces`.
fn parse_face(
    args: &[&str],
    data: &Geometry,
    line: usize,
    corners: &mut Vec<(usize, i64, i64)>,
    faces: &mut Vec<Face>,
) -> Result<()> {
    if args.len() < 3 {
        return Err(Error::Obj {
            line,
            reason: "face needs at least 3 corners",
        });
    }

    corners.clear();
    for arg in args {
        corners.push(parse_corner(arg, data, line)?);
    }

    let (v0, t0, n0) = corners[0];
    for w in corners[1..].windows(2) {
        let [(v1, t1, n1), (v2, t2, n2)] = [w[0], w[1]];
        faces.push(Face::from_raw([v0, v1, v2], [t0, t1, t2], [n0, n1, n2]));
    }

    Ok(())
}

/// Reads OBJ text into raw [`Geometry`].
///
/// Unknown records and malformed records of any kind are skipped, with a trace message naming
/// the line. A face is only added once all of its corners parse, so a broken face never
/// contributes partial triangles. Positive indices past the end are left for
/// [`Mesh::load`](crate::Mesh::load) to reject.
pub fn parse(src: &str) -> Geometry {
    let mut data = Geometry::default();
    let mut corners = Vec::new();
    let mut faces = Vec::new();

    for (n, line) in src.lines().enumerate() {
        let line_no = n + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let Some((&keyword, args)) = tokens.split_first() else {
            continue;
        };

        match keyword {
            "v" => match parse_floats::<3>(args) {
                Some(v) => data.positions.push(v),
                None => log::trace!("obj line {line_no}: skipping malformed vertex"),
            },
            "vt" => match parse_floats::<2>(args) {
                Some(v) => data.tex_coords.push(v),
                None => log::trace!("obj line {line_no}: skipping malformed texture coordinate"),
            },
            "vn" => match parse_floats::<3>(args) {
                Some(v) => data.normals.push(v),
                None => log::trace!("obj line {line_no}: skipping malformed normal"),
            },
            "f" => {
                faces.clear();
                match parse_face(args, &data, line_no, &mut corners, &mut faces) {
                    Ok(()) => data.faces.extend_from_slice(&faces),
                    Err(e) => log::trace!("skipping face: {e}"),
                }
            }
            k if k.starts_with('#') => {}
            k => log::trace!("obj line {line_no}: skipping `{k}` record"),
        }
    }

    log::debug!(
        "parsed obj: {} positions, {} texture coordinates, {} normals, {} triangles",
        data.positions.len(),
        data.tex_coords.len(),
        data.normals.len(),
        data.faces.len()
    );

    data
}
