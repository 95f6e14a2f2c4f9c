use ndarray::{s, Array2, Array3, ArrayView1, Axis};

use crate::error::SwtError;

/// Stack per-snapshot u and v fields into flat feature vectors.
///
/// Each row of the result is the row-major flattened u slice followed by the
/// row-major flattened v slice, length 2 * nlat * nlon. Centroids are split
/// back with [`unstack`], so the two phases always agree on point order.
pub fn stack(u: &Array3<f64>, v: &Array3<f64>) -> Result<Array2<f64>, SwtError> {
    if u.dim() != v.dim() {
        return Err(SwtError::shape_mismatch("u and v series", u.shape(), v.shape()));
    }
    let (ntime, nlat, nlon) = u.dim();
    let npoints = nlat * nlon;

    let mut stacked = Array2::zeros((ntime, 2 * npoints));
    for it in 0..ntime {
        let u_slice = u.index_axis(Axis(0), it);
        let v_slice = v.index_axis(Axis(0), it);
        for (i, value) in u_slice.iter().enumerate() {
            stacked[[it, i]] = *value;
        }
        for (i, value) in v_slice.iter().enumerate() {
            stacked[[it, npoints + i]] = *value;
        }
    }
    Ok(stacked)
}

/// Split one stacked vector back into (u, v) fields of the given grid shape.
pub fn unstack(
    row: ArrayView1<f64>,
    nlat: usize,
    nlon: usize,
) -> Result<(Array2<f64>, Array2<f64>), SwtError> {
    let npoints = nlat * nlon;
    if row.len() != 2 * npoints {
        return Err(SwtError::shape_mismatch(
            "stacked vector vs grid",
            &[row.len()],
            &[2 * npoints],
        ));
    }
    let u = row
        .slice(s![..npoints])
        .to_owned()
        .into_shape((nlat, nlon))
        .map_err(|_| SwtError::shape_mismatch("stacked u half", &[npoints], &[nlat, nlon]))?;
    let v = row
        .slice(s![npoints..])
        .to_owned()
        .into_shape((nlat, nlon))
        .map_err(|_| SwtError::shape_mismatch("stacked v half", &[npoints], &[nlat, nlon]))?;
    Ok((u, v))
}
