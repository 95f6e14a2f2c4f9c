use ndarray::{s, Array1, Array2};

use crate::error::SwtError;
use crate::grid::WindField;
use crate::math::{bilin_interp, bracket_coordinate};

/// Interpolate a wind field onto a fixed target grid.
///
/// The source latitude axis may run either way; a decreasing axis is
/// reversed together with the data so the bilinear lookup always works on
/// increasing coordinates. Every target point must lie inside the source
/// domain, boundaries included: out-of-range coordinates fail with
/// `OutOfDomain` and are never clamped.
pub fn regrid(
    field: &WindField,
    target_lat: &Array1<f64>,
    target_lon: &Array1<f64>,
) -> Result<WindField, SwtError> {
    let (src_lat, u, v) = if is_decreasing(&field.latitude) {
        (
            field.latitude.slice(s![..;-1]).to_owned(),
            field.u.slice(s![..;-1, ..]).to_owned(),
            field.v.slice(s![..;-1, ..]).to_owned(),
        )
    } else {
        (field.latitude.clone(), field.u.clone(), field.v.clone())
    };

    let src_lat_values = src_lat.to_vec();
    let src_lon_values = field.longitude.to_vec();

    // Bracket every target coordinate up front so domain violations surface
    // before any output is produced.
    let lat_brackets: Vec<(usize, usize, f64)> = target_lat
        .iter()
        .map(|&t| bracket_coordinate(&src_lat_values, t, "latitude"))
        .collect::<Result<_, _>>()?;
    let lon_brackets: Vec<(usize, usize, f64)> = target_lon
        .iter()
        .map(|&t| bracket_coordinate(&src_lon_values, t, "longitude"))
        .collect::<Result<_, _>>()?;

    let mut out_u = Array2::zeros((target_lat.len(), target_lon.len()));
    let mut out_v = Array2::zeros((target_lat.len(), target_lon.len()));
    for (i, &(i0, i1, fac_lat)) in lat_brackets.iter().enumerate() {
        for (j, &(j0, j1, fac_lon)) in lon_brackets.iter().enumerate() {
            out_u[[i, j]] = bilin_interp(
                u[[i0, j0]],
                u[[i0, j1]],
                u[[i1, j0]],
                u[[i1, j1]],
                fac_lat,
                fac_lon,
            );
            out_v[[i, j]] = bilin_interp(
                v[[i0, j0]],
                v[[i0, j1]],
                v[[i1, j0]],
                v[[i1, j1]],
                fac_lat,
                fac_lon,
            );
        }
    }

    WindField::new(out_u, out_v, target_lat.clone(), target_lon.clone())
}

fn is_decreasing(coords: &Array1<f64>) -> bool {
    coords.len() >= 2 && coords[0] > coords[coords.len() - 1]
}
