use ndarray::{Array1, Array2, Array3, Axis};

use crate::error::SwtError;

/// A single (u, v) wind snapshot on a rectangular latitude x longitude grid.
///
/// Invariant: u and v share one shape, and that shape matches the coordinate
/// arrays. The latitude axis may run in either direction; longitude is
/// monotonically increasing, degrees east.
#[derive(Debug, Clone)]
pub struct WindField {
    pub u: Array2<f64>,
    pub v: Array2<f64>,
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
}

impl WindField {
    pub fn new(
        u: Array2<f64>,
        v: Array2<f64>,
        latitude: Array1<f64>,
        longitude: Array1<f64>,
    ) -> Result<Self, SwtError> {
        if u.dim() != v.dim() {
            return Err(SwtError::shape_mismatch(
                "u and v components",
                u.shape(),
                v.shape(),
            ));
        }
        if u.dim() != (latitude.len(), longitude.len()) {
            return Err(SwtError::shape_mismatch(
                "field vs coordinate arrays",
                u.shape(),
                &[latitude.len(), longitude.len()],
            ));
        }
        Ok(Self {
            u,
            v,
            latitude,
            longitude,
        })
    }

    /// (nlat, nlon) of the underlying grid.
    pub fn grid_shape(&self) -> (usize, usize) {
        self.u.dim()
    }
}

/// A time-ordered sequence of wind snapshots sharing one fixed grid.
///
/// Invariant: the time axis length equals the leading dimension of both
/// component arrays. Time is hours since 1900-01-01 00:00 UTC, gregorian.
#[derive(Debug, Clone)]
pub struct WindFieldSeries {
    pub u: Array3<f64>,
    pub v: Array3<f64>,
    pub time: Array1<f64>,
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
}

impl WindFieldSeries {
    pub fn new(
        u: Array3<f64>,
        v: Array3<f64>,
        time: Array1<f64>,
        latitude: Array1<f64>,
        longitude: Array1<f64>,
    ) -> Result<Self, SwtError> {
        if u.dim() != v.dim() {
            return Err(SwtError::shape_mismatch("u and v series", u.shape(), v.shape()));
        }
        if u.dim() != (time.len(), latitude.len(), longitude.len()) {
            return Err(SwtError::shape_mismatch(
                "series vs coordinate arrays",
                u.shape(),
                &[time.len(), latitude.len(), longitude.len()],
            ));
        }
        Ok(Self {
            u,
            v,
            time,
            latitude,
            longitude,
        })
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Clone out the snapshot at `index` as a standalone field.
    pub fn snapshot(&self, index: usize) -> Option<WindField> {
        if index >= self.len() {
            return None;
        }
        Some(WindField {
            u: self.u.index_axis(Axis(0), index).to_owned(),
            v: self.v.index_axis(Axis(0), index).to_owned(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_wind_field_shape_invariants() {
        let u = Array2::zeros((2, 3));
        let v = Array2::zeros((2, 3));
        let field = WindField::new(u, v, array![-40.0, -30.0], array![110.0, 120.0, 130.0]);
        assert!(field.is_ok());
        assert_eq!(field.unwrap().grid_shape(), (2, 3));

        let u = Array2::zeros((2, 3));
        let v = Array2::zeros((3, 2));
        let result = WindField::new(u, v, array![-40.0, -30.0], array![110.0, 120.0, 130.0]);
        assert!(matches!(result, Err(SwtError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_series_time_length_invariant() {
        let u = Array3::zeros((4, 2, 3));
        let v = Array3::zeros((4, 2, 3));
        let result = WindFieldSeries::new(
            u,
            v,
            array![0.0, 24.0, 48.0],
            array![-40.0, -30.0],
            array![110.0, 120.0, 130.0],
        );
        assert!(matches!(result, Err(SwtError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_snapshot_extraction() {
        let u = Array3::from_shape_fn((2, 2, 2), |(t, i, j)| (t * 100 + i * 10 + j) as f64);
        let v = &u * 2.0;
        let series = WindFieldSeries::new(
            u,
            v,
            array![0.0, 24.0],
            array![-40.0, -30.0],
            array![110.0, 120.0],
        )
        .unwrap();

        let snap = series.snapshot(1).unwrap();
        assert_eq!(snap.u[[0, 1]], 101.0);
        assert_eq!(snap.v[[1, 0]], 220.0);
        assert!(series.snapshot(2).is_none());
    }
}
