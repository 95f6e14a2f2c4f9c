use ndarray::{array, Array1, Array2};
use swt_rust::error::SwtError;
use swt_rust::grid::WindField;
use swt_rust::regrid::regrid;

/// Field whose components are linear in latitude and longitude, so bilinear
/// interpolation reproduces them exactly at any interior point.
fn linear_field(latitude: Array1<f64>, longitude: Array1<f64>) -> WindField {
    let u = Array2::from_shape_fn((latitude.len(), longitude.len()), |(i, j)| {
        2.0 * latitude[i] + 3.0 * longitude[j]
    });
    let v = Array2::from_shape_fn((latitude.len(), longitude.len()), |(i, j)| {
        latitude[i] - longitude[j]
    });
    WindField::new(u, v, latitude, longitude).unwrap()
}

#[test]
fn test_regrid_identity_on_same_grid() {
    let field = linear_field(array![-40.0, -30.0, -20.0, -10.0], array![110.0, 120.0, 130.0]);
    let out = regrid(&field, &field.latitude, &field.longitude).unwrap();

    assert_eq!(out.grid_shape(), field.grid_shape());
    for (a, b) in out.u.iter().zip(field.u.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
    for (a, b) in out.v.iter().zip(field.v.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn test_regrid_interpolates_linear_field_exactly() {
    let field = linear_field(array![-40.0, -30.0, -20.0, -10.0], array![110.0, 120.0, 130.0]);
    let target_lat = array![-35.0, -25.0, -15.0];
    let target_lon = array![112.5, 125.0];

    let out = regrid(&field, &target_lat, &target_lon).unwrap();
    assert_eq!(out.grid_shape(), (3, 2));
    for i in 0..3 {
        for j in 0..2 {
            let expected_u = 2.0 * target_lat[i] + 3.0 * target_lon[j];
            let expected_v = target_lat[i] - target_lon[j];
            assert!((out.u[[i, j]] - expected_u).abs() < 1e-10);
            assert!((out.v[[i, j]] - expected_v).abs() < 1e-10);
        }
    }
}

#[test]
fn test_regrid_normalizes_decreasing_latitude() {
    // Same linear field, but stored with latitude running north to south.
    let latitude = array![-10.0, -20.0, -30.0, -40.0];
    let longitude = array![110.0, 120.0, 130.0];
    let field = linear_field(latitude, longitude);

    let target_lat = array![-35.0, -15.0];
    let target_lon = array![115.0, 125.0];
    let out = regrid(&field, &target_lat, &target_lon).unwrap();

    for i in 0..2 {
        for j in 0..2 {
            let expected_u = 2.0 * target_lat[i] + 3.0 * target_lon[j];
            assert!((out.u[[i, j]] - expected_u).abs() < 1e-10);
        }
    }
}

#[test]
fn test_regrid_rejects_target_outside_source_domain() {
    let field = linear_field(array![-40.0, -30.0, -20.0, -10.0], array![110.0, 120.0, 130.0]);

    let result = regrid(&field, &array![-45.0, -20.0], &array![115.0]);
    match result {
        Err(SwtError::OutOfDomain { axis, value, min, max }) => {
            assert_eq!(axis, "latitude");
            assert_eq!(value, -45.0);
            assert_eq!(min, -40.0);
            assert_eq!(max, -10.0);
        }
        other => panic!("expected OutOfDomain, got {:?}", other),
    }

    let result = regrid(&field, &array![-20.0], &array![109.0]);
    assert!(matches!(
        result,
        Err(SwtError::OutOfDomain { axis: "longitude", .. })
    ));
}

#[test]
fn test_regrid_accepts_domain_boundary() {
    let field = linear_field(array![-40.0, -30.0, -20.0, -10.0], array![110.0, 120.0, 130.0]);
    let out = regrid(&field, &array![-40.0, -10.0], &array![110.0, 130.0]).unwrap();

    assert!((out.u[[0, 0]] - (2.0 * -40.0 + 3.0 * 110.0)).abs() < 1e-10);
    assert!((out.u[[1, 1]] - (2.0 * -10.0 + 3.0 * 130.0)).abs() < 1e-10);
}
