use std::path::Path;
use swt_rust::data_io::{read_wind_field, Era5Reader, SeriesRequest, SilentProgress};
use swt_rust::error::SwtError;

const LATITUDE: [f64; 4] = [-40.0, -30.0, -20.0, -10.0];
const LONGITUDE: [f64; 5] = [110.0, 120.0, 130.0, 140.0, 150.0];

/// Deterministic cell value so tests can check which time step and grid
/// point a sample came from.
fn cell_value(t: usize, i: usize, j: usize) -> f64 {
    (t * 10_000 + i * 100 + j) as f64
}

/// Scoped helper so consecutive variable writes never hold two mutable
/// borrows of the file at once.
fn put_f64(file: &mut netcdf::FileMut, name: &str, dims: &[&str], values: &[f64]) {
    let mut var = file.add_variable::<f64>(name, dims).unwrap();
    var.put_values(values, ..).unwrap();
}

/// Write one monthly archive file with hourly steps over `ndays` days.
/// The variable is 3-D (time, latitude, longitude) unless `levels` is given,
/// in which case it is 4-D with the level axis second.
fn write_month_file(
    path: &Path,
    variable: &str,
    time_start: f64,
    ndays: usize,
    levels: Option<&[f64]>,
) {
    let ntime = ndays * 24;
    let nlat = LATITUDE.len();
    let nlon = LONGITUDE.len();

    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", ntime).unwrap();
    file.add_dimension("latitude", nlat).unwrap();
    file.add_dimension("longitude", nlon).unwrap();

    let times: Vec<f64> = (0..ntime).map(|k| time_start + k as f64).collect();
    put_f64(&mut file, "time", &["time"], &times);
    put_f64(&mut file, "latitude", &["latitude"], &LATITUDE);
    put_f64(&mut file, "longitude", &["longitude"], &LONGITUDE);

    match levels {
        None => {
            let mut values = Vec::with_capacity(ntime * nlat * nlon);
            for t in 0..ntime {
                for i in 0..nlat {
                    for j in 0..nlon {
                        values.push(cell_value(t, i, j));
                    }
                }
            }
            put_f64(
                &mut file,
                variable,
                &["time", "latitude", "longitude"],
                &values,
            );
        }
        Some(levels) => {
            file.add_dimension("level", levels.len()).unwrap();
            put_f64(&mut file, "level", &["level"], levels);
            // Offset each level so selection is observable in the values.
            let mut values = Vec::with_capacity(ntime * levels.len() * nlat * nlon);
            for t in 0..ntime {
                for l in 0..levels.len() {
                    for i in 0..nlat {
                        for j in 0..nlon {
                            values.push(cell_value(t, i, j) + l as f64 * 1_000_000.0);
                        }
                    }
                }
            }
            put_f64(
                &mut file,
                variable,
                &["time", "level", "latitude", "longitude"],
                &values,
            );
        }
    }
}

/// Archive with two monthly files of the given variable under
/// `<root>/<variable>/<year>/`.
fn build_archive(root: &Path, variable: &str, levels: Option<&[f64]>) {
    let year_dir = root.join(variable).join("2010");
    std::fs::create_dir_all(&year_dir).unwrap();
    // 2010-01-01 00:00 is 964248 hours since 1900-01-01 00:00.
    write_month_file(
        &year_dir.join(format!("{variable}_20100101-20100102.nc")),
        variable,
        964_248.0,
        2,
        levels,
    );
    write_month_file(
        &year_dir.join(format!("{variable}_20100201-20100201.nc")),
        variable,
        964_992.0,
        1,
        levels,
    );
}

fn request(variable: &str) -> SeriesRequest {
    SeriesRequest {
        variable: variable.to_string(),
        variable_dir: None,
        date_start: "2010-01".to_string(),
        date_end: "2010-02".to_string(),
        utc_hour: 6,
        lat_bounds: (-40.0, -10.0),
        lon_bounds: (110.0, 150.0),
        coarsen: 1,
        pressure_level: None,
    }
}

fn reader(root: &Path) -> Era5Reader {
    Era5Reader::with_progress(root, Box::new(SilentProgress))
}

#[test]
fn test_read_series_samples_daily_across_files() {
    let dir = tempfile::tempdir().unwrap();
    build_archive(dir.path(), "u", None);

    let series = reader(dir.path()).read_series(&request("u")).unwrap();

    // Two days in January plus one in February, sampled at 06 UTC.
    assert_eq!(series.values.dim(), (3, 4, 5));
    assert_eq!(series.values[[0, 1, 2]], cell_value(6, 1, 2));
    assert_eq!(series.values[[1, 1, 2]], cell_value(30, 1, 2));
    assert_eq!(series.values[[2, 1, 2]], cell_value(6, 1, 2));

    assert_eq!(series.time[0], 964_248.0 + 6.0);
    assert_eq!(series.time[1], 964_248.0 + 30.0);
    assert_eq!(series.time[2], 964_992.0 + 6.0);
}

#[test]
fn test_read_series_respects_date_range() {
    let dir = tempfile::tempdir().unwrap();
    build_archive(dir.path(), "u", None);

    let mut req = request("u");
    req.date_end = "2010-01".to_string();
    let series = reader(dir.path()).read_series(&req).unwrap();

    // The February file falls outside the range.
    assert_eq!(series.values.dim(), (2, 4, 5));
}

#[test]
fn test_read_series_masks_and_coarsens_grid() {
    let dir = tempfile::tempdir().unwrap();
    build_archive(dir.path(), "u", None);

    let mut req = request("u");
    req.lat_bounds = (-35.0, -10.0);
    req.coarsen = 2;
    let series = reader(dir.path()).read_series(&req).unwrap();

    // Latitudes -30, -20, -10 survive the window; every second one is kept.
    assert_eq!(series.latitude.to_vec(), vec![-30.0, -10.0]);
    assert_eq!(series.longitude.to_vec(), vec![110.0, 130.0, 150.0]);
    assert_eq!(series.values.dim(), (3, 2, 3));
    // Output cell (0, 0, 1) comes from source latitude index 1 and source
    // longitude index 2.
    assert_eq!(series.values[[0, 0, 1]], cell_value(6, 1, 2));
}

#[test]
fn test_read_series_selects_pressure_level() {
    let dir = tempfile::tempdir().unwrap();
    build_archive(dir.path(), "u", Some(&[1000.0, 850.0]));

    let mut req = request("u");
    req.pressure_level = Some(850.0);
    let series = reader(dir.path()).read_series(&req).unwrap();

    assert_eq!(series.values.dim(), (3, 4, 5));
    assert_eq!(series.values[[0, 0, 0]], cell_value(6, 0, 0) + 1_000_000.0);
}

#[test]
fn test_read_series_requires_level_for_4d_data() {
    let dir = tempfile::tempdir().unwrap();
    build_archive(dir.path(), "u", Some(&[1000.0, 850.0]));

    let result = reader(dir.path()).read_series(&request("u"));
    match result {
        Err(SwtError::SchemaMismatch { what, .. }) => {
            assert!(what.contains("pressure level"), "unexpected message: {what}");
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }

    let mut req = request("u");
    req.pressure_level = Some(500.0);
    let result = reader(dir.path()).read_series(&req);
    assert!(matches!(result, Err(SwtError::SchemaMismatch { .. })));
}

#[test]
fn test_read_series_rejects_unsupported_rank() {
    let dir = tempfile::tempdir().unwrap();
    let year_dir = dir.path().join("u").join("2010");
    std::fs::create_dir_all(&year_dir).unwrap();

    // A 2-D variable is neither single-level nor pressure-level data.
    let path = year_dir.join("u_20100101-20100101.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("time", 24).unwrap();
        file.add_dimension("latitude", 4).unwrap();
        file.add_dimension("longitude", 5).unwrap();
        let times: Vec<f64> = (0..24).map(|k| k as f64).collect();
        put_f64(&mut file, "time", &["time"], &times);
        put_f64(&mut file, "latitude", &["latitude"], &LATITUDE);
        put_f64(&mut file, "longitude", &["longitude"], &LONGITUDE);
        put_f64(&mut file, "u", &["time", "latitude"], &vec![0.0; 24 * 4]);
    }

    let result = reader(dir.path()).read_series(&request("u"));
    match result {
        Err(SwtError::UnsupportedShape { name, shape }) => {
            assert_eq!(name, "u");
            assert_eq!(shape, vec![24, 4]);
        }
        other => panic!("expected UnsupportedShape, got {:?}", other),
    }
}

#[test]
fn test_read_series_fails_when_no_files_in_range() {
    let dir = tempfile::tempdir().unwrap();
    build_archive(dir.path(), "u", None);

    let mut req = request("u");
    req.date_start = "2015-01".to_string();
    req.date_end = "2015-12".to_string();
    let result = reader(dir.path()).read_series(&req);
    match result {
        Err(SwtError::SchemaMismatch { what, .. }) => {
            assert!(what.contains("no archive files"), "unexpected message: {what}");
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_read_wind_series_combines_components() {
    let dir = tempfile::tempdir().unwrap();
    build_archive(dir.path(), "u", None);
    build_archive(dir.path(), "v", None);

    let series = reader(dir.path())
        .read_wind_series(&request("u"), &request("v"))
        .unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.u.dim(), (3, 4, 5));
    assert_eq!(series.u, series.v);
    assert_eq!(series.latitude.to_vec(), LATITUDE.to_vec());
    assert_eq!(series.longitude.to_vec(), LONGITUDE.to_vec());
}

#[test]
fn test_read_wind_field_reads_single_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("latitude", 4).unwrap();
        file.add_dimension("longitude", 5).unwrap();
        put_f64(&mut file, "latitude", &["latitude"], &LATITUDE);
        put_f64(&mut file, "longitude", &["longitude"], &LONGITUDE);

        let values: Vec<f64> = (0..20).map(|k| k as f64).collect();
        put_f64(&mut file, "u", &["latitude", "longitude"], &values);
        put_f64(&mut file, "v", &["latitude", "longitude"], &values);
    }

    let field = read_wind_field(&path, "u", "v", "latitude", "longitude").unwrap();
    assert_eq!(field.grid_shape(), (4, 5));
    assert_eq!(field.u[[1, 2]], 7.0);
    assert_eq!(field.u, field.v);
}
