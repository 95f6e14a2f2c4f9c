use chrono::NaiveDate;
use ndarray::{Array1, Array2, Array3, Array4, ArrayView3, Axis};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SwtError;
use crate::grid::{WindField, WindFieldSeries};

/// Destination for progress messages emitted while scanning and reading the
/// archive. Implementations may print, log, or ignore them.
pub trait ProgressReporter {
    fn report(&self, message: &str);

    /// Called once reading completes.
    fn finish(&self) {}
}

/// Discards all progress messages.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn report(&self, _message: &str) {}
}

/// Rewrites a single console line per message.
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, message: &str) {
        print!("\r{:<50}", message);
        let _ = std::io::stdout().flush();
    }

    fn finish(&self) {
        println!();
    }
}

/// One ingestion request: a variable sampled daily at a fixed UTC hour over
/// a date range and spatial window.
#[derive(Debug, Clone)]
pub struct SeriesRequest {
    /// Variable name inside the NetCDF files.
    pub variable: String,
    /// Directory name under the archive root when it differs from `variable`.
    pub variable_dir: Option<String>,
    /// First month to include, `YYYY-MM`.
    pub date_start: String,
    /// Last month to include, `YYYY-MM`.
    pub date_end: String,
    /// UTC hour of day at which to sample, 0..=23.
    pub utc_hour: usize,
    /// Latitude window, inclusive on both ends, any order.
    pub lat_bounds: (f64, f64),
    /// Longitude window, inclusive on both ends, any order.
    pub lon_bounds: (f64, f64),
    /// Spatial stride: keep every `coarsen`-th grid point inside the window.
    pub coarsen: usize,
    /// Pressure level for 4-D variables, hPa.
    pub pressure_level: Option<f64>,
}

/// Time-ordered daily samples of one variable on the selected grid window.
#[derive(Debug, Clone)]
pub struct VariableSeries {
    pub values: Array3<f64>,
    pub time: Array1<f64>,
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
}

/// Reads daily-sampled series out of a monthly-file ERA5-style archive laid
/// out as `<root>/<variable>/<year>/<variable>_<YYYYMMDD>-<YYYYMMDD>.nc`.
pub struct Era5Reader {
    root: PathBuf,
    progress: Box<dyn ProgressReporter>,
}

impl Era5Reader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            progress: Box::new(ConsoleProgress),
        }
    }

    pub fn with_progress(root: impl Into<PathBuf>, progress: Box<dyn ProgressReporter>) -> Self {
        Self {
            root: root.into(),
            progress,
        }
    }

    /// Read one variable's daily series over the requested window.
    ///
    /// The spatial selection comes from the first file in range and applies
    /// to every file; archives whose grids differ between files fail with
    /// `ShapeMismatch` when the per-file chunks are joined.
    pub fn read_series(&self, request: &SeriesRequest) -> Result<VariableSeries, SwtError> {
        if request.coarsen == 0 {
            return Err(SwtError::SchemaMismatch {
                path: self.root.clone(),
                what: "coarsening factor must be at least 1".to_string(),
            });
        }

        self.progress.report("Finding files to include");
        let files = self.discover_files(request)?;
        if files.is_empty() {
            return Err(SwtError::SchemaMismatch {
                path: self.root.clone(),
                what: format!(
                    "no archive files for '{}' between {} and {}",
                    request.variable, request.date_start, request.date_end
                ),
            });
        }

        let (lat_all, lon_all) = read_grid_coordinates(&files[0])?;
        let (lat_indices, latitude) = mask_axis(&lat_all, request.lat_bounds, request.coarsen);
        let (lon_indices, longitude) = mask_axis(&lon_all, request.lon_bounds, request.coarsen);
        if lat_indices.is_empty() {
            let (min, max) = axis_min_max(&lat_all);
            return Err(SwtError::OutOfDomain {
                axis: "latitude",
                value: request.lat_bounds.0,
                min,
                max,
            });
        }
        if lon_indices.is_empty() {
            let (min, max) = axis_min_max(&lon_all);
            return Err(SwtError::OutOfDomain {
                axis: "longitude",
                value: request.lon_bounds.0,
                min,
                max,
            });
        }

        let mut chunks: Vec<Array3<f64>> = Vec::new();
        let mut times: Vec<f64> = Vec::new();
        for file in &files {
            let (span_start, _) = date_span_from_filename(file)?;
            self.progress
                .report(&format!("Reading data for {}", span_start.format("%Y/%m")));
            let (chunk, chunk_times) =
                read_file_samples(file, request, &lat_indices, &lon_indices)?;
            times.extend_from_slice(&chunk_times);
            chunks.push(chunk);
        }
        self.progress.report("Reading data done");
        self.progress.finish();

        let views: Vec<ArrayView3<f64>> = chunks.iter().map(|chunk| chunk.view()).collect();
        let values = ndarray::concatenate(Axis(0), &views).map_err(|_| {
            SwtError::shape_mismatch(
                "archive files disagree on grid",
                chunks.first().map(|c| c.shape()).unwrap_or(&[]),
                chunks.last().map(|c| c.shape()).unwrap_or(&[]),
            )
        })?;

        Ok(VariableSeries {
            values,
            time: Array1::from(times),
            latitude,
            longitude,
        })
    }

    /// Read u and v with matching request windows and combine them into a
    /// wind-field series; the two grids must agree exactly.
    pub fn read_wind_series(
        &self,
        u_request: &SeriesRequest,
        v_request: &SeriesRequest,
    ) -> Result<WindFieldSeries, SwtError> {
        let u = self.read_series(u_request)?;
        let v = self.read_series(v_request)?;
        if u.latitude != v.latitude || u.longitude != v.longitude || u.time != v.time {
            return Err(SwtError::shape_mismatch(
                "u and v series grids",
                u.values.shape(),
                v.values.shape(),
            ));
        }
        WindFieldSeries::new(u.values, v.values, u.time, u.latitude, u.longitude)
    }

    /// Archive files overlapping the requested date range, sorted by name.
    fn discover_files(&self, request: &SeriesRequest) -> Result<Vec<PathBuf>, SwtError> {
        let var_dir = request
            .variable_dir
            .as_deref()
            .unwrap_or(&request.variable);
        let dir = self.root.join(var_dir);
        let range_start = parse_month(&request.date_start)?;
        let range_end = parse_month(&request.date_end)?;

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                for inner in std::fs::read_dir(&path)? {
                    let inner_path = inner?.path();
                    if is_netcdf(&inner_path) {
                        files.push(inner_path);
                    }
                }
            } else if is_netcdf(&path) {
                files.push(path);
            }
        }
        files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));

        let mut included = Vec::new();
        for file in files {
            // Files without a parseable date span are not archive members.
            let (file_start, file_end) = match date_span_from_filename(&file) {
                Ok(span) => span,
                Err(_) => continue,
            };
            if file_start > range_end || file_end < range_start {
                continue;
            }
            included.push(file);
        }
        Ok(included)
    }
}

/// Read one 2-D (u, v) snapshot straight off a NetCDF file, for assignment.
/// A leading time axis of length one is squeezed away.
pub fn read_wind_field(
    path: impl AsRef<Path>,
    u_variable: &str,
    v_variable: &str,
    lat_name: &str,
    lon_name: &str,
) -> Result<WindField, SwtError> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;
    let latitude = Array1::from(read_coordinate_values(&file, lat_name, path)?);
    let longitude = Array1::from(read_coordinate_values(&file, lon_name, path)?);
    let u = read_field_2d(&file, u_variable, path)?;
    let v = read_field_2d(&file, v_variable, path)?;
    WindField::new(u, v, latitude, longitude)
}

fn is_netcdf(path: &Path) -> bool {
    path.extension().map(|ext| ext == "nc").unwrap_or(false)
}

fn parse_month(value: &str) -> Result<NaiveDate, SwtError> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").map_err(|_| {
        SwtError::InvalidDate {
            value: value.to_string(),
        }
    })
}

/// Extract the `YYYYMMDD-YYYYMMDD` span carried by an archive file name.
fn date_span_from_filename(path: &Path) -> Result<(NaiveDate, NaiveDate), SwtError> {
    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("");
    let span = stem.rsplit('_').next().unwrap_or("");
    let mut parts = span.splitn(2, '-');
    let (start, end) = match (parts.next(), parts.next()) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(SwtError::SchemaMismatch {
                path: path.to_path_buf(),
                what: "file name carries no YYYYMMDD-YYYYMMDD span".to_string(),
            })
        }
    };
    let start = NaiveDate::parse_from_str(start, "%Y%m%d").map_err(|_| SwtError::SchemaMismatch {
        path: path.to_path_buf(),
        what: "file name carries no YYYYMMDD-YYYYMMDD span".to_string(),
    })?;
    let end = NaiveDate::parse_from_str(end, "%Y%m%d").map_err(|_| SwtError::SchemaMismatch {
        path: path.to_path_buf(),
        what: "file name carries no YYYYMMDD-YYYYMMDD span".to_string(),
    })?;
    Ok((start, end))
}

/// Indices inside the inclusive window, strided by `coarsen`, plus the
/// coordinate values they select.
fn mask_axis(coords: &[f64], bounds: (f64, f64), coarsen: usize) -> (Vec<usize>, Array1<f64>) {
    let (lo, hi) = if bounds.0 <= bounds.1 {
        (bounds.0, bounds.1)
    } else {
        (bounds.1, bounds.0)
    };
    let kept: Vec<usize> = coords
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value >= lo && value <= hi)
        .map(|(index, _)| index)
        .collect();
    let kept: Vec<usize> = kept.into_iter().step_by(coarsen).collect();
    let values = Array1::from(kept.iter().map(|&index| coords[index]).collect::<Vec<_>>());
    (kept, values)
}

fn axis_min_max(coords: &[f64]) -> (f64, f64) {
    let min = coords.iter().copied().fold(f64::INFINITY, f64::min);
    let max = coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn read_grid_coordinates(path: &Path) -> Result<(Vec<f64>, Vec<f64>), SwtError> {
    let file = netcdf::open(path)?;
    let latitude = read_coordinate_values(&file, "latitude", path)?;
    let longitude = read_coordinate_values(&file, "longitude", path)?;
    Ok((latitude, longitude))
}

fn read_coordinate_values(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<f64>, SwtError> {
    let var = file.variable(name).ok_or_else(|| SwtError::SchemaMismatch {
        path: path.to_path_buf(),
        what: format!("missing coordinate variable '{name}'"),
    })?;
    Ok(var.get_values(..)?)
}

/// Read one file's worth of the variable, daily-sampled at the requested
/// UTC hour and subset to the masked grid window.
fn read_file_samples(
    path: &Path,
    request: &SeriesRequest,
    lat_indices: &[usize],
    lon_indices: &[usize],
) -> Result<(Array3<f64>, Vec<f64>), SwtError> {
    let file = netcdf::open(path)?;
    let var = file
        .variable(&request.variable)
        .ok_or_else(|| SwtError::SchemaMismatch {
            path: path.to_path_buf(),
            what: format!("missing variable '{}'", request.variable),
        })?;
    let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();
    let raw: Vec<f64> = var.get_values(..)?;

    let sampled = match shape.len() {
        // Single-level variables: (time, lat, lon)
        3 => {
            let full = Array3::from_shape_vec((shape[0], shape[1], shape[2]), raw)
                .map_err(|_| SwtError::UnsupportedShape {
                    name: request.variable.clone(),
                    shape: shape.clone(),
                })?;
            sample_daily(full.view(), request.utc_hour, lat_indices, lon_indices)
        }
        // Pressure-level variables: (time, level, lat, lon)
        4 => {
            let level = request
                .pressure_level
                .ok_or_else(|| SwtError::SchemaMismatch {
                    path: path.to_path_buf(),
                    what: format!(
                        "variable '{}' is 4-D; a pressure level is required",
                        request.variable
                    ),
                })?;
            let levels = read_coordinate_values(&file, "level", path)?;
            let level_index = levels
                .iter()
                .position(|&l| (l - level).abs() < 1e-6)
                .ok_or_else(|| SwtError::SchemaMismatch {
                    path: path.to_path_buf(),
                    what: format!("pressure level {level} not available (have {levels:?})"),
                })?;
            let full = Array4::from_shape_vec((shape[0], shape[1], shape[2], shape[3]), raw)
                .map_err(|_| SwtError::UnsupportedShape {
                    name: request.variable.clone(),
                    shape: shape.clone(),
                })?;
            sample_daily(
                full.index_axis(Axis(1), level_index),
                request.utc_hour,
                lat_indices,
                lon_indices,
            )
        }
        _ => {
            return Err(SwtError::UnsupportedShape {
                name: request.variable.clone(),
                shape,
            })
        }
    };

    let time_var = file.variable("time").ok_or_else(|| SwtError::SchemaMismatch {
        path: path.to_path_buf(),
        what: "missing coordinate variable 'time'".to_string(),
    })?;
    let time_all: Vec<f64> = time_var.get_values(..)?;
    let times: Vec<f64> = time_all
        .iter()
        .skip(request.utc_hour)
        .step_by(24)
        .copied()
        .collect();
    if times.len() != sampled.shape()[0] {
        return Err(SwtError::SchemaMismatch {
            path: path.to_path_buf(),
            what: format!(
                "time axis length {} disagrees with variable '{}' ({} daily samples)",
                time_all.len(),
                request.variable,
                sampled.shape()[0]
            ),
        });
    }

    Ok((sampled, times))
}

fn sample_daily(
    values: ArrayView3<f64>,
    utc_hour: usize,
    lat_indices: &[usize],
    lon_indices: &[usize],
) -> Array3<f64> {
    let steps: Vec<usize> = (utc_hour..values.shape()[0]).step_by(24).collect();
    let mut out = Array3::zeros((steps.len(), lat_indices.len(), lon_indices.len()));
    for (it, &t) in steps.iter().enumerate() {
        for (ii, &i) in lat_indices.iter().enumerate() {
            for (ij, &j) in lon_indices.iter().enumerate() {
                out[[it, ii, ij]] = values[[t, i, j]];
            }
        }
    }
    out
}

fn read_field_2d(file: &netcdf::File, name: &str, path: &Path) -> Result<Array2<f64>, SwtError> {
    let var = file.variable(name).ok_or_else(|| SwtError::SchemaMismatch {
        path: path.to_path_buf(),
        what: format!("missing variable '{name}'"),
    })?;
    let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();
    let raw: Vec<f64> = var.get_values(..)?;
    match shape.as_slice() {
        [nlat, nlon] => Array2::from_shape_vec((*nlat, *nlon), raw).map_err(|_| {
            SwtError::UnsupportedShape {
                name: name.to_string(),
                shape: shape.clone(),
            }
        }),
        [1, nlat, nlon] => Array2::from_shape_vec((*nlat, *nlon), raw).map_err(|_| {
            SwtError::UnsupportedShape {
                name: name.to_string(),
                shape: shape.clone(),
            }
        }),
        _ => Err(SwtError::UnsupportedShape {
            name: name.to_string(),
            shape,
        }),
    }
}
