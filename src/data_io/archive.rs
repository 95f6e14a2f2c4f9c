use ndarray::{Array1, Array3};
use std::path::Path;

use crate::cluster::ClusterModel;
use crate::error::SwtError;

/// Write a trained model to a self-describing NetCDF archive.
///
/// Layout: dimensions `time` (unlimited), `latitude`, `longitude`,
/// `clusterID`; the per-timestep label series; per-cluster u/v centroid
/// fields; scalar quality metrics. Coordinate variables carry their units so
/// reloaded models stay comparable across tools.
pub fn save_model(model: &ClusterModel, path: impl AsRef<Path>) -> Result<(), SwtError> {
    let path = path.as_ref();
    let n_clusters = model.n_clusters();
    let (nlat, nlon) = model.grid_shape();
    let ntime = model.time.len();
    if model.labels.len() != ntime {
        return Err(SwtError::shape_mismatch(
            "label series vs time axis",
            &[model.labels.len()],
            &[ntime],
        ));
    }

    let mut file = netcdf::create(path)?;
    file.add_unlimited_dimension("time")?;
    file.add_dimension("latitude", nlat)?;
    file.add_dimension("longitude", nlon)?;
    file.add_dimension("clusterID", n_clusters)?;

    file.add_attribute("title", "Synoptic weather type cluster fields")?;
    file.add_attribute(
        "history",
        format!(
            "Created on {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ")
        ),
    )?;

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", "hours since 1900-01-01 00:00:00.0")?;
        var.put_attribute("long_name", "time")?;
        var.put_attribute("calendar", "gregorian")?;
    }
    {
        let mut var = file.add_variable::<f64>("latitude", &["latitude"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_attribute("long_name", "latitude")?;
    }
    {
        let mut var = file.add_variable::<f64>("longitude", &["longitude"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_attribute("long_name", "longitude")?;
    }
    file.add_variable::<i32>("clusterID", &["clusterID"])?;
    {
        let mut var = file.add_variable::<i32>("clusterSeries", &["time"])?;
        var.put_attribute("long_name", "time series of cluster IDs")?;
    }
    file.add_variable::<f64>("clusterU", &["clusterID", "latitude", "longitude"])?;
    file.add_variable::<f64>("clusterV", &["clusterID", "latitude", "longitude"])?;
    {
        let mut var = file.add_variable::<f64>("inertia", &[])?;
        var.put_attribute("long_name", "inertia")?;
    }
    {
        let mut var = file.add_variable::<f64>("silhouette_score", &[])?;
        var.put_attribute("long_name", "silhouette score")?;
    }

    {
        let mut var = require_variable_mut(&mut file, path, "time")?;
        var.put_values(&model.time.to_vec(), 0..ntime)?;
    }
    {
        let mut var = require_variable_mut(&mut file, path, "latitude")?;
        var.put_values(&model.latitude.to_vec(), 0..nlat)?;
    }
    {
        let mut var = require_variable_mut(&mut file, path, "longitude")?;
        var.put_values(&model.longitude.to_vec(), 0..nlon)?;
    }
    {
        let ids: Vec<i32> = (1..=n_clusters as i32).collect();
        let mut var = require_variable_mut(&mut file, path, "clusterID")?;
        var.put_values(&ids, 0..n_clusters)?;
    }
    {
        let series: Vec<i32> = model.labels.iter().map(|&label| label as i32).collect();
        let mut var = require_variable_mut(&mut file, path, "clusterSeries")?;
        var.put_values(&series, 0..ntime)?;
    }

    let centroid_u: Vec<f64> = model.centroids_u.iter().copied().collect();
    let centroid_v: Vec<f64> = model.centroids_v.iter().copied().collect();
    {
        let mut var = require_variable_mut(&mut file, path, "clusterU")?;
        var.put_values(&centroid_u, (0..n_clusters, 0..nlat, 0..nlon))?;
    }
    {
        let mut var = require_variable_mut(&mut file, path, "clusterV")?;
        var.put_values(&centroid_v, (0..n_clusters, 0..nlat, 0..nlon))?;
    }

    {
        let mut var = require_variable_mut(&mut file, path, "inertia")?;
        var.put_values(&[model.inertia], ..)?;
    }
    {
        let mut var = require_variable_mut(&mut file, path, "silhouette_score")?;
        var.put_values(&[model.silhouette], ..)?;
    }

    Ok(())
}

/// Load a model written by [`save_model`].
///
/// Missing files surface as `Io`; files that exist but deviate from the
/// expected layout fail with `SchemaMismatch` naming the offending piece.
pub fn load_model(path: impl AsRef<Path>) -> Result<ClusterModel, SwtError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SwtError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("model file not found: {}", path.display()),
        )));
    }
    let file = netcdf::open(path)?;

    let time = Array1::from(read_f64_values(&file, path, "time")?);
    let latitude = Array1::from(read_f64_values(&file, path, "latitude")?);
    let longitude = Array1::from(read_f64_values(&file, path, "longitude")?);

    let ids: Vec<i32> = {
        let var = require_variable(&file, path, "clusterID")?;
        var.get_values(..)?
    };
    let n_clusters = ids.len();
    let nlat = latitude.len();
    let nlon = longitude.len();

    let centroids_u = read_centroids(&file, path, "clusterU", n_clusters, nlat, nlon)?;
    let centroids_v = read_centroids(&file, path, "clusterV", n_clusters, nlat, nlon)?;

    let series: Vec<i32> = {
        let var = require_variable(&file, path, "clusterSeries")?;
        var.get_values(..)?
    };
    if series.len() != time.len() {
        return Err(SwtError::SchemaMismatch {
            path: path.to_path_buf(),
            what: format!(
                "clusterSeries length {} disagrees with time axis length {}",
                series.len(),
                time.len()
            ),
        });
    }
    let labels = series
        .iter()
        .map(|&label| {
            if label >= 1 && label <= n_clusters as i32 {
                Ok(label as u32)
            } else {
                Err(SwtError::SchemaMismatch {
                    path: path.to_path_buf(),
                    what: format!("cluster label {label} outside 1..={n_clusters}"),
                })
            }
        })
        .collect::<Result<Vec<u32>, SwtError>>()?;

    let inertia = read_scalar(&file, path, "inertia")?;
    let silhouette = read_scalar(&file, path, "silhouette_score")?;

    Ok(ClusterModel {
        centroids_u,
        centroids_v,
        labels: Array1::from(labels),
        inertia,
        silhouette,
        latitude,
        longitude,
        time,
    })
}

fn require_variable<'f>(
    file: &'f netcdf::File,
    path: &Path,
    name: &str,
) -> Result<netcdf::Variable<'f>, SwtError> {
    file.variable(name).ok_or_else(|| SwtError::SchemaMismatch {
        path: path.to_path_buf(),
        what: format!("missing variable '{name}'"),
    })
}

fn require_variable_mut<'f>(
    file: &'f mut netcdf::FileMut,
    path: &Path,
    name: &str,
) -> Result<netcdf::VariableMut<'f>, SwtError> {
    file.variable_mut(name)
        .ok_or_else(|| SwtError::SchemaMismatch {
            path: path.to_path_buf(),
            what: format!("variable '{name}' missing after creation"),
        })
}

fn read_f64_values(file: &netcdf::File, path: &Path, name: &str) -> Result<Vec<f64>, SwtError> {
    let var = require_variable(file, path, name)?;
    Ok(var.get_values(..)?)
}

fn read_scalar(file: &netcdf::File, path: &Path, name: &str) -> Result<f64, SwtError> {
    let values = read_f64_values(file, path, name)?;
    values
        .first()
        .copied()
        .ok_or_else(|| SwtError::SchemaMismatch {
            path: path.to_path_buf(),
            what: format!("variable '{name}' holds no value"),
        })
}

fn read_centroids(
    file: &netcdf::File,
    path: &Path,
    name: &str,
    n_clusters: usize,
    nlat: usize,
    nlon: usize,
) -> Result<Array3<f64>, SwtError> {
    let var = require_variable(file, path, name)?;
    let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();
    if shape != [n_clusters, nlat, nlon] {
        return Err(SwtError::SchemaMismatch {
            path: path.to_path_buf(),
            what: format!(
                "variable '{name}' has shape {shape:?}, expected {:?}",
                [n_clusters, nlat, nlon]
            ),
        });
    }
    let raw: Vec<f64> = var.get_values(..)?;
    Array3::from_shape_vec((n_clusters, nlat, nlon), raw).map_err(|_| SwtError::SchemaMismatch {
        path: path.to_path_buf(),
        what: format!("variable '{name}' does not fill its declared shape"),
    })
}
