use ndarray::Axis;

use crate::cluster::ClusterModel;
use crate::error::SwtError;
use crate::grid::WindField;
use crate::labels::{SwtCatalog, SwtLabel};

/// Nearest-centroid assignment over the summed squared differences of both
/// wind components.
///
/// The field must already live on the model grid; mismatched shapes are an
/// error rather than being reshaped, so callers regrid first. The scan keeps
/// the first minimum: an exact tie between two centroids resolves to the
/// lower cluster id.
pub fn assign(field: &WindField, model: &ClusterModel) -> Result<u32, SwtError> {
    if model.n_clusters() == 0 {
        return Err(SwtError::Cluster("model contains no centroids".to_string()));
    }
    let (nlat, nlon) = model.grid_shape();
    if field.grid_shape() != (nlat, nlon) {
        return Err(SwtError::shape_mismatch(
            "wind field vs cluster grid; interpolate the field onto the cluster grid first",
            field.u.shape(),
            &[nlat, nlon],
        ));
    }

    let mut best_id = 1u32;
    let mut best_distance = f64::INFINITY;
    for ic in 0..model.n_clusters() {
        let centroid_u = model.centroids_u.index_axis(Axis(0), ic);
        let centroid_v = model.centroids_v.index_axis(Axis(0), ic);

        let mut distance = 0.0;
        for (value, centroid) in field.u.iter().zip(centroid_u.iter()) {
            let d = value - centroid;
            distance += d * d;
        }
        for (value, centroid) in field.v.iter().zip(centroid_v.iter()) {
            let d = value - centroid;
            distance += d * d;
        }

        // Strict comparison: ties keep the earlier (lower) cluster id.
        if distance < best_distance {
            best_distance = distance;
            best_id = ic as u32 + 1;
        }
    }
    Ok(best_id)
}

/// A resolved assignment: the winning cluster plus its catalog label, when
/// the catalog carries one for that id.
#[derive(Debug, Clone)]
pub struct Assignment<'a> {
    pub cluster_id: u32,
    pub label: Option<&'a SwtLabel>,
}

/// Assign, then resolve the synoptic-type label through the injected catalog.
pub fn classify<'a>(
    field: &WindField,
    model: &ClusterModel,
    catalog: &'a SwtCatalog,
) -> Result<Assignment<'a>, SwtError> {
    let cluster_id = assign(field, model)?;
    Ok(Assignment {
        cluster_id,
        label: catalog.lookup(cluster_id),
    })
}
