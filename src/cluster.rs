use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis};
use rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use rayon::prelude::*;

use crate::error::SwtError;
use crate::grid::{WindField, WindFieldSeries};
use crate::stack;

/// Tuning knobs for a clustering run.
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub n_clusters: usize,
    /// Worker threads for the quality-metric distance sweeps; 0 uses all cores.
    pub n_jobs: usize,
    /// RNG seed for centroid initialisation. Fixed by default so repeated
    /// runs on identical input reproduce the same model.
    pub seed: u64,
    pub max_iterations: u64,
    pub tolerance: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            n_clusters: 30,
            n_jobs: 1,
            seed: 0,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

/// Output of a training run: per-cluster centroid wind fields, the
/// per-timestep label series, the quality metrics, and the coordinate
/// arrays that anchor the model to its training grid.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    /// Centroid u fields, (n_clusters, nlat, nlon).
    pub centroids_u: Array3<f64>,
    /// Centroid v fields, (n_clusters, nlat, nlon).
    pub centroids_v: Array3<f64>,
    /// Per-timestep cluster ids, 1-indexed.
    pub labels: Array1<u32>,
    pub inertia: f64,
    pub silhouette: f64,
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
    /// Hours since 1900-01-01 00:00 UTC for each training snapshot.
    pub time: Array1<f64>,
}

impl ClusterModel {
    pub fn n_clusters(&self) -> usize {
        self.centroids_u.shape()[0]
    }

    /// (nlat, nlon) of the grid the model was trained on.
    pub fn grid_shape(&self) -> (usize, usize) {
        let shape = self.centroids_u.shape();
        (shape[1], shape[2])
    }

    /// Clone out centroid `cluster_id` (1-indexed) as a standalone field.
    pub fn centroid_field(&self, cluster_id: u32) -> Option<WindField> {
        if cluster_id == 0 || cluster_id as usize > self.n_clusters() {
            return None;
        }
        let index = cluster_id as usize - 1;
        Some(WindField {
            u: self.centroids_u.index_axis(Axis(0), index).to_owned(),
            v: self.centroids_v.index_axis(Axis(0), index).to_owned(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
        })
    }
}

/// Partition stacked feature vectors into `n_clusters` synoptic types.
///
/// K-means with Euclidean distances in the stacked (u, v) space, seeded so
/// results are reproducible across runs on identical input. Labels come out
/// 1-indexed; inertia and silhouette are reported as independent quality
/// signals and neither gates success.
pub fn cluster(
    features: &Array2<f64>,
    latitude: &Array1<f64>,
    longitude: &Array1<f64>,
    time: &Array1<f64>,
    options: &ClusterOptions,
) -> Result<ClusterModel, SwtError> {
    let nsamples = features.nrows();
    let nlat = latitude.len();
    let nlon = longitude.len();

    if features.ncols() != 2 * nlat * nlon {
        return Err(SwtError::shape_mismatch(
            "feature width vs grid",
            &[features.ncols()],
            &[2 * nlat * nlon],
        ));
    }
    if time.len() != nsamples {
        return Err(SwtError::shape_mismatch(
            "time axis vs samples",
            &[time.len()],
            &[nsamples],
        ));
    }
    if options.n_clusters == 0 || nsamples < options.n_clusters {
        return Err(SwtError::InsufficientData {
            requested: options.n_clusters,
            samples: nsamples,
        });
    }

    let rng = Isaac64Rng::seed_from_u64(options.seed);
    let dataset = DatasetBase::from(features.clone());
    let fitted = KMeans::params_with_rng(options.n_clusters, rng)
        .max_n_iterations(options.max_iterations)
        .tolerance(options.tolerance)
        .fit(&dataset)
        .map_err(|e| SwtError::Cluster(e.to_string()))?;

    let raw_labels: Array1<usize> = fitted.predict(features);
    let centroids = fitted.centroids();

    // Reshape each centroid row back into 2-D wind component fields.
    let mut centroids_u = Array3::zeros((options.n_clusters, nlat, nlon));
    let mut centroids_v = Array3::zeros((options.n_clusters, nlat, nlon));
    for (ic, row) in centroids.outer_iter().enumerate() {
        let (cu, cv) = stack::unstack(row, nlat, nlon)?;
        centroids_u.index_axis_mut(Axis(0), ic).assign(&cu);
        centroids_v.index_axis_mut(Axis(0), ic).assign(&cv);
    }

    let labels = raw_labels.mapv(|label| label as u32 + 1);

    let inertia = inertia(features, centroids, &raw_labels);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.n_jobs)
        .build()
        .map_err(|e| SwtError::Cluster(e.to_string()))?;
    let silhouette =
        pool.install(|| silhouette_score(features, &raw_labels, options.n_clusters));

    Ok(ClusterModel {
        centroids_u,
        centroids_v,
        labels,
        inertia,
        silhouette,
        latitude: latitude.clone(),
        longitude: longitude.clone(),
        time: time.clone(),
    })
}

/// Convenience wrapper: stack a wind-field series and cluster it.
pub fn cluster_series(
    series: &WindFieldSeries,
    options: &ClusterOptions,
) -> Result<ClusterModel, SwtError> {
    let features = stack::stack(&series.u, &series.v)?;
    cluster(
        &features,
        &series.latitude,
        &series.longitude,
        &series.time,
        options,
    )
}

/// Sum of squared distances from each sample to its assigned centroid.
pub fn inertia(features: &Array2<f64>, centroids: &Array2<f64>, labels: &Array1<usize>) -> f64 {
    features
        .outer_iter()
        .zip(labels.iter())
        .map(|(row, &label)| squared_distance(row, centroids.row(label)))
        .sum()
}

/// Mean silhouette coefficient over all samples, Euclidean distances.
///
/// Samples in singleton clusters score 0, as does a run with fewer than two
/// clusters, where separation is undefined.
pub fn silhouette_score(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    n_clusters: usize,
) -> f64 {
    let nsamples = features.nrows();
    if n_clusters < 2 || nsamples == 0 {
        return 0.0;
    }

    let mut counts = vec![0usize; n_clusters];
    for &label in labels.iter() {
        counts[label] += 1;
    }

    let total: f64 = (0..nsamples)
        .into_par_iter()
        .map(|i| {
            let own = labels[i];
            if counts[own] <= 1 {
                return 0.0;
            }
            // Distance sums to every cluster, accumulated in one sweep.
            let mut sums = vec![0.0; n_clusters];
            for j in 0..nsamples {
                if j == i {
                    continue;
                }
                sums[labels[j]] += euclidean_distance(features.row(i), features.row(j));
            }
            let a = sums[own] / (counts[own] - 1) as f64;
            let b = (0..n_clusters)
                .filter(|&c| c != own && counts[c] > 0)
                .map(|c| sums[c] / counts[c] as f64)
                .fold(f64::INFINITY, f64::min);
            if !b.is_finite() {
                return 0.0;
            }
            let denom = a.max(b);
            if denom == 0.0 {
                0.0
            } else {
                (b - a) / denom
            }
        })
        .sum();

    total / nsamples as f64
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    squared_distance(a, b).sqrt()
}
