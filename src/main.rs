use swt_rust::assign::classify;
use swt_rust::cluster::{cluster_series, ClusterOptions};
use swt_rust::config::{AssignConfig, ClusterConfig, Config};
use swt_rust::data_io::archive::{load_model, save_model};
use swt_rust::data_io::reader::{
    read_wind_field, ConsoleProgress, Era5Reader, ProgressReporter, SeriesRequest, SilentProgress,
};
use swt_rust::error::SwtError;
use swt_rust::labels::SwtCatalog;
use swt_rust::regrid::regrid;
use swt_rust::time_utils::datetime_from_hours;

fn main() {
    let config = match Config::from_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    let result = match config {
        Config::Cluster(config) => run_cluster(&config),
        Config::Assign(config) => run_assign(&config),
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run_cluster(config: &ClusterConfig) -> Result<(), SwtError> {
    let progress: Box<dyn ProgressReporter> = if config.quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(ConsoleProgress)
    };
    let reader = Era5Reader::with_progress(&config.archive_path, progress);

    let u_request = series_request(config, &config.u_variable);
    let v_request = series_request(config, &config.v_variable);
    let series = reader.read_wind_series(&u_request, &v_request)?;

    let options = ClusterOptions {
        n_clusters: config.n_clusters,
        n_jobs: config.n_jobs,
        seed: config.seed,
        ..ClusterOptions::default()
    };
    let model = cluster_series(&series, &options)?;
    save_model(&model, &config.output_path)?;

    if !config.quiet {
        println!(
            "Clustered {} daily fields into {} synoptic types",
            series.len(),
            model.n_clusters()
        );
        if let (Some(&first), Some(&last)) = (series.time.first(), series.time.last()) {
            if let (Some(start), Some(end)) =
                (datetime_from_hours(first), datetime_from_hours(last))
            {
                println!(
                    "Training period: {} to {}",
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                );
            }
        }
        println!("Inertia: {:.3}", model.inertia);
        println!("Silhouette score: {:.3}", model.silhouette);
        println!("Saved model to {}", config.output_path.display());
    }
    Ok(())
}

fn run_assign(config: &AssignConfig) -> Result<(), SwtError> {
    let model = load_model(&config.model_path)?;
    let field = read_wind_field(
        &config.input_path,
        &config.u_variable,
        &config.v_variable,
        &config.lat_name,
        &config.lon_name,
    )?;

    // The assigner demands an exact grid match; regrid whenever the input
    // grid differs from the stored cluster grid.
    let field = if field.latitude == model.latitude && field.longitude == model.longitude {
        field
    } else {
        regrid(&field, &model.latitude, &model.longitude)?
    };

    let catalog = SwtCatalog::australian_850();
    let assignment = classify(&field, &model, &catalog)?;

    if config.quiet {
        println!("{}", assignment.cluster_id);
    } else {
        match assignment.label {
            Some(label) => {
                println!("Synoptic Weather Type: {}-{}", label.regime, label.subtype)
            }
            None => println!("Synoptic Weather Type: unlabelled"),
        }
        println!("Cluster ID: {}", assignment.cluster_id);
    }
    Ok(())
}

fn series_request(config: &ClusterConfig, variable: &str) -> SeriesRequest {
    SeriesRequest {
        variable: variable.to_string(),
        variable_dir: None,
        date_start: config.date_start.clone(),
        date_end: config.date_end.clone(),
        utc_hour: config.utc_hour,
        lat_bounds: config.lat_bounds,
        lon_bounds: config.lon_bounds,
        coarsen: config.coarsen,
        pressure_level: config.pressure_level,
    }
}
