use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Parsed command line: one of the two operating modes.
#[derive(Debug, Clone)]
pub enum Config {
    Cluster(ClusterConfig),
    Assign(AssignConfig),
}

/// Settings for the offline clustering phase.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Root of the reanalysis archive.
    pub archive_path: PathBuf,
    pub u_variable: String,
    pub v_variable: String,
    /// First month of training data, YYYY-MM.
    pub date_start: String,
    /// Last month of training data, YYYY-MM (inclusive).
    pub date_end: String,
    /// UTC hour of the daily sample.
    pub utc_hour: usize,
    pub lat_bounds: (f64, f64),
    pub lon_bounds: (f64, f64),
    /// Keep every n-th grid point.
    pub coarsen: usize,
    /// Pressure level for 4-D variables, hPa.
    pub pressure_level: Option<f64>,
    pub n_clusters: usize,
    pub n_jobs: usize,
    pub seed: u64,
    pub output_path: PathBuf,
    pub quiet: bool,
}

/// Settings for the online assignment phase.
#[derive(Debug, Clone)]
pub struct AssignConfig {
    /// Persisted cluster model file.
    pub model_path: PathBuf,
    /// NetCDF file holding the wind field to classify.
    pub input_path: PathBuf,
    pub u_variable: String,
    pub v_variable: String,
    pub lat_name: String,
    pub lon_name: String,
    pub quiet: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn from_args() -> Result<Self, String> {
        let matches = Self::command().try_get_matches().map_err(|e| e.to_string())?;
        match matches.subcommand() {
            Some(("cluster", sub)) => Ok(Config::Cluster(ClusterConfig::from_matches(sub)?)),
            Some(("assign", sub)) => Ok(Config::Assign(AssignConfig::from_matches(sub)?)),
            _ => Err("expected a subcommand: cluster or assign".to_string()),
        }
    }

    fn command() -> Command {
        Command::new("swt_rust")
            .version("0.1.0")
            .about("Synoptic weather type clustering and assignment")
            .subcommand_required(true)
            .subcommand(
                Command::new("cluster")
                    .about("Cluster an archive of daily wind fields into synoptic types")
                    .arg(
                        Arg::new("archive-path")
                            .short('i')
                            .long("archive-path")
                            .value_name("PATH")
                            .help("Root directory of the reanalysis archive")
                            .required(true),
                    )
                    .arg(
                        Arg::new("u-variable")
                            .long("u-variable")
                            .value_name("NAME")
                            .help("Zonal wind variable name")
                            .default_value("u"),
                    )
                    .arg(
                        Arg::new("v-variable")
                            .long("v-variable")
                            .value_name("NAME")
                            .help("Meridional wind variable name")
                            .default_value("v"),
                    )
                    .arg(
                        Arg::new("date-start")
                            .short('s')
                            .long("date-start")
                            .value_name("YYYY-MM")
                            .help("First month of training data")
                            .required(true),
                    )
                    .arg(
                        Arg::new("date-end")
                            .short('e')
                            .long("date-end")
                            .value_name("YYYY-MM")
                            .help("Last month of training data (inclusive)")
                            .required(true),
                    )
                    .arg(
                        Arg::new("utc-hour")
                            .long("utc-hour")
                            .value_name("HOUR")
                            .help("UTC hour of the daily sample")
                            .default_value("0"),
                    )
                    .arg(
                        Arg::new("lat-min")
                            .long("lat-min")
                            .value_name("DEGREES")
                            .help("Southern latitude bound")
                            .required(true),
                    )
                    .arg(
                        Arg::new("lat-max")
                            .long("lat-max")
                            .value_name("DEGREES")
                            .help("Northern latitude bound")
                            .required(true),
                    )
                    .arg(
                        Arg::new("lon-min")
                            .long("lon-min")
                            .value_name("DEGREES")
                            .help("Western longitude bound")
                            .required(true),
                    )
                    .arg(
                        Arg::new("lon-max")
                            .long("lon-max")
                            .value_name("DEGREES")
                            .help("Eastern longitude bound")
                            .required(true),
                    )
                    .arg(
                        Arg::new("coarsen")
                            .long("coarsen")
                            .value_name("FACTOR")
                            .help("Keep every n-th grid point")
                            .default_value("1"),
                    )
                    .arg(
                        Arg::new("pressure-level")
                            .short('p')
                            .long("pressure-level")
                            .value_name("HPA")
                            .help("Pressure level for 4-D variables"),
                    )
                    .arg(
                        Arg::new("n-clusters")
                            .short('n')
                            .long("n-clusters")
                            .value_name("COUNT")
                            .help("Number of synoptic types to form")
                            .default_value("30"),
                    )
                    .arg(
                        Arg::new("n-jobs")
                            .short('j')
                            .long("n-jobs")
                            .value_name("COUNT")
                            .help("Worker threads for quality metrics (0 = all cores)")
                            .default_value("1"),
                    )
                    .arg(
                        Arg::new("seed")
                            .long("seed")
                            .value_name("SEED")
                            .help("RNG seed for centroid initialisation")
                            .default_value("0"),
                    )
                    .arg(
                        Arg::new("output")
                            .short('o')
                            .long("output")
                            .value_name("FILE")
                            .help("Output model file")
                            .default_value("swt_data.nc"),
                    )
                    .arg(
                        Arg::new("quiet")
                            .short('q')
                            .long("quiet")
                            .help("Suppress progress and summary output")
                            .action(ArgAction::SetTrue),
                    ),
            )
            .subcommand(
                Command::new("assign")
                    .about("Assign a wind field to its nearest synoptic type")
                    .arg(
                        Arg::new("model")
                            .short('m')
                            .long("model")
                            .value_name("FILE")
                            .help("Persisted cluster model file")
                            .required(true),
                    )
                    .arg(
                        Arg::new("input")
                            .short('i')
                            .long("input")
                            .value_name("FILE")
                            .help("NetCDF file holding the wind field to classify")
                            .required(true),
                    )
                    .arg(
                        Arg::new("u-variable")
                            .long("u-variable")
                            .value_name("NAME")
                            .help("Zonal wind variable name")
                            .default_value("u"),
                    )
                    .arg(
                        Arg::new("v-variable")
                            .long("v-variable")
                            .value_name("NAME")
                            .help("Meridional wind variable name")
                            .default_value("v"),
                    )
                    .arg(
                        Arg::new("lat-name")
                            .long("lat-name")
                            .value_name("NAME")
                            .help("Latitude coordinate name in the input file")
                            .default_value("latitude"),
                    )
                    .arg(
                        Arg::new("lon-name")
                            .long("lon-name")
                            .value_name("NAME")
                            .help("Longitude coordinate name in the input file")
                            .default_value("longitude"),
                    )
                    .arg(
                        Arg::new("quiet")
                            .short('q')
                            .long("quiet")
                            .help("Print only the cluster id")
                            .action(ArgAction::SetTrue),
                    ),
            )
    }
}

impl ClusterConfig {
    fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let utc_hour: usize = parse_arg(matches, "utc-hour", "Invalid UTC hour")?;
        let lat_min: f64 = parse_arg(matches, "lat-min", "Invalid latitude bound")?;
        let lat_max: f64 = parse_arg(matches, "lat-max", "Invalid latitude bound")?;
        let lon_min: f64 = parse_arg(matches, "lon-min", "Invalid longitude bound")?;
        let lon_max: f64 = parse_arg(matches, "lon-max", "Invalid longitude bound")?;
        let coarsen: usize = parse_arg(matches, "coarsen", "Invalid coarsening factor")?;
        let n_clusters: usize = parse_arg(matches, "n-clusters", "Invalid cluster count")?;
        let n_jobs: usize = parse_arg(matches, "n-jobs", "Invalid worker count")?;
        let seed: u64 = parse_arg(matches, "seed", "Invalid seed")?;

        let pressure_level = match matches.get_one::<String>("pressure-level") {
            Some(value) => Some(
                value
                    .parse::<f64>()
                    .map_err(|_| "Invalid pressure level".to_string())?,
            ),
            None => None,
        };

        let config = Self {
            archive_path: PathBuf::from(required_arg(matches, "archive-path")?),
            u_variable: required_arg(matches, "u-variable")?,
            v_variable: required_arg(matches, "v-variable")?,
            date_start: required_arg(matches, "date-start")?,
            date_end: required_arg(matches, "date-end")?,
            utc_hour,
            lat_bounds: (lat_min, lat_max),
            lon_bounds: (lon_min, lon_max),
            coarsen,
            pressure_level,
            n_clusters,
            n_jobs,
            seed,
            output_path: PathBuf::from(required_arg(matches, "output")?),
            quiet: matches.get_flag("quiet"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.utc_hour >= 24 {
            return Err("UTC hour must be between 0 and 23".to_string());
        }
        if self.lat_bounds.0 < -90.0
            || self.lat_bounds.0 > 90.0
            || self.lat_bounds.1 < -90.0
            || self.lat_bounds.1 > 90.0
        {
            return Err("Latitude bounds must be between -90 and 90 degrees".to_string());
        }
        if self.n_clusters == 0 {
            return Err("Cluster count must be at least 1".to_string());
        }
        if self.coarsen == 0 {
            return Err("Coarsening factor must be at least 1".to_string());
        }
        if !self.archive_path.is_dir() {
            return Err(format!(
                "Archive path is not a directory: {}",
                self.archive_path.display()
            ));
        }
        Ok(())
    }
}

impl AssignConfig {
    fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let config = Self {
            model_path: PathBuf::from(required_arg(matches, "model")?),
            input_path: PathBuf::from(required_arg(matches, "input")?),
            u_variable: required_arg(matches, "u-variable")?,
            v_variable: required_arg(matches, "v-variable")?,
            lat_name: required_arg(matches, "lat-name")?,
            lon_name: required_arg(matches, "lon-name")?,
            quiet: matches.get_flag("quiet"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if !self.model_path.is_file() {
            return Err(format!(
                "Model file does not exist: {}",
                self.model_path.display()
            ));
        }
        if !self.input_path.is_file() {
            return Err(format!(
                "Input file does not exist: {}",
                self.input_path.display()
            ));
        }
        Ok(())
    }
}

fn required_arg(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {name}"))
}

fn parse_arg<T: std::str::FromStr>(
    matches: &ArgMatches,
    name: &str,
    message: &str,
) -> Result<T, String> {
    required_arg(matches, name)?
        .parse()
        .map_err(|_| message.to_string())
}
