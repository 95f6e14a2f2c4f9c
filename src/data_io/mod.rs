pub mod archive;
pub mod reader;

pub use archive::{load_model, save_model};
pub use reader::{
    read_wind_field, ConsoleProgress, Era5Reader, ProgressReporter, SeriesRequest,
    SilentProgress, VariableSeries,
};
