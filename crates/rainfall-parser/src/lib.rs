pub mod errors;
pub mod model;
mod reader;
pub mod timestamp;

pub use errors::ParserError;
pub use model::{
    timestamp_dtype, ObservationTable, LATITUDE_COLUMN, LONGITUDE_COLUMN, REQUIRED_COLUMNS,
    TIME_COLUMN, VALUE_COLUMN,
};
pub use reader::{parse_observations, read_observations};
pub use timestamp::{micros_to_naive, naive_to_micros, parse_timestamp};
