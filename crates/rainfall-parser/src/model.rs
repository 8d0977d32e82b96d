use polars::prelude::*;

pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const TIME_COLUMN: &str = "time";
pub const VALUE_COLUMN: &str = "value";

/// Columns every observation file must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    LONGITUDE_COLUMN,
    LATITUDE_COLUMN,
    TIME_COLUMN,
    VALUE_COLUMN,
];

pub fn timestamp_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Microseconds, None)
}

/// Observations loaded from a rainfall CSV.
///
/// The frame always holds `latitude` and `longitude` as `f64`, `time` as a naive-UTC
/// microsecond datetime, and one nullable `f64` column per value column (in header order,
/// `value` included). Non-numeric extra columns never make it into the frame.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    df: DataFrame,
    value_columns: Vec<String>,
}

impl ObservationTable {
    pub(crate) fn new(df: DataFrame, value_columns: Vec<String>) -> Self {
        Self { df, value_columns }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }
}
