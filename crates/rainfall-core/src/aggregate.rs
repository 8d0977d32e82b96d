use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use polars::prelude::*;
use rainfall_parser::{
    micros_to_naive, naive_to_micros, timestamp_dtype, ObservationTable, LATITUDE_COLUMN,
    LONGITUDE_COLUMN, TIME_COLUMN,
};

use crate::error::{ResampleError, Result};
use crate::resolution::{BucketLabel, Resolution};

/// One flattened output row: the group key and the mean of each value column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub time: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// Group means keyed by (`latitude`, `longitude`, bucketed `time`), sorted by that key.
#[derive(Debug, Clone)]
pub struct ResampledTable {
    df: DataFrame,
    value_columns: Vec<String>,
}

/// Buckets every observation at `resolution` and averages each value column per
/// (latitude, longitude, bucket). Buckets without observations do not appear.
pub fn aggregate(
    observations: &ObservationTable,
    resolution: Resolution,
    label: BucketLabel,
) -> Result<ResampledTable> {
    let frame = observations.frame();
    let times = frame.column(TIME_COLUMN)?.datetime()?;

    let mut buckets = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        let dt = times
            .get(idx)
            .and_then(micros_to_naive)
            .ok_or_else(|| ResampleError::Processing(format!("row {idx} has no usable time")))?;
        let bucket = label.label(resolution, dt).ok_or_else(|| {
            ResampleError::Processing(format!(
                "row {idx} at {dt} has no {label} label at resolution {resolution}"
            ))
        })?;
        buckets.push(naive_to_micros(bucket));
    }
    let bucket_series = Series::new(TIME_COLUMN.into(), buckets).cast(&timestamp_dtype())?;

    let value_columns = observations.value_columns().to_vec();
    let mut columns: Vec<Column> = vec![
        frame.column(LATITUDE_COLUMN)?.clone(),
        frame.column(LONGITUDE_COLUMN)?.clone(),
        bucket_series.into(),
    ];
    for name in &value_columns {
        columns.push(frame.column(name)?.clone());
    }
    let bucketed = DataFrame::new(columns)?;

    let means: Vec<Expr> = value_columns
        .iter()
        .map(|name| col(name.as_str()).mean())
        .collect();

    let df = bucketed
        .lazy()
        .group_by([col(LATITUDE_COLUMN), col(LONGITUDE_COLUMN), col(TIME_COLUMN)])
        .agg(means)
        .sort(
            [LATITUDE_COLUMN, LONGITUDE_COLUMN, TIME_COLUMN],
            SortMultipleOptions::default(),
        )
        .collect()?;

    Ok(ResampledTable { df, value_columns })
}

impl ResampledTable {
    pub fn frame(&self) -> &DataFrame {
        &self.df
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

    pub fn rows(&self) -> Result<Vec<ResampledRecord>> {
        let lat = self.df.column(LATITUDE_COLUMN)?.f64()?;
        let lon = self.df.column(LONGITUDE_COLUMN)?.f64()?;
        let time = self.df.column(TIME_COLUMN)?.datetime()?;
        let values = self
            .value_columns
            .iter()
            .map(|name| self.df.column(name).and_then(|column| column.f64()))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            let (Some(latitude), Some(longitude), Some(micros)) =
                (lat.get(idx), lon.get(idx), time.get(idx))
            else {
                return Err(ResampleError::Processing(format!(
                    "resampled row {idx} is missing its group key"
                )));
            };
            let time = micros_to_naive(micros).ok_or_else(|| {
                ResampleError::Processing(format!("resampled row {idx} has time out of range"))
            })?;
            rows.push(ResampledRecord {
                latitude,
                longitude,
                time,
                values: values.iter().map(|column| column.get(idx)).collect(),
            });
        }
        Ok(rows)
    }

    /// Writes the table with a leading row index column. A failed write leaves whatever was
    /// already written in place; open and write failures both carry `path`.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file_access = |source| ResampleError::FileAccess {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(file_access)?;
        self.write_csv_to(file).map_err(|err| match err {
            ResampleError::Io(source) => file_access(source),
            ResampleError::Csv(source) if source.is_io_error() => match source.into_kind() {
                csv::ErrorKind::Io(source) => file_access(source),
                other => ResampleError::Processing(format!("csv write failed: {other:?}")),
            },
            other => other,
        })
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec![
            String::new(),
            LATITUDE_COLUMN.to_string(),
            LONGITUDE_COLUMN.to_string(),
            TIME_COLUMN.to_string(),
        ];
        header.extend(self.value_columns.iter().cloned());
        csv_writer.write_record(&header)?;

        for (idx, row) in self.rows()?.into_iter().enumerate() {
            let mut record = vec![
                idx.to_string(),
                format_float(row.latitude),
                format_float(row.longitude),
                format_time(row.time),
            ];
            record.extend(
                row.values
                    .iter()
                    .map(|value| value.map(format_float).unwrap_or_default()),
            );
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| ResampleError::Processing(err.to_string()))
    }
}

pub(crate) fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Bucket labels fall on midnight, so only the date is written unless a time is present.
pub(crate) fn format_time(time: NaiveDateTime) -> String {
    if time.time() == NaiveTime::MIN {
        time.format("%Y-%m-%d").to_string()
    } else {
        time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
