use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use polars::prelude::*;
use tracing::debug;

use crate::errors::ParserError;
use crate::model::{
    timestamp_dtype, ObservationTable, LATITUDE_COLUMN, LONGITUDE_COLUMN, REQUIRED_COLUMNS,
    TIME_COLUMN, VALUE_COLUMN,
};
use crate::timestamp::{naive_to_micros, parse_timestamp};

/// Reads an observation CSV from disk.
pub fn read_observations(path: impl AsRef<Path>) -> Result<ObservationTable, ParserError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ParserError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "reading observations");
    parse_observations(file)
}

/// Reads an observation CSV from any byte source.
///
/// Columns with an empty header name are treated as a written row index and skipped, so
/// resampled output written back to CSV loads cleanly. Rows missing a latitude or longitude
/// are dropped, since they can never form a location group.
pub fn parse_observations<R: Read>(reader: R) -> Result<ObservationTable, ParserError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let layout = ColumnLayout::from_headers(&headers)?;
    let mut columns = ObservationColumns::new(&layout);

    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        columns.push(&layout, &record, idx + 1)?;
    }

    columns.finish()
}

struct ColumnLayout {
    latitude: usize,
    longitude: usize,
    time: usize,
    values: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self, ParserError> {
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ParserError::MissingColumn { column });
            }
        }

        let position = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(ParserError::MissingColumn { column: name })
        };

        let values = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                !name.is_empty()
                    && name.as_str() != LATITUDE_COLUMN
                    && name.as_str() != LONGITUDE_COLUMN
                    && name.as_str() != TIME_COLUMN
            })
            .map(|(idx, name)| (idx, name.clone()))
            .collect();

        Ok(Self {
            latitude: position(LATITUDE_COLUMN)?,
            longitude: position(LONGITUDE_COLUMN)?,
            time: position(TIME_COLUMN)?,
            values,
        })
    }
}

struct ValueAccumulator {
    name: String,
    required: bool,
    numeric: bool,
    values: Vec<Option<f64>>,
}

struct ObservationColumns {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    time: Vec<i64>,
    values: Vec<ValueAccumulator>,
}

impl ObservationColumns {
    fn new(layout: &ColumnLayout) -> Self {
        Self {
            latitude: Vec::new(),
            longitude: Vec::new(),
            time: Vec::new(),
            values: layout
                .values
                .iter()
                .map(|(_, name)| ValueAccumulator {
                    name: name.clone(),
                    required: name == VALUE_COLUMN,
                    numeric: true,
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    fn push(
        &mut self,
        layout: &ColumnLayout,
        record: &StringRecord,
        line_index: usize,
    ) -> Result<(), ParserError> {
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let latitude = parse_optional_f64(cell(layout.latitude), line_index, LATITUDE_COLUMN)?;
        let longitude = parse_optional_f64(cell(layout.longitude), line_index, LONGITUDE_COLUMN)?;
        let time = naive_to_micros(parse_timestamp(cell(layout.time), line_index)?);

        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            debug!(line_index, "skipping row without coordinates");
            return Ok(());
        };
        self.latitude.push(latitude);
        self.longitude.push(longitude);
        self.time.push(time);

        for ((idx, _), acc) in layout.values.iter().zip(self.values.iter_mut()) {
            if !acc.numeric {
                continue;
            }
            match parse_optional_numeric(cell(*idx), line_index, &acc.name) {
                Ok(value) => acc.values.push(value),
                Err(err) if acc.required => return Err(err),
                Err(_) => {
                    acc.numeric = false;
                    acc.values = Vec::new();
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Result<ObservationTable, ParserError> {
        let mut columns: Vec<Column> = Vec::with_capacity(3 + self.values.len());
        columns.push(Series::new(LATITUDE_COLUMN.into(), self.latitude).into());
        columns.push(Series::new(LONGITUDE_COLUMN.into(), self.longitude).into());
        columns.push(
            Series::new(TIME_COLUMN.into(), self.time)
                .cast(&timestamp_dtype())?
                .into(),
        );

        let mut value_columns = Vec::with_capacity(self.values.len());
        for acc in self.values {
            if !acc.numeric {
                debug!(column = %acc.name, "dropping non-numeric column");
                continue;
            }
            columns.push(Series::new(acc.name.as_str().into(), acc.values).into());
            value_columns.push(acc.name);
        }

        let df = DataFrame::new(columns)?;
        Ok(ObservationTable::new(df, value_columns))
    }
}

/// Value cell parser; `True`/`False` count as 1 and 0 so boolean columns are averaged.
fn parse_optional_numeric(
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Ok(Some(1.0));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Ok(Some(0.0));
    }
    parse_optional_f64(trimmed, line_index, column)
}

pub(crate) fn parse_optional_f64(
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|err| ParserError::DataRow {
            line_index,
            message: format!("failed to parse column '{column}' as float: {err}"),
        })
}
