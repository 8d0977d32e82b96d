use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};
use polars::prelude::*;
use rainfall_parser::{naive_to_micros, timestamp_dtype, TIME_COLUMN};
use serde_json::json;

use crate::aggregate::{format_float, format_time, ResampledTable};
use crate::error::{ResampleError, Result};

pub const CRS_EPSG_4326: &str = "EPSG:4326";
const CRS_URN_EPSG_4326: &str = "urn:ogc:def:crs:EPSG::4326";
pub const LAT_LONG_COLUMN: &str = "lat_long";

/// Return shape of [`crate::resample`].
#[derive(Debug, Clone)]
pub enum ResampleOutput {
    Points(PointCollection),
    Keyed(KeyedTable),
}

impl ResampleOutput {
    pub fn as_points(&self) -> Option<&PointCollection> {
        match self {
            ResampleOutput::Points(points) => Some(points),
            ResampleOutput::Keyed(_) => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&KeyedTable> {
        match self {
            ResampleOutput::Keyed(table) => Some(table),
            ResampleOutput::Points(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResampleOutput::Points(points) => points.len(),
            ResampleOutput::Keyed(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// WGS84 point, stored in GeoJSON axis order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointGeometry {
    pub longitude: f64,
    pub latitude: f64,
}

impl PointGeometry {
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub geometry: PointGeometry,
    pub time: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// Resampled rows as located point features in EPSG:4326. Coordinates live only in the
/// geometry; the attributes are `time` plus the value columns.
#[derive(Debug, Clone)]
pub struct PointCollection {
    value_columns: Vec<String>,
    features: Vec<PointFeature>,
}

impl PointCollection {
    pub fn from_table(table: &ResampledTable) -> Result<Self> {
        let features = table
            .rows()?
            .into_iter()
            .map(|row| PointFeature {
                geometry: PointGeometry {
                    longitude: row.longitude,
                    latitude: row.latitude,
                },
                time: row.time,
                values: row.values,
            })
            .collect();

        Ok(Self {
            value_columns: table.value_columns().to_vec(),
            features,
        })
    }

    pub fn crs(&self) -> &'static str {
        CRS_EPSG_4326
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        std::iter::once(TIME_COLUMN)
            .chain(self.value_columns.iter().map(String::as_str))
            .collect()
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    pub fn features(&self) -> &[PointFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|feature| {
                let mut properties = JsonObject::new();
                properties.insert(TIME_COLUMN.to_string(), json!(format_time(feature.time)));
                for (name, value) in self.value_columns.iter().zip(&feature.values) {
                    properties.insert(name.clone(), json!(value));
                }
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(GeoJsonValue::Point(
                        feature.geometry.coordinates().to_vec(),
                    ))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert(
            "crs".to_string(),
            json!({ "type": "name", "properties": { "name": CRS_URN_EPSG_4326 } }),
        );

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson())?)
    }
}

/// Composite `(latitude, longitude)` key of the tabular output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.latitude
            .total_cmp(&other.latitude)
            .then_with(|| self.longitude.total_cmp(&other.longitude))
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRow {
    pub key: LatLon,
    pub time: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// Resampled rows indexed by `(lat_long, time)`, ascending on the pair and then on time.
#[derive(Debug, Clone)]
pub struct KeyedTable {
    value_columns: Vec<String>,
    rows: Vec<KeyedRow>,
}

impl KeyedTable {
    pub fn from_table(table: &ResampledTable) -> Result<Self> {
        let mut rows: Vec<KeyedRow> = table
            .rows()?
            .into_iter()
            .map(|row| KeyedRow {
                key: LatLon::new(row.latitude, row.longitude),
                time: row.time,
                values: row.values,
            })
            .collect();
        rows.sort_by(|a, b| a.key.total_cmp(&b.key).then_with(|| a.time.cmp(&b.time)));

        Ok(Self {
            value_columns: table.value_columns().to_vec(),
            rows,
        })
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    pub fn rows(&self) -> &[KeyedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct keys in table order.
    pub fn keys(&self) -> Vec<LatLon> {
        let mut keys: Vec<LatLon> = Vec::new();
        for row in &self.rows {
            if keys.last().map_or(true, |last| *last != row.key) {
                keys.push(row.key);
            }
        }
        keys
    }

    /// Time series recorded at one location.
    pub fn series(&self, key: LatLon) -> impl Iterator<Item = &KeyedRow> + '_ {
        self.rows.iter().filter(move |row| row.key == key)
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let keys: Vec<String> = self.rows.iter().map(|row| row.key.to_string()).collect();
        let times: Vec<i64> = self.rows.iter().map(|row| naive_to_micros(row.time)).collect();

        let mut columns: Vec<Column> = vec![
            Series::new(LAT_LONG_COLUMN.into(), keys).into(),
            Series::new(TIME_COLUMN.into(), times)
                .cast(&timestamp_dtype())?
                .into(),
        ];
        for (idx, name) in self.value_columns.iter().enumerate() {
            let values: Vec<Option<f64>> = self.rows.iter().map(|row| row.values[idx]).collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }

    /// CSV rendering with `lat_long,time,<value columns>` header.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        {
            let mut csv_writer = csv::Writer::from_writer(&mut buffer);

            let mut header = vec![LAT_LONG_COLUMN.to_string(), TIME_COLUMN.to_string()];
            header.extend(self.value_columns.iter().cloned());
            csv_writer.write_record(&header)?;

            for row in &self.rows {
                let mut record = vec![row.key.to_string(), format_time(row.time)];
                record.extend(
                    row.values
                        .iter()
                        .map(|value| value.map(format_float).unwrap_or_default()),
                );
                csv_writer.write_record(&record)?;
            }
            csv_writer.flush()?;
        }
        String::from_utf8(buffer).map_err(|err| ResampleError::Processing(err.to_string()))
    }
}
