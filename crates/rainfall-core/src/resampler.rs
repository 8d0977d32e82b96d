use std::path::Path;

use rainfall_parser::read_observations;
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::error::Result;
use crate::options::ResampleOptions;
use crate::outputs::{KeyedTable, PointCollection, ResampleOutput};
use crate::resolution::Resolution;

/// Loads `source`, averages it per location and calendar bucket, optionally persists the
/// flattened table, and returns either point features or the keyed table.
pub fn resample(source: impl AsRef<Path>, options: &ResampleOptions) -> Result<ResampleOutput> {
    let source = source.as_ref();
    info!(
        source = %source.display(),
        resolution = %options.resolution,
        label = %options.label,
        "resampling rainfall observations"
    );

    let observations = read_observations(source)?;
    debug!(columns = ?observations.value_columns(), "averaging value columns");

    let resampled = aggregate(&observations, options.resolution, options.label)?;
    info!(
        input_rows = observations.height(),
        output_rows = resampled.height(),
        "aggregated observations"
    );

    if let Some(destination) = &options.destination {
        resampled.write_csv(destination)?;
        info!(destination = %destination.display(), "wrote resampled table");
    }

    if options.geo_output {
        Ok(ResampleOutput::Points(PointCollection::from_table(&resampled)?))
    } else {
        Ok(ResampleOutput::Keyed(KeyedTable::from_table(&resampled)?))
    }
}

/// Positional form of [`resample`] taking the resolution as its code.
pub fn resample_with(
    source: impl AsRef<Path>,
    resolution: &str,
    destination: Option<&Path>,
    geo_output: bool,
) -> Result<ResampleOutput> {
    let mut options = ResampleOptions::default()
        .with_resolution(resolution.parse::<Resolution>()?)
        .with_geo_output(geo_output);
    if let Some(destination) = destination {
        options = options.with_destination(destination);
    }
    resample(source, &options)
}
