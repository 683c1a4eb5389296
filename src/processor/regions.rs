use crate::db::store::Store;
use crate::error::PipelineError;
use tracing::debug;

/// Names of every region whose bounding box contains the point, edges included.
pub async fn regions_for(
    store: &dyn Store,
    latitude: f64,
    longitude: f64,
) -> Result<Vec<String>, PipelineError> {
    let regions = store.regions_containing(latitude, longitude).await?;
    debug!(
        "({}, {}) falls in {} region(s)",
        latitude,
        longitude,
        regions.len()
    );
    Ok(regions.into_iter().map(|r| r.region_name).collect())
}
