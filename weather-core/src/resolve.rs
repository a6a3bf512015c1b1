use std::time::Duration;

use tracing::{debug, info};

use crate::{
    error::LookupError,
    fetch::bounded,
    model::{Coordinate, LocationQuery},
    provider::{Geocoder, Upstream},
};

/// Turn a location query into the coordinate the forecast is fetched for.
///
/// Coordinates pass through as given. A city name is searched with the
/// forward geocoder and the first candidate wins.
pub async fn resolve_location(
    query: &LocationQuery,
    geocoder: &dyn Geocoder,
    timeout: Duration,
) -> Result<Coordinate, LookupError> {
    match query {
        LocationQuery::Coordinates(coordinate) => Ok(coordinate.clone()),
        LocationQuery::City(city) => {
            let matches = bounded(Upstream::ForwardGeocode, timeout, geocoder.search(city)).await?;

            let first = matches
                .first()
                .ok_or_else(|| LookupError::LocationNotFound(city.clone()))?;

            let coordinate = first.coordinate();
            info!(%city, %coordinate, "resolved city");
            debug!(candidates = matches.len(), "forward geocode candidates");
            Ok(coordinate)
        }
    }
}
