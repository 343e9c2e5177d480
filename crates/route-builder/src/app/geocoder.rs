//! Nominatim geocoding over HTTP

use eframe_entrypoints::async_runtime::spawn_detached;
use route_builder_lib::{GeocodeError, GeocodeResult, Geocoder, PendingLookup, lat_lon};
use serde::Deserialize;

/// Geocoding service configuration
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// One entry of a Nominatim `jsonv2` search response
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// [`Geocoder`] backed by a Nominatim-compatible `/search` endpoint.
///
/// Requests run on the async runtime; each completion wakes the UI so the
/// next frame's poll picks the result up.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
    ctx: egui::Context,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig, ctx: egui::Context) -> Result<Self, reqwest::Error> {
        let builder = reqwest::Client::builder();
        // Browsers set the user agent themselves and have no per-client timeout
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.timeout_secs));

        Ok(Self {
            client: builder.build()?,
            search_url: search_endpoint(&config.base_url),
            ctx,
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn lookup(&self, query: &str) -> PendingLookup {
        let (resolver, pending) = PendingLookup::channel();
        let client = self.client.clone();
        let ctx = self.ctx.clone();
        let url = search_url(&self.search_url, query);
        let query = query.to_owned();

        let spawned = spawn_detached(async move {
            let result = match url {
                Ok(url) => search(&client, url).await,
                Err(e) => Err(e),
            };
            match &result {
                Ok(Some(point)) => {
                    tracing::debug!(%query, lat = point.y(), lon = point.x(), "Geocoded")
                }
                Ok(None) => tracing::debug!(%query, "No geocoding match"),
                Err(e) => tracing::warn!(%query, "Geocoding request failed: {}", e),
            }
            resolver.resolve(result);
            ctx.request_repaint();
        });
        if !spawned {
            tracing::error!("Geocoding task could not be started");
        }

        pending
    }
}

/// Stands in when the HTTP client cannot be built; every lookup fails
pub struct UnavailableGeocoder {
    pub reason: String,
}

impl Geocoder for UnavailableGeocoder {
    fn lookup(&self, _query: &str) -> PendingLookup {
        PendingLookup::ready(Err(GeocodeError::Request(self.reason.clone())))
    }
}

fn search_endpoint(base_url: &str) -> String {
    format!("{}/search", base_url.trim_end_matches('/'))
}

fn search_url(endpoint: &str, query: &str) -> Result<reqwest::Url, GeocodeError> {
    reqwest::Url::parse_with_params(
        endpoint,
        &[("format", "jsonv2"), ("limit", "1"), ("q", query)],
    )
    .map_err(|e| GeocodeError::Request(e.to_string()))
}

async fn search(client: &reqwest::Client, url: reqwest::Url) -> GeocodeResult {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| GeocodeError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GeocodeError::Status(status.as_u16()));
    }

    let places: Vec<Place> = response
        .json()
        .await
        .map_err(|e| GeocodeError::Decode(e.to_string()))?;
    first_place(places)
}

/// First place of a `jsonv2` response; an empty array is not found
fn first_place(places: Vec<Place>) -> GeocodeResult {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    let lat: f64 = place
        .lat
        .parse()
        .map_err(|_| GeocodeError::Decode(format!("bad latitude {:?}", place.lat)))?;
    let lon: f64 = place
        .lon
        .parse()
        .map_err(|_| GeocodeError::Decode(format!("bad longitude {:?}", place.lon)))?;

    tracing::trace!(name = place.display_name.as_deref(), lat, lon, "Place matched");
    Ok(Some(lat_lon(lat, lon)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_places(body: &str) -> GeocodeResult {
        first_place(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn test_parse_first_place() {
        let body = r#"[
            {"place_id": 1, "lat": "55.7505412", "lon": "37.6174782", "display_name": "Moscow, Russia"},
            {"place_id": 2, "lat": "46.7323875", "lon": "-117.0001651", "display_name": "Moscow, Idaho"}
        ]"#;

        assert_eq!(parse_places(body), Ok(Some(lat_lon(55.7505412, 37.6174782))));
    }

    #[test]
    fn test_parse_empty_is_not_found() {
        assert_eq!(parse_places("[]"), Ok(None));
    }

    #[test]
    fn test_bad_coordinates_are_decode_errors() {
        assert!(matches!(
            parse_places(r#"[{"lat": "north", "lon": "1.0"}]"#),
            Err(GeocodeError::Decode(_))
        ));
    }

    #[test]
    fn test_search_url() {
        let endpoint = search_endpoint("https://nominatim.openstreetmap.org/");
        assert_eq!(endpoint, "https://nominatim.openstreetmap.org/search");

        let url = search_url(&endpoint, "Saint Petersburg & co").unwrap();
        assert_eq!(
            url.as_str(),
            "https://nominatim.openstreetmap.org/search?format=jsonv2&limit=1&q=Saint+Petersburg+%26+co"
        );
    }

    #[test]
    fn test_unavailable_geocoder_fails() {
        let geocoder = UnavailableGeocoder {
            reason: "no TLS backend".to_owned(),
        };
        let mut pending = geocoder.lookup("Moscow");
        assert_eq!(
            pending.try_take(),
            Some(Err(GeocodeError::Request("no TLS backend".to_owned())))
        );
    }
}
