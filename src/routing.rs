//! Google Routes API client
//!
//! One call computes one route estimate for a fixed departure time,
//! optionally through an intermediate waypoint. Failures of any kind
//! (network, timeout, non-2xx, empty response) come back as a
//! [`BoardError`] value so a single bad route never takes down the tick.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::Coordinate;
use crate::error::BoardError;

const ROUTES_URL: &str = "https://routes.googleapis.com/directions/v2:computeRoutes";

// Keep the response limited to what the payload actually uses
const FIELD_MASK: &str = "routes.duration,routes.distanceMeters,routes.polyline.encodedPolyline,routes.legs.duration,routes.legs.distanceMeters";

/// Outcome of one route query, kept as a value for the assembler
pub type RouteOutcome = Result<RouteEstimate, BoardError>;

/// Successful route query result
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEstimate {
    /// Raw duration as returned upstream, e.g. `"1234s"`
    pub duration: String,
    pub distance_meters: u64,
    /// Encoded polyline of the whole route
    pub polyline: String,
    pub legs: Vec<RouteLeg>,
}

/// Per-leg duration and distance
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub duration: String,
    pub distance_meters: u64,
}

/// Compute a traffic-aware drive estimate between two coordinates,
/// optionally via an intermediate stop.
pub async fn compute_route(
    client: &reqwest::Client,
    api_key: &str,
    timeout: Duration,
    origin: Coordinate,
    destination: Coordinate,
    via: Option<Coordinate>,
    departure: DateTime<Utc>,
) -> RouteOutcome {
    let request = google::ComputeRoutesRequest::new(origin, destination, via, departure);

    tracing::debug!(
        via = via.is_some(),
        departure = %departure.to_rfc3339_opts(SecondsFormat::Secs, true),
        "Calling the routes API"
    );

    let response = client
        .post(ROUTES_URL)
        .timeout(timeout)
        .header("X-Goog-Api-Key", api_key)
        .header("X-Goog-FieldMask", FIELD_MASK)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(BoardError::api(
            format!("Route query returned {status}"),
            Some(status.as_u16()),
        ));
    }

    let body: google::ComputeRoutesResponse = response
        .json()
        .await
        .map_err(|e| BoardError::parse(format!("Malformed routes response: {e}")))?;

    body.routes
        .into_iter()
        .next()
        .map(RouteEstimate::from)
        .ok_or_else(|| BoardError::api("No routes in response", Some(status.as_u16())))
}

/// Google Routes API request and response structures
mod google {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Serialize};

    use super::{RouteEstimate, RouteLeg};
    use crate::config::Coordinate;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ComputeRoutesRequest {
        origin: Waypoint,
        destination: Waypoint,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        intermediates: Vec<Waypoint>,
        travel_mode: &'static str,
        routing_preference: &'static str,
        departure_time: String,
    }

    impl ComputeRoutesRequest {
        pub fn new(
            origin: Coordinate,
            destination: Coordinate,
            via: Option<Coordinate>,
            departure: DateTime<Utc>,
        ) -> Self {
            Self {
                origin: Waypoint::from(origin),
                destination: Waypoint::from(destination),
                intermediates: via.into_iter().map(Waypoint::from).collect(),
                travel_mode: "DRIVE",
                routing_preference: "TRAFFIC_AWARE_OPTIMAL",
                departure_time: departure.to_rfc3339_opts(SecondsFormat::Secs, true),
            }
        }
    }

    #[derive(Debug, Serialize)]
    pub struct Waypoint {
        location: Location,
    }

    #[derive(Debug, Serialize)]
    pub struct Location {
        #[serde(rename = "latLng")]
        lat_lng: LatLng,
    }

    #[derive(Debug, Serialize)]
    pub struct LatLng {
        latitude: f64,
        longitude: f64,
    }

    impl From<Coordinate> for Waypoint {
        fn from(c: Coordinate) -> Self {
            Self {
                location: Location {
                    lat_lng: LatLng {
                        latitude: c.latitude,
                        longitude: c.longitude,
                    },
                },
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ComputeRoutesResponse {
        #[serde(default)]
        pub routes: Vec<Route>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Route {
        pub duration: Option<String>,
        pub distance_meters: Option<u64>,
        pub polyline: Option<Polyline>,
        #[serde(default)]
        pub legs: Vec<Leg>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Polyline {
        pub encoded_polyline: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Leg {
        pub duration: Option<String>,
        pub distance_meters: Option<u64>,
    }

    impl From<Route> for RouteEstimate {
        fn from(route: Route) -> Self {
            Self {
                duration: route.duration.unwrap_or_default(),
                distance_meters: route.distance_meters.unwrap_or_default(),
                polyline: route
                    .polyline
                    .and_then(|p| p.encoded_polyline)
                    .unwrap_or_default(),
                legs: route
                    .legs
                    .into_iter()
                    .map(|leg| RouteLeg {
                        duration: leg.duration.unwrap_or_default(),
                        distance_meters: leg.distance_meters.unwrap_or_default(),
                    })
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_request_serialization_direct() {
        let departure = Utc.with_ymd_and_hms(2025, 3, 12, 6, 50, 0).unwrap();
        let request = google::ComputeRoutesRequest::new(
            Coordinate::new(42.171_842, -8.628_590),
            Coordinate::new(42.210_826, -8.692_426),
            None,
            departure,
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["travelMode"], "DRIVE");
        assert_eq!(json["routingPreference"], "TRAFFIC_AWARE_OPTIMAL");
        assert_eq!(json["departureTime"], "2025-03-12T06:50:00Z");
        assert_eq!(json["origin"]["location"]["latLng"]["latitude"], 42.171_842);
        // No intermediates key for the direct route
        assert!(json.get("intermediates").is_none());
    }

    #[test]
    fn test_request_serialization_with_waypoint() {
        let departure = Utc.with_ymd_and_hms(2025, 3, 12, 6, 50, 0).unwrap();
        let request = google::ComputeRoutesRequest::new(
            Coordinate::new(42.171_842, -8.628_590),
            Coordinate::new(42.210_826, -8.692_426),
            Some(Coordinate::new(42.2276, -8.7135)),
            departure,
        );
        let json = serde_json::to_value(&request).unwrap();

        let intermediates = json["intermediates"].as_array().unwrap();
        assert_eq!(intermediates.len(), 1);
        assert_eq!(
            intermediates[0]["location"]["latLng"]["longitude"],
            -8.7135
        );
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "routes": [{
                "duration": "1234s",
                "distanceMeters": 10230,
                "polyline": {"encodedPolyline": "abc{xyz"},
                "legs": [
                    {"duration": "600s", "distanceMeters": 5000},
                    {"duration": "634s", "distanceMeters": 5230}
                ]
            }]
        }"#;

        let response: google::ComputeRoutesResponse = serde_json::from_str(body).unwrap();
        let estimate = RouteEstimate::from(response.routes.into_iter().next().unwrap());

        assert_eq!(estimate.duration, "1234s");
        assert_eq!(estimate.distance_meters, 10230);
        assert_eq!(estimate.polyline, "abc{xyz");
        assert_eq!(estimate.legs.len(), 2);
        assert_eq!(estimate.legs[1].distance_meters, 5230);
    }

    #[test]
    fn test_empty_response_has_no_routes() {
        let response: google::ComputeRoutesResponse = serde_json::from_str("{}").unwrap();
        assert!(response.routes.is_empty());
    }

    #[test]
    fn test_partial_route_fields_default() {
        let body = r#"{"routes": [{"duration": "90s"}]}"#;
        let response: google::ComputeRoutesResponse = serde_json::from_str(body).unwrap();
        let estimate = RouteEstimate::from(response.routes.into_iter().next().unwrap());
        assert_eq!(estimate.duration, "90s");
        assert_eq!(estimate.distance_meters, 0);
        assert!(estimate.polyline.is_empty());
        assert!(estimate.legs.is_empty());
    }
}
