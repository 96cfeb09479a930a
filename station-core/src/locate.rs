//! Approximate station position from the caller's public IP (ip-api.com).

use log::{error, info};
use serde_json::Value;

use crate::{
    error::{Defect, FetchError, ModelError},
    model::Coordinates,
    station::truncate_body,
    transport::HttpTransport,
};

pub const IP_LOOKUP_URL: &str = "http://ip-api.com/json";

pub async fn locate_by_ip(transport: &dyn HttpTransport) -> Result<Coordinates, FetchError> {
    info!("Getting latitude/longitude from IP address...");
    let res = transport
        .get(IP_LOOKUP_URL, &[("fields", "lat,lon".to_string())])
        .await?;

    if !res.is_success() {
        error!("Couldn't retrieve position from IP, status {}", res.status);
        return Err(FetchError::Status {
            status: res.status,
            body: truncate_body(&res.body),
        });
    }

    let body: Value = serde_json::from_str(&res.body)?;
    let coord = Coordinates::from_raw(body.as_object())
        .ok_or_else(|| ModelError::malformed("<body>", Defect::Empty))?;

    match (coord.latitude, coord.longitude) {
        (Some(lat), Some(lon)) => {
            info!("Found! Latitude: {lat}, Longitude: {lon}");
            Ok(coord)
        }
        (None, _) => Err(ModelError::malformed("lat", Defect::Missing).into()),
        (_, None) => Err(ModelError::malformed("lon", Defect::Missing).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::ScriptedTransport;

    #[tokio::test]
    async fn reads_lat_lon() {
        let transport = ScriptedTransport::default().respond(200, r#"{"lat":45.5,"lon":-73.6}"#);

        let coord = locate_by_ip(&transport).await.unwrap();

        assert_eq!(coord.latitude, Some(45.5));
        assert_eq!(coord.longitude, Some(-73.6));
        let req = &transport.requests()[0];
        assert_eq!(req.url, IP_LOOKUP_URL);
        assert_eq!(req.param("fields"), Some("lat,lon"));
    }

    #[tokio::test]
    async fn missing_longitude_is_malformed() {
        let transport = ScriptedTransport::default().respond(200, r#"{"lat":45.5}"#);
        let err = locate_by_ip(&transport).await.unwrap_err();
        assert!(matches!(err, FetchError::Payload(ref e) if e.key() == "lon"));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let transport = ScriptedTransport::default().respond(503, "busy");
        let err = locate_by_ip(&transport).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn error_body_is_truncated() {
        let transport = ScriptedTransport::default().respond(500, "e".repeat(1000));
        match locate_by_ip(&transport).await.unwrap_err() {
            FetchError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), 203);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
