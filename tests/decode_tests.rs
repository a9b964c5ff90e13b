use directions_route::route::decode_response;
use directions_route::{LatLng, Polyline, RoutingError, TravelMode};

const DIRECTIONS_OK: &str = include_str!("fixtures/directions_ok.json");
const ZERO_RESULTS: &str = include_str!("fixtures/zero_results.json");

/// Reference vector for the polyline algorithm.
const REFERENCE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

fn reference_points() -> Vec<LatLng> {
    vec![
        LatLng::new(38.5, -120.2),
        LatLng::new(40.7, -120.95),
        LatLng::new(43.252, -126.453),
    ]
}

#[test]
fn decodes_minimal_document() {
    let body = format!(
        r#"{{
            "status": "OK",
            "routes": [{{
                "summary": "A1",
                "bounds": {{
                    "northeast": {{"lat": 43.252, "lng": -120.2}},
                    "southwest": {{"lat": 38.5, "lng": -126.453}}
                }},
                "overview_polyline": {{"points": "{poly}"}},
                "legs": [{{
                    "start_location": {{"lat": 38.5, "lng": -120.2}},
                    "end_location": {{"lat": 43.252, "lng": -126.453}},
                    "distance": {{"value": 1000, "text": "1 km"}},
                    "duration": {{"value": 60, "text": "1 min"}},
                    "steps": [{{
                        "polyline": {{"points": "{poly}"}},
                        "start_location": {{"lat": 38.5, "lng": -120.2}},
                        "end_location": {{"lat": 43.252, "lng": -126.453}},
                        "distance": {{"value": 1000, "text": "1 km"}},
                        "duration": {{"value": 60, "text": "1 min"}},
                        "travel_mode": "WALKING"
                    }}]
                }}]
            }}]
        }}"#,
        poly = REFERENCE_POLYLINE
    );

    let routes = decode_response(&body).expect("minimal document decodes");
    assert_eq!(routes.len(), 1);

    let route = &routes[0];
    assert_eq!(route.overview.points(), &reference_points()[..]);
    assert_eq!(route.overview_encoded, REFERENCE_POLYLINE);
    assert_eq!(route.summary, "A1");
    assert_eq!(route.copyrights, None);
    assert!(route.warnings.is_empty());

    let step = &route.legs[0].steps[0];
    assert_eq!(step.polyline, Polyline::new(reference_points()));
    assert_eq!(step.travel_mode, TravelMode::Walking);
    assert_eq!(step.maneuver, None);
}

#[test]
fn decodes_alternatives_in_order() {
    let routes = decode_response(DIRECTIONS_OK).expect("fixture decodes");
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].summary, "I-5 N");
    assert_eq!(routes[1].summary, "US-101 N");
    assert_eq!(routes[1].warnings, vec!["This route has tolls.".to_string()]);
}

#[test]
fn decodes_leg_and_steps() {
    let routes = decode_response(DIRECTIONS_OK).expect("fixture decodes");
    let route = &routes[0];
    let leg = &route.legs[0];

    assert_eq!(leg.distance.value, 812345);
    assert_eq!(leg.distance.text, "812 km");
    assert_eq!(leg.duration.value, 30660);
    assert_eq!(leg.start_address.as_deref(), Some("Origin, CA, USA"));
    assert_eq!(leg.start_location, LatLng::new(38.5, -120.2));
    assert_eq!(leg.end_location, LatLng::new(43.252, -126.453));

    assert_eq!(leg.steps.len(), 2);
    let first = &leg.steps[0];
    assert_eq!(
        first.polyline.points(),
        &[LatLng::new(38.5, -120.2), LatLng::new(40.7, -120.95)]
    );
    assert_eq!(first.instructions.as_deref(), Some("Head <b>north</b>"));
    assert_eq!(leg.steps[1].maneuver.as_deref(), Some("turn-left"));

    assert_eq!(route.distance_meters(), 812345);
    assert_eq!(route.duration_seconds(), 30660);
    assert_eq!(route.steps().count(), 2);
    assert!(route.bounds.contains(leg.end_location));
}

#[test]
fn zero_results_is_service_status_failure() {
    match decode_response(ZERO_RESULTS) {
        Err(RoutingError::ServiceStatus { status, message }) => {
            assert_eq!(status, "ZERO_RESULTS");
            assert_eq!(message, None);
        }
        other => panic!("expected service status failure, got {:?}", other),
    }
}

#[test]
fn missing_leg_distance_is_malformed() {
    let body = DIRECTIONS_OK.replacen(
        r#""distance": { "text": "812 km", "value": 812345 },"#,
        "",
        1,
    );
    assert_ne!(body, DIRECTIONS_OK);
    assert!(matches!(
        decode_response(&body),
        Err(RoutingError::MalformedResponse(_))
    ));
}

#[test]
fn broken_step_polyline_is_malformed() {
    let body = DIRECTIONS_OK.replacen("_p~iF~ps|U_ulLnnqC\"", "_p~iF~ps|U_ulLnnq\"", 1);
    assert_ne!(body, DIRECTIONS_OK);
    assert!(matches!(
        decode_response(&body),
        Err(RoutingError::MalformedResponse(_))
    ));
}

#[test]
fn overlong_polyline_values_are_malformed() {
    let corrupt = format!("{}F?", "~".repeat(12)).repeat(3);
    let body = DIRECTIONS_OK.replacen(REFERENCE_POLYLINE, &corrupt, 1);
    assert_ne!(body, DIRECTIONS_OK);
    assert!(matches!(
        decode_response(&body),
        Err(RoutingError::MalformedResponse(_))
    ));
}
