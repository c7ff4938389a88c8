use kiosk_assist::{Coordinates, LocationProvider, MapsConfig, PlacesClient, StationLocationProvider};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn places_for(server: &MockServer) -> PlacesClient {
    let mut config = MapsConfig::new("maps-key");
    config.places_url = format!("{}/place/nearbysearch/json", server.uri());
    PlacesClient::new(config).unwrap()
}

#[tokio::test]
async fn nearest_station_is_named() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .and(query_param("location", "19.4326,-99.1332"))
        .and(query_param("radius", "1000"))
        .and(query_param("type", "subway_station"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{"name": "Zócalo/Tenochtitlan"}, {"name": "Allende"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        StationLocationProvider::new(Some(Coordinates::ZOCALO), Some(places_for(&server)));
    assert_eq!(
        provider.current_context().await,
        "El usuario está en Lat:19.4326, Lon:-99.1332. Estación cercana: Zócalo/Tenochtitlan."
    );
}

#[tokio::test]
async fn no_station_falls_back_to_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ZERO_RESULTS", "results": []})),
        )
        .mount(&server)
        .await;

    let provider =
        StationLocationProvider::new(Some(Coordinates::ZOCALO), Some(places_for(&server)));
    assert_eq!(
        provider.current_context().await,
        "Coordenadas: 19.4326, -99.1332."
    );
}

#[tokio::test]
async fn lookup_error_falls_back_to_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let places = places_for(&server);
    assert!(places.nearest_station(Coordinates::ZOCALO).await.is_err());

    let provider = StationLocationProvider::new(Some(Coordinates::ZOCALO), Some(places));
    assert_eq!(
        provider.current_context().await,
        "Coordenadas: 19.4326, -99.1332."
    );
}

#[tokio::test]
async fn visitor_position_is_looked_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .and(query_param("location", "19.3029,-99.1505"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{"name": "Estadio Azteca"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        StationLocationProvider::new(Some(Coordinates::ZOCALO), Some(places_for(&server)));
    let visitor = Coordinates {
        latitude: 19.3029,
        longitude: -99.1505,
    };
    assert_eq!(
        provider.context_near(visitor).await,
        "El usuario está en Lat:19.3029, Lon:-99.1505. Estación cercana: Estadio Azteca."
    );
}
