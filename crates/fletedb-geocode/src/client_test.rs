use super::*;

fn test_client(base_url: &str) -> GeocodingClient {
    GeocodingClient::with_base_url("test-key", 30, "fletedb-test", base_url)
        .expect("client construction should not fail")
}

#[test]
fn build_url_constructs_correct_query_string() {
    let client = test_client("https://maps.googleapis.com");
    let url = client.build_url("Rosario", "AR", "es").unwrap();
    assert_eq!(
        url.as_str(),
        "https://maps.googleapis.com/maps/api/geocode/json?address=Rosario&components=country%3AAR&region=AR&language=es&key=test-key"
    );
}

#[test]
fn build_url_keeps_base_path_prefix() {
    let client = test_client("http://127.0.0.1:9000/proxy/");
    let url = client.build_url("Rosario", "AR", "es").unwrap();
    assert!(
        url.as_str()
            .starts_with("http://127.0.0.1:9000/proxy/maps/api/geocode/json?"),
        "unexpected url: {url}"
    );
}

#[test]
fn build_url_encodes_special_characters() {
    let client = test_client("https://maps.googleapis.com");
    let url = client
        .build_url("San Martín & Mitre, Córdoba", "AR", "es")
        .unwrap();
    assert!(
        url.as_str().contains("San+Mart%C3%ADn+%26+Mitre%2C+C%C3%B3rdoba"),
        "address should be percent-encoded: {url}"
    );
}

#[test]
fn with_base_url_rejects_garbage() {
    let result = GeocodingClient::with_base_url("k", 30, "ua", "not a url");
    assert!(matches!(result, Err(GeocodeError::InvalidBaseUrl(_))));
}
