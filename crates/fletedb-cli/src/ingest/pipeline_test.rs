use std::time::Duration;

use fletedb_core::{Catalogs, RecordOutcome};
use fletedb_geocode::GeocodingClient;
use fletedb_store::StoreClient;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::IngestPipeline;
use crate::ingest::locations::LocationResolver;

fn store(uri: &str) -> StoreClient {
    StoreClient::new(uri, "service-key", 30, "fletedb-test").unwrap()
}

fn geocoder(uri: &str) -> GeocodingClient {
    GeocodingClient::with_base_url("maps-key", 30, "fletedb-test", uri).unwrap()
}

fn owner() -> Uuid {
    fletedb_core::DEFAULT_OWNER_ID.parse().unwrap()
}

fn valid_record(origin: &str, destination: &str) -> Value {
    json!({
        "material": "Soja",
        "tipoCarga": "Granel",
        "peso": "30000",
        "tipoEquipo": "Tolva",
        "localidadCarga": origin,
        "localidadDescarga": destination,
        "fechaCarga": "01/08/2024",
        "fechaDescarga": "02/08/2024",
        "telefono": "3411234567",
        "confianza": 90
    })
}

fn geocode_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "OK",
        "results": [{
            "formatted_address": "Santa Fe, Argentina",
            "geometry": { "location": { "lat": -32.9, "lng": -60.6 } }
        }]
    }))
}

async fn mount_known_locations(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/ubicaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(server)
        .await;
}

async fn mount_listing_insert(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/cargas"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn valid_record_is_stored_with_normalized_fields() {
    let server = MockServer::start().await;
    let origin = Uuid::new_v4();
    let listing_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/ubicaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": origin }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/cargas"))
        .and(body_partial_json(json!({
            "dador_id": fletedb_core::DEFAULT_OWNER_ID,
            "telefonodador": "+543411234567",
            "fechacarga": "2024-08-01",
            "fechadescarga": "2024-08-02",
            "peso": "30000",
            "valorviaje": "0",
            "pagopor": "Otros",
            "formadepago_id": "c96c6cd8-8742-4a8c-9df6-18554a7c87af"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": listing_id }])))
        .expect(1)
        .mount(&server)
        .await;

    let catalogs = Catalogs::builtin().unwrap();
    let store = store(&server.uri());
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::ZERO);

    let report = pipeline.run(vec![valid_record("Rosario", "Córdoba")]).await;

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.results[0].index, 1);
    assert_eq!(report.results[0].outcome, RecordOutcome::Created { listing_id });
    let confidence = report.confidence.expect("record carried a confidence");
    assert!((confidence.average - 90.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn invalid_record_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    mount_known_locations(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/cargas"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .expect(4)
        .mount(&server)
        .await;

    let mut records: Vec<Value> = (0..4).map(|_| valid_record("Rosario", "Junín")).collect();
    let mut bad = valid_record("Rosario", "Junín");
    bad["peso"] = json!("muchas");
    records.insert(2, bad);

    let catalogs = Catalogs::builtin().unwrap();
    let store = store(&server.uri());
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::ZERO);

    let report = pipeline.run(records).await;

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed, 1);
    assert!((report.success_rate - 80.0).abs() < f64::EPSILON);
    let failures: Vec<(usize, String)> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 3);
    assert!(failures[0].1.contains("weight"));
}

#[tokio::test]
async fn repeated_address_is_geocoded_once() {
    let server = MockServer::start().await;
    let stored = Uuid::new_v4();

    // The first lookup misses; once the location row exists every later
    // lookup finds it.
    Mock::given(method("GET"))
        .and(path("/rest/v1/ubicaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/ubicaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": stored }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "Pergamino"))
        .respond_with(geocode_ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/ubicaciones"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": stored }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/cargas"))
        .and(body_partial_json(json!({
            "ubicacioninicial_id": stored,
            "ubicacionfinal_id": stored
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .expect(2)
        .mount(&server)
        .await;

    let catalogs = Catalogs::builtin().unwrap();
    let store = store(&server.uri());
    let geo = geocoder(&server.uri());
    let resolver = LocationResolver::new(&store, Some(&geo), "AR", "es");
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::ZERO);

    let report = pipeline
        .run(vec![
            valid_record("Pergamino", "Pergamino"),
            valid_record("Pergamino", "Pergamino"),
        ])
        .await;

    assert_eq!(report.succeeded, 2);
}

#[tokio::test]
async fn missing_material_reports_exactly_one_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut record = valid_record("Rosario", "Córdoba");
    record
        .as_object_mut()
        .unwrap()
        .remove("material");

    let catalogs = Catalogs::builtin().unwrap();
    let store = store(&server.uri());
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::ZERO);

    let report = pipeline.run(vec![record]).await;

    assert_eq!(
        report.results[0].outcome,
        RecordOutcome::Failed {
            errors: vec!["material is required".to_string()]
        }
    );
}

#[tokio::test]
async fn non_object_element_is_a_failure() {
    let server = MockServer::start().await;
    mount_known_locations(&server).await;
    mount_listing_insert(&server).await;

    let catalogs = Catalogs::builtin().unwrap();
    let store = store(&server.uri());
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::ZERO);

    let report = pipeline
        .run(vec![json!("Soja 30tn"), valid_record("Rosario", "Junín")])
        .await;

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.results[0].record, json!("Soja 30tn"));
    assert!(!report.results[0].outcome.is_success());
}

#[tokio::test]
async fn unseen_address_without_geocoding_key_fails_the_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/ubicaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let catalogs = Catalogs::builtin().unwrap();
    let store = store(&server.uri());
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::ZERO);

    let report = pipeline.run(vec![valid_record("Casilda", "Rosario")]).await;

    let failures: Vec<(usize, String)> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].1.contains("origin location \"Casilda\""));
    assert!(failures[0].1.contains("geocoding is disabled"));
}

#[tokio::test]
async fn store_rejection_is_reported_per_record() {
    let server = MockServer::start().await;
    mount_known_locations(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/cargas"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad column"))
        .mount(&server)
        .await;

    let catalogs = Catalogs::builtin().unwrap();
    let store = store(&server.uri());
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::ZERO);

    let report = pipeline.run(vec![valid_record("Rosario", "Junín")]).await;

    let failures: Vec<(usize, String)> = report.failures().collect();
    assert!(failures[0].1.contains("bad column"), "got: {}", failures[0].1);
}

#[tokio::test(start_paused = true)]
async fn pauses_between_records_but_not_after_the_last() {
    // Records without a material fail validation before any request, so the
    // store address is never contacted.
    let store = store("http://127.0.0.1:9");
    let catalogs = Catalogs::builtin().unwrap();
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let delay = Duration::from_secs(5);
    let pipeline = IngestPipeline::new(&catalogs, &store, resolver, owner(), delay);

    let records: Vec<Value> = (0..3).map(|_| json!({ "peso": "100" })).collect();

    let started = tokio::time::Instant::now();
    let report = pipeline.run(records).await;

    assert_eq!(report.failed, 3);
    assert_eq!(started.elapsed(), delay * 2);
}

#[tokio::test(start_paused = true)]
async fn single_record_does_not_pause() {
    let store = store("http://127.0.0.1:9");
    let catalogs = Catalogs::builtin().unwrap();
    let resolver = LocationResolver::new(&store, None, "AR", "es");
    let pipeline =
        IngestPipeline::new(&catalogs, &store, resolver, owner(), Duration::from_secs(5));

    let started = tokio::time::Instant::now();
    pipeline.run(vec![json!({ "peso": "100" })]).await;

    assert_eq!(started.elapsed(), Duration::ZERO);
}
