//! End-to-end driver and bucket transfer tests against wiremock

use std::collections::HashMap;
use std::path::Path;

use kbc_client::{ApiError, KbcApiClient, KbcClientConfig};
use kbc_config_transfer::{Parameters, TransferDriver, TransferError};
use serde_json::{Value, json};
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const STORAGE_TOKEN_HEADER: &str = "X-StorageApi-Token";

async fn setup(dst_region: &str) -> (MockServer, TransferDriver) {
    let server = MockServer::start().await;
    let config = KbcClientConfig::default()
        .with_url_template(&format!("{}/{{service}}", server.uri()))
        .with_job_poll_interval(5)
        .with_retry(3, 10);
    let client = KbcApiClient::new(config).unwrap();
    let params = Parameters {
        api_token: "manage-token".to_string(),
        src_token: "src-token".to_string(),
        src_region: "US".to_string(),
        dst_region: dst_region.to_string(),
        debug: false,
    };
    (server, TransferDriver::new(client, params))
}

async fn mount_token(server: &MockServer, project_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/connection/manage/projects/{}/tokens", project_id)))
        .and(header("X-KBC-ManageApiToken", "manage-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "token": "dst-token",
            "description": "Sample Config provisioning"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn form_of(request: &Request) -> HashMap<String, String> {
    serde_urlencoded::from_bytes(&request.body).unwrap()
}

async fn requests(server: &MockServer, http_method: &str, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
        .collect()
}

fn write_input(data_dir: &Path, content: &str) -> std::path::PathBuf {
    let input = data_dir.join("in/tables/configs.csv");
    std::fs::create_dir_all(input.parent().unwrap()).unwrap();
    std::fs::write(&input, content).unwrap();
    input
}

// ============== Configuration transfer ==============

#[tokio::test]
async fn test_run_transfers_flows_and_orchestrations() {
    let (server, mut driver) = setup("EU").await;
    let dir = tempfile::tempdir().unwrap();
    mount_token(&server, "123").await;

    let flow_path = "/connection/v2/storage/components/keboola.orchestrator/configs/45";
    Mock::given(method("GET"))
        .and(path(flow_path))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(flow_path))
        .and(header(STORAGE_TOKEN_HEADER, "src-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "45",
            "name": "Daily flow",
            "configuration": {"phases": [], "tasks": []}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/rows", flow_path)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/connection/v2/storage/components/keboola.orchestrator/configs"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "45", "name": "Daily flow"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/components/orchestrator/configs/77"))
        .and(header(STORAGE_TOKEN_HEADER, "src-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "77",
            "name": "Legacy nightly",
            "configuration": {"tasks": [{"component": "keboola.ex-db-mysql", "actionParameters": {"config": "46"}}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/syrup/orchestrator/orchestrations"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 88, "name": "Legacy nightly"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/components/keboola.ex-db-mysql/configs/46"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "46", "name": "Orders"})))
        .mount(&server)
        .await;

    let input = write_input(
        dir.path(),
        "project_id,component_id,configuration_id\n\
         123,flow,45\n\
         123,orchestrator-legacy,77\n\
         123,keboola.ex-db-mysql,46\n",
    );
    let output = dir.path().join("out/tables/transferred_configs_log.csv");

    let summary = driver.run(&input, &output).await.unwrap();
    assert_eq!(summary.transferred, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(driver.tokens().len(), 1);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["project_id", "region", "src_cfg_id", "dst_cfg_id", "component_id", "time"]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].iter().take(5).collect::<Vec<_>>(),
        vec!["123", "EU", "45", "45", "keboola.orchestrator"]
    );
    assert_eq!(
        records[1].iter().take(5).collect::<Vec<_>>(),
        vec!["123", "EU", "77", "88", "orchestrator-legacy"]
    );
    assert!(chrono::DateTime::parse_from_rfc3339(&records[0][5]).is_ok());

    let manifest: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/tables/transferred_configs_log.csv.manifest")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["incremental"], true);
    assert_eq!(
        manifest["primary_key"],
        json!(["project_id", "region", "src_cfg_id", "dst_cfg_id", "component_id"])
    );

    let created = requests(
        &server,
        "POST",
        "/connection/v2/storage/components/keboola.orchestrator/configs",
    )
    .await;
    assert_eq!(form_of(&created[0])["configurationId"], "45");
}

#[tokio::test]
async fn test_run_without_input_table_fails() {
    let (server, mut driver) = setup("EU").await;
    let dir = tempfile::tempdir().unwrap();

    let input = dir.path().join("in/tables/configs.csv");
    let output = dir.path().join("out/tables/transferred_configs_log.csv");
    let err = driver.run(&input, &output).await.unwrap_err();

    assert!(matches!(err, TransferError::MissingInputTable(p) if p == input));
    assert!(!output.exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_region_fails_before_any_request() {
    let (server, mut driver) = setup("MARS").await;
    let dir = tempfile::tempdir().unwrap();

    let input = write_input(
        dir.path(),
        "project_id,component_id,configuration_id\n123,keboola.ex-db-mysql,46\n",
    );
    let output = dir.path().join("out/tables/transferred_configs_log.csv");
    let err = driver.run(&input, &output).await.unwrap_err();

    assert!(matches!(
        err,
        TransferError::Api(ApiError::UnknownRegion { ref region, .. }) if region == "MARS"
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_aborts_on_first_error() {
    let (server, mut driver) = setup("EU").await;
    let dir = tempfile::tempdir().unwrap();
    mount_token(&server, "123").await;

    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/components/keboola.ex-db-mysql/configs/46"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let input = write_input(
        dir.path(),
        "project_id,component_id,configuration_id\n\
         123,keboola.ex-db-mysql,46\n\
         123,keboola.ex-db-mysql,47\n",
    );
    let output = dir.path().join("out/tables/transferred_configs_log.csv");
    let err = driver.run(&input, &output).await.unwrap_err();

    match err {
        TransferError::Api(api) => assert_eq!(api.status(), Some(500)),
        other => panic!("unexpected error: {other}"),
    }
    assert!(
        requests(&server, "GET", "/connection/v2/storage/components/keboola.ex-db-mysql/configs/47")
            .await
            .is_empty()
    );
}

// ============== Bucket transfer ==============

async fn mount_table_export(server: &MockServer, table_id: &str, job_id: u64, file_id: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/connection/v2/storage/tables/{}/export-async", table_id)))
        .and(header(STORAGE_TOKEN_HEADER, "src-token"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": job_id, "status": "waiting"})))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/connection/v2/storage/jobs/{}", job_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": job_id,
            "status": "success",
            "results": {"file": {"id": file_id}}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/connection/v2/storage/files/{}", file_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": file_id,
            "name": format!("{}.csv", table_id),
            "url": format!("{}/s3/{}", server.uri(), file_id)
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/s3/{}", file_id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\"id\"\n\"1\"\n".to_vec()))
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer, bucket_id: &str) {
    Mock::given(method("POST"))
        .and(path("/connection/v2/storage/files/prepare"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 900,
            "uploadParams": {
                "url": format!("{}/kbc-files", server.uri()),
                "bucket": "kbc-files",
                "key": "exp-15/files/900.csv",
                "acl": "private",
                "policy": "eyJjb25kaXRpb25zIjpbXX0=",
                "signature": "c2lnbmF0dXJl",
                "AWSAccessKeyId": "AKIAEXAMPLE"
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/kbc-files"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/connection/v2/storage/buckets/{}/tables-async", bucket_id)))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": 31, "status": "success"})))
        .mount(server)
        .await;
}

async fn mount_source_tables(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/buckets/in.c-main/tables"))
        .and(header(STORAGE_TOKEN_HEADER, "src-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "in.c-main.orders", "name": "orders", "primaryKey": ["id"]},
            {"id": "in.c-main.customers", "name": "customers", "primaryKey": []}
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bucket_transfer_skips_existing_tables() {
    let (server, mut driver) = setup("EU").await;
    let dir = tempfile::tempdir().unwrap();
    mount_token(&server, "123").await;
    mount_source_tables(&server).await;
    mount_table_export(&server, "in.c-main.orders", 10, 500).await;
    mount_upload(&server, "in.c-main").await;

    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/buckets"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "in.c-main", "name": "c-main", "stage": "in"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/buckets/in.c-main/tables"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "in.c-main.customers", "name": "customers"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/connection/v2/storage/buckets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "in.c-main"})))
        .expect(0)
        .mount(&server)
        .await;

    let tmp_dir = dir.path().join("tmp");
    let report = driver
        .transfer_bucket("123", "in.c-main", None, &tmp_dir)
        .await
        .unwrap();

    assert_eq!(report.transferred, vec!["in.c-main.orders".to_string()]);
    assert_eq!(report.skipped, vec!["in.c-main.customers".to_string()]);
    assert!(
        requests(&server, "POST", "/connection/v2/storage/tables/in.c-main.customers/export-async")
            .await
            .is_empty()
    );

    let created = requests(&server, "POST", "/connection/v2/storage/buckets/in.c-main/tables-async").await;
    assert_eq!(created.len(), 1);
    let form = form_of(&created[0]);
    assert_eq!(form["name"], "orders");
    assert_eq!(form["dataFileId"], "900");
    assert_eq!(form["primaryKey"], "id");

    let uploads = requests(&server, "POST", "/kbc-files").await;
    assert_eq!(uploads.len(), 1);
    let body = String::from_utf8_lossy(&uploads[0].body);
    assert!(body.contains("name=\"policy\""));
    assert!(body.contains("\"id\"\n\"1\"\n"));

    // Temp files are removed after upload
    assert_eq!(std::fs::read_dir(&tmp_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_bucket_transfer_creates_missing_bucket() {
    let (server, mut driver) = setup("EU").await;
    let dir = tempfile::tempdir().unwrap();
    mount_token(&server, "123").await;
    mount_source_tables(&server).await;
    mount_table_export(&server, "in.c-main.orders", 10, 500).await;
    mount_table_export(&server, "in.c-main.customers", 11, 501).await;
    mount_upload(&server, "out.c-archive").await;

    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/buckets"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/connection/v2/storage/buckets"))
        .and(header(STORAGE_TOKEN_HEADER, "dst-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "out.c-archive", "name": "c-archive", "stage": "out"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = driver
        .transfer_bucket("123", "in.c-main", Some("out.c-archive"), &dir.path().join("tmp"))
        .await
        .unwrap();

    assert_eq!(
        report.transferred,
        vec!["out.c-archive.orders".to_string(), "out.c-archive.customers".to_string()]
    );
    assert!(report.skipped.is_empty());

    let bucket = requests(&server, "POST", "/connection/v2/storage/buckets").await;
    let form = form_of(&bucket[0]);
    assert_eq!(form["name"], "archive");
    assert_eq!(form["stage"], "out");
    assert_eq!(
        requests(&server, "POST", "/connection/v2/storage/buckets/out.c-archive/tables-async")
            .await
            .len(),
        2
    );
}

#[tokio::test]
async fn test_bucket_transfer_rejects_malformed_destination() {
    let (server, mut driver) = setup("EU").await;
    let dir = tempfile::tempdir().unwrap();
    mount_token(&server, "123").await;
    mount_source_tables(&server).await;

    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = driver
        .transfer_bucket("123", "in.c-main", Some("archive"), &dir.path().join("tmp"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidBucketId(id) if id == "archive"));
}

#[tokio::test]
async fn test_empty_bucket_transfer_does_nothing() {
    let (server, mut driver) = setup("EU").await;
    let dir = tempfile::tempdir().unwrap();
    mount_token(&server, "123").await;

    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/buckets/in.c-empty/tables"))
        .and(header(STORAGE_TOKEN_HEADER, "src-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/connection/v2/storage/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // The destination id is malformed, but no bucket is ever needed
    let report = driver
        .transfer_bucket("123", "in.c-empty", Some("archive"), &dir.path().join("tmp"))
        .await
        .unwrap();

    assert_eq!(report, Default::default());
    assert!(requests(&server, "POST", "/connection/v2/storage/buckets").await.is_empty());
}
