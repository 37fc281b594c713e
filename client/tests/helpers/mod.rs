//! Reusable test helpers for data API integration tests.
//!
//! Provides `TestApi`: a mock backend plus an `AdminClient` pointed at it,
//! and row fixtures in the shape the backend returns.
#![allow(dead_code)]

use od_client::config::Config;
use od_client::AdminClient;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Anon key the client sends when nobody is signed in.
pub const ANON_KEY: &str = "test-anon-key";

/// Mock backend and a client wired to it.
pub struct TestApi {
    pub server: MockServer,
    pub client: AdminClient,
}

impl TestApi {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let config = Config {
            data_api_url: server.uri(),
            ..Config::default_for_test()
        };
        let client = AdminClient::new(config).expect("client builds");
        Self { server, client }
    }

    /// Path of a table under the REST prefix.
    pub fn table(name: &str) -> String {
        format!("/rest/v1/{name}")
    }
}

pub fn permission_row(id: i64, role: &str, module: &str, can_edit: bool) -> Value {
    json!({
        "id": id,
        "role": role,
        "module": module,
        "can_view": true,
        "can_add": true,
        "can_edit": can_edit,
        "can_delete": false,
    })
}

pub fn document_row(id: &str, number: &str, created_by: &str) -> Value {
    json!({
        "id": id,
        "direction": "incoming",
        "document_number": number,
        "summary": "Họp giao ban tháng 3",
        "issuing_agency": "Sở Nội vụ",
        "signer": null,
        "issued_date": "2024-03-15",
        "received_date": "2024-03-18",
        "status": "pending",
        "attachment_url": null,
        "created_by": created_by,
        "created_at": "2024-03-18T08:30:00Z",
    })
}

pub fn reward_row(id: &str, kind: &str, amount: Option<i64>) -> Value {
    json!({
        "id": id,
        "kind": kind,
        "decision_number": "12/QĐ-UBND",
        "subject_name": "Nguyễn Văn A",
        "unit": "Phòng Tổ chức",
        "form": "Giấy khen",
        "reason": null,
        "decision_date": "2024-06-01",
        "amount": amount,
        "attachment_url": null,
        "created_by": "u1",
        "created_at": "2024-06-02T01:00:00Z",
    })
}
