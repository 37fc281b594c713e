//! HTTP Integration Tests for Document and Decision Records
//!
//! Tests server-side pagination and counting, creator stamping, validation
//! before any request, and not-found handling.
//!
//! Run with: `cargo test --test records_http_test -- --nocapture`

mod helpers;

use chrono::NaiveDate;
use helpers::{document_row, reward_row, TestApi};
use od_client::documents::DocumentFilter;
use od_client::rewards::summarize;
use od_client::ClientError;
use od_common::{
    CurrentUser, DecisionKind, DocumentDirection, DocumentStatus, NewOfficialDocument,
    NewRewardDecision, UpdateOfficialDocument,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const DOC_ID: &str = "7d0b5c1e-4f6a-4c38-9a57-2f0d1c9e8b11";

fn new_document() -> NewOfficialDocument {
    NewOfficialDocument {
        direction: DocumentDirection::Incoming,
        document_number: "125/SNV-TCBC".into(),
        summary: "Họp giao ban tháng 3".into(),
        issuing_agency: Some("Sở Nội vụ".into()),
        signer: None,
        issued_date: NaiveDate::from_ymd_opt(2024, 3, 15),
        received_date: None,
        status: DocumentStatus::Pending,
        attachment_url: None,
    }
}

// ============================================================================
// Documents
// ============================================================================

#[tokio::test]
async fn test_list_documents_reads_exact_count() {
    let app = TestApi::new().await;
    Mock::given(method("GET"))
        .and(path(TestApi::table("cong_van")))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("offset", "20"))
        .and(query_param("limit", "20"))
        .and(header("Prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(206)
                .set_body_json(json!([
                    document_row(DOC_ID, "21/CV", "u1"),
                    document_row("3c9f8d2a-1b4e-4e7a-8c55-6a2b9d0e4f22", "22/CV", "u2"),
                ]))
                .insert_header("Content-Range", "20-21/57"),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let page = app.client.documents.list(2, 20).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 57);
    assert_eq!(page.offset, 20);
    assert_eq!(page.page_count(20), 3);

    let filter = DocumentFilter {
        search: Some("22/cv".into()),
        ..Default::default()
    };
    assert_eq!(filter.apply(&page.items).len(), 1);
}

#[tokio::test]
async fn test_list_by_direction_filters_server_side() {
    let app = TestApi::new().await;
    Mock::given(method("GET"))
        .and(path(TestApi::table("cong_van")))
        .and(query_param("direction", "eq.outgoing"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("Content-Range", "*/0"),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let page = app
        .client
        .documents
        .list_by_direction(DocumentDirection::Outgoing, 1, 20)
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_search_documents_filters_server_side() {
    let app = TestApi::new().await;
    Mock::given(method("GET"))
        .and(path(TestApi::table("cong_van")))
        .and(query_param(
            "or",
            r#"(document_number.ilike."*giao ban*",summary.ilike."*giao ban*",issuing_agency.ilike."*giao ban*")"#,
        ))
        .and(query_param("status", "eq.pending"))
        .and(query_param("issued_date", "gte.2024-03-01"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([document_row(DOC_ID, "21/CV", "u1")]))
                .insert_header("Content-Range", "0-0/1"),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let filter = DocumentFilter {
        search: Some("giao ban".into()),
        status: Some(DocumentStatus::Pending),
        issued_from: NaiveDate::from_ymd_opt(2024, 3, 1),
        ..Default::default()
    };
    let page = app.client.documents.search(&filter, 1, 20).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].document_number, "21/CV");
}

#[tokio::test]
async fn test_create_document_stamps_creator() {
    let app = TestApi::new().await;
    Mock::given(method("POST"))
        .and(path(TestApi::table("cong_van")))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "document_number": "125/SNV-TCBC",
            "created_by": "u1",
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([document_row(DOC_ID, "125/SNV-TCBC", "u1")])),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let user = CurrentUser::new("u1", "user");
    let doc = app
        .client
        .documents
        .create(Some(&user), &new_document())
        .await
        .unwrap();
    assert_eq!(doc.created_by.as_deref(), Some("u1"));
    assert_eq!(doc.id.to_string(), DOC_ID);
}

#[tokio::test]
async fn test_create_without_user_sends_nothing() {
    let app = TestApi::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.server)
        .await;

    let err = app
        .client
        .documents
        .create(None, &new_document())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn test_invalid_document_is_rejected_locally() {
    let app = TestApi::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.server)
        .await;

    let mut payload = new_document();
    payload.document_number = String::new();
    let user = CurrentUser::new("u1", "user");

    let err = app
        .client
        .documents
        .create(Some(&user), &payload)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Common(od_common::Error::Validation(_))));
}

#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let app = TestApi::new().await;
    let mut updated = document_row(DOC_ID, "21/CV", "u1");
    updated["status"] = json!("completed");
    Mock::given(method("PATCH"))
        .and(path(TestApi::table("cong_van")))
        .and(query_param("id", format!("eq.{DOC_ID}").as_str()))
        .and(body_json(json!({ "status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .expect(1)
        .mount(&app.server)
        .await;

    let id: Uuid = DOC_ID.parse().unwrap();
    let payload = UpdateOfficialDocument {
        status: Some(DocumentStatus::Completed),
        ..Default::default()
    };
    let doc = app.client.documents.update(id, &payload).await.unwrap();
    assert_eq!(doc.status, DocumentStatus::Completed);
}

#[tokio::test]
async fn test_update_clears_attachment_with_null() {
    let app = TestApi::new().await;
    Mock::given(method("PATCH"))
        .and(path(TestApi::table("cong_van")))
        .and(query_param("id", format!("eq.{DOC_ID}").as_str()))
        .and(body_json(json!({ "attachment_url": null })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([document_row(DOC_ID, "21/CV", "u1")])),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let payload = UpdateOfficialDocument {
        attachment_url: Some(None),
        ..Default::default()
    };
    let doc = app
        .client
        .documents
        .update(DOC_ID.parse().unwrap(), &payload)
        .await
        .unwrap();
    assert!(doc.attachment_url.is_none());
}

#[tokio::test]
async fn test_get_missing_document_is_not_found() {
    let app = TestApi::new().await;
    Mock::given(method("GET"))
        .and(path(TestApi::table("cong_van")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.server)
        .await;

    let err = app.client.documents.get(Uuid::nil()).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_document_by_id() {
    let app = TestApi::new().await;
    Mock::given(method("DELETE"))
        .and(path(TestApi::table("cong_van")))
        .and(query_param("id", format!("eq.{DOC_ID}").as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.server)
        .await;

    app.client
        .documents
        .delete(DOC_ID.parse().unwrap())
        .await
        .unwrap();
}

// ============================================================================
// Rewards
// ============================================================================

#[tokio::test]
async fn test_list_rewards_newest_decision_first() {
    let app = TestApi::new().await;
    Mock::given(method("GET"))
        .and(path(TestApi::table("rewards")))
        .and(query_param("order", "decision_date.desc,created_at.desc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    reward_row("0b7e3a52-9c1d-4f7b-a2e6-5d8c4b3a2f10", "reward", Some(500_000)),
                    reward_row("1c8f4b63-0d2e-4a8c-b3f7-6e9d5c4b3a21", "discipline", None),
                ]))
                .insert_header("Content-Range", "0-1/2"),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let page = app.client.rewards.list(1, 50).await.unwrap();
    let summary = summarize(&page.items);
    assert_eq!(summary.rewards, 1);
    assert_eq!(summary.disciplines, 1);
    assert_eq!(summary.total_amount, 500_000);
}

#[tokio::test]
async fn test_negative_reward_amount_is_rejected_locally() {
    let app = TestApi::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.server)
        .await;

    let payload = NewRewardDecision {
        kind: DecisionKind::Reward,
        decision_number: "12/QĐ-UBND".into(),
        subject_name: "Nguyễn Văn A".into(),
        unit: None,
        form: "Giấy khen".into(),
        reason: None,
        decision_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        amount: Some(-1),
        attachment_url: None,
    };
    let user = CurrentUser::new("u1", "manager");
    assert!(app.client.rewards.create(Some(&user), &payload).await.is_err());
}
