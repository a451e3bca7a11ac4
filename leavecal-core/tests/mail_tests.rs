//! HTTP mail transport against a mocked mail API.

use leavecal_core::mail::{
    Attachment, HttpMailConfig, HttpMailTransport, MailError, MailTransport, OutgoingMail,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn transport(server: &MockServer) -> HttpMailTransport {
    HttpMailTransport::new(HttpMailConfig {
        api_url: format!("{}/emails", server.uri()),
        api_key: "test_key".to_string(),
        from: "Leave Planner <calendar@acme.test>".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn mail(to: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: "Acme Corp leave calendar".to_string(),
        html: "<p>calendar</p>".to_string(),
        attachment: Attachment {
            filename: "AcmeCorp_leave_calendar.ics".to_string(),
            content_type: "text/calendar; charset=utf-8".to_string(),
            content: b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_vec(),
        },
    }
}

// =============================================================================
// Send Tests
// =============================================================================

#[tokio::test]
async fn test_send_posts_message_with_base64_attachment() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer test_key"))
        .and(body_partial_json(serde_json::json!({
            "from": "Leave Planner <calendar@acme.test>",
            "to": ["hr@acme.test"],
            "subject": "Acme Corp leave calendar",
            "attachments": [{
                "filename": "AcmeCorp_leave_calendar.ics",
                "content": "QkVHSU46VkNBTEVOREFSDQpFTkQ6VkNBTEVOREFSDQo=",
                "content_type": "text/calendar; charset=utf-8"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "msg_1" })))
        .expect(1)
        .mount(&server)
        .await;

    transport(&server).send(&mail("hr@acme.test")).await.unwrap();
}

#[tokio::test]
async fn test_rejected_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("domain not verified"))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(&mail("hr@acme.test"))
        .await
        .unwrap_err();

    match err {
        MailError::Rejected { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "domain not verified");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_address_is_not_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = transport(&server).send(&mail("nobody")).await.unwrap_err();
    assert!(matches!(err, MailError::InvalidAddress(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_an_http_error() {
    let server = MockServer::start().await;
    let transport = transport(&server);
    drop(server);

    let err = transport.send(&mail("hr@acme.test")).await.unwrap_err();
    assert!(matches!(err, MailError::Http(_)));
}
