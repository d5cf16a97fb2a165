//! Integration tests for the user service operations against a mock server.

mod common;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use user_service_client::domain::{AuthDecision, ClientError, Token, UserService};
use user_service_client::UserClient;
use user_service_client::infra::{CallOptions, ClientConfig, StatusPolicy};

use common::client_for;

#[tokio::test]
async fn test_can_customer_allowed() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/internal/auth/customer")
                .header("token", "customer-token");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"allowed": true, "userID": 42}));
        })
        .await;

    let client = client_for(&server);
    let decision = client
        .can_customer(&Token::from("customer-token"))
        .await
        .unwrap();

    assert_eq!(
        decision,
        AuthDecision {
            allowed: true,
            user_id: 42
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_can_customer_denied() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/customer");
            then.status(200)
                .json_body(json!({"allowed": false, "userID": 0}));
        })
        .await;

    let decision = client_for(&server)
        .can_customer(&Token::from("t"))
        .await
        .unwrap();
    assert!(!decision.allowed);
}

#[tokio::test]
async fn test_can_admin_builds_scoped_path() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/internal/auth/admin/orders/refund")
                .header("token", "admin-token");
            then.status(200)
                .json_body(json!({"traceID": "tr-77", "allowed": true, "userID": 8}));
        })
        .await;

    let result = client_for(&server)
        .can_admin(&Token::from("admin-token"), "orders", "refund")
        .await
        .unwrap();

    assert!(result.allowed);
    assert_eq!(result.user_id, 8);
    assert_eq!(result.trace_id.as_deref(), Some("tr-77"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_can_admin_without_trace_id() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/admin/users/read");
            then.status(200).json_body(json!({"allowed": true, "userID": 2}));
        })
        .await;

    let result = client_for(&server)
        .can_admin(&Token::from("t"), "users", "read")
        .await
        .unwrap();
    assert!(result.trace_id.is_none());
    assert_eq!(AuthDecision::from(result).user_id, 2);
}

#[tokio::test]
async fn test_user_profile_uses_auth_id_header() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/internal/me")
                .header("x-auth-id", "profile-token");
            then.status(200).json_body(json!({
                "id": 42,
                "phone": "+15550100",
                "email": "jane@example.com",
                "firstName": "Jane",
                "lastName": "Doe",
                "kycLevel": 2,
                "nationalCode": "0012345678",
                "createdAt": "2024-03-09T14:30:05Z"
            }));
        })
        .await;

    let profile = client_for(&server)
        .user(&Token::from("profile-token"))
        .await
        .unwrap();

    assert_eq!(profile.id, 42);
    assert_eq!(profile.first_name, "Jane");
    assert_eq!(profile.last_name, "Doe");
    assert_eq!(profile.kyc_level, 2);
    assert_eq!(profile.national_code, "0012345678");
    assert_eq!(
        profile.created_at,
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap()
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_carries_message_and_status_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/customer");
            then.status(500)
                .json_body(json!({"message": "boom", "code": "X", "trace_id": "t-1"}));
        })
        .await;

    let err = client_for(&server)
        .can_customer(&Token::from("t"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("boom"));
    let api = err.api_error().unwrap();
    assert_eq!(api.code, "500");
    assert_eq!(api.trace_id, "t-1");
}

#[tokio::test]
async fn test_lookup_policy_keeps_server_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/me");
            then.status(500)
                .json_body(json!({"message": "boom", "code": "X", "trace_id": "t-1"}));
        })
        .await;

    let client = client_for(&server).with_status_policy(StatusPolicy::LOOKUP);
    let err = client.user(&Token::from("t")).await.unwrap_err();

    assert!(err.to_string().contains("boom"));
    assert_eq!(err.api_error().unwrap().code, "X");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_lookup_policy_maps_404_to_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/me");
            then.status(404)
                .json_body(json!({"message": "no such user", "code": "U404", "trace_id": "t"}));
        })
        .await;

    let client = client_for(&server).with_status_policy(StatusPolicy::LOOKUP);
    let err = client.user(&Token::from("t")).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound));
}

#[tokio::test]
async fn test_permissive_policy_treats_404_as_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/me");
            then.status(404)
                .json_body(json!({"message": "no such user", "code": "U404", "trace_id": "t"}));
        })
        .await;

    let err = client_for(&server)
        .user(&Token::from("t"))
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(err.api_error().unwrap().code, "404");
}

#[tokio::test]
async fn test_non_json_error_body_is_decode_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/customer");
            then.status(500).body("upstream exploded");
        })
        .await;

    let err = client_for(&server)
        .can_customer(&Token::from("t"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::StatusBodyDecode { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/customer");
            then.status(200).json_body(json!({"allowed": "yes"}));
        })
        .await;

    let err = client_for(&server)
        .can_customer(&Token::from("t"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_cancellation_returns_promptly() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/me");
            then.status(200)
                .delay(Duration::from_secs(10))
                .json_body(json!({}));
        })
        .await;

    let client = client_for(&server);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = client
        .user_with(
            &Token::from("t"),
            &CallOptions::new().with_cancellation(cancel),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_deadline_returns_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/customer");
            then.status(200)
                .delay(Duration::from_secs(10))
                .json_body(json!({"allowed": true, "userID": 1}));
        })
        .await;

    let started = std::time::Instant::now();
    let err = client_for(&server)
        .can_customer_with(
            &Token::from("t"),
            &CallOptions::new().with_deadline(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_client_timeout_returns_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/admin/a/b");
            then.status(200)
                .delay(Duration::from_secs(10))
                .json_body(json!({"allowed": true, "userID": 1}));
        })
        .await;

    let client = client_for(&server).with_timeout(Duration::from_millis(150));
    let err = client
        .can_admin(&Token::from("t"), "a", "b")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout));
}

#[tokio::test]
async fn test_concurrent_operations_do_not_cross_talk() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/internal/auth/customer")
                .header("token", "c");
            then.status(200)
                .delay(Duration::from_millis(80))
                .json_body(json!({"allowed": true, "userID": 1}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/internal/auth/admin/billing/write")
                .header("token", "a");
            then.status(200)
                .delay(Duration::from_millis(40))
                .json_body(json!({"traceID": "adm", "allowed": false, "userID": 2}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/internal/me")
                .header("x-auth-id", "u");
            then.status(200).json_body(json!({
                "id": 3,
                "phone": "p",
                "email": "e",
                "firstName": "f",
                "lastName": "l",
                "kycLevel": 0,
                "nationalCode": "n",
                "createdAt": "2023-01-01T00:00:00Z"
            }));
        })
        .await;

    let client = client_for(&server);
    let mut handles = Vec::new();
    for _ in 0..4 {
        let c = client.clone();
        handles.push(tokio::spawn(async move {
            let (customer_token, admin_token, user_token) =
                (Token::from("c"), Token::from("a"), Token::from("u"));
            let (customer, admin, user) = tokio::join!(
                c.can_customer(&customer_token),
                c.can_admin(&admin_token, "billing", "write"),
                c.user(&user_token),
            );
            (customer.unwrap(), admin.unwrap(), user.unwrap())
        }));
    }

    for handle in handles {
        let (customer, admin, user) = handle.await.unwrap();
        assert_eq!(customer.user_id, 1);
        assert!(customer.allowed);
        assert_eq!(admin.user_id, 2);
        assert_eq!(admin.trace_id.as_deref(), Some("adm"));
        assert!(!admin.allowed);
        assert_eq!(user.id, 3);
    }
}

#[tokio::test]
async fn test_trailing_slash_base_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/customer");
            then.status(200).json_body(json!({"allowed": true, "userID": 4}));
        })
        .await;

    let client = UserClient::new(
        format!("{}/", server.base_url()),
        "https://external.invalid",
    )
    .unwrap();
    let decision = client.can_customer(&Token::from("t")).await.unwrap();
    assert_eq!(decision.user_id, 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_timeout_disables_client_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/user/internal/auth/customer");
            then.status(200).json_body(json!({"allowed": true, "userID": 5}));
        })
        .await;

    let base_url = server.base_url();
    let config = ClientConfig::from_lookup(|key| match key {
        "USER_SERVICE_INTERNAL_URL" => Some(base_url.clone()),
        "USER_SERVICE_EXTERNAL_URL" => Some("https://external.invalid".to_string()),
        "USER_SERVICE_TIMEOUT_SECS" => Some("0".to_string()),
        _ => None,
    })
    .unwrap();
    assert!(config.timeout.is_zero());

    let from_config = UserClient::from_config(&config).unwrap();
    let decision = from_config.can_customer(&Token::from("t")).await.unwrap();
    assert_eq!(decision.user_id, 5);

    let reconfigured = client_for(&server).with_timeout(Duration::ZERO);
    let decision = reconfigured.can_customer(&Token::from("t")).await.unwrap();
    assert!(decision.allowed);
}
