use super::*;
use crate::web::{MemoryStorage, MockHttpClient};
use maisha_shared::{Gender, PaymentStatus};
use serde_json::json;

const BASE: &str = "http://test";

fn setup(lookup_token: Option<&str>) -> (MaishaApi<MockHttpClient, MemoryStorage>, Arc<MockHttpClient>, MemoryStorage) {
    let config = AppConfig {
        api_base: format!("{}/", BASE),
        lookup_token: lookup_token.map(str::to_string),
        log_level: log::LevelFilter::Off,
    };
    let client = Arc::new(MockHttpClient::new());
    let storage = MemoryStorage::new();
    let api = MaishaApi::new(&config, Arc::clone(&client), storage.clone());
    (api, client, storage)
}

fn url(path: &str) -> String {
    format!("{}/api/{}", BASE, path)
}

fn draft() -> MemberDraft {
    MemberDraft {
        first_name: "Aline".to_string(),
        last_name: "Uwase".to_string(),
        birth_date: None,
        gender_code: None,
        gender_label: Some("Female".to_string()),
        is_active: true,
        national_id: "1199880012345678".to_string(),
        phone: "250788000111".to_string(),
        group_id: Some(3),
    }
}

// =========================================================
// 请求头
// =========================================================

#[tokio::test]
async fn bearer_header_only_when_token_stored() {
    let (api, client, storage) = setup(None);
    client.mock_response(&url("groups"), 200, json!([]));

    api.get_groups().await.unwrap();
    let headers = client.last_headers();
    assert_eq!(headers.get(HEADER_CONTENT_TYPE).map(String::as_str), Some("application/json"));
    assert!(!headers.contains_key(HEADER_AUTHORIZATION));

    storage.set(STORAGE_TOKEN_KEY, "session-abc");
    api.get_groups().await.unwrap();
    assert_eq!(
        client.last_headers().get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer session-abc")
    );
}

#[tokio::test]
async fn lookup_uses_secondary_token_only() {
    let (api, client, storage) = setup(Some("build-default"));
    storage.set(STORAGE_TOKEN_KEY, "session-abc");
    client.mock_raw(&url("customer-info?phone=250788000111"), 200, "");

    api.get_customer_info("250788000111").await.unwrap();
    let headers = client.last_headers();
    assert_eq!(headers.get(HEADER_MOPAY_TOKEN).map(String::as_str), Some("build-default"));
    assert_eq!(
        headers.get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer build-default")
    );

    storage.set(STORAGE_MOPAY_TOKEN_KEY, "stored-mopay");
    api.get_customer_info("250788000111").await.unwrap();
    assert_eq!(
        client.last_headers().get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer stored-mopay")
    );
}

#[tokio::test]
async fn lookup_without_secondary_token_sends_no_authorization() {
    let (api, client, storage) = setup(None);
    storage.set(STORAGE_TOKEN_KEY, "session-abc");
    client.mock_raw(&url("customer-info?phone=250788"), 200, "");

    api.get_customer_info("250788").await.unwrap();
    let headers = client.last_headers();
    assert!(!headers.contains_key(HEADER_AUTHORIZATION));
    assert!(!headers.contains_key(HEADER_MOPAY_TOKEN));
}

// =========================================================
// 响应处理
// =========================================================

#[tokio::test]
async fn delete_group_with_no_content_resolves() {
    let (api, client, _) = setup(None);
    client.mock_raw(&url("groups/7"), 204, "");

    assert_eq!(api.delete_group(7).await, Ok(()));
    let requests = client.requests.borrow();
    assert_eq!(requests[0].1, "DELETE");
}

#[tokio::test]
async fn non_array_member_list_is_empty() {
    let (api, client, _) = setup(None);
    client.mock_response(&url("members"), 200, json!({ "error": "oops" }));

    assert!(api.get_members(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn whitespace_body_is_treated_as_no_content() {
    let (api, client, _) = setup(None);
    client.mock_raw(&url("members"), 200, "  \n");
    client.mock_raw(&url("reports/audit"), 200, " ");
    client.mock_raw(&url("wallets/member/4"), 200, "\t");

    assert!(api.get_members(None).await.unwrap().is_empty());
    assert_eq!(api.get_audit_log().await.unwrap(), ReportDocument(Value::Null));
    assert!(matches!(api.get_wallet(4).await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn malformed_list_items_are_skipped() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("members?group_id=3"),
        200,
        json!([
            { "id": 1, "first_name": "Aline", "last_name": "Uwase", "gender": "FEMALE", "is_active": 1 },
            { "first_name": "no id" },
            { "id": "2", "first_name": " ", "last_name": "Kalisa", "gender": "MALE", "is_active": false }
        ]),
    );

    let members = api.get_members(Some(3)).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].full_name, "Aline Uwase");
    assert_eq!(members[0].gender_code, Gender::Female);
    assert!(members[0].is_active);
    assert_eq!(members[1].id, 2);
    assert_eq!(members[1].full_name, "Kalisa");
}

#[tokio::test]
async fn error_message_is_body_or_status_fallback() {
    let (api, client, _) = setup(None);
    client.mock_raw(&url("groups"), 500, "");
    assert_eq!(
        api.get_groups().await.unwrap_err().to_string(),
        "Request failed: 500"
    );

    client.mock_raw(&url("groups"), 403, "Forbidden group");
    let err = api.get_groups().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 403,
            message: "Forbidden group".to_string()
        }
    );
    assert_eq!(err.error_code(), "HTTP_STATUS");
}

#[tokio::test]
async fn network_failure_is_reported() {
    let (api, client, _) = setup(None);
    client.mock_network_failure(&url("groups"));

    let err = api.get_groups().await.unwrap_err();
    assert_eq!(err.error_code(), "NETWORK_ERROR");
}

#[tokio::test]
async fn required_document_must_decode() {
    let (api, client, _) = setup(None);
    client.mock_raw(&url("group-policy/3"), 200, "");

    let err = api.get_group_policy(3).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =========================================================
// 成员
// =========================================================

#[tokio::test]
async fn member_create_fills_placeholder_birth_date() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("members"),
        201,
        json!({ "id": 10, "first_name": "Aline", "last_name": "Uwase", "gender": "FEMALE", "is_active": true, "group_id": 3 }),
    );

    let member = api.add_member(&draft()).await.unwrap();
    assert_eq!(member.id, 10);

    let body = client.last_body().unwrap();
    assert_eq!(body["birth_date"], "1990-01-01");
    assert_eq!(body["gender"], "FEMALE");
    assert_eq!(body["group_id"], 3);
}

#[tokio::test]
async fn member_update_leaves_birth_date_absent() {
    let (api, client, _) = setup(None);
    client.mock_response(&url("members/10"), 200, json!({ "id": 10 }));

    api.update_member(10, &draft()).await.unwrap();
    let body = client.last_body().unwrap();
    assert!(body.get("birth_date").is_none());
    assert_eq!(client.requests.borrow()[0].1, "PUT");
}

#[tokio::test]
async fn invalid_member_never_reaches_network() {
    let (api, client, _) = setup(None);
    let mut d = draft();
    d.group_id = None;

    let err = api.add_member(&d).await.unwrap_err();
    assert_eq!(err, ApiError::Validation("Please select a group".to_string()));
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn groups_with_counts_joins_both_lists() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("groups"),
        200,
        json!([{ "id": 1, "name": "Abakorana" }, { "id": 2, "name": "Twiyubake" }]),
    );
    client.mock_response(
        &url("members"),
        200,
        json!([{ "id": 5, "group_id": 1 }, { "id": 6, "group_id": 1 }, { "id": 7, "group_id": 2 }]),
    );

    let (groups, members) = api.get_groups_with_counts().await.unwrap();
    assert_eq!(members.len(), 3);
    assert_eq!(groups[0].member_count, 2);
    assert_eq!(groups[1].member_count, 1);
}

#[tokio::test]
async fn unassigned_group_role_never_lists_members() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("members"),
        200,
        json!([{ "id": 1, "group_id": 1 }, { "id": 2, "group_id": 2 }]),
    );

    let admin = AuthUser {
        id: 9,
        name: "Grace".to_string(),
        email: "grace@maisha.rw".to_string(),
        role: Some(maisha_shared::Role::GroupAdmin),
        group_id: None,
        group: None,
    };
    let scope = GroupScope::for_user(Some(&admin));

    assert!(api.get_scoped_members(scope).await.unwrap().is_empty());
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn scoped_members_drop_other_groups() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("members?group_id=1"),
        200,
        json!([
            { "id": 1, "group_id": 1 },
            { "id": 2, "group_id": 2 },
            { "id": 3 }
        ]),
    );

    let ids: Vec<i64> = api
        .get_scoped_members(GroupScope::Group(1))
        .await
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(client.requests.borrow()[0].0, url("members?group_id=1"));
}

#[tokio::test]
async fn groups_with_counts_fails_when_either_fails() {
    let (api, client, _) = setup(None);
    client.mock_response(&url("groups"), 200, json!([]));
    client.mock_raw(&url("members"), 500, "boom");

    assert!(api.get_groups_with_counts().await.is_err());
}

#[tokio::test]
async fn import_counts_success_and_failures() {
    let (api, client, _) = setup(Some("mopay"));
    client.mock_response(
        &url("customer-info?phone=250788000111"),
        200,
        json!({ "firstName": "Eric", "lastName": "", "gender": "Male" }),
    );
    client.mock_raw(&url("customer-info?phone=250788000222"), 200, "");
    client.mock_response(&url("members"), 201, json!({ "id": 1 }));

    let phones = vec![
        "0788000111".to_string(),
        "250788000222".to_string(),
        "250788000333".to_string(),
    ];
    let summary = api.import_members(4, &phones).await;

    // 第三个号码查询返回 404
    assert_eq!(summary.success, 2);
    assert_eq!(summary.failed, vec!["250788000333".to_string()]);

    let created: Vec<Value> = client
        .requests
        .borrow()
        .iter()
        .filter(|(u, m, _, _)| u == &url("members") && m == "POST")
        .filter_map(|(_, _, _, b)| b.as_deref().and_then(|b| serde_json::from_str(b).ok()))
        .collect();
    assert_eq!(created[0]["first_name"], "Eric");
    assert_eq!(created[0]["last_name"], "User");
    assert_eq!(created[0]["gender"], "MALE");
    assert_eq!(created[0]["phone"], "250788000111");
    assert_eq!(created[1]["first_name"], "Unknown");
    assert_eq!(created[1]["group_id"], 4);
}

// =========================================================
// 认证
// =========================================================

#[tokio::test]
async fn login_posts_credentials() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("auth/login"),
        200,
        json!({ "user": { "id": 1, "name": "Root", "email": "root@maisha.rw", "role": "super_admin" }, "token": "t1" }),
    );

    let resp = api.login("root@maisha.rw", "secret").await.unwrap();
    assert_eq!(resp.token.as_deref(), Some("t1"));
    assert_eq!(client.last_body().unwrap()["email"], "root@maisha.rw");
}

#[tokio::test]
async fn me_accepts_wrapped_or_bare_user() {
    let (api, client, _) = setup(None);
    client.mock_response(&url("auth/me"), 200, json!({ "user": { "id": 4, "role": "member" } }));
    assert_eq!(api.get_me().await.unwrap().map(|u| u.id), Some(4));

    client.mock_response(&url("auth/me"), 200, json!({ "id": 5, "role": "group_user", "group_id": 2 }));
    let me = api.get_me().await.unwrap().unwrap();
    assert_eq!(me.group_id, Some(2));
}

// =========================================================
// 支付与报表
// =========================================================

#[tokio::test]
async fn payment_status_codes_map_to_labels() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("payments/check-status/TX%2042"),
        200,
        json!({ "transactionId": "TX 42", "status": 202, "amount": 500 }),
    );

    let doc = api.check_payment_status(" TX 42 ").await.unwrap();
    assert_eq!(doc.status(), Some(PaymentStatus::Processing));
    assert_eq!(PaymentStatus::from_code(418).label(), "Status 418");
}

#[tokio::test]
async fn blank_transaction_id_is_rejected_locally() {
    let (api, client, _) = setup(None);
    assert!(matches!(
        api.check_payment_status("  ").await,
        Err(ApiError::Validation(_))
    ));
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn transaction_lookup_encodes_id() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("payments/transactions/TX%2F7"),
        200,
        json!({ "id": 3, "transaction_id": "TX/7", "amount": "1500" }),
    );

    let tx = api.get_transaction("TX/7").await.unwrap();
    assert_eq!(tx.transaction_id, "TX/7");
    assert_eq!(tx.amount, 1500.0);
}

#[tokio::test]
async fn member_wallet_is_single_document() {
    let (api, client, _) = setup(None);
    client.mock_response(
        &url("wallets/member/4"),
        200,
        json!({ "id": 11, "member_id": "4", "balance": "250.5", "is_active": 1 }),
    );

    let wallet = api.get_wallet(4).await.unwrap();
    assert_eq!(wallet.member_id, 4);
    assert_eq!(wallet.balance, 250.5);
    assert!(wallet.is_active);
}

#[tokio::test]
async fn member_and_audit_reports_keep_raw_document() {
    let (api, client, _) = setup(None);
    client.mock_response(&url("reports/member/4"), 200, json!({ "total_topups": 3 }));
    client.mock_response(&url("reports/audit"), 200, json!([{ "action": "login" }]));

    let report = api.get_member_report(4).await.unwrap();
    assert_eq!(report.0["total_topups"], 3);
    let audit = api.get_audit_log().await.unwrap();
    assert_eq!(audit.0[0]["action"], "login");
}

#[tokio::test]
async fn member_statement_attaches_filter() {
    let (api, client, _) = setup(None);
    let filter = StatementFilter {
        start_date: Some("2024-01-01".to_string()),
        ..StatementFilter::default()
    };
    client.mock_response(
        &url("wallet-reports/member-statement/8?start_date=2024-01-01"),
        200,
        json!({ "transactions": [] }),
    );

    let doc = api.get_member_statement(8, &filter).await.unwrap();
    assert!(doc.0["transactions"].is_array());
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn report_filters_become_query_parameters() {
    let (api, client, _) = setup(None);
    client.mock_response(&url("wallet-reports/topup"), 200, json!({ "total": 0 }));

    api.get_topup_report(&ReportFilter::default()).await.unwrap();
    assert_eq!(client.requests.borrow()[0].0, url("wallet-reports/topup"));

    let filter = ReportFilter {
        group_id: Some(3),
        ..ReportFilter::default()
    };
    client.mock_response(&url("wallet-reports/topup?group_id=3"), 200, json!({ "total": 10 }));
    let doc = api.get_topup_report(&filter).await.unwrap();
    assert_eq!(doc.0["total"], 10);
}

#[tokio::test]
async fn withdrawal_actions_post_to_request_paths() {
    let (api, client, _) = setup(None);
    client.mock_raw(&url("withdrawals/9/approve"), 200, "{}");
    client.mock_raw(&url("withdrawals/9/reject"), 204, "");

    api.approve_withdrawal(9, "Root").await.unwrap();
    assert_eq!(client.last_body().unwrap()["approved_by"], "Root");

    api.reject_withdrawal(9, &RejectWithdrawalPayload::by_admin("Root"))
        .await
        .unwrap();
    assert_eq!(client.last_body().unwrap()["notes"], "Rejected by admin");
}
