#[cfg(test)]
mod integration_tests {
    use crate::test_utils::{
        TEST_PASSWORD, create_employee, init_test_tracing, login, login_admin, setup_test_server,
    };
    use axum::http::StatusCode;
    use common::{ApiResponse, ErrorResponse, SessionInfo};
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    fn sick_leave(start: &str, end: &str) -> Value {
        json!({ "type": "SICK", "startDate": start, "endDate": end, "reason": "flu" })
    }

    #[tokio::test]
    async fn test_health_check() {
        let _guard = init_test_tracing();
        let server = setup_test_server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_metrics_route_not_mounted_in_tests() {
        let server = setup_test_server().await;

        // The recorder is process-global, so /metrics only exists outside tests
        let admin = login_admin(&server).await;
        let (name, value) = admin.header();
        let response = server.get("/metrics").add_header(name, value).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_me_logout() {
        let server = setup_test_server().await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "emp", "password": TEST_PASSWORD }))
            .await;
        response.assert_status(StatusCode::OK);
        let set_cookie = response.header("set-cookie");
        let set_cookie = set_cookie.to_str().unwrap();
        assert!(set_cookie.starts_with("OASESSIONID="));
        assert!(set_cookie.contains("HttpOnly"));
        let body: ApiResponse<SessionInfo> = response.json();
        assert!(body.success);
        assert_eq!(body.data.username, "emp");
        assert_eq!(body.data.roles, vec!["ROLE_EMP".to_string()]);

        let session = login(&server, "emp", TEST_PASSWORD).await;
        let (name, value) = session.header();
        let response = server.get("/api/auth/me").add_header(name.clone(), value.clone()).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<SessionInfo> = response.json();
        assert_eq!(body.data.username, "emp");

        let response = server
            .post("/api/auth/logout")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert!(response.header("set-cookie").to_str().unwrap().contains("Max-Age=0"));

        let response = server.get("/api/auth/me").add_header(name, value).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials() {
        let server = setup_test_server().await;

        for (username, password) in [("emp", "wrong"), ("nobody", TEST_PASSWORD)] {
            let response = server
                .post("/api/auth/login")
                .json(&json!({ "username": username, "password": password }))
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            let body: ErrorResponse = response.json();
            assert!(!body.success);
            assert_eq!(body.code, "UNAUTHENTICATED");
            assert_eq!(body.error, "Bad credentials");
        }

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "", "password": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_requests_without_session_are_rejected() {
        let server = setup_test_server().await;

        for path in ["/api/auth/me", "/api/employee/leave/my", "/api/admin/users", "/nowhere"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
        }

        let response = server
            .get("/api/employee/leave/my")
            .add_header("cookie".parse::<axum::http::HeaderName>().unwrap(), "OASESSIONID=forged".parse::<axum::http::HeaderValue>().unwrap())
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_path_with_session() {
        let server = setup_test_server().await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (name, value) = emp.header();

        let response = server
            .get("/api/does-not-exist")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/api/admin/does-not-exist").add_header(name, value).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_employee_cannot_use_admin_endpoints() {
        let server = setup_test_server().await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (name, value) = emp.header();

        let response = server.get("/api/admin/users").add_header(name.clone(), value.clone()).await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "FORBIDDEN");

        let response = server
            .post("/api/admin/announcement")
            .add_header(name, value)
            .json(&json!({ "title": "Sneaky" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_leave_approved_by_manager() {
        let server = setup_test_server().await;
        let admin = login_admin(&server).await;
        let manager_id = create_employee(&server, &admin, "mgr", None).await;
        create_employee(&server, &admin, "alice", Some(manager_id)).await;

        let alice = login(&server, "alice", TEST_PASSWORD).await;
        let manager = login(&server, "mgr", TEST_PASSWORD).await;
        let (alice_name, alice_value) = alice.header();
        let (mgr_name, mgr_value) = manager.header();

        // Submit
        let response = server
            .post("/api/employee/leave")
            .add_header(alice_name.clone(), alice_value.clone())
            .json(&sick_leave("2024-01-10", "2024-01-12"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let leave_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["status"], "PENDING");
        assert_eq!(body["data"]["approverId"], manager_id);
        assert_eq!(body["data"]["type"], "SICK");

        // Listed as pending for the requester
        let response = server
            .get("/api/employee/leave/my")
            .add_header(alice_name.clone(), alice_value.clone())
            .await;
        let body: Value = response.json();
        let mine = body["data"].as_array().unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["status"], "PENDING");
        assert_eq!(mine[0]["approverUsername"], "mgr");
        assert_eq!(mine[0]["employeeUsername"], "alice");

        // Waiting for the manager
        let response = server
            .get("/api/employee/leave/to-approve")
            .add_header(mgr_name.clone(), mgr_value.clone())
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        // The requester cannot approve their own request
        let response = server
            .post(&format!("/api/employee/leave/{}/approve", leave_id))
            .add_header(alice_name.clone(), alice_value.clone())
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post(&format!("/api/employee/leave/{}/approve", leave_id))
            .add_header(mgr_name.clone(), mgr_value.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "APPROVED");

        let response = server
            .get("/api/employee/leave/my")
            .add_header(alice_name, alice_value)
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"][0]["status"], "APPROVED");

        let response = server
            .get("/api/employee/leave/to-approve")
            .add_header(mgr_name.clone(), mgr_value.clone())
            .await;
        let body: Value = response.json();
        assert!(body["data"].as_array().unwrap().is_empty());

        // Decisions are final
        let response = server
            .post(&format!("/api/employee/leave/{}/reject", leave_id))
            .add_header(mgr_name, mgr_value)
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "CONFLICT");
    }

    #[tokio::test]
    async fn test_admin_override_on_unassigned_request() {
        let server = setup_test_server().await;
        let admin = login_admin(&server).await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (emp_name, emp_value) = emp.header();
        let (admin_name, admin_value) = admin.header();

        let response = server
            .post("/api/employee/leave")
            .add_header(emp_name.clone(), emp_value.clone())
            .json(&sick_leave("2024-02-01", "2024-02-01"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let leave_id = body["data"]["id"].as_i64().unwrap();
        assert!(body["data"]["approverId"].is_null());

        let response = server
            .get("/api/admin/leaves/pending")
            .add_header(admin_name.clone(), admin_value.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let response = server
            .post(&format!("/api/admin/leaves/{}/reject", leave_id))
            .add_header(admin_name.clone(), admin_value.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "REJECTED");

        let response = server
            .post("/api/admin/leaves/9999/approve")
            .add_header(admin_name, admin_value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_leave_validation() {
        let server = setup_test_server().await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (name, value) = emp.header();

        let response = server
            .post("/api/employee/leave")
            .add_header(name.clone(), value.clone())
            .json(&sick_leave("2024-01-12", "2024-01-10"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");

        let response = server
            .post("/api/employee/leave")
            .add_header(name, value)
            .json(&json!({ "type": "", "startDate": "2024-01-10", "endDate": "2024-01-10" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_attendance_day() {
        let server = setup_test_server().await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (name, value) = emp.header();

        let response = server
            .post("/api/employee/attendance/check-in")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let status = body["data"]["status"].as_str().unwrap().to_string();
        assert!(status == "NORMAL" || status == "LATE");
        assert!(body["data"]["checkInTime"].is_string());

        let response = server
            .post("/api/employee/attendance/check-in")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .post("/api/employee/attendance/check-out")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], status.as_str());
        assert!(body["data"]["checkOutTime"].is_string());

        let response = server
            .post("/api/employee/attendance/check-out")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .get("/api/employee/attendance/my")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_check_out_without_check_in() {
        let server = setup_test_server().await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (name, value) = emp.header();

        let response = server
            .post("/api/employee/attendance/check-out")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "ABNORMAL");
        assert!(body["data"]["checkInTime"].is_null());
    }

    #[tokio::test]
    async fn test_attendance_history_range() {
        let server = setup_test_server().await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (name, value) = emp.header();

        let response = server
            .get("/api/employee/attendance/my?from=2024-02-01&to=2024-01-01")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/employee/attendance/my?from=2024-01-01&to=2024-01-31")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_announcements() {
        let server = setup_test_server().await;
        let admin = login_admin(&server).await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (admin_name, admin_value) = admin.header();
        let (emp_name, emp_value) = emp.header();

        for title in ["First", "Second"] {
            let response = server
                .post("/api/admin/announcement")
                .add_header(admin_name.clone(), admin_value.clone())
                .json(&json!({ "title": title, "content": "Details" }))
                .await;
            response.assert_status(StatusCode::CREATED);
        }

        let response = server
            .post("/api/admin/announcement")
            .add_header(admin_name.clone(), admin_value.clone())
            .json(&json!({ "title": "   " }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/admin/announcement")
            .add_header(admin_name, admin_value)
            .json(&json!({ "title": "x".repeat(201) }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/employee/announcement")
            .add_header(emp_name, emp_value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "Second");
        assert_eq!(items[1]["title"], "First");
    }

    #[tokio::test]
    async fn test_user_administration() {
        let server = setup_test_server().await;
        let admin = login_admin(&server).await;
        let (name, value) = admin.header();

        let top = create_employee(&server, &admin, "top", None).await;
        let bottom = create_employee(&server, &admin, "bottom", Some(top)).await;

        // Duplicate username
        let response = server
            .post("/api/admin/users")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "username": "top", "password": "pw", "realName": "Again" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        // Read back with manager resolved
        let response = server
            .get(&format!("/api/admin/users/{}", bottom))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["managerUsername"], "top");
        assert_eq!(body["data"]["roles"], json!(["ROLE_EMP"]));

        // Manager cycle
        let response = server
            .put(&format!("/api/admin/users/{}", top))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "managerId": bottom }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Profile update by the administrator
        let response = server
            .put(&format!("/api/admin/users/{}", bottom))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "department": "Sales", "baseSalary": "4200.50", "clearManager": true }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["department"], "Sales");
        let salary: Decimal = body["data"]["baseSalary"].as_str().unwrap().parse().unwrap();
        assert_eq!(salary, Decimal::new(420050, 2));
        assert!(body["data"]["managerId"].is_null());

        // Delete and confirm it is gone
        let response = server
            .delete(&format!("/api/admin/users/{}", bottom))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
        let response = server
            .get(&format!("/api/admin/users/{}", bottom))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/api/admin/users").add_header(name, value).await;
        let body: Value = response.json();
        let usernames: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["username"].as_str().unwrap())
            .collect();
        assert_eq!(usernames, vec!["admin", "emp", "top"]);
    }

    #[tokio::test]
    async fn test_delete_user_with_history_conflicts() {
        let server = setup_test_server().await;
        let admin = login_admin(&server).await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (admin_name, admin_value) = admin.header();
        let (emp_name, emp_value) = emp.header();

        let response = server
            .post("/api/employee/attendance/check-out")
            .add_header(emp_name.clone(), emp_value.clone())
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/employee/profile/emp")
            .add_header(emp_name, emp_value)
            .await;
        let body: Value = response.json();
        let emp_id = body["data"]["id"].as_i64().unwrap();

        let response = server
            .delete(&format!("/api/admin/users/{}", emp_id))
            .add_header(admin_name, admin_value)
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_disabled_user_loses_session() {
        let server = setup_test_server().await;
        let admin = login_admin(&server).await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (admin_name, admin_value) = admin.header();
        let (emp_name, emp_value) = emp.header();

        let response = server
            .get("/api/employee/profile/emp")
            .add_header(emp_name.clone(), emp_value.clone())
            .await;
        let body: Value = response.json();
        let emp_id = body["data"]["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/admin/users/{}", emp_id))
            .add_header(admin_name.clone(), admin_value.clone())
            .json(&json!({ "enabled": false }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server.get("/api/auth/me").add_header(emp_name, emp_value).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "emp", "password": TEST_PASSWORD }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        // Disabled accounts are still manager candidates in the full list only
        let response = server
            .get("/api/admin/users/managers")
            .add_header(admin_name.clone(), admin_value.clone())
            .await;
        let body: Value = response.json();
        assert!(body["data"].as_array().unwrap().iter().all(|m| m["username"] != "emp"));

        let response = server
            .get("/api/admin/meta/managers")
            .add_header(admin_name, admin_value)
            .await;
        let body: Value = response.json();
        assert!(body["data"].as_array().unwrap().iter().any(|m| m["username"] == "emp"));
    }

    #[tokio::test]
    async fn test_profile_access() {
        let server = setup_test_server().await;
        let admin = login_admin(&server).await;
        let emp = login(&server, "emp", TEST_PASSWORD).await;
        let (admin_name, admin_value) = admin.header();
        let (emp_name, emp_value) = emp.header();

        let response = server
            .get("/api/employee/profile/emp")
            .add_header(emp_name.clone(), emp_value.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["username"], "emp");

        let response = server
            .get("/api/employee/profile/admin")
            .add_header(emp_name.clone(), emp_value.clone())
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .get("/api/employee/profile/emp")
            .add_header(admin_name.clone(), admin_value.clone())
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/employee/profile/ghost")
            .add_header(admin_name, admin_value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .put("/api/employee/profile/emp")
            .add_header(emp_name.clone(), emp_value.clone())
            .json(&json!({ "phone": "555-0100", "email": "emp@example.com", "address": "Main St 1" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["phone"], "555-0100");
        assert_eq!(body["data"]["email"], "emp@example.com");

        let response = server
            .put("/api/employee/profile/emp")
            .add_header(emp_name, emp_value)
            .json(&json!({ "email": "not-an-email" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
