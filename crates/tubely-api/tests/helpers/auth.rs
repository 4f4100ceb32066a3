use super::TestApp;
use chrono::Duration;
use uuid::Uuid;

/// Signing secret shared by the test server and the token helper.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// A caller with a valid access token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn register_test_user(app: &TestApp) -> TestUser {
    let user_id = Uuid::new_v4();
    let token = app
        .tokens
        .issue(user_id, Duration::hours(1))
        .expect("Failed to sign test token");
    TestUser { user_id, token }
}
