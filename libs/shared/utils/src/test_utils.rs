use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::{AppConfig, StoreBackend};
use shared_models::auth::User;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";
pub const TEST_ADMIN_EMAIL: &str = "admin@clinic.test";

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub admin_emails: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            admin_emails: vec![TEST_ADMIN_EMAIL.to_string()],
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            admin_emails: self.admin_emails.clone(),
            store_backend: StoreBackend::Memory,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email)
    }

    /// A user whose email is on the test config's admin allow-list.
    pub fn admin() -> Self {
        Self::new(TEST_ADMIN_EMAIL)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

/// Signs HS256 tokens shaped like the ones Supabase Auth issues.
pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let issued = Utc::now();
        let expires = issued + Duration::hours(exp_hours.unwrap_or(24));

        Self::sign(
            &json!({
                "sub": user.id,
                "email": user.email,
                "role": "authenticated",
                "iat": issued.timestamp(),
                "exp": expires.timestamp()
            }),
            secret,
        )
    }

    /// Signs arbitrary claims, for tokens missing fields the middleware needs.
    pub fn sign(claims: &Value, secret: &str) -> String {
        let encode = |v: &Value| general_purpose::URL_SAFE_NO_PAD.encode(v.to_string());
        let signing_input = format!("{}.{}", encode(&json!({ "alg": "HS256", "typ": "JWT" })), encode(claims));

        // HMAC accepts keys of any length, so this never falls back.
        let signature = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
            Ok(mut mac) => {
                mac.update(signing_input.as_bytes());
                general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
            }
            Err(_) => String::new(),
        };

        format!("{}.{}", signing_input, signature)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}
