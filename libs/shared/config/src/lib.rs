use std::env;
use std::str::FromStr;
use tracing::warn;

pub mod seed;

pub use seed::{ClinicSeed, TherapistSeed, WindowSeed};

/// Which persistence backend the stores are wired against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "memory" | "in-memory" | "in_memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// What happens to a patient's package when a `completed` session is deleted
/// outright (as opposed to being moved to another status).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletedDeletionPolicy {
    /// Leave `used_sessions` untouched. Matches the historical behaviour.
    Keep,
    /// Give the session back to the package, like a transition out of `completed`.
    Compensate,
}

impl FromStr for CompletedDeletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(CompletedDeletionPolicy::Keep),
            "compensate" => Ok(CompletedDeletionPolicy::Compensate),
            other => Err(format!("unknown deletion policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_jwt_secret: String,
    pub admin_emails: Vec<String>,
    pub store_backend: StoreBackend,
    pub default_package_sessions: i32,
    pub slot_duration_minutes: u16,
    pub completed_deletion_policy: CompletedDeletionPolicy,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            supabase_jwt_secret: String::new(),
            admin_emails: Vec::new(),
            store_backend: StoreBackend::Supabase,
            default_package_sessions: 20,
            slot_duration_minutes: 60,
            completed_deletion_policy: CompletedDeletionPolicy::Keep,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let supabase_service_key = env::var("SUPABASE_SERVICE_KEY")
            .or_else(|_| env::var("SUPABASE_ANON_PUBLIC_KEY"))
            .unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                String::new()
            });

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key,
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            admin_emails: env::var("ADMIN_EMAILS")
                .map(|raw| parse_email_list(&raw))
                .unwrap_or_else(|_| {
                    warn!("ADMIN_EMAILS not set, nobody will be granted the admin role");
                    Vec::new()
                }),
            store_backend: parse_or_default("STORE_BACKEND", defaults.store_backend),
            default_package_sessions: parse_or_default(
                "DEFAULT_PACKAGE_SESSIONS",
                defaults.default_package_sessions,
            ),
            slot_duration_minutes: parse_or_default(
                "SLOT_DURATION_MINUTES",
                defaults.slot_duration_minutes,
            ),
            completed_deletion_policy: parse_or_default(
                "COMPLETED_DELETION_POLICY",
                defaults.completed_deletion_policy,
            ),
            port: parse_or_default("PORT", defaults.port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        let auth_ready = !self.supabase_jwt_secret.is_empty();
        match self.store_backend {
            StoreBackend::Memory => auth_ready,
            StoreBackend::Supabase => {
                auth_ready
                    && !self.supabase_url.is_empty()
                    && !self.supabase_service_key.is_empty()
            }
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{} has invalid value {:?} ({}), using default {:?}", key, raw, e, default);
            default
        }),
        Err(_) => default,
    }
}
