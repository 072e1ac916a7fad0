use async_trait::async_trait;
use tracing::info;

use crate::models::Session;

/// Hook for side effects that follow a committed booking, such as the
/// confirmation email or the CRM contact push.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionObserver: Send + Sync {
    async fn session_created(&self, session: &Session) -> anyhow::Result<()>;
}

pub struct LoggingObserver;

#[async_trait]
impl SessionObserver for LoggingObserver {
    async fn session_created(&self, session: &Session) -> anyhow::Result<()> {
        info!(
            session_id = %session.id,
            patient = %session.patient_name,
            therapist = %session.therapist_name,
            "Session booked for {} {}-{}",
            session.date,
            session.start_time,
            session.end_time
        );
        Ok(())
    }
}
