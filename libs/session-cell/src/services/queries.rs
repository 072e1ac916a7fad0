use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::models::{DashboardStats, Session, SessionError, SessionStatus};
use crate::services::store::SessionStore;

/// Read-side calendar queries. Each takes an explicit reference date so the
/// caller decides what "today" is.
#[derive(Clone)]
pub struct SessionQueries {
    sessions: Arc<dyn SessionStore>,
}

impl SessionQueries {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn get(&self, session_id: Uuid) -> Result<Session, SessionError> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or(SessionError::SessionNotFound(session_id))
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Session>, SessionError> {
        Ok(self.sessions.list_by_date(date).await?)
    }

    pub async fn list_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Session>, SessionError> {
        if from > to {
            return Err(SessionError::ValidationError(format!(
                "Range start {} is after range end {}",
                from, to
            )));
        }
        Ok(self.sessions.list_by_date_range(from, to).await?)
    }

    pub async fn list_by_therapist(&self, therapist_id: Uuid) -> Result<Vec<Session>, SessionError> {
        Ok(self.sessions.list_by_therapist(therapist_id).await?)
    }

    pub async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Session>, SessionError> {
        Ok(self.sessions.list_by_patient(patient_id).await?)
    }

    pub async fn today(&self, today: NaiveDate) -> Result<Vec<Session>, SessionError> {
        self.list_by_date(today).await
    }

    pub async fn week(&self, reference: NaiveDate) -> Result<Vec<Session>, SessionError> {
        let (from, to) = week_bounds(reference);
        self.list_by_date_range(from, to).await
    }

    pub async fn month(&self, reference: NaiveDate) -> Result<Vec<Session>, SessionError> {
        let (from, to) = month_bounds(reference)?;
        self.list_by_date_range(from, to).await
    }

    pub async fn dashboard_stats(&self, reference: NaiveDate) -> Result<DashboardStats, SessionError> {
        let today = self.today(reference).await?;
        let week = self.week(reference).await?;
        let month = self.month(reference).await?;

        Ok(DashboardStats {
            today_sessions: today.iter().filter(|s| s.holds_slot()).count(),
            today_completed: count_status(&today, SessionStatus::Completed),
            week_sessions: week.iter().filter(|s| s.holds_slot()).count(),
            month_completed: count_status(&month, SessionStatus::Completed),
        })
    }
}

fn count_status(sessions: &[Session], status: SessionStatus) -> usize {
    sessions.iter().filter(|s| s.status == status).count()
}

/// Monday through Sunday around `reference`.
pub fn week_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = reference - Duration::days(i64::from(reference.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

pub fn month_bounds(reference: NaiveDate) -> Result<(NaiveDate, NaiveDate), SessionError> {
    let first = reference
        .with_day(1)
        .ok_or_else(|| SessionError::InvalidDate(reference.to_string()))?;
    let next_first = if reference.month() == 12 {
        NaiveDate::from_ymd_opt(reference.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(reference.year(), reference.month() + 1, 1)
    }
    .ok_or_else(|| SessionError::InvalidDate(reference.to_string()))?;

    Ok((first, next_first - Duration::days(1)))
}
