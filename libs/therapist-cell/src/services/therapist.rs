// libs/therapist-cell/src/services/therapist.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::ClinicSeed;

use crate::models::{
    BootstrapReport, CreateTherapistRequest, Therapist, TherapistError, UpdateTherapistRequest,
};
use crate::services::availability::AvailabilityService;
use crate::services::store::{AvailabilityStore, TherapistStore};

#[derive(Clone)]
pub struct TherapistService {
    therapists: Arc<dyn TherapistStore>,
    windows: Arc<dyn AvailabilityStore>,
}

impl TherapistService {
    pub fn new(therapists: Arc<dyn TherapistStore>, windows: Arc<dyn AvailabilityStore>) -> Self {
        Self { therapists, windows }
    }

    pub async fn list_therapists(&self) -> Result<Vec<Therapist>, TherapistError> {
        Ok(self.therapists.list().await?)
    }

    pub async fn get_therapist(&self, therapist_id: Uuid) -> Result<Therapist, TherapistError> {
        debug!("Fetching therapist: {}", therapist_id);

        self.therapists
            .get(therapist_id)
            .await?
            .ok_or(TherapistError::NotFound(therapist_id))
    }

    pub async fn create_therapist(&self, request: CreateTherapistRequest) -> Result<Therapist, TherapistError> {
        validate_name(&request.name)?;
        validate_color(&request.color)?;

        let therapist = Therapist {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            specialization: request.specialization.trim().to_string(),
            color: request.color,
            avatar_url: request.avatar_url,
            created_at: Utc::now(),
        };

        let created = self.therapists.create(&therapist).await?;
        info!("Therapist {} created: {}", created.id, created.name);
        Ok(created)
    }

    pub async fn update_therapist(
        &self,
        therapist_id: Uuid,
        request: UpdateTherapistRequest,
    ) -> Result<Therapist, TherapistError> {
        let mut therapist = self.get_therapist(therapist_id).await?;

        if let Some(name) = request.name {
            validate_name(&name)?;
            therapist.name = name.trim().to_string();
        }
        if let Some(specialization) = request.specialization {
            therapist.specialization = specialization.trim().to_string();
        }
        if let Some(color) = request.color {
            validate_color(&color)?;
            therapist.color = color;
        }
        if request.avatar_url.is_some() {
            therapist.avatar_url = request.avatar_url;
        }

        self.therapists
            .update(&therapist)
            .await?
            .ok_or(TherapistError::NotFound(therapist_id))
    }

    /// Remove a therapist and every availability window they own. Sessions
    /// keep their denormalized therapist name and are left in place.
    pub async fn delete_therapist(&self, therapist_id: Uuid) -> Result<(), TherapistError> {
        if self.therapists.get(therapist_id).await?.is_none() {
            return Err(TherapistError::NotFound(therapist_id));
        }

        let removed_windows = self.windows.delete_all_windows_for(therapist_id).await?;
        self.therapists.delete(therapist_id).await?;

        info!(
            "Therapist {} deleted along with {} availability windows",
            therapist_id, removed_windows
        );
        Ok(())
    }

    /// Create the default roster when the clinic has no therapists yet, then
    /// give every therapist still lacking a schedule their roster windows.
    pub async fn bootstrap(
        &self,
        seed: &ClinicSeed,
        availability: &AvailabilityService,
    ) -> Result<BootstrapReport, TherapistError> {
        let mut report = BootstrapReport::default();

        if self.therapists.list().await?.is_empty() {
            for entry in &seed.therapists {
                let therapist = Therapist {
                    id: Uuid::new_v4(),
                    name: entry.name.clone(),
                    specialization: entry.specialization.clone(),
                    color: entry.color.clone(),
                    avatar_url: None,
                    created_at: Utc::now(),
                };
                self.therapists.create(&therapist).await?;
                report.therapists_created += 1;
            }
        }

        for therapist in self.therapists.list().await? {
            report.windows_created += availability.ensure_default_schedule(&therapist, seed).await?;
        }

        info!(
            "Clinic bootstrap finished: {} therapists, {} windows created",
            report.therapists_created, report.windows_created
        );
        Ok(report)
    }
}

fn validate_name(name: &str) -> Result<(), TherapistError> {
    if name.trim().is_empty() {
        return Err(TherapistError::ValidationError("Therapist name is required".to_string()));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), TherapistError> {
    let hex = color.strip_prefix('#').unwrap_or_default();
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TherapistError::ValidationError(format!(
            "Colour '{}' must be a #rrggbb hex value",
            color
        )));
    }
    Ok(())
}
