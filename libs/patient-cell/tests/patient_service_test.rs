use std::sync::Arc;

use assert_matches::assert_matches;
use uuid::Uuid;

use patient_cell::services::store::InMemoryPatientStore;
use patient_cell::{
    CreatePatientRequest, PackageBalanceTracker, PatientError, PatientService, PatientStore, UpdatePatientRequest,
};

fn services() -> (PatientService, PackageBalanceTracker, Arc<InMemoryPatientStore>) {
    let store = Arc::new(InMemoryPatientStore::new());
    (
        PatientService::new(store.clone(), 20),
        PackageBalanceTracker::new(store.clone()),
        store,
    )
}

fn request(name: &str, email: Option<&str>) -> CreatePatientRequest {
    CreatePatientRequest {
        name: name.to_string(),
        email: email.map(str::to_string),
        phone: None,
        notes: None,
        total_sessions: None,
        crm_patient_id: None,
    }
}

#[tokio::test]
async fn new_patient_gets_default_package() {
    let (patients, balance, _) = services();

    let patient = patients
        .create_patient(request("Anna Kowalska", Some(" Anna@Example.com ")))
        .await
        .unwrap();

    assert_eq!(patient.email.as_deref(), Some("anna@example.com"));
    assert_eq!(patient.total_sessions, 20);
    assert_eq!(patient.used_sessions, 0);

    let b = balance.balance(patient.id).await.unwrap();
    assert_eq!(b.remaining, 20);
    assert!(!b.exhausted);
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let (patients, _, _) = services();
    patients.create_patient(request("Anna", Some("anna@example.com"))).await.unwrap();

    assert_matches!(
        patients.create_patient(request("Anna K", Some("ANNA@example.com"))).await,
        Err(PatientError::EmailAlreadyExists { .. })
    );
    assert!(patients.find_by_email("Anna@Example.com").await.unwrap().is_some());
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let (patients, _, _) = services();

    assert_matches!(
        patients.create_patient(request("  ", None)).await,
        Err(PatientError::ValidationError(_))
    );
    assert_matches!(
        patients.create_patient(request("Jan", Some("jan@"))).await,
        Err(PatientError::ValidationError(_))
    );
}

#[tokio::test]
async fn decrement_at_zero_stays_zero() {
    let (patients, balance, store) = services();
    let patient = patients.create_patient(request("Jan", None)).await.unwrap();

    balance.decrement_used(patient.id).await.unwrap();
    balance.decrement_used(patient.id).await.unwrap();

    assert_eq!(store.get(patient.id).await.unwrap().unwrap().used_sessions, 0);
}

#[tokio::test]
async fn increment_then_decrement_round_trips() {
    let (patients, balance, _) = services();
    let patient = patients.create_patient(request("Jan", None)).await.unwrap();

    let after_inc = balance.increment_used(patient.id).await.unwrap().unwrap();
    assert_eq!(after_inc.used_sessions, 1);

    let after_dec = balance.decrement_used(patient.id).await.unwrap().unwrap();
    assert_eq!(after_dec.used_sessions, 0);
}

#[tokio::test]
async fn adjusting_missing_patient_is_skipped() {
    let (_, balance, _) = services();

    assert!(balance.increment_used(Uuid::new_v4()).await.unwrap().is_none());
    assert!(balance.decrement_used(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn lowering_package_below_usage_reads_as_exhausted() {
    let (patients, balance, _) = services();
    let patient = patients.create_patient(request("Jan", None)).await.unwrap();
    for _ in 0..4 {
        balance.increment_used(patient.id).await.unwrap();
    }

    patients
        .update_patient(
            patient.id,
            UpdatePatientRequest {
                total_sessions: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let b = balance.balance(patient.id).await.unwrap();
    assert_eq!(b.remaining, -1);
    assert!(b.exhausted);

    let summary = balance.package_summary().await.unwrap();
    assert_eq!(summary.total_patients, 1);
    assert_eq!(summary.exhausted_packages, 1);
    assert_eq!(summary.active_packages, 0);
}

#[tokio::test]
async fn history_and_delete() {
    let (patients, _, store) = services();
    let patient = patients.create_patient(request("Jan", None)).await.unwrap();
    let session_id = Uuid::new_v4();

    patients.append_history(patient.id, session_id).await;
    assert_eq!(store.get(patient.id).await.unwrap().unwrap().sessions_history, vec![session_id]);

    patients.delete_patient(patient.id).await.unwrap();
    assert_matches!(patients.get_patient(patient.id).await, Err(PatientError::NotFound(_)));
    assert_matches!(patients.delete_patient(patient.id).await, Err(PatientError::NotFound(_)));
}
