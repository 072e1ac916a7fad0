// libs/shared/config/src/seed.rs
//
// Default roster and weekly schedules used to bootstrap an empty clinic.

use serde::{Deserialize, Serialize};

/// One recurring weekly window. Times are `HH:MM` wall-clock strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSeed {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
}

impl WindowSeed {
    pub fn new(day_of_week: u8, start_time: &str, end_time: &str) -> Self {
        Self {
            day_of_week,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapistSeed {
    pub name: String,
    pub specialization: String,
    pub color: String,
    /// A therapist whose name contains any of these keywords receives `schedule`.
    pub match_keywords: Vec<String>,
    pub schedule: Vec<WindowSeed>,
}

impl TherapistSeed {
    pub fn matches(&self, therapist_name: &str) -> bool {
        self.match_keywords
            .iter()
            .any(|keyword| therapist_name.contains(keyword.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicSeed {
    pub therapists: Vec<TherapistSeed>,
}

impl ClinicSeed {
    pub fn empty() -> Self {
        Self { therapists: Vec::new() }
    }

    /// Schedule for the first roster entry matching `therapist_name`.
    pub fn schedule_for(&self, therapist_name: &str) -> Option<&[WindowSeed]> {
        self.therapists
            .iter()
            .find(|seed| seed.matches(therapist_name))
            .map(|seed| seed.schedule.as_slice())
    }
}

impl Default for ClinicSeed {
    fn default() -> Self {
        Self {
            therapists: vec![
                TherapistSeed {
                    name: "Krystian Nagaba".to_string(),
                    specialization: "Terapeuta uzależnień".to_string(),
                    color: "#0f766e".to_string(),
                    match_keywords: vec!["Krystian".to_string()],
                    schedule: vec![WindowSeed::new(4, "19:30", "21:00")],
                },
                TherapistSeed {
                    name: "Natalia Pucz".to_string(),
                    specialization: "Terapeutka".to_string(),
                    color: "#7c3aed".to_string(),
                    match_keywords: vec!["Natalia".to_string()],
                    schedule: vec![
                        WindowSeed::new(1, "18:30", "19:30"),
                        WindowSeed::new(4, "16:30", "17:30"),
                    ],
                },
                TherapistSeed {
                    name: "Waldemar Sikorski".to_string(),
                    specialization: "Terapeuta uzależnień".to_string(),
                    color: "#ea580c".to_string(),
                    match_keywords: vec!["Waldemar".to_string(), "Waldek".to_string()],
                    schedule: vec![
                        WindowSeed::new(3, "10:00", "16:00"),
                        WindowSeed::new(4, "08:00", "13:00"),
                        WindowSeed::new(5, "08:00", "13:00"),
                    ],
                },
            ],
        }
    }
}
