//! Accepted attendance submissions and the submission decision core.
//!
//! A record is created exactly once per accepted submission and never updated
//! or deleted here. The duplicate guard is authoritatively enforced by the
//! UNIQUE index over `(roll_number, event, device_id)`; the pre-insert lookup
//! in [`Model::submit`] is only a fast path.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, Set, SqlErr};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use util::geo::{self, Coordinate};

use super::attendance_window;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_name: String,
    pub roll_number: String,
    pub section: Section,
    pub event: Event,
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Student sections that can mark attendance.
#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_section")]
pub enum Section {
    #[sea_orm(string_value = "CSAI-1")]
    #[strum(serialize = "CSAI-1")]
    #[serde(rename = "CSAI-1")]
    Csai1,

    #[sea_orm(string_value = "CSAI-2")]
    #[strum(serialize = "CSAI-2")]
    #[serde(rename = "CSAI-2")]
    Csai2,

    #[sea_orm(string_value = "CSAI-3")]
    #[strum(serialize = "CSAI-3")]
    #[serde(rename = "CSAI-3")]
    Csai3,

    #[sea_orm(string_value = "CSAI-4")]
    #[strum(serialize = "CSAI-4")]
    #[serde(rename = "CSAI-4")]
    Csai4,
}

/// Campus events attendance can be marked for.
#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_event")]
pub enum Event {
    #[sea_orm(string_value = "Technical Training")]
    #[strum(serialize = "Technical Training")]
    #[serde(rename = "Technical Training")]
    TechnicalTraining,

    #[sea_orm(string_value = "Verbal Lecture")]
    #[strum(serialize = "Verbal Lecture")]
    #[serde(rename = "Verbal Lecture")]
    VerbalLecture,

    #[sea_orm(string_value = "Aptitude Lecture")]
    #[strum(serialize = "Aptitude Lecture")]
    #[serde(rename = "Aptitude Lecture")]
    AptitudeLecture,

    #[sea_orm(string_value = "CDC Event")]
    #[strum(serialize = "CDC Event")]
    #[serde(rename = "CDC Event")]
    CdcEvent,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Why a submission attempt was rejected. Each variant is scoped to a single
/// attempt; none is fatal to the process.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// A required field is missing; the user corrects their input.
    #[error("{0}")]
    Validation(String),

    /// Outside the configured window; carries the evaluator's message.
    #[error("{0}")]
    WindowClosed(String),

    /// The geolocation collaborator produced no coordinate.
    #[error("Unable to determine your location. Please enable location access and try again.")]
    LocationUnavailable,

    /// A valid coordinate outside the geofence; recoverable by moving closer.
    #[error("{message}")]
    OutOfRange { distance_m: i64, message: String },

    /// Same device already submitted for this student and event.
    #[error("You have already marked attendance for this event from this device.")]
    Duplicate,

    /// The storage write failed for a reason other than a uniqueness conflict.
    #[error("Failed to record attendance: {0}")]
    Persistence(#[from] DbErr),
}

/// A transient submission attempt. Exists only for the duration of one
/// decision; nothing is persisted unless the attempt is accepted.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub student_name: String,
    pub roll_number: String,
    pub section: Section,
    pub event: Event,
    pub device_id: String,
    pub location: Option<Coordinate>,
}

impl Model {
    /// The per-attempt duplicate scope key: student x event x device.
    pub fn scope_key(roll_number: &str, event: &Event, device_id: &str) -> String {
        format!("{roll_number}_{event}_{device_id}")
    }

    /// Fast-path duplicate lookup. The UNIQUE index remains the authority.
    pub async fn find_duplicate(
        db: &DatabaseConnection,
        roll_number: &str,
        event: &Event,
        device_id: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::RollNumber.eq(roll_number))
            .filter(Column::Event.eq(event.clone()))
            .filter(Column::DeviceId.eq(device_id))
            .one(db)
            .await
    }

    /// The submission decision core. Applies, in order: required-field check,
    /// attendance window, geolocation presence, geofence, duplicate guard,
    /// and finally the persisted insert. The first failing step
    /// short-circuits; persistence is always last, so a rejected attempt
    /// leaves no partial state behind.
    pub async fn submit(
        db: &DatabaseConnection,
        attempt: NewSubmission,
        now: DateTime<Utc>,
    ) -> Result<Model, SubmissionError> {
        let student_name = attempt.student_name.trim();
        let roll_number = attempt.roll_number.trim();
        let device_id = attempt.device_id.trim();

        if student_name.is_empty() || roll_number.is_empty() || device_id.is_empty() {
            return Err(SubmissionError::Validation(
                "Student name, roll number and device id are required".into(),
            ));
        }

        let config = attendance_window::Model::current(db).await?;
        let status = attendance_window::Model::status(config.as_ref(), now);
        if !status.allowed {
            return Err(SubmissionError::WindowClosed(status.message));
        }

        let observed = attempt
            .location
            .ok_or(SubmissionError::LocationUnavailable)?;

        let check = geo::validate_location(observed);
        if !check.is_valid {
            return Err(SubmissionError::OutOfRange {
                distance_m: check.distance_m,
                message: check.message,
            });
        }

        if Self::find_duplicate(db, roll_number, &attempt.event, device_id)
            .await?
            .is_some()
        {
            return Err(SubmissionError::Duplicate);
        }

        let am = ActiveModel {
            student_name: Set(student_name.to_owned()),
            roll_number: Set(roll_number.to_owned()),
            section: Set(attempt.section),
            event: Set(attempt.event.clone()),
            device_id: Set(device_id.to_owned()),
            latitude: Set(observed.latitude),
            longitude: Set(observed.longitude),
            location_name: Set(Some("Campus Location".to_owned())),
            created_at: Set(now),
            ..Default::default()
        };

        let record = am.insert(db).await.map_err(Self::map_insert_error)?;
        tracing::info!(
            scope_key = %Self::scope_key(&record.roll_number, &record.event, &record.device_id),
            "attendance recorded"
        );
        Ok(record)
    }

    /// Two attempts with the same scope key can race past the fast-path
    /// lookup; the index conflict is still reported as a duplicate.
    fn map_insert_error(e: DbErr) -> SubmissionError {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => SubmissionError::Duplicate,
            _ => SubmissionError::Persistence(e),
        }
    }
}
