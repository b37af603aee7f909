//! The administrator-configured daily attendance window.
//!
//! A single `attendance_settings` row is authoritative at any moment (the most
//! recently created one). Opening and closing bounds are stored as `HH:MM:SS`
//! strings and compared lexically against the current time-of-day, so a window
//! never crosses midnight; a configuration with `closing_time < opening_time`
//! is never satisfiable and is only warned about, not reinterpreted.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `HH:MM:SS`, inclusive lower bound.
    pub opening_time: String,
    /// `HH:MM:SS`, inclusive upper bound.
    pub closing_time: String,
    pub is_enabled: bool,
    /// JWT subject of the administrator who first configured the window.
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Result of evaluating the window against a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct WindowStatus {
    pub allowed: bool,
    pub message: String,
}

impl Model {
    /// Fetches the authoritative window configuration, if any.
    pub async fn current(db: &DatabaseConnection) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    /// Evaluates whether submissions are allowed at `now` (UTC time-of-day).
    pub fn status(config: Option<&Model>, now: DateTime<Utc>) -> WindowStatus {
        let Some(cfg) = config else {
            return WindowStatus {
                allowed: false,
                message: "Attendance settings not configured".into(),
            };
        };

        if !cfg.is_enabled {
            return WindowStatus {
                allowed: false,
                message: "Attendance is currently disabled".into(),
            };
        }

        let current_time = now.format("%H:%M:%S").to_string();

        if current_time >= cfg.opening_time && current_time <= cfg.closing_time {
            WindowStatus {
                allowed: true,
                message: format!("Attendance is open until {}", cfg.closing_time),
            }
        } else if current_time < cfg.opening_time {
            WindowStatus {
                allowed: false,
                message: format!("Attendance opens at {}", cfg.opening_time),
            }
        } else {
            WindowStatus {
                allowed: false,
                message: format!("Attendance closed at {}", cfg.closing_time),
            }
        }
    }

    /// Administrator-only mutation: inserts the first-ever configuration
    /// (attributed to `admin_id`) or updates the existing one in place.
    /// Exactly one of the two paths runs per call.
    pub async fn set_window(
        db: &DatabaseConnection,
        admin_id: i64,
        opening_time: &str,
        closing_time: &str,
        is_enabled: bool,
    ) -> Result<Model, DbErr> {
        if closing_time < opening_time {
            tracing::warn!(
                opening_time,
                closing_time,
                "closing_time precedes opening_time; this window admits no submissions"
            );
        }

        let now = Utc::now();

        match Self::current(db).await? {
            None => {
                let am = ActiveModel {
                    opening_time: Set(opening_time.to_owned()),
                    closing_time: Set(closing_time.to_owned()),
                    is_enabled: Set(is_enabled),
                    created_by: Set(admin_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                am.insert(db).await
            }
            Some(existing) => {
                let mut am: ActiveModel = existing.into();
                am.opening_time = Set(opening_time.to_owned());
                am.closing_time = Set(closing_time.to_owned());
                am.is_enabled = Set(is_enabled);
                am.updated_at = Set(now);
                am.update(db).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window(opening: &str, closing: &str, enabled: bool) -> Model {
        Model {
            id: 1,
            opening_time: opening.into(),
            closing_time: closing.into(),
            is_enabled: enabled,
            created_by: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 30, h, m, s).unwrap()
    }

    #[test]
    fn unconfigured_is_never_allowed() {
        let status = Model::status(None, at(12, 0, 0));
        assert!(!status.allowed);
        assert_eq!(status.message, "Attendance settings not configured");
    }

    #[test]
    fn disabled_is_never_allowed_regardless_of_time() {
        let cfg = window("09:00:00", "17:00:00", false);
        for now in [at(8, 0, 0), at(12, 0, 0), at(18, 0, 0)] {
            let status = Model::status(Some(&cfg), now);
            assert!(!status.allowed);
            assert_eq!(status.message, "Attendance is currently disabled");
        }
    }

    #[test]
    fn boundaries_are_inclusive() {
        let cfg = window("09:00:00", "17:00:00", true);

        let opening = Model::status(Some(&cfg), at(9, 0, 0));
        assert!(opening.allowed);
        assert_eq!(opening.message, "Attendance is open until 17:00:00");

        let closing = Model::status(Some(&cfg), at(17, 0, 0));
        assert!(closing.allowed);
    }

    #[test]
    fn just_outside_boundaries_is_rejected() {
        let cfg = window("09:00:00", "17:00:00", true);

        let early = Model::status(Some(&cfg), at(8, 59, 59));
        assert!(!early.allowed);
        assert_eq!(early.message, "Attendance opens at 09:00:00");

        let late = Model::status(Some(&cfg), at(17, 0, 1));
        assert!(!late.allowed);
        assert_eq!(late.message, "Attendance closed at 17:00:00");
    }

    #[test]
    fn inverted_window_admits_nothing() {
        // closing < opening cannot be satisfied by a same-day time-of-day.
        let cfg = window("17:00:00", "09:00:00", true);
        for now in [at(8, 0, 0), at(12, 0, 0), at(18, 0, 0)] {
            assert!(!Model::status(Some(&cfg), now).allowed);
        }
    }

    #[tokio::test]
    async fn set_window_inserts_then_updates_in_place() {
        let db = crate::test_utils::setup_test_db().await;

        let created = Model::set_window(&db, 7, "09:00:00", "17:00:00", true)
            .await
            .unwrap();
        assert_eq!(created.created_by, 7);
        assert_eq!(created.opening_time, "09:00:00");

        let updated = Model::set_window(&db, 9, "10:00:00", "16:00:00", false)
            .await
            .unwrap();
        // Update path keeps the row (and its original attribution).
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_by, 7);
        assert_eq!(updated.opening_time, "10:00:00");
        assert!(!updated.is_enabled);

        let count = Entity::find().all(&db).await.unwrap().len();
        assert_eq!(count, 1);
    }
}
