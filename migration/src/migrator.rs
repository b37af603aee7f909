use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202608300001_create_attendance_records::Migration),
            Box::new(migrations::m202608300002_create_attendance_settings::Migration),
        ]
    }
}
