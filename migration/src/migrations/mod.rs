pub mod m202608300001_create_attendance_records;
pub mod m202608300002_create_attendance_settings;
