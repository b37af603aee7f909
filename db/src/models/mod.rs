pub mod attendance_record;
pub mod attendance_window;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_window::Entity as AttendanceWindow;
