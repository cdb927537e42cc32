//! This file serves as the root for all SeaORM entity modules.
//! The data model covers user accounts with their roles and reporting line,
//! leave requests, daily attendance records and company announcements.

pub mod announcement;
pub mod attendance_record;
pub mod leave_request;
pub mod role;
pub mod user;
pub mod user_role;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::announcement::Entity as Announcement;
    pub use super::attendance_record::Entity as AttendanceRecord;
    pub use super::leave_request::Entity as LeaveRequest;
    pub use super::role::Entity as Role;
    pub use super::user::Entity as User;
    pub use super::user_role::Entity as UserRole;
}
