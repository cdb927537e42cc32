pub mod announcement;
pub mod attendance;
pub mod directory;
pub mod error;
pub mod identity;
pub mod leave;
pub mod password;
pub mod seed;

pub use announcement::AnnouncementBoard;
pub use attendance::AttendanceTracker;
pub use directory::UserDirectory;
pub use error::{OfficeError, Result};
pub use identity::{Caller, RoleName};
pub use leave::{Authority, LeaveWorkflow};

/// The office services an HTTP request can reach, configured once at startup.
#[derive(Debug, Default)]
pub struct Office {
    pub directory: UserDirectory,
    pub leave: LeaveWorkflow,
    pub attendance: AttendanceTracker,
    pub announcements: AnnouncementBoard,
}

impl Office {
    /// Builds the services with the given attendance rules and defaults for the rest.
    pub fn new(attendance: AttendanceTracker) -> Self {
        Self {
            attendance,
            ..Default::default()
        }
    }
}
