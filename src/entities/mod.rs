//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attendance;
pub mod fee;
pub mod grade;
pub mod subject;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use attendance::{
    Column as AttendanceColumn, Entity as Attendance, Model as AttendanceModel,
};
pub use fee::{Column as FeeColumn, Entity as Fee, Model as FeeModel};
pub use grade::{Column as GradeColumn, Entity as Grade, Model as GradeModel};
pub use subject::{Column as SubjectColumn, Entity as Subject, Model as SubjectModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
