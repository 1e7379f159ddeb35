pub mod report;
pub mod review;
pub mod summary;
pub mod target;
pub mod user;

pub use report::{NewReport, Report, ReportStatus, ReportTargetType};
pub use review::{Feedback, FeedbackWithReviewer, FeedbackWithTarget, NewFeedback, Rating};
pub use summary::Summary;
pub use target::{TargetKind, TargetRef};
pub use user::{AuthenticatedUser, ReviewerProfile, Role};
