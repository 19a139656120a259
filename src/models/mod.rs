pub mod resume;
pub mod score;

pub use resume::{Education, Experience, PersonalInfo, Project, ResumeDocument};
pub use score::{ScoreBreakdown, ScoreResult};
