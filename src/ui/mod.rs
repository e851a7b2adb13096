pub mod analysis_progress;
pub mod icons;

pub use analysis_progress::{AnalysisUi, UiMode, final_report};
