pub mod intent;
pub mod knowledge;
pub mod models;
pub mod selector;
pub mod templates;

pub use intent::{detect_scenario, mentions_report_filing, normalize_text, SCENARIO_RULES};
pub use models::*;
pub use selector::{select, select_response};
