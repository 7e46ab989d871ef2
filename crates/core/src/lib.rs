pub mod calendar;
pub mod classify;
pub mod models;

pub use calendar::{
    active_holidays, active_season, default_cultural_preferences, glossary, regional_customs,
    BilingualText, GlossaryTerm, Holiday, HolidayCategory, RegionalCustom, Season,
};
pub use classify::{detect_flow, detect_mood, extract_keywords, extract_topic};
pub use models::*;
