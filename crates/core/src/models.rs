use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of interactions kept per session; older entries are evicted
/// FIFO while `total_interactions` keeps counting.
pub const MAX_HISTORY: usize = 50;

/// Rolling cap on the keyword window carried in `ConversationContext`.
pub const MAX_RECENT_KEYWORDS: usize = 10;

/// Cap on the topic trail carried in `ConversationContext`.
pub const MAX_PREVIOUS_TOPICS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    En,
    Ar,
}

impl Locale {
    /// The locale set is closed; anything unrecognized fails closed to English.
    pub fn from_optional_str(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "ar" || v == "arabic" || v.starts_with("ar-") => Self::Ar,
            _ => Self::En,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::En
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelType {
    Family,
    Religious,
    Cultural,
    Business,
    #[default]
    Leisure,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown travel type: {0}")]
pub struct ParseTravelTypeError(String);

impl FromStr for TravelType {
    type Err = ParseTravelTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "family" => Ok(Self::Family),
            "religious" => Ok(Self::Religious),
            "cultural" => Ok(Self::Cultural),
            "business" => Ok(Self::Business),
            "leisure" => Ok(Self::Leisure),
            other => Err(ParseTravelTypeError(other.to_string())),
        }
    }
}

/// `Curious` and `Frustrated` are valid session states but are never produced
/// by the lexical rules; they are reachable only through imports or direct
/// context writes from an external affect source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Excited,
    Curious,
    Concerned,
    #[default]
    Neutral,
    Frustrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationFlow {
    #[default]
    Greeting,
    InformationGathering,
    Recommendation,
    Booking,
    FollowUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Accommodation,
    Food,
    Transportation,
    Activities,
    Weather,
    Budget,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CulturalSensitivity {
    Low,
    #[default]
    Standard,
    High,
}

/// Boolean bias flags influencing recommendation style. Seeded from locale at
/// session creation, mutable thereafter via explicit merges only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CulturalPreferences {
    pub family_friendly: bool,
    pub conservative_dress: bool,
    pub ramadan_aware: bool,
    pub hajj_season_aware: bool,
    pub gender_separated: bool,
    pub alcohol_free: bool,
    pub friday_prayer_aware: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CulturalPreferencesUpdate {
    pub family_friendly: Option<bool>,
    pub conservative_dress: Option<bool>,
    pub ramadan_aware: Option<bool>,
    pub hajj_season_aware: Option<bool>,
    pub gender_separated: Option<bool>,
    pub alcohol_free: Option<bool>,
    pub friday_prayer_aware: Option<bool>,
}

impl CulturalPreferencesUpdate {
    /// Shallow-merge: fields left as `None` keep their current value.
    pub fn apply(&self, prefs: &mut CulturalPreferences) {
        if let Some(value) = self.family_friendly {
            prefs.family_friendly = value;
        }
        if let Some(value) = self.conservative_dress {
            prefs.conservative_dress = value;
        }
        if let Some(value) = self.ramadan_aware {
            prefs.ramadan_aware = value;
        }
        if let Some(value) = self.hajj_season_aware {
            prefs.hajj_season_aware = value;
        }
        if let Some(value) = self.gender_separated {
            prefs.gender_separated = value;
        }
        if let Some(value) = self.alcohol_free {
            prefs.alcohol_free = value;
        }
        if let Some(value) = self.friday_prayer_aware {
            prefs.friday_prayer_aware = value;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyleTier {
    Budget,
    Comfort,
    Luxury,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Solo,
    Couple,
    Family,
    Friends,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFluency {
    Basic,
    Conversational,
    Fluent,
    Native,
}

/// Free-form traveler profile. Everything is optional-or-empty by default and
/// only changes through explicit update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalPreferences {
    pub display_name: Option<String>,
    pub title: Option<String>,
    pub travel_style: Option<TravelStyleTier>,
    pub group_type: Option<GroupType>,
    pub interests: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub language_fluency: HashMap<String, LanguageFluency>,
    pub frequent_destinations: Vec<String>,
    pub avoided_destinations: Vec<String>,
    pub seasonal_preferences: Vec<String>,
    pub accommodation_preferences: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalPreferencesUpdate {
    pub display_name: Option<String>,
    pub title: Option<String>,
    pub travel_style: Option<TravelStyleTier>,
    pub group_type: Option<GroupType>,
    pub interests: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub language_fluency: Option<HashMap<String, LanguageFluency>>,
    pub frequent_destinations: Option<Vec<String>>,
    pub avoided_destinations: Option<Vec<String>>,
    pub seasonal_preferences: Option<Vec<String>>,
    pub accommodation_preferences: Option<Vec<String>>,
}

impl PersonalPreferencesUpdate {
    /// Shallow-merge: fields left as `None` keep their current value.
    pub fn apply(&self, prefs: &mut PersonalPreferences) {
        if let Some(value) = &self.display_name {
            prefs.display_name = Some(value.clone());
        }
        if let Some(value) = &self.title {
            prefs.title = Some(value.clone());
        }
        if let Some(value) = self.travel_style {
            prefs.travel_style = Some(value);
        }
        if let Some(value) = self.group_type {
            prefs.group_type = Some(value);
        }
        if let Some(value) = &self.interests {
            prefs.interests = value.clone();
        }
        if let Some(value) = &self.dietary_restrictions {
            prefs.dietary_restrictions = value.clone();
        }
        if let Some(value) = &self.language_fluency {
            prefs.language_fluency = value.clone();
        }
        if let Some(value) = &self.frequent_destinations {
            prefs.frequent_destinations = value.clone();
        }
        if let Some(value) = &self.avoided_destinations {
            prefs.avoided_destinations = value.clone();
        }
        if let Some(value) = &self.seasonal_preferences {
            prefs.seasonal_preferences = value.clone();
        }
        if let Some(value) = &self.accommodation_preferences {
            prefs.accommodation_preferences = value.clone();
        }
    }
}

/// Loosely-typed preference snapshot attached to one interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    pub budget: Option<f64>,
    pub duration_days: Option<u32>,
    pub group_size: Option<u32>,
    pub interests: Vec<String>,
}

/// Immutable record of one conversational turn. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelInteraction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub ai_response: String,
    pub language: Locale,
    pub travel_type: TravelType,
    pub mentioned_destinations: Vec<String>,
    pub preference_snapshot: PreferenceSnapshot,
    pub recommended_packages: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

/// Caller-supplied overrides merged permissively over the computed interaction
/// defaults. No validation is performed on these fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionExtra {
    pub travel_type: Option<TravelType>,
    pub mentioned_destinations: Option<Vec<String>>,
    pub preference_snapshot: Option<PreferenceSnapshot>,
    pub recommended_packages: Option<Vec<String>>,
    pub follow_up_questions: Option<Vec<String>>,
}

/// Live classification state, recomputed (not replaced) on every turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub current_topic: Option<Topic>,
    pub previous_topics: Vec<Topic>,
    pub pending_questions: Vec<String>,
    pub user_mood: Mood,
    pub conversation_flow: ConversationFlow,
    pub cultural_sensitivity: CulturalSensitivity,
    pub has_language_mixed: bool,
    pub recent_keywords: Vec<String>,
    pub contextual_hints: Vec<String>,
}

/// One record per session, keyed by the caller-assigned session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMemory {
    pub session_id: String,
    pub preferred_language: Locale,
    pub cultural_preferences: CulturalPreferences,
    pub travel_history: Vec<TravelInteraction>,
    pub personal_preferences: PersonalPreferences,
    pub conversation_context: ConversationContext,
    pub last_interaction: DateTime<Utc>,
    pub total_interactions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_locale_fails_closed_to_english() {
        assert_eq!(Locale::from_optional_str(Some("fr")), Locale::En);
        assert_eq!(Locale::from_optional_str(None), Locale::En);
        assert_eq!(Locale::from_optional_str(Some("ar-SA")), Locale::Ar);
        assert_eq!(Locale::from_optional_str(Some(" Arabic ")), Locale::Ar);
    }

    #[test]
    fn cultural_update_merges_only_supplied_fields() {
        let mut prefs = CulturalPreferences {
            family_friendly: true,
            alcohol_free: true,
            ..Default::default()
        };
        CulturalPreferencesUpdate {
            gender_separated: Some(true),
            ..Default::default()
        }
        .apply(&mut prefs);

        assert!(prefs.gender_separated);
        assert!(prefs.family_friendly);
        assert!(prefs.alcohol_free);
        assert!(!prefs.ramadan_aware);
    }

    #[test]
    fn personal_update_leaves_untouched_fields_alone() {
        let mut prefs = PersonalPreferences {
            display_name: Some("Aisha".to_string()),
            interests: vec!["diving".to_string()],
            ..Default::default()
        };
        PersonalPreferencesUpdate {
            title: Some("Dr.".to_string()),
            frequent_destinations: Some(vec!["Jeddah".to_string()]),
            ..Default::default()
        }
        .apply(&mut prefs);

        assert_eq!(prefs.display_name.as_deref(), Some("Aisha"));
        assert_eq!(prefs.title.as_deref(), Some("Dr."));
        assert_eq!(prefs.interests, vec!["diving".to_string()]);
        assert_eq!(prefs.frequent_destinations, vec!["Jeddah".to_string()]);
    }

    #[test]
    fn interaction_serializes_timestamps_as_iso8601() {
        let interaction = TravelInteraction {
            id: "t-1".to_string(),
            timestamp: "2026-08-23T10:00:00Z".parse().unwrap(),
            user_message: "hello".to_string(),
            ai_response: "hi".to_string(),
            language: Locale::En,
            travel_type: TravelType::default(),
            mentioned_destinations: Vec::new(),
            preference_snapshot: PreferenceSnapshot::default(),
            recommended_packages: Vec::new(),
            follow_up_questions: Vec::new(),
        };

        let value = serde_json::to_value(&interaction).unwrap();
        assert_eq!(value["travel_type"], "leisure");
        assert!(value["timestamp"]
            .as_str()
            .unwrap()
            .starts_with("2026-08-23T10:00:00"));

        let back: TravelInteraction = serde_json::from_value(value).unwrap();
        assert_eq!(back, interaction);
    }
}
