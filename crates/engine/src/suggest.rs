//! Greeting and follow-up suggestion derivation from accumulated memory.
//! Read-only: nothing here mutates a session.

use rihla_core::{ConversationMemory, Locale};

const MAX_SUGGESTIONS: usize = 3;

const ACCOMMODATION_HINTS: &[&str] = &[
    "hotel",
    "resort",
    "apartment",
    "room",
    "suite",
    "accommodation",
    "stay",
    "فندق",
    "منتجع",
    "شقة",
    "غرفة",
    "جناح",
    "إقامة",
    "سكن",
];

const CULTURAL_INTERESTS: &[&str] = &[
    "culture",
    "cultural",
    "heritage",
    "history",
    "museums",
    "ثقافة",
    "تراث",
    "تاريخ",
];

/// Generic bilingual welcome for brand-new sessions; a "welcome back" variant
/// once the session has recorded interactions, name-inclusive when the
/// traveler profile carries one.
pub fn personalized_greeting(memory: Option<&ConversationMemory>, locale: Locale) -> String {
    let Some(memory) = memory.filter(|m| m.total_interactions > 0) else {
        return match locale {
            Locale::En => {
                "Welcome! I'm your travel assistant. How can I help you plan your next trip?"
                    .to_string()
            }
            Locale::Ar => {
                "أهلا وسهلا! أنا مساعد السفر الخاص بك. كيف أساعدك في التخطيط لرحلتك القادمة؟"
                    .to_string()
            }
        };
    };

    let prefs = &memory.personal_preferences;
    if let Some(name) = prefs.display_name.as_deref() {
        let styled = match prefs.title.as_deref() {
            Some(title) => format!("{title} {name}"),
            None => name.to_string(),
        };
        return match locale {
            Locale::En => format!("Welcome back, {styled}! Shall we pick up where we left off?"),
            Locale::Ar => format!("أهلا بعودتك يا {styled}! هل نكمل من حيث توقفنا؟"),
        };
    }

    match locale {
        Locale::En => "Welcome back! Ready to continue planning your trip?".to_string(),
        Locale::Ar => "أهلا بعودتك! هل نكمل التخطيط لرحلتك؟".to_string(),
    }
}

/// Up to three follow-up prompts, in fixed priority order: recent
/// accommodation keywords, a cultural interest in the profile, then a
/// non-empty frequent-destinations list.
pub fn contextual_suggestions(memory: Option<&ConversationMemory>, locale: Locale) -> Vec<String> {
    let Some(memory) = memory else {
        return Vec::new();
    };

    let mut suggestions = Vec::new();

    let keywords = &memory.conversation_context.recent_keywords;
    if keywords
        .iter()
        .any(|keyword| ACCOMMODATION_HINTS.contains(&keyword.as_str()))
    {
        suggestions.push(match locale {
            Locale::En => {
                "Would you like a shortlist of stays that match your preferences?".to_string()
            }
            Locale::Ar => "هل تود قائمة مختصرة بأماكن إقامة تناسب تفضيلاتك؟".to_string(),
        });
    }

    let interests = &memory.personal_preferences.interests;
    if interests.iter().any(|interest| {
        let lower = interest.to_lowercase();
        CULTURAL_INTERESTS.contains(&lower.as_str())
    }) {
        suggestions.push(match locale {
            Locale::En => {
                "There are heritage sites and cultural tours I can line up for you.".to_string()
            }
            Locale::Ar => "هناك مواقع تراثية وجولات ثقافية يمكنني ترتيبها لك.".to_string(),
        });
    }

    if let Some(destination) = memory.personal_preferences.frequent_destinations.first() {
        suggestions.push(match locale {
            Locale::En => format!("Planning another visit to {destination}?"),
            Locale::Ar => format!("هل تخطط لزيارة أخرى إلى {destination}؟"),
        });
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
