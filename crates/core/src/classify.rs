//! Lexical intent classification over fixed bilingual keyword tables.
//!
//! Everything here is a pure function of `(message, language)`: no I/O, no
//! failure paths. Unmatched input always falls through to a default. The
//! tables are data on purpose so they can be unit-tested and extended per
//! locale without touching control flow.

use crate::models::{ConversationFlow, Locale, Mood, Topic};

const GREETING_TERMS_EN: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good evening",
];
const GREETING_TERMS_AR: &[&str] = &[
    "مرحبا",
    "اهلا",
    "أهلا",
    "هلا",
    "السلام عليكم",
    "صباح الخير",
    "مساء الخير",
];

const BOOKING_TERMS_EN: &[&str] = &["book", "booking", "reserve", "price", "need", "want", "pay"];
const BOOKING_TERMS_AR: &[&str] = &[
    "احجز", "حجز", "سعر", "أريد", "اريد", "أحتاج", "احتاج", "ادفع",
];

const EXCITED_TERMS_EN: &[&str] = &[
    "excited",
    "amazing",
    "awesome",
    "fantastic",
    "wonderful",
    "love",
];
const EXCITED_TERMS_AR: &[&str] = &["متحمس", "متحمسة", "رائع", "ممتاز", "مذهل", "أحب"];

const CONCERN_TERMS_EN: &[&str] = &[
    "worried",
    "concerned",
    "afraid",
    "scared",
    "nervous",
    "problem",
    "unsafe",
];
const CONCERN_TERMS_AR: &[&str] = &["قلق", "قلقان", "قلقة", "خائف", "خائفة", "مشكلة", "خطير"];

const TRAVEL_TERMS_EN: &[&str] = &[
    "travel",
    "trip",
    "journey",
    "flight",
    "vacation",
    "visa",
    "destination",
];
const TRAVEL_TERMS_AR: &[&str] = &["سفر", "رحلة", "طيران", "تأشيرة", "عطلة", "وجهة"];

const ACCOMMODATION_TERMS_EN: &[&str] = &[
    "hotel",
    "resort",
    "apartment",
    "room",
    "suite",
    "accommodation",
    "stay",
];
const ACCOMMODATION_TERMS_AR: &[&str] = &["فندق", "منتجع", "شقة", "غرفة", "جناح", "إقامة", "سكن"];

const FOOD_TERMS_EN: &[&str] = &[
    "restaurant",
    "food",
    "halal",
    "breakfast",
    "dinner",
    "cuisine",
    "coffee",
];
const FOOD_TERMS_AR: &[&str] = &["مطعم", "طعام", "أكل", "حلال", "فطور", "عشاء", "قهوة"];

const RELIGIOUS_TERMS_EN: &[&str] = &[
    "mosque", "prayer", "ramadan", "hajj", "umrah", "eid", "qibla",
];
const RELIGIOUS_TERMS_AR: &[&str] = &["مسجد", "صلاة", "رمضان", "الحج", "حج", "عمرة", "عيد", "قبلة"];

const FAMILY_TERMS_EN: &[&str] = &["family", "kids", "children", "wife", "husband", "parents"];
const FAMILY_TERMS_AR: &[&str] = &["عائلة", "أطفال", "أولاد", "زوجة", "زوج", "والدي"];

const LOGISTICS_TERMS_EN: &[&str] = &[
    "airport", "taxi", "luggage", "transfer", "schedule", "checkout",
];
const LOGISTICS_TERMS_AR: &[&str] = &["مطار", "تاكسي", "أمتعة", "جدول", "مواصلات"];

const WEATHER_TERMS_EN: &[&str] = &["weather", "temperature", "rain", "heat", "climate"];
const WEATHER_TERMS_AR: &[&str] = &["طقس", "حرارة", "مطر", "مناخ"];

const TRANSPORT_TOPIC_EN: &[&str] = &["flight", "taxi", "bus", "train", "car", "airport", "metro"];
const TRANSPORT_TOPIC_AR: &[&str] = &[
    "طيران",
    "طائرة",
    "تاكسي",
    "حافلة",
    "قطار",
    "سيارة",
    "مطار",
    "مواصلات",
];

const ACTIVITIES_TOPIC_EN: &[&str] = &[
    "activity",
    "activities",
    "tour",
    "museum",
    "beach",
    "shopping",
    "hiking",
    "adventure",
];
const ACTIVITIES_TOPIC_AR: &[&str] = &["نشاط", "أنشطة", "جولة", "متحف", "شاطئ", "تسوق", "مغامرة"];

const BUDGET_TOPIC_EN: &[&str] = &["budget", "cheap", "expensive", "cost", "afford"];
const BUDGET_TOPIC_AR: &[&str] = &["ميزانية", "رخيص", "غالي", "تكلفة"];

/// Intersects the message against the fixed bilingual keyword dictionary and
/// returns the matched subset in dictionary order. The table for the tagged
/// language is consulted first so code-switched messages still match.
pub fn extract_keywords(message: &str, language: Locale) -> Vec<String> {
    let lower = message.to_lowercase();
    let mut matched = Vec::new();

    for table in keyword_dictionary(language) {
        for term in table {
            if term_matches(&lower, term) && !matched.iter().any(|m| m == term) {
                matched.push((*term).to_string());
            }
        }
    }

    matched
}

/// Greeting takes priority over booking; everything else is a recommendation
/// request.
pub fn detect_flow(message: &str, language: Locale) -> ConversationFlow {
    let lower = message.to_lowercase();

    if matches_any(&lower, language, GREETING_TERMS_EN, GREETING_TERMS_AR) {
        return ConversationFlow::Greeting;
    }
    if matches_any(&lower, language, BOOKING_TERMS_EN, BOOKING_TERMS_AR) {
        return ConversationFlow::Booking;
    }

    ConversationFlow::Recommendation
}

pub fn detect_mood(message: &str, language: Locale) -> Mood {
    let lower = message.to_lowercase();

    if matches_any(&lower, language, EXCITED_TERMS_EN, EXCITED_TERMS_AR) {
        return Mood::Excited;
    }
    if matches_any(&lower, language, CONCERN_TERMS_EN, CONCERN_TERMS_AR) {
        return Mood::Concerned;
    }

    Mood::Neutral
}

/// Six topic groups checked in fixed priority order; first match wins.
pub fn extract_topic(message: &str, language: Locale) -> Topic {
    let lower = message.to_lowercase();

    let groups: [(Topic, &[&str], &[&str]); 6] = [
        (
            Topic::Accommodation,
            ACCOMMODATION_TERMS_EN,
            ACCOMMODATION_TERMS_AR,
        ),
        (Topic::Food, FOOD_TERMS_EN, FOOD_TERMS_AR),
        (
            Topic::Transportation,
            TRANSPORT_TOPIC_EN,
            TRANSPORT_TOPIC_AR,
        ),
        (Topic::Activities, ACTIVITIES_TOPIC_EN, ACTIVITIES_TOPIC_AR),
        (Topic::Weather, WEATHER_TERMS_EN, WEATHER_TERMS_AR),
        (Topic::Budget, BUDGET_TOPIC_EN, BUDGET_TOPIC_AR),
    ];

    for (topic, en, ar) in groups {
        if matches_any(&lower, language, en, ar) {
            return topic;
        }
    }

    Topic::General
}

fn keyword_dictionary(language: Locale) -> [&'static [&'static str]; 16] {
    let en: [&'static [&'static str]; 8] = [
        TRAVEL_TERMS_EN,
        ACCOMMODATION_TERMS_EN,
        FOOD_TERMS_EN,
        RELIGIOUS_TERMS_EN,
        FAMILY_TERMS_EN,
        LOGISTICS_TERMS_EN,
        WEATHER_TERMS_EN,
        BUDGET_TOPIC_EN,
    ];
    let ar: [&'static [&'static str]; 8] = [
        TRAVEL_TERMS_AR,
        ACCOMMODATION_TERMS_AR,
        FOOD_TERMS_AR,
        RELIGIOUS_TERMS_AR,
        FAMILY_TERMS_AR,
        LOGISTICS_TERMS_AR,
        WEATHER_TERMS_AR,
        BUDGET_TOPIC_AR,
    ];

    match language {
        Locale::En => [
            en[0], en[1], en[2], en[3], en[4], en[5], en[6], en[7], ar[0], ar[1], ar[2], ar[3],
            ar[4], ar[5], ar[6], ar[7],
        ],
        Locale::Ar => [
            ar[0], ar[1], ar[2], ar[3], ar[4], ar[5], ar[6], ar[7], en[0], en[1], en[2], en[3],
            en[4], en[5], en[6], en[7],
        ],
    }
}

fn matches_any(lower: &str, language: Locale, en: &[&str], ar: &[&str]) -> bool {
    let (first, second) = match language {
        Locale::En => (en, ar),
        Locale::Ar => (ar, en),
    };
    first.iter().chain(second.iter()).any(|term| term_matches(lower, term))
}

/// Single-word terms match on word boundaries so that short English terms like
/// "hi" never fire inside "this"; multi-word terms use plain containment.
fn term_matches(lower: &str, term: &str) -> bool {
    if term.contains(' ') {
        return lower.contains(term);
    }
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_wins_over_booking() {
        assert_eq!(
            detect_flow("hello, I want to book a room", Locale::En),
            ConversationFlow::Greeting
        );
        assert_eq!(
            detect_flow("السلام عليكم، أريد حجز غرفة", Locale::Ar),
            ConversationFlow::Greeting
        );
    }

    #[test]
    fn plain_greeting_scenario() {
        let message = "hello, can you help me plan a trip?";
        assert_eq!(detect_flow(message, Locale::En), ConversationFlow::Greeting);
        assert_eq!(detect_mood(message, Locale::En), Mood::Neutral);
        assert_eq!(extract_topic(message, Locale::En), Topic::General);
    }

    #[test]
    fn weather_question_is_a_recommendation() {
        let message = "What's the weather in Mecca this month?";
        // "this" must not trip the single-word greeting term "hi".
        assert_eq!(
            detect_flow(message, Locale::En),
            ConversationFlow::Recommendation
        );
        assert_eq!(extract_topic(message, Locale::En), Topic::Weather);
        assert!(extract_keywords(message, Locale::En).contains(&"weather".to_string()));
    }

    #[test]
    fn booking_terms_detected_and_expensive_is_not_a_concern_keyword() {
        let message = "I want to book a hotel, it's expensive";
        assert_eq!(detect_flow(message, Locale::En), ConversationFlow::Booking);
        assert!(!CONCERN_TERMS_EN.contains(&"expensive"));
        assert_eq!(detect_mood(message, Locale::En), Mood::Neutral);
        assert_eq!(extract_topic(message, Locale::En), Topic::Accommodation);
    }

    #[test]
    fn arabic_booking_and_mood() {
        assert_eq!(
            detect_flow("اريد حجز فندق في جدة", Locale::Ar),
            ConversationFlow::Booking
        );
        assert_eq!(detect_mood("أنا قلق من الطقس", Locale::Ar), Mood::Concerned);
        assert_eq!(detect_mood("رائع! متى نسافر؟", Locale::Ar), Mood::Excited);
    }

    #[test]
    fn keywords_follow_dictionary_order_and_deduplicate() {
        let keywords = extract_keywords("hotel trip hotel halal", Locale::En);
        assert_eq!(keywords, vec!["trip", "hotel", "halal"]);
    }

    #[test]
    fn mixed_language_message_still_matches_both_tables() {
        let keywords = extract_keywords("book a فندق near the mosque", Locale::En);
        assert!(keywords.contains(&"mosque".to_string()));
        assert!(keywords.contains(&"فندق".to_string()));
    }

    #[test]
    fn topic_priority_prefers_accommodation_over_budget() {
        assert_eq!(
            extract_topic("cheap hotel please", Locale::En),
            Topic::Accommodation
        );
        assert_eq!(extract_topic("cheap please", Locale::En), Topic::Budget);
    }
}
