pub mod suggest;

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use rihla_core::{
    calendar, classify, ConversationContext, ConversationMemory, CulturalPreferencesUpdate,
    CulturalSensitivity, InteractionExtra, Locale, PersonalPreferences, PersonalPreferencesUpdate,
    TravelInteraction, TravelType, MAX_HISTORY, MAX_PREVIOUS_TOPICS, MAX_RECENT_KEYWORDS,
};
use rihla_observability::AppMetrics;
use rihla_storage::{SessionTable, SnapshotRepository};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Owns the per-session conversation memories. One instance per process,
/// constructed with an injected snapshot backend; there is no hidden
/// singleton, so tests instantiate isolated engines freely.
///
/// Persistence is best-effort: the whole session table is loaded once at
/// construction and rewritten after every mutating call. A failing backend
/// degrades to in-memory-only operation and is never surfaced to callers.
pub struct MemoryEngine<S>
where
    S: SnapshotRepository,
{
    sessions: RwLock<SessionTable>,
    backend: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> MemoryEngine<S>
where
    S: SnapshotRepository,
{
    pub async fn load(backend: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        let sessions = match backend.load_all().await {
            Ok(table) => {
                info!(sessions = table.len(), "session snapshot loaded");
                table
            }
            Err(error) => {
                metrics.inc_persist_failure();
                warn!(%error, "failed loading session snapshot, starting empty");
                SessionTable::new()
            }
        };

        Self {
            sessions: RwLock::new(sessions),
            backend,
            metrics,
        }
    }

    /// Returns the existing record for `session_id` or registers a new one
    /// seeded from locale defaults. Idempotent: the locale argument is
    /// ignored for sessions that already exist.
    pub async fn get_or_create_memory(
        &self,
        session_id: &str,
        locale: Locale,
    ) -> ConversationMemory {
        let (memory, created) = {
            let mut guard = self.sessions.write();
            let created = !guard.contains_key(session_id);
            let memory = guard
                .entry(session_id.to_string())
                .or_insert_with(|| new_memory(session_id, locale))
                .clone();
            (memory, created)
        };

        if created {
            self.metrics.inc_session_created();
            self.persist().await;
        }

        memory
    }

    /// Records one conversational turn: appends the interaction (caller
    /// `extra` fields win over computed defaults), bumps the lifetime
    /// counter, evicts history FIFO past `MAX_HISTORY`, and refreshes the
    /// conversation context from the classifier.
    #[instrument(skip(self, user_message, ai_response, extra))]
    pub async fn add_interaction(
        &self,
        session_id: &str,
        user_message: &str,
        ai_response: &str,
        language: Locale,
        extra: Option<InteractionExtra>,
    ) -> TravelInteraction {
        self.metrics.inc_interaction();

        let (interaction, created) = {
            let mut guard = self.sessions.write();
            let created = !guard.contains_key(session_id);
            let memory = guard
                .entry(session_id.to_string())
                .or_insert_with(|| new_memory(session_id, language));

            let interaction = build_interaction(user_message, ai_response, language, extra);
            memory.travel_history.push(interaction.clone());
            if memory.travel_history.len() > MAX_HISTORY {
                let keep_from = memory.travel_history.len() - MAX_HISTORY;
                memory.travel_history = memory.travel_history.split_off(keep_from);
            }
            memory.total_interactions += 1;
            memory.last_interaction = interaction.timestamp;
            update_context(memory, user_message, language);

            (interaction, created)
        };

        if created {
            self.metrics.inc_session_created();
        }
        self.persist().await;

        info!(
            session_id,
            locale = language.as_code(),
            "interaction recorded"
        );

        interaction
    }

    /// Shallow-merges the update over the stored profile, creating the
    /// session with defaults first when it does not yet exist.
    pub async fn update_personal_preferences(
        &self,
        session_id: &str,
        update: PersonalPreferencesUpdate,
    ) {
        {
            let mut guard = self.sessions.write();
            let memory = guard
                .entry(session_id.to_string())
                .or_insert_with(|| new_memory(session_id, Locale::En));
            update.apply(&mut memory.personal_preferences);
        }
        self.persist().await;
    }

    pub async fn update_cultural_preferences(
        &self,
        session_id: &str,
        update: CulturalPreferencesUpdate,
    ) {
        {
            let mut guard = self.sessions.write();
            let memory = guard
                .entry(session_id.to_string())
                .or_insert_with(|| new_memory(session_id, Locale::En));
            update.apply(&mut memory.cultural_preferences);
        }
        self.persist().await;
    }

    /// The last `count` interactions in chronological order, fewer when the
    /// history is shorter.
    pub fn recent_interactions(&self, session_id: &str, count: usize) -> Vec<TravelInteraction> {
        let guard = self.sessions.read();
        let Some(memory) = guard.get(session_id) else {
            return Vec::new();
        };
        let skip = memory.travel_history.len().saturating_sub(count);
        memory.travel_history[skip..].to_vec()
    }

    pub fn export_memory(&self, session_id: &str) -> Option<ConversationMemory> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Restores a full record, overwriting any existing record for that
    /// session id.
    pub async fn import_memory(&self, memory: ConversationMemory) {
        self.metrics.inc_import();
        {
            let mut guard = self.sessions.write();
            guard.insert(memory.session_id.clone(), memory);
        }
        self.persist().await;
    }

    pub async fn clear_memory(&self, session_id: &str) {
        let removed = { self.sessions.write().remove(session_id).is_some() };
        if removed {
            self.persist().await;
            info!(session_id, "session cleared");
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn personalized_greeting(&self, session_id: &str, locale: Locale) -> String {
        let guard = self.sessions.read();
        suggest::personalized_greeting(guard.get(session_id), locale)
    }

    pub fn contextual_suggestions(&self, session_id: &str, locale: Locale) -> Vec<String> {
        let guard = self.sessions.read();
        suggest::contextual_suggestions(guard.get(session_id), locale)
    }

    async fn persist(&self) {
        let snapshot = { self.sessions.read().clone() };
        if let Err(error) = self.backend.save_all(&snapshot).await {
            self.metrics.inc_persist_failure();
            warn!(%error, "failed persisting session snapshot");
        }
    }
}

fn new_memory(session_id: &str, locale: Locale) -> ConversationMemory {
    ConversationMemory {
        session_id: session_id.to_string(),
        preferred_language: locale,
        cultural_preferences: calendar::default_cultural_preferences(locale),
        travel_history: Vec::new(),
        personal_preferences: PersonalPreferences::default(),
        conversation_context: ConversationContext {
            cultural_sensitivity: match locale {
                Locale::Ar => CulturalSensitivity::High,
                Locale::En => CulturalSensitivity::Standard,
            },
            ..ConversationContext::default()
        },
        last_interaction: Utc::now(),
        total_interactions: 0,
    }
}

fn build_interaction(
    user_message: &str,
    ai_response: &str,
    language: Locale,
    extra: Option<InteractionExtra>,
) -> TravelInteraction {
    let extra = extra.unwrap_or_default();

    TravelInteraction {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        user_message: user_message.to_string(),
        ai_response: ai_response.to_string(),
        language,
        travel_type: extra.travel_type.unwrap_or(TravelType::Leisure),
        mentioned_destinations: extra.mentioned_destinations.unwrap_or_default(),
        preference_snapshot: extra.preference_snapshot.unwrap_or_default(),
        recommended_packages: extra.recommended_packages.unwrap_or_default(),
        follow_up_questions: extra.follow_up_questions.unwrap_or_default(),
    }
}

fn update_context(memory: &mut ConversationMemory, message: &str, language: Locale) {
    if language != memory.preferred_language {
        memory.preferred_language = language;
        // Sticky: once a session has mixed languages it stays flagged.
        memory.conversation_context.has_language_mixed = true;
    }

    let context = &mut memory.conversation_context;

    for keyword in classify::extract_keywords(message, language) {
        if !context.recent_keywords.contains(&keyword) {
            context.recent_keywords.push(keyword);
        }
    }
    if context.recent_keywords.len() > MAX_RECENT_KEYWORDS {
        let keep_from = context.recent_keywords.len() - MAX_RECENT_KEYWORDS;
        context.recent_keywords = context.recent_keywords.split_off(keep_from);
    }

    context.conversation_flow = classify::detect_flow(message, language);
    context.user_mood = classify::detect_mood(message, language);

    let topic = classify::extract_topic(message, language);
    if let Some(previous) = context.current_topic.replace(topic) {
        context.previous_topics.push(previous);
        if context.previous_topics.len() > MAX_PREVIOUS_TOPICS {
            let keep_from = context.previous_topics.len() - MAX_PREVIOUS_TOPICS;
            context.previous_topics = context.previous_topics.split_off(keep_from);
        }
    }
}
