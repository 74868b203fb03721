use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::api::gemini::{Content, GeminiClient};
use crate::db::DocumentStore;
use crate::error::AssistantError;
use crate::format::{format_box_score, format_play_by_play};
use crate::models::{BoxScoreSnapshot, LiveGameSet};

const NO_DATA: &str = "No live game data is currently available.";

/// One earlier turn of the conversation, as sent by the front end
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    /// "user" or "model" ("assistant" is accepted as "model")
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// Restrict the context to one game; all live games otherwise
    pub game_id: Option<String>,
}

/// Stateless chat proxy that prefixes the prompt with stored game data
#[derive(Clone)]
pub struct Assistant {
    gemini: Option<GeminiClient>,
    store: DocumentStore,
    live_games: LiveGameSet,
}

impl Assistant {
    pub fn new(
        gemini: Option<GeminiClient>,
        store: DocumentStore,
        live_games: LiveGameSet,
    ) -> Self {
        Self {
            gemini,
            store,
            live_games,
        }
    }

    /// Answer a prompt using the stored data for the requested games
    pub async fn respond(&self, request: &AssistantRequest) -> Result<String, AssistantError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }

        let gemini = self.gemini.as_ref().ok_or(AssistantError::NotConfigured)?;

        let context = self.build_context(request.game_id.as_deref()).await;
        let contents = build_contents(&request.history, &context, prompt);

        info!(
            "Assistant request: {} history turns, context {} chars",
            request.history.len(),
            context.len()
        );

        gemini.generate(&contents).await.map_err(|e| {
            error!("Assistant model call failed: {:#}", e);
            AssistantError::Model(e.to_string())
        })
    }

    /// Text context from the store only; never reaches the provider
    pub async fn build_context(&self, game_id: Option<&str>) -> String {
        let game_ids = match game_id {
            Some(id) => vec![id.to_string()],
            None => self.live_games.snapshot().await,
        };

        let mut session = self.store.session();
        let mut sections = Vec::new();

        for id in &game_ids {
            if let Some(box_score) = session.get::<BoxScoreSnapshot>(id).await {
                sections.push(format_box_score(&box_score));
            }
            if let Some(plays) = session.get_latest_slice(id, None).await {
                sections.push(format_play_by_play(&plays));
            }
        }
        session.close();

        if sections.is_empty() {
            debug!("No stored data for assistant context ({} games)", game_ids.len());
            return NO_DATA.to_string();
        }

        sections.join("\n\n")
    }
}

/// History turns followed by one user turn carrying context and prompt
pub fn build_contents(history: &[ChatTurn], context: &str, prompt: &str) -> Vec<Content> {
    let mut contents: Vec<Content> = history
        .iter()
        .filter(|turn| !turn.text.trim().is_empty())
        .map(|turn| {
            let role = match turn.role.as_str() {
                "model" | "assistant" => "model",
                _ => "user",
            };
            Content::text(role, turn.text.clone())
        })
        .collect();

    contents.push(Content::text(
        "user",
        format!(
            "You are an NBA game assistant. Use the game data below when it is relevant.\n\n\
             {}\n\nQuestion: {}",
            context, prompt
        ),
    ));

    contents
}
