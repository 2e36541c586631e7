use crate::errors::AppError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Fallback system prompt for the `system-prompt` knowledge mode, used when
/// no `SYSTEM_PROMPT` override is configured.
const DEFAULT_SYSTEM_PROMPT: &str = "You are a customer support assistant for a commercial \
    printing company. You help customers with print specifications (resolution, bleed, \
    color management, file formats), product selection (business cards, brochures, banners, \
    postcards, booklets), order and turnaround questions, and troubleshooting of submitted \
    artwork. Give specific measurements and industry-standard guidance, and ask clarifying \
    questions when a request is ambiguous.";

/// How domain expertise reaches the model. The two strategies are alternative
/// deployment modes and are never combined in one instance.
#[derive(Debug, Clone)]
pub enum KnowledgeStrategy {
    /// Inline system prompt sent with every request.
    SystemPrompt(String),
    /// Server-managed skill ids attached via the vendor `container` parameter,
    /// together with the code-execution tool the skills rely on.
    Skills(Vec<String>),
}

/// Everything the upstream client needs, resolved once at startup and passed
/// into the service at construction.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub knowledge: KnowledgeStrategy,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AppError::config("ANTHROPIC_API_KEY must be set"))?;

        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = parse_var("CHAT_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        let max_tokens = parse_var("CHAT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;

        let knowledge = resolve_knowledge(
            std::env::var("KNOWLEDGE_MODE").ok().as_deref(),
            std::env::var("SKILL_IDS").ok().as_deref(),
            std::env::var("SYSTEM_PROMPT").ok().as_deref(),
        )?;

        Ok(Self { api_key, base_url, model, temperature, max_tokens, knowledge })
    }

    /// Trailing-slash tolerant join against the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

/// Picks the knowledge strategy from the raw environment values. Defaults to
/// the inline system prompt when no mode is given; `skills` mode requires a
/// non-empty `SKILL_IDS` list.
fn resolve_knowledge(
    mode: Option<&str>,
    skill_ids: Option<&str>,
    system_prompt: Option<&str>,
) -> Result<KnowledgeStrategy, AppError> {
    match mode.unwrap_or("system-prompt") {
        "skills" => {
            let ids = parse_skill_ids(skill_ids.unwrap_or(""));
            if ids.is_empty() {
                return Err(AppError::config(
                    "KNOWLEDGE_MODE=skills requires SKILL_IDS (run the upload-skills binary \
                     to obtain them)",
                ));
            }
            Ok(KnowledgeStrategy::Skills(ids))
        }
        "system-prompt" => {
            let prompt = system_prompt
                .map(str::to_string)
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
            Ok(KnowledgeStrategy::SystemPrompt(prompt))
        }
        other => Err(AppError::config(format!(
            "KNOWLEDGE_MODE must be 'skills' or 'system-prompt', got '{other}'"
        ))),
    }
}

fn parse_skill_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_id_list_splits_and_trims() {
        assert_eq!(
            parse_skill_ids("skill_a, skill_b ,,skill_c"),
            vec!["skill_a", "skill_b", "skill_c"]
        );
        assert!(parse_skill_ids("").is_empty());
    }

    #[test]
    fn default_mode_is_system_prompt() {
        let strategy = resolve_knowledge(None, None, None).unwrap();
        match strategy {
            KnowledgeStrategy::SystemPrompt(prompt) => {
                assert!(prompt.contains("commercial"));
            }
            KnowledgeStrategy::Skills(_) => panic!("expected system prompt mode"),
        }
    }

    #[test]
    fn system_prompt_override_wins() {
        let strategy = resolve_knowledge(Some("system-prompt"), None, Some("custom")).unwrap();
        assert!(matches!(strategy, KnowledgeStrategy::SystemPrompt(p) if p == "custom"));
    }

    #[test]
    fn skills_mode_requires_ids() {
        assert!(resolve_knowledge(Some("skills"), None, None).is_err());
        assert!(resolve_knowledge(Some("skills"), Some(" , "), None).is_err());

        let strategy = resolve_knowledge(Some("skills"), Some("skill_1,skill_2"), None).unwrap();
        assert!(matches!(strategy, KnowledgeStrategy::Skills(ids) if ids.len() == 2));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(resolve_knowledge(Some("both"), Some("skill_1"), Some("p")).is_err());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ChatConfig {
            api_key: "k".into(),
            base_url: "https://api.anthropic.com/".into(),
            model: "m".into(),
            temperature: 0.7,
            max_tokens: 4096,
            knowledge: KnowledgeStrategy::SystemPrompt("p".into()),
        };
        assert_eq!(config.endpoint("/v1/messages"), "https://api.anthropic.com/v1/messages");
    }
}
