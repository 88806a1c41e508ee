//! Portfolio Content
//!
//! The widget's model configuration and the portfolio facts it is grounded
//! in, loaded from the same JSON files the site serves. Missing or malformed
//! files degrade to defaults; content problems never stop the widget.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Model used when no configuration names one
pub const DEFAULT_MODEL_ID: &str = "llama3.2:1b";

/// System prompt used when configuration or context is unavailable
pub const FALLBACK_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant for this portfolio website.";

/// Model and prompt configuration (`ai_config.json`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    /// Model to load
    pub model_id: String,
    /// Prompt with a `{context}` substitution point
    pub system_prompt_template: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Target of the "learn more" link
    pub blog_url: Option<String>,
    /// Suggestions cycled through the placeholder
    pub placeholder_prompts: Vec<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            system_prompt_template: "You are an assistant on a personal portfolio website. \
                Answer questions about the owner using only this information:\n\n{context}"
                .to_string(),
            temperature: 0.2,
            blog_url: None,
            placeholder_prompts: Vec::new(),
        }
    }
}

/// Text that may be written as a string or a list of strings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    /// A single string
    Text(String),
    /// Several strings, shown comma-separated
    List(Vec<String>),
}

impl Default for TextOrList {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for TextOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// A position held
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub period: String,
    pub highlights: Vec<String>,
}

/// A project built
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub tech: TextOrList,
    pub highlights: Vec<String>,
}

/// An extracurricular role
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub title: String,
    pub role: String,
}

/// Portfolio facts the model answers from (`ai_context.json`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiContext {
    pub name: String,
    pub title: String,
    pub location: String,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    /// Category name to skills
    pub skills: BTreeMap<String, Vec<String>>,
    pub awards: Vec<String>,
    pub activities: Vec<Activity>,
    pub email: String,
    pub github: String,
    pub linkedin: String,
}

impl AiContext {
    /// Flatten into the text block substituted for `{context}`
    pub fn to_prompt_text(&self) -> String {
        let mut lines = vec![
            format!("Name: {}", self.name),
            format!("Title: {}", self.title),
            format!("Location: {}", self.location),
            format!("Summary: {}", self.summary),
            String::new(),
            "Experience:".to_string(),
        ];

        lines.extend(self.experience.iter().map(|e| {
            format!(
                "- {} at {} ({}): {}",
                e.role,
                e.company,
                e.period,
                e.highlights.join("; ")
            )
        }));

        lines.push(String::new());
        lines.push("Projects:".to_string());
        lines.extend(self.projects.iter().map(|p| {
            format!(
                "- {}: {}. Tech: {}. {}",
                p.name,
                p.description,
                p.tech,
                p.highlights.join("; ")
            )
        }));

        let skills: Vec<&str> = self
            .skills
            .values()
            .flatten()
            .map(String::as_str)
            .collect();
        let activities: Vec<String> = self
            .activities
            .iter()
            .map(|a| format!("{} ({})", a.title, a.role))
            .collect();

        lines.extend([
            String::new(),
            format!("Skills: {}", skills.join(", ")),
            String::new(),
            format!("Awards: {}", self.awards.join(", ")),
            String::new(),
            format!("Activities: {}", activities.join(", ")),
            String::new(),
            format!(
                "Contact: {} | GitHub: {} | LinkedIn: {}",
                self.email, self.github, self.linkedin
            ),
        ]);

        lines.join("\n")
    }
}

/// System prompt for the model
///
/// Substitutes the first `{context}` in the template. Without both a config
/// and a context, returns [`FALLBACK_SYSTEM_PROMPT`].
pub fn build_system_prompt(config: Option<&AiConfig>, context: Option<&AiContext>) -> String {
    match (config, context) {
        (Some(config), Some(context)) => config
            .system_prompt_template
            .replacen("{context}", &context.to_prompt_text(), 1),
        _ => FALLBACK_SYSTEM_PROMPT.to_string(),
    }
}

/// Everything loaded from the content directory
#[derive(Clone, Debug, Default)]
pub struct ContentStore {
    /// Parsed `ai_config.json`
    pub config: Option<AiConfig>,
    /// Parsed `ai_context.json`
    pub context: Option<AiContext>,
    /// Parsed `prompts.json`
    pub prompts: Option<Vec<String>>,
}

impl ContentStore {
    /// Read the content files under `data_dir`
    pub fn load(data_dir: &Path) -> Self {
        let store = Self {
            config: read_json(&data_dir.join("ai_config.json")),
            context: read_json(&data_dir.join("ai_context.json")),
            prompts: read_json(&data_dir.join("prompts.json")),
        };
        tracing::info!(
            dir = %data_dir.display(),
            config = store.config.is_some(),
            context = store.context.is_some(),
            prompts = store.placeholder_prompts().len(),
            "Content loaded"
        );
        store
    }

    /// System prompt built from the loaded config and context
    pub fn system_prompt(&self) -> String {
        build_system_prompt(self.config.as_ref(), self.context.as_ref())
    }

    /// Model to load
    pub fn model_id(&self) -> &str {
        self.config
            .as_ref()
            .map_or(DEFAULT_MODEL_ID, |c| c.model_id.as_str())
    }

    /// Sampling temperature
    pub fn temperature(&self) -> f32 {
        self.config.as_ref().map_or(0.2, |c| c.temperature)
    }

    /// "Learn more" link target
    pub fn blog_url(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.blog_url.as_deref())
    }

    /// Placeholder suggestions (`prompts.json` wins over the config list)
    pub fn placeholder_prompts(&self) -> Vec<String> {
        match (&self.prompts, &self.config) {
            (Some(prompts), _) if !prompts.is_empty() => prompts.clone(),
            (_, Some(config)) => config.placeholder_prompts.clone(),
            _ => Vec::new(),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Content file unreadable");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Content file malformed");
            None
        }
    }
}
