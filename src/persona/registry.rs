//! The fixed, ordered set of personas.
//!
//! Definitions are YAML: a list of `{id, display_name, emoji, description,
//! template}` entries. List order is registry order, which is also the order
//! replies are returned and rendered in. The registry is validated once at
//! load and never mutated afterwards.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persona::template::{PromptTemplate, RenderedPrompt};
use crate::utilities::errors::{ConfigurationError, PromptError};

/// Default persona definitions, embedded at compile time.
const EMBEDDED_PERSONAS_YAML: &str = include_str!("personas.yaml");

/// Stable key identifying one persona.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One persona as written in the definitions file.
#[derive(Debug, Clone, Deserialize)]
struct PersonaDefinition {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    template: Option<String>,
}

/// A validated persona.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaSpec {
    /// Stable key.
    pub id: PersonaId,
    /// Name shown above chat bubbles. Defaults to the id.
    pub display_name: String,
    /// Avatar emoji. Defaults to 🤖.
    pub emoji: String,
    /// One-line summary of the persona's style.
    pub description: String,
    /// Prompt template; not exposed over the wire.
    #[serde(skip)]
    pub template: PromptTemplate,
}

impl PersonaSpec {
    /// Build a persona, validating its template.
    pub fn new(
        id: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let id = id.into();
        let template = PromptTemplate::new(&id, template)?;
        Ok(Self {
            display_name: id.clone(),
            emoji: "🤖".to_string(),
            description: String::new(),
            id: PersonaId::new(id),
            template,
        })
    }

    pub fn with_display(mut self, display_name: impl Into<String>, emoji: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self.emoji = emoji.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn from_definition(def: PersonaDefinition) -> Result<Self, ConfigurationError> {
        let template = match def.template {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ConfigurationError::MissingTemplate { persona: def.id }),
        };
        let display_name = def.display_name.unwrap_or_else(|| def.id.clone());
        let emoji = def.emoji.unwrap_or_else(|| "🤖".to_string());
        Ok(Self::new(def.id, template)?
            .with_display(display_name, emoji)
            .with_description(def.description))
    }
}

/// Ordered, immutable persona registry.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<PersonaSpec>,
}

impl PersonaRegistry {
    /// Build a registry from validated personas, keeping their order.
    ///
    /// # Errors
    /// Fails on an empty list or a duplicated id.
    pub fn new(personas: Vec<PersonaSpec>) -> Result<Self, ConfigurationError> {
        if personas.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }
        let mut seen = HashSet::new();
        for persona in &personas {
            if !seen.insert(persona.id.clone()) {
                return Err(ConfigurationError::DuplicatePersona {
                    persona: persona.id.to_string(),
                });
            }
        }
        Ok(Self { personas })
    }

    /// Parse persona definitions from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        let definitions: Vec<PersonaDefinition> = serde_yaml::from_str(yaml)?;
        let personas = definitions
            .into_iter()
            .map(PersonaSpec::from_definition)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(personas)
    }

    /// Load persona definitions from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// The personas shipped with the crate.
    pub fn embedded() -> Result<Self, ConfigurationError> {
        Self::from_yaml_str(EMBEDDED_PERSONAS_YAML)
    }

    /// Load from `path` if given, else the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        match path {
            Some(path) => {
                log::info!("Loading personas from {}", path.display());
                Self::from_file(path)
            }
            None => Self::embedded(),
        }
    }

    /// Personas in registry order.
    pub fn personas(&self) -> &[PersonaSpec] {
        &self.personas
    }

    /// Persona ids in registry order.
    pub fn ids(&self) -> impl Iterator<Item = &PersonaId> {
        self.personas.iter().map(|p| &p.id)
    }

    pub fn get(&self, id: &PersonaId) -> Option<&PersonaSpec> {
        self.personas.iter().find(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Fill `persona`'s template with `user_input`.
    ///
    /// # Errors
    /// [`PromptError::TemplateNotFound`] if `persona` is not registered.
    pub fn render(&self, persona: &PersonaId, user_input: &str) -> Result<RenderedPrompt, PromptError> {
        let spec = self.get(persona).ok_or_else(|| PromptError::TemplateNotFound {
            persona: persona.to_string(),
        })?;
        Ok(RenderedPrompt {
            persona: persona.clone(),
            text: spec.template.fill(user_input),
        })
    }
}
