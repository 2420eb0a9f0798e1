use thiserror::Error;

/// Services the reference `/ask` backend knows how to route.
pub const KNOWN_SERVICES: &[(&str, &str)] = &[
    ("groq", "Groq, llama-3.1-8b-instant (free tier, fast)"),
    ("huggingface", "Hugging Face Inference, DialoGPT-large"),
    ("together", "Together AI, Llama-2-7b-chat"),
    ("replicate", "Replicate, llama-2-7b-chat"),
    ("gemini", "Google Gemini 1.5 Flash"),
    ("openrouter", "OpenRouter, wizardlm-2-8x22b"),
    ("openai", "OpenAI (requires billing)"),
    ("deepinfra", "DeepInfra (requires payment)"),
];

pub const DEFAULT_SERVICE: &str = "groq";

#[derive(Debug, Error)]
#[error("unknown service '{name}', expected one of: {}", .available.join(", "))]
pub struct UnknownService {
    pub name: String,
    pub available: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub id: String,
    pub description: String,
}

/// The list of selectable service identifiers and the current choice.
#[derive(Debug, Clone)]
pub struct ServiceSelector {
    entries: Vec<ServiceEntry>,
    selected: usize,
}

impl ServiceSelector {
    /// Builds the selector from [`KNOWN_SERVICES`] plus `extra` ids, with
    /// `initial` selected.
    pub fn new(initial: &str, extra: &[String]) -> Result<Self, UnknownService> {
        let mut entries: Vec<ServiceEntry> = KNOWN_SERVICES
            .iter()
            .map(|(id, description)| ServiceEntry {
                id: id.to_string(),
                description: description.to_string(),
            })
            .collect();

        for id in extra {
            let id = id.trim();
            if id.is_empty() || entries.iter().any(|e| e.id == id) {
                continue;
            }
            entries.push(ServiceEntry {
                id: id.to_string(),
                description: "custom".to_string(),
            });
        }

        let mut selector = Self { entries, selected: 0 };
        selector.select(initial)?;
        Ok(selector)
    }

    pub fn selected(&self) -> &str {
        &self.entries[self.selected].id
    }

    /// Selects `name`. On error the current selection is unchanged.
    pub fn select(&mut self, name: &str) -> Result<&str, UnknownService> {
        let name = name.trim();
        match self.entries.iter().position(|e| e.id == name) {
            Some(index) => {
                self.selected = index;
                Ok(self.selected())
            }
            None => Err(UnknownService {
                name: name.to_string(),
                available: self.entries.iter().map(|e| e.id.clone()).collect(),
            }),
        }
    }

    pub fn entries(&self) -> &[ServiceEntry] {
        &self.entries
    }

    /// One line per service, the selected one marked with `*`.
    pub fn listing(&self) -> String {
        let width = self.entries.iter().map(|e| e.id.len()).max().unwrap_or(0);

        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let marker = if i == self.selected { '*' } else { ' ' };
                format!("{} {:<width$}  {}", marker, e.id, e.description, width = width)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_service_is_known() {
        let selector = ServiceSelector::new(DEFAULT_SERVICE, &[]).unwrap();
        assert_eq!(selector.selected(), "groq");
        assert_eq!(selector.entries().len(), KNOWN_SERVICES.len());
    }

    #[test]
    fn unknown_initial_service_lists_choices() {
        let err = ServiceSelector::new("gpt-9", &[]).unwrap_err();
        assert_eq!(err.name, "gpt-9");
        assert!(err.to_string().contains("openrouter"));
    }

    #[test]
    fn failed_select_keeps_current() {
        let mut selector = ServiceSelector::new("gemini", &[]).unwrap();
        assert!(selector.select("nope").is_err());
        assert_eq!(selector.selected(), "gemini");

        assert_eq!(selector.select(" together ").unwrap(), "together");
    }

    #[test]
    fn extra_services_are_appended_once() {
        let extra = vec!["ollama".to_string(), "groq".to_string(), "ollama".to_string()];
        let selector = ServiceSelector::new("ollama", &extra).unwrap();

        assert_eq!(selector.entries().len(), KNOWN_SERVICES.len() + 1);
        assert_eq!(selector.selected(), "ollama");
    }

    #[test]
    fn listing_marks_selection() {
        let selector = ServiceSelector::new("replicate", &[]).unwrap();
        let listing = selector.listing();

        let marked: Vec<_> = listing.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("replicate"));
    }
}
