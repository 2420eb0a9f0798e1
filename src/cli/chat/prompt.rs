use rustyline::{Config, Editor, Result};

pub fn generate_prompt(service: &str) -> String {
    format!("[{}] > ", service)
}

// Lines are added to history by the editor itself.
fn editor_config() -> Config {
    Config::builder()
        .auto_add_history(true)
        .history_ignore_space(true)
        .build()
}

pub fn rl() -> Result<Editor<()>> {
    Editor::with_config(editor_config())
}
