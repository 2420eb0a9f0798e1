pub mod prompt;
pub mod service;
pub mod session;
pub mod transcript;
pub mod view;

use std::process::ExitCode;

use color_print::cstr;
use eyre::Result;
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use session::{ChatSession, Reply};
use tracing::info;
use view::ChatView;

use crate::backend_client::BackendClient;
use crate::config::ChatConfig;

const WELCOME_TEXT: &str = cstr!(
    "
<bold>Hi, I'm PolyGPT Chat.</> Ask me anything.

Your prompt goes to the selected service on the local backend.

/services     List the services you can pick from
/help         Show the help dialogue
/quit         Quit the application
"
);

const HELP_TEXT: &str = cstr!(
    "
<bold>PolyGPT Chat</>

/service      Show the selected service
/service <<id> Select a service
/services     List the available services
/clear        Clear the conversation
/help         Show this help dialogue
/quit         Quit the application
"
);

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct ChatContext {
    session: ChatSession<BackendClient>,
    input: Option<String>,
    interactive: bool,
}

impl ChatContext {
    pub fn new(
        view: ChatView,
        input: Option<String>,
        interactive: bool,
        config: &ChatConfig,
    ) -> Result<Self> {
        let backend = BackendClient::new(&config.backend_url)?;
        info!("Using backend endpoint {}", backend.endpoint());

        let session = ChatSession::new(backend, view, config.services()?);

        Ok(Self {
            session,
            input,
            interactive,
        })
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.interactive {
            self.print_welcome()?;
        }

        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            let reply = self.run_once(&input).await?;
            let failed = reply.as_ref().is_some_and(Reply::is_error);
            return Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS });
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    async fn run_once(&mut self, input: &str) -> Result<Option<Reply>> {
        self.session.send_message(input).await
    }

    fn print_welcome(&mut self) -> Result<()> {
        self.session.view_mut().notice(WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(self.session.services().selected());
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    match self.handle_input(&line).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => self.session.view_mut().notice(&format!("Error: {}", e))?,
                    }
                }
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
                Err(e) => {
                    self.session.view_mut().notice(&format!("Error: {}", e))?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<Flow> {
        let line = input.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        match (command, argument) {
            ("/quit", "") => return Ok(Flow::Quit),
            ("/help", "") => {
                self.session.view_mut().notice(HELP_TEXT)?;
            }
            ("/clear", "") => {
                let cleared = self.session.transcript().len();
                self.session.clear();
                let notice = format!("Conversation cleared ({} messages).", cleared);
                self.session.view_mut().notice(&notice)?;
            }
            ("/services", "") => {
                let listing = self.session.services().listing();
                self.session.view_mut().notice(&listing)?;
            }
            ("/service", "") => {
                let notice = format!("Current service: {}", self.session.services().selected());
                self.session.view_mut().notice(&notice)?;
            }
            ("/service", name) => {
                let notice = match self.session.services_mut().select(name) {
                    Ok(selected) => format!("Switched to {}.", selected),
                    Err(e) => format!("Error: {}", e),
                };
                self.session.view_mut().notice(&notice)?;
            }
            _ => {
                self.session.send_message(line).await?;
            }
        }

        Ok(Flow::Continue)
    }
}
