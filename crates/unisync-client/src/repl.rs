//! Line-oriented terminal front-end.
//!
//! Plain lines are chat messages; lines starting with `/` are commands.

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use unisync_shared::types::{ConversationId, MessageId};

use crate::components::{suggested_prompts, Route, TopNav};
use crate::error::ClientError;
use crate::events::ChatEvent;
use crate::pages::settings::SettingKey;
use crate::pages::{integrations, schedule};
use crate::state::AppState;

pub const HELP: &str = "\
Commands:
  <text>                 send a message (from Home: start a new chat)
  /home /chat /schedule /integrations /settings
                         switch page
  /new                   start a new conversation
  /list                  reload the conversation list
  /open <id>             open a conversation
  /close                 close the open conversation
  /delete <id>           delete a conversation
  /prompt <n>            send suggested prompt number n
  /toggle <msg> <sec>    expand/collapse a source section
  /collapse              collapse/expand the sidebar
  /set <key> <value>     change a setting (see /settings)
  /token <value>         store the access token
  /logout                forget the access token
  /help                  show this help
  /quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Go(Route),
    New,
    List,
    Open(ConversationId),
    Close,
    Delete(ConversationId),
    Prompt(usize),
    Toggle { message: usize, section: usize },
    Collapse,
    Set(SettingKey, String),
    Token(String),
    Logout,
    Help,
    Quit,
}

fn usage(text: &str) -> ClientError {
    ClientError::Command(format!("Usage: {text}"))
}

fn conversation_arg(arg: Option<&str>, text: &str) -> Result<ConversationId, ClientError> {
    let arg = arg.ok_or_else(|| usage(text))?;
    ConversationId::parse(arg).map_err(|_| usage(text))
}

/// A 1-based number as typed by the user.
fn number_arg(arg: Option<&str>, text: &str) -> Result<usize, ClientError> {
    arg.and_then(|a| a.parse().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| usage(text))
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, ClientError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Say(line.to_string()));
        };
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        Ok(match name {
            "home" => Command::Go(Route::Home),
            "chat" => Command::Go(Route::Chat),
            "schedule" => Command::Go(Route::Schedule),
            "integrations" => Command::Go(Route::Integrations),
            "settings" => Command::Go(Route::Settings),
            "new" => Command::New,
            "list" => Command::List,
            "open" => Command::Open(conversation_arg(arg, "/open <id>")?),
            "close" => Command::Close,
            "delete" => Command::Delete(conversation_arg(arg, "/delete <id>")?),
            "prompt" => Command::Prompt(number_arg(arg, "/prompt <n>")?),
            "toggle" => Command::Toggle {
                message: number_arg(arg, "/toggle <msg> <sec>")?,
                section: number_arg(parts.next(), "/toggle <msg> <sec>")?,
            },
            "collapse" => Command::Collapse,
            "set" => {
                let key: SettingKey = arg.ok_or_else(|| usage("/set <key> <value>"))?.parse()?;
                let value = parts.next().ok_or_else(|| usage("/set <key> <value>"))?;
                Command::Set(key, value.to_string())
            }
            "token" => Command::Token(
                arg.ok_or_else(|| usage("/token <value>"))?
                    .to_string(),
            ),
            "logout" => Command::Logout,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ClientError::Command(format!("Unknown command: /{other}"))),
        })
    }
}

/// The line printed for a chat event, for the events worth a notice.
pub fn notice(event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::ConversationCreated { conversation } => {
            Some(format!("* Started conversation {conversation}"))
        }
        ChatEvent::ConversationDeleted { conversation } => {
            Some(format!("* Deleted conversation {conversation}"))
        }
        ChatEvent::SendFailed { conversation, .. } => Some(format!(
            "! Message to conversation {conversation} was not sent and has been removed"
        )),
        _ => None,
    }
}

/// Notices for every event received since the last call.
pub fn drain_notices(events: &mut broadcast::Receiver<ChatEvent>) -> Vec<String> {
    let mut notices = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => notices.extend(notice(&event)),
            Err(TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "Chat events skipped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    notices
}

/// Whether the loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Repl {
    state: AppState,
    events: broadcast::Receiver<ChatEvent>,
}

impl Repl {
    pub fn new(state: AppState) -> Self {
        let events = state.chat.controller().events();
        Self { state, events }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Read commands from stdin until `/quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", self.render());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let result = match Command::parse(&line) {
                Ok(command) => self.execute(command).await,
                Err(e) => Err(e),
            };
            for notice in drain_notices(&mut self.events) {
                println!("{notice}");
            }
            match result {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => println!("{}", self.render()),
                Err(e) => println!("! {e}"),
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow, ClientError> {
        debug!(?command, "Executing command");
        match command {
            Command::Say(text) => self.say(text).await?,
            Command::Go(route) => self.go(route).await?,
            Command::New => {
                self.ensure_chat().await?;
                self.state.chat.controller().new_conversation().await?;
            }
            Command::List => {
                self.ensure_chat().await?;
                self.state.chat.controller().refresh_conversations().await?;
            }
            Command::Open(id) => {
                self.ensure_chat().await?;
                self.state.chat.select(id).await?;
            }
            Command::Close => self.state.chat.close().await?,
            Command::Delete(id) => self.state.chat.delete(&id).await,
            Command::Prompt(n) => {
                let prompt = suggested_prompts::pick(n)
                    .ok_or_else(|| ClientError::Command(format!("No prompt number {n}")))?;
                self.say(prompt.to_string()).await?;
            }
            Command::Toggle { message, section } => {
                let id = self.message_id(message)?;
                let index = section
                    .checked_sub(1)
                    .ok_or_else(|| ClientError::Command(format!("No section number {section}")))?;
                self.state.chat.toggle_section(id, index);
            }
            Command::Collapse => self.state.chat.sidebar.toggle_collapsed(),
            Command::Set(key, value) => {
                self.state.settings.apply(key, &value)?;
                self.state.save_settings()?;
            }
            Command::Token(token) => {
                self.state.set_token(&token)?;
                self.events = self.state.chat.controller().events();
            }
            Command::Logout => {
                self.state.logout()?;
                self.events = self.state.chat.controller().events();
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    async fn say(&mut self, text: String) -> Result<(), ClientError> {
        let state = &mut self.state;
        if state.nav.route() == Route::Home {
            state.home.input.set_draft(text);
            if state.home.submit(&mut state.nav) {
                state.chat.mount(&mut state.nav).await?;
            }
            return Ok(());
        }
        self.ensure_chat().await?;
        let state = &mut self.state;
        state.chat.input.set_draft(text);
        if let Err(e) = state.chat.submit().await {
            warn!(error = %e, "Message not sent");
            return Err(e);
        }
        Ok(())
    }

    async fn go(&mut self, route: Route) -> Result<(), ClientError> {
        if route == Route::Chat {
            return self.ensure_chat().await;
        }
        self.state.nav.navigate(route);
        Ok(())
    }

    async fn ensure_chat(&mut self) -> Result<(), ClientError> {
        let state = &mut self.state;
        if state.nav.route() != Route::Chat {
            state.nav.navigate(Route::Chat);
            state.chat.mount(&mut state.nav).await?;
        }
        Ok(())
    }

    fn message_id(&self, number: usize) -> Result<MessageId, ClientError> {
        let messages = self.state.chat.controller().visible_messages();
        number
            .checked_sub(1)
            .and_then(|i| messages.get(i))
            .map(|m| m.id.clone())
            .ok_or_else(|| ClientError::Command(format!("No message number {number}")))
    }

    pub fn render(&mut self) -> String {
        let now = Utc::now();
        let state = &mut self.state;
        let route = state.nav.route();
        let body = match route {
            Route::Home => state.home.render(),
            Route::Chat => state.chat.render(now),
            Route::Schedule => schedule::render(&schedule::mock_timeline(now), now.date_naive()),
            Route::Integrations => {
                integrations::render(&integrations::mock_integrations(now), now)
            }
            Route::Settings => state.settings.render(),
        };
        format!(
            "{}\n{}\n{body}",
            TopNav::render(route, &state.config.user_name),
            "─".repeat(60)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::ChatApi;
    use crate::chat::ChatController;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn test_failed_send_and_delete_produce_notices() {
        let api = Arc::new(FakeApi::new());
        let chat = ChatController::new(Arc::clone(&api) as Arc<dyn ChatApi>);
        let mut events = chat.events();

        let conv = chat.new_conversation().await.unwrap();
        api.fail_next_send();
        assert!(chat.submit("Hello").await.is_err());
        chat.delete_conversation(&conv.id).await;

        let notices = drain_notices(&mut events);
        assert_eq!(
            notices,
            vec![
                format!("* Started conversation {}", conv.id),
                format!(
                    "! Message to conversation {} was not sent and has been removed",
                    conv.id
                ),
                format!("* Deleted conversation {}", conv.id),
            ]
        );
        assert!(drain_notices(&mut events).is_empty());
    }

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            Command::parse("  hello there ").unwrap(),
            Command::Say("hello there".into())
        );
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            Command::parse("/open 42").unwrap(),
            Command::Open("42".into())
        );
        assert_eq!(
            Command::parse("/toggle 2 1").unwrap(),
            Command::Toggle {
                message: 2,
                section: 1
            }
        );
        assert_eq!(
            Command::parse("/set dark-mode on").unwrap(),
            Command::Set(SettingKey::DarkMode, "on".into())
        );
        assert_eq!(Command::parse("/schedule").unwrap(), Command::Go(Route::Schedule));
    }

    #[test]
    fn test_missing_argument_reports_usage() {
        let err = Command::parse("/delete").unwrap_err();
        assert_eq!(err.to_string(), "Usage: /delete <id>");
        assert!(Command::parse("/prompt x").is_err());
        assert_eq!(
            Command::parse("/toggle 2 0").unwrap_err().to_string(),
            "Usage: /toggle <msg> <sec>"
        );
        assert!(Command::parse("/toggle 0 1").is_err());
        assert!(Command::parse("/prompt 0").is_err());
        assert!(Command::parse("/set volume 3").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse("/dance").unwrap_err().to_string(),
            "Unknown command: /dance"
        );
    }
}
