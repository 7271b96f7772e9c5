//! Page controllers. Each page composes components and talks to the chat
//! controller or local storage; navigation state is shared through
//! [`Navigation`].

pub mod chat;
pub mod home;
pub mod integrations;
pub mod schedule;
pub mod settings;

pub use chat::ChatPage;
pub use home::HomePage;
pub use settings::AppSettings;

use tracing::debug;

use crate::components::Route;

/// Current route plus the message carried from Home to Chat.
#[derive(Debug)]
pub struct Navigation {
    route: Route,
    initial_message: Option<String>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation {
    pub fn new() -> Self {
        Self {
            route: Route::Home,
            initial_message: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn navigate(&mut self, route: Route) {
        debug!(from = self.route.path(), to = route.path(), "Navigate");
        self.route = route;
    }

    /// Go to Chat and hand it `message` to send on arrival.
    pub fn navigate_with_message(&mut self, message: impl Into<String>) {
        self.initial_message = Some(message.into());
        self.navigate(Route::Chat);
    }

    /// The carried message, at most once.
    pub fn take_initial_message(&mut self) -> Option<String> {
        self.initial_message.take()
    }
}
