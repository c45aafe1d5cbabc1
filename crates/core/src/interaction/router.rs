//! Routing table from commands and callback tags to handlers.

use std::collections::HashMap;

/// Key a handler is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Command name without the leading slash.
    Command(String),
    /// Exact callback data of an inline button.
    Callback(String),
}

impl Route {
    /// Route of a text message, if it is a command.
    ///
    /// Handles `/cmd`, `/cmd args` and `/cmd@botname`.
    pub fn for_text(text: &str) -> Option<Route> {
        let command = text.strip_prefix('/')?.split_whitespace().next()?;
        let name = command.split('@').next().unwrap_or(command);
        if name.is_empty() {
            return None;
        }
        Some(Route::Command(name.to_string()))
    }
}

/// Exact-match routing table.
#[derive(Debug, Clone)]
pub struct Router<H> {
    routes: HashMap<Route, H>,
}

impl<H: Copy> Router<H> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn on_command(mut self, name: &str, handler: H) -> Self {
        self.routes.insert(Route::Command(name.to_string()), handler);
        self
    }

    pub fn on_callback(mut self, tag: &str, handler: H) -> Self {
        self.routes.insert(Route::Callback(tag.to_string()), handler);
        self
    }

    pub fn resolve(&self, route: &Route) -> Option<H> {
        self.routes.get(route).copied()
    }
}

impl<H: Copy> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}
