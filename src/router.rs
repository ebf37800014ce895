use crate::browser;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Route {
    Home,
    Game,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Home, Route::Game];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Game => "/game",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    /// Matches a path, ignoring query, fragment and a trailing slash
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let bare = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = match bare.trim_end_matches('/') {
            "" => "/",
            rest => rest,
        };
        Route::ALL
            .into_iter()
            .find(|route| route.path() == trimmed)
            .ok_or_else(|| RouteError::NotFound(path.to_owned()))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("no route matches '{0}'")]
    NotFound(String),
    #[error("history update failed : {0}")]
    History(String),
}

/// Where route changes get recorded
pub trait History {
    fn push(&self, path: &str) -> Result<(), RouteError>;
}

/// `window.history` backed history
pub struct BrowserHistory;

impl BrowserHistory {
    /// Path the page was loaded with
    pub fn current_path() -> anyhow::Result<String> {
        browser::window()?
            .location()
            .pathname()
            .map_err(|err| anyhow::anyhow!("Could not read location : {:#?}", err))
    }
}

impl History for BrowserHistory {
    fn push(&self, path: &str) -> Result<(), RouteError> {
        browser::window()
            .map_err(|err| RouteError::History(err.to_string()))?
            .history()
            .map_err(|err| RouteError::History(format!("{:#?}", err)))?
            .push_state_with_url(&JsValue::NULL, "", Some(path))
            .map_err(|err| RouteError::History(format!("{:#?}", err)))
    }
}

/// In-memory history, keeps every pushed path
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
}

impl MemoryHistory {
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl History for MemoryHistory {
    fn push(&self, path: &str) -> Result<(), RouteError> {
        self.entries.borrow_mut().push(path.to_owned());
        Ok(())
    }
}

/// Client-side router over the fixed route table
pub struct Router<H: History> {
    history: H,
    current: Route,
}

impl<H: History> Router<H> {
    pub fn new(history: H, current: Route) -> Self {
        Router { history, current }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Navigates to `to`. Already being there is a successful no-op.
    pub fn push(&mut self, to: &str) -> Result<Route, RouteError> {
        let route = Route::from_str(to)?;
        if route == self.current {
            return Ok(route);
        }
        self.history.push(route.path())?;
        log::debug!("route {} -> {}", self.current, route);
        self.current = route;
        Ok(route)
    }

    /// Adopts a route the browser already moved to (back/forward), without
    /// touching history
    pub fn sync(&mut self, route: Route) {
        if route != self.current {
            log::debug!("route {} -> {} (history)", self.current, route);
            self.current = route;
        }
    }
}
