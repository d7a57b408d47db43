//! Path resolution plus guard evaluation for one navigation attempt.
//!
//! ARCHITECTURE
//! ============
//! `navigate` strips the router base, looks the path up in the route table,
//! follows table redirects, and runs the guard on the route it lands on. A
//! guard redirect starts a new lookup for the named route, which is guarded
//! again. Hops are bounded so a misconfigured table cannot loop forever.

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::rc::Rc;

use super::guard::{self, Decision, GuardContext, Verdict};
use super::table::{Resolution, RouteMatch, RouteTable, RouteTableError};
use crate::state::session::Session;

const MAX_HOPS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("no route matches {0}")]
    NotFound(String),
    #[error("navigation to {0} exceeded the redirect limit")]
    TooManyRedirects(String),
    #[error(transparent)]
    Table(#[from] RouteTableError),
}

/// Where a navigation attempt ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub route: RouteMatch,
    /// First path that was redirected away from, if any.
    pub redirected_from: Option<String>,
    /// Guard decisions in the order they were made.
    pub decisions: Vec<Decision>,
}

impl Navigation {
    pub fn path(&self) -> &str {
        &self.route.path
    }

    pub fn name(&self) -> &'static str {
        self.route.name()
    }
}

#[derive(Clone, Debug)]
pub struct Navigator {
    table: Rc<RouteTable>,
    session: Session,
    base: String,
}

impl Navigator {
    #[must_use]
    pub fn new(table: RouteTable, session: Session) -> Self {
        Self { table: Rc::new(table), session, base: String::new() }
    }

    /// Mount the router under `base` (e.g. `"/market/"`).
    #[must_use]
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.trim_end_matches('/').to_owned();
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    /// Browser URL for an in-app path.
    pub fn href(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Resolve and guard a navigation to `requested`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the table has no fallback and nothing matched,
    /// `TooManyRedirects` on a redirect loop, `Table` if a guard target is
    /// missing from the table.
    pub fn navigate(&self, requested: &str) -> Result<Navigation, NavigationError> {
        let mut path = self.strip_base(requested).to_owned();
        let mut redirected_from: Option<String> = None;
        let mut via_logout = false;
        let mut decisions = Vec::new();

        for _ in 0..MAX_HOPS {
            match self.table.resolve(&path) {
                Resolution::Redirect { to, marks_logout } => {
                    redirected_from.get_or_insert_with(|| path.clone());
                    via_logout |= marks_logout;
                    path = to;
                }
                Resolution::Route(route) => {
                    let decision = guard::evaluate(&self.session, &GuardContext { access: route.access(), via_logout });
                    decisions.push(decision);
                    match decision.verdict {
                        Verdict::Allow => {
                            tracing::debug!(from = ?redirected_from, to = %route.path, "navigation allowed");
                            return Ok(Navigation { route, redirected_from, decisions });
                        }
                        Verdict::Redirect(name) => {
                            redirected_from.get_or_insert_with(|| path.clone());
                            via_logout = false;
                            path = self.table.path_for(name, &[])?;
                        }
                    }
                }
                Resolution::NotFound => return Err(NavigationError::NotFound(path)),
            }
        }
        tracing::error!(%requested, "navigation redirect loop");
        Err(NavigationError::TooManyRedirects(requested.to_owned()))
    }
}
