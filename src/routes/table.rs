//! Declarative route table: path patterns, pages and access flags.
//!
//! DESIGN
//! ======
//! Routes are declared as a tree (children inherit their parents' access
//! flags) and flattened into an ordered list at build time. Resolution walks
//! that list in declaration order, so redirects listed first shadow routes
//! listed after them, and the fallback only applies when nothing matched.
//!
//! The table is validated once when it is built. Contradictory acting-as
//! flags, duplicate names, dangling redirects and missing guard targets are
//! configuration errors, not runtime conditions.

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;

use std::collections::{BTreeMap, HashSet};

/// Route the guard sends unauthenticated users to.
pub const LOGIN_ROUTE: &str = "Login";
/// Route the guard sends users acting under the wrong identity to.
pub const HOME_ROUTE: &str = "HomePage";

const MAX_REDIRECT_DEPTH: usize = 8;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("invalid path pattern {path:?}: {reason}")]
    InvalidPattern { path: String, reason: &'static str },
    #[error("duplicate route name: {0}")]
    DuplicateName(String),
    #[error("route {0} is both acting-as-user-only and acting-as-business-only")]
    ConflictingActingAs(String),
    #[error("redirect from {from:?} to {to:?} does not reach a route")]
    UnresolvedRedirect { from: String, to: String },
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("route {route} needs parameter {param}")]
    MissingParam { route: String, param: String },
}

// =============================================================================
// METADATA
// =============================================================================

/// Access-control flags consulted by the navigation guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessFlags {
    /// Requires a logged-in session.
    pub requires_auth: bool,
    /// Intended for logged-out visitors. Informational; not enforced.
    pub guest_only: bool,
    /// Requires acting as the user's own account.
    pub acting_as_user_only: bool,
    /// Requires acting as a business.
    pub acting_as_business_only: bool,
}

impl AccessFlags {
    pub const NONE: Self = Self {
        requires_auth: false,
        guest_only: false,
        acting_as_user_only: false,
        acting_as_business_only: false,
    };

    #[must_use]
    pub const fn auth() -> Self {
        Self { requires_auth: true, ..Self::NONE }
    }

    #[must_use]
    pub const fn guest() -> Self {
        Self { guest_only: true, ..Self::NONE }
    }

    #[must_use]
    pub const fn user_only() -> Self {
        Self { requires_auth: true, acting_as_user_only: true, ..Self::NONE }
    }

    #[must_use]
    pub const fn business_only() -> Self {
        Self { requires_auth: true, acting_as_business_only: true, ..Self::NONE }
    }

    /// A flag set anywhere in the matched chain applies to the whole match.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            requires_auth: self.requires_auth || other.requires_auth,
            guest_only: self.guest_only || other.guest_only,
            acting_as_user_only: self.acting_as_user_only || other.acting_as_user_only,
            acting_as_business_only: self.acting_as_business_only || other.acting_as_business_only,
        }
    }

    fn conflicting(self) -> bool {
        self.acting_as_user_only && self.acting_as_business_only
    }
}

/// Screen a route mounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    UserProfile,
    HomePage,
    SaleItemView,
    Signup,
    BusinessManagement,
    BusinessSignup,
    BusinessProfile,
    Product,
    Inventory,
    Login,
    SearchUsers,
    SaleListingManager,
    CommunityMarketplace,
    SaleListing,
    NotificationView,
    MyCards,
    NotFound,
}

/// Declared route. Child paths are relative to the parent's path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: &'static str,
    pub page: Page,
    pub access: AccessFlags,
    /// Rendered as a modal over the parent route.
    pub show_modal: bool,
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    #[must_use]
    pub fn new(path: &'static str, name: &'static str, page: Page) -> Self {
        Self { path, name, page, access: AccessFlags::NONE, show_modal: false, children: Vec::new() }
    }

    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn modal(mut self) -> Self {
        self.show_modal = true;
        self
    }

    #[must_use]
    pub fn child(mut self, child: RouteDescriptor) -> Self {
        self.children.push(child);
        self
    }
}

/// One level of a resolved route chain, with its full path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteRecord {
    pub name: &'static str,
    pub path: String,
    pub page: Page,
    pub access: AccessFlags,
    pub show_modal: bool,
}

// =============================================================================
// PATH PATTERNS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PathPattern {
    segments: Vec<Segment>,
}

/// Path segments with query string and fragment removed.
fn split_path(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

fn join_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return child.to_owned();
    }
    format!("{}/{child}", parent.trim_end_matches('/'))
}

impl PathPattern {
    fn parse(path: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason| RouteTableError::InvalidPattern { path: path.to_owned(), reason };
        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for raw in split_path(path) {
            if let Some(name) = raw.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("empty parameter name"));
                }
                if !seen.insert(name) {
                    return Err(invalid("repeated parameter name"));
                }
                segments.push(Segment::Param(name.to_owned()));
            } else {
                segments.push(Segment::Static(raw.to_owned()));
            }
        }
        Ok(Self { segments })
    }

    fn matches(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == *part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_owned());
                }
            }
        }
        Some(params)
    }

    fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }
}

// =============================================================================
// TABLE
// =============================================================================

#[derive(Clone, Debug)]
struct CompiledRoute {
    pattern: PathPattern,
    chain: Vec<RouteRecord>,
}

#[derive(Clone, Debug)]
struct CompiledRedirect {
    from: String,
    pattern: PathPattern,
    to: String,
    marks_logout: bool,
}

#[derive(Clone, Debug)]
enum Entry {
    Route(CompiledRoute),
    Redirect(CompiledRedirect),
}

/// A path that landed on a route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    /// Normalized path that matched.
    pub path: String,
    pub params: BTreeMap<String, String>,
    /// Matched chain, outermost first; the last entry is the target.
    pub matched: Vec<RouteRecord>,
}

impl RouteMatch {
    /// The route being navigated to (innermost of the chain).
    pub fn route(&self) -> &RouteRecord {
        &self.matched[self.matched.len() - 1]
    }

    pub fn name(&self) -> &'static str {
        self.route().name
    }

    /// Access flags of the whole matched chain.
    pub fn access(&self) -> AccessFlags {
        self.matched.iter().fold(AccessFlags::NONE, |acc, r| acc.union(r.access))
    }
}

/// Outcome of looking a path up in the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Route(RouteMatch),
    Redirect { to: String, marks_logout: bool },
    NotFound,
}

#[derive(Clone, Debug)]
pub struct RouteTable {
    entries: Vec<Entry>,
    fallback: Option<String>,
}

/// Ordered builder for `RouteTable`.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<PendingEntry>,
    fallback: Option<&'static str>,
}

#[derive(Debug)]
enum PendingEntry {
    Route(RouteDescriptor),
    Redirect { from: &'static str, to: &'static str, marks_logout: bool },
}

impl RouteTableBuilder {
    #[must_use]
    pub fn route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(PendingEntry::Route(route));
        self
    }

    #[must_use]
    pub fn redirect(mut self, from: &'static str, to: &'static str) -> Self {
        self.routes.push(PendingEntry::Redirect { from, to, marks_logout: false });
        self
    }

    /// Redirect whose use marks the navigation as an explicit logout.
    #[must_use]
    pub fn logout_redirect(mut self, from: &'static str, to: &'static str) -> Self {
        self.routes.push(PendingEntry::Redirect { from, to, marks_logout: true });
        self
    }

    /// Where paths matching nothing are sent.
    #[must_use]
    pub fn fallback(mut self, to: &'static str) -> Self {
        self.fallback = Some(to);
        self
    }

    /// Flatten and validate the table.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut entries = Vec::new();
        for pending in self.routes {
            match pending {
                PendingEntry::Route(route) => flatten(&route, "", &[], &mut entries)?,
                PendingEntry::Redirect { from, to, marks_logout } => {
                    entries.push(Entry::Redirect(CompiledRedirect {
                        from: from.to_owned(),
                        pattern: PathPattern::parse(from)?,
                        to: to.to_owned(),
                        marks_logout,
                    }));
                }
            }
        }
        let table = RouteTable { entries, fallback: self.fallback.map(str::to_owned) };
        table.validate()?;
        Ok(table)
    }
}

fn flatten(
    route: &RouteDescriptor,
    parent_path: &str,
    parents: &[RouteRecord],
    out: &mut Vec<Entry>,
) -> Result<(), RouteTableError> {
    let path = if parent_path.is_empty() { route.path.to_owned() } else { join_path(parent_path, route.path) };
    let pattern = PathPattern::parse(&path)?;
    let mut chain = parents.to_vec();
    chain.push(RouteRecord {
        name: route.name,
        path: path.clone(),
        page: route.page,
        access: route.access,
        show_modal: route.show_modal,
    });
    out.push(Entry::Route(CompiledRoute { pattern, chain: chain.clone() }));
    for child in &route.children {
        flatten(child, &path, &chain, out)?;
    }
    Ok(())
}

impl RouteTable {
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    fn routes(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Route(r) => Some(r),
            Entry::Redirect(_) => None,
        })
    }

    fn find(&self, name: &str) -> Option<&CompiledRoute> {
        self.routes().find(|r| r.chain.last().is_some_and(|leaf| leaf.name == name))
    }

    /// Look `path` up without following redirects.
    pub fn resolve(&self, path: &str) -> Resolution {
        self.resolve_declared(&split_path(path)).unwrap_or_else(|| match &self.fallback {
            Some(to) => Resolution::Redirect { to: to.clone(), marks_logout: false },
            None => Resolution::NotFound,
        })
    }

    fn resolve_declared(&self, parts: &[&str]) -> Option<Resolution> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Route(route) => route.pattern.matches(parts).map(|params| {
                Resolution::Route(RouteMatch {
                    path: format!("/{}", parts.join("/")),
                    params,
                    matched: route.chain.clone(),
                })
            }),
            Entry::Redirect(redirect) => redirect
                .pattern
                .matches(parts)
                .map(|_| Resolution::Redirect { to: redirect.to.clone(), marks_logout: redirect.marks_logout }),
        })
    }

    /// Build the concrete path of the named route.
    ///
    /// # Errors
    ///
    /// `UnknownRoute` if no route has that name, `MissingParam` if a path
    /// parameter was not supplied.
    pub fn path_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteTableError> {
        let route = self.find(name).ok_or_else(|| RouteTableError::UnknownRoute(name.to_owned()))?;
        let mut parts = Vec::with_capacity(route.pattern.segments.len());
        for segment in &route.pattern.segments {
            match segment {
                Segment::Static(s) => parts.push(s.as_str()),
                Segment::Param(param) => {
                    let value = params.iter().find(|(k, _)| *k == param.as_str()).map(|(_, v)| *v).ok_or_else(|| {
                        RouteTableError::MissingParam { route: name.to_owned(), param: param.clone() }
                    })?;
                    parts.push(value);
                }
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }

    /// Names of every route, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.routes().filter_map(|r| r.chain.last().map(|leaf| leaf.name)).collect()
    }

    fn validate(&self) -> Result<(), RouteTableError> {
        let mut names = HashSet::new();
        for route in self.routes() {
            let Some(leaf) = route.chain.last() else { continue };
            if !names.insert(leaf.name) {
                return Err(RouteTableError::DuplicateName(leaf.name.to_owned()));
            }
            let access = route.chain.iter().fold(AccessFlags::NONE, |acc, r| acc.union(r.access));
            if access.conflicting() {
                return Err(RouteTableError::ConflictingActingAs(leaf.name.to_owned()));
            }
        }

        for entry in &self.entries {
            if let Entry::Redirect(redirect) = entry {
                self.check_reaches_route(&redirect.from, &redirect.to)?;
            }
        }
        if let Some(fallback) = &self.fallback {
            self.check_reaches_route("*", fallback)?;
        }

        for target in [LOGIN_ROUTE, HOME_ROUTE] {
            let route = self.find(target).ok_or_else(|| RouteTableError::UnknownRoute(target.to_owned()))?;
            if let Some(param) = route.pattern.params().next() {
                return Err(RouteTableError::MissingParam { route: target.to_owned(), param: param.to_owned() });
            }
        }
        Ok(())
    }

    fn check_reaches_route(&self, from: &str, to: &str) -> Result<(), RouteTableError> {
        let mut path = to.to_owned();
        for _ in 0..MAX_REDIRECT_DEPTH {
            match self.resolve_declared(&split_path(&path)) {
                Some(Resolution::Route(_)) => return Ok(()),
                Some(Resolution::Redirect { to, .. }) => path = to,
                Some(Resolution::NotFound) | None => break,
            }
        }
        Err(RouteTableError::UnresolvedRedirect { from: from.to_owned(), to: to.to_owned() })
    }
}

// =============================================================================
// MARKETPLACE ROUTES
// =============================================================================

/// The marketplace client's route table.
///
/// # Errors
///
/// Only if the declarations below are edited into an invalid state.
pub fn marketplace_routes() -> Result<RouteTable, RouteTableError> {
    RouteTable::builder()
        .logout_redirect("/logout", "/login")
        .route(RouteDescriptor::new("/profile/:id", "Profile", Page::UserProfile).access(AccessFlags::auth()))
        .route(
            RouteDescriptor::new("/home", HOME_ROUTE, Page::HomePage)
                .access(AccessFlags::auth())
                .child(RouteDescriptor::new(":id", "FullSaleListingView", Page::SaleItemView).modal()),
        )
        .route(RouteDescriptor::new("/signup", "SignUp", Page::Signup).access(AccessFlags::guest()))
        .route(RouteDescriptor::new("/business/manage", "ManageBusiness", Page::BusinessManagement))
        .route(
            RouteDescriptor::new("/business-signup", "BusinessSignUp", Page::BusinessSignup)
                .access(AccessFlags::user_only()),
        )
        .route(RouteDescriptor::new("/business/:id", "BusinessProfile", Page::BusinessProfile))
        .route(
            RouteDescriptor::new("/business/:businessId/add-product", "AddProduct", Page::Product)
                .access(AccessFlags::business_only()),
        )
        .route(
            RouteDescriptor::new("/business/:businessId/edit-product/:productId", "EditProduct", Page::Product)
                .access(AccessFlags::business_only()),
        )
        .route(
            RouteDescriptor::new("/business/:businessId/add-inventory", "AddInventory", Page::Inventory)
                .access(AccessFlags::business_only()),
        )
        .route(RouteDescriptor::new("/login", LOGIN_ROUTE, Page::Login).access(AccessFlags::guest()))
        .route(RouteDescriptor::new("/search", "SearchUsers", Page::SearchUsers).access(AccessFlags::auth()))
        .route(
            RouteDescriptor::new("/business/:id/listings", "MyBusinessListings", Page::SaleListingManager)
                .access(AccessFlags::auth()),
        )
        .route(
            RouteDescriptor::new("/community-marketplace", "CommunityMarketplace", Page::CommunityMarketplace)
                .access(AccessFlags::auth()),
        )
        .route(
            RouteDescriptor::new("/business/:businessId/add-sale-listing", "AddSaleListing", Page::SaleListing)
                .access(AccessFlags::business_only()),
        )
        .route(
            RouteDescriptor::new("/notifications/:id", "Notifications", Page::NotificationView)
                .access(AccessFlags::user_only()),
        )
        .route(RouteDescriptor::new("/my-cards/:id", "MyCards", Page::MyCards).access(AccessFlags::auth()))
        .route(RouteDescriptor::new("/user-cards/:id", "UserCards", Page::MyCards).access(AccessFlags::auth()))
        .route(RouteDescriptor::new("/404", "Not Found", Page::NotFound))
        .redirect("/", "/login")
        .fallback("/404")
        .build()
}
