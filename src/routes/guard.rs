//! Navigation guard evaluated before every route transition.
//!
//! DESIGN
//! ======
//! The guard is a pure function of the target's access flags and a session
//! snapshot. Precedence is an explicit ordered rule list; the first rule
//! that returns a decision wins, and the last rule always allows, so every
//! evaluation ends in `Allow` or `Redirect`.
//!
//! Rules never touch the network. The only side effect, ending the session,
//! is described by the decision and applied by `evaluate`.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::table::{AccessFlags, HOME_ROUTE, LOGIN_ROUTE};
use crate::state::session::{ActingAs, Session, SessionSnapshot};

/// What the router should do with the navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Navigate to the named route instead.
    Redirect(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Name of the rule that produced this decision.
    pub rule: &'static str,
    pub verdict: Verdict,
    /// Whether the session must be logged out before continuing.
    pub end_session: bool,
}

/// Guard input describing the navigation target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuardContext {
    /// Access flags of the whole matched route chain.
    pub access: AccessFlags,
    /// The navigation arrived through the synthetic logout redirect.
    pub via_logout: bool,
}

pub struct GuardRule {
    pub name: &'static str,
    check: fn(&GuardContext, &SessionSnapshot) -> Option<Decision>,
}

impl GuardRule {
    pub fn check(&self, ctx: &GuardContext, session: &SessionSnapshot) -> Option<Decision> {
        (self.check)(ctx, session)
    }
}

const fn allow(rule: &'static str) -> Decision {
    Decision { rule, verdict: Verdict::Allow, end_session: false }
}

const fn redirect(rule: &'static str, to: &'static str) -> Decision {
    Decision { rule, verdict: Verdict::Redirect(to), end_session: false }
}

fn acting_as_self(session: &SessionSnapshot) -> bool {
    session.acting_as == Some(ActingAs::SelfUser)
}

/// Guard rules in precedence order.
pub const RULES: &[GuardRule] = &[
    // Explicit logout: drop the session and skip every other check.
    GuardRule {
        name: "logout-marker",
        check: |ctx, _| ctx.via_logout.then_some(Decision { end_session: true, ..allow("logout-marker") }),
    },
    // Stale login flags are cleared along with the redirect.
    GuardRule {
        name: "require-login",
        check: |ctx, session| {
            (ctx.access.requires_auth && !session.logged_in)
                .then_some(Decision { end_session: true, ..redirect("require-login", LOGIN_ROUTE) })
        },
    },
    GuardRule {
        name: "business-only",
        check: |ctx, session| {
            (ctx.access.requires_auth && ctx.access.acting_as_business_only && acting_as_self(session))
                .then_some(redirect("business-only", HOME_ROUTE))
        },
    },
    GuardRule {
        name: "user-only",
        check: |ctx, session| {
            (ctx.access.requires_auth && ctx.access.acting_as_user_only && !acting_as_self(session))
                .then_some(redirect("user-only", HOME_ROUTE))
        },
    },
    // Guest-only routes stay reachable while logged in.
    GuardRule { name: "default-allow", check: |_, _| Some(allow("default-allow")) },
];

/// Decide without side effects.
pub fn decide(ctx: &GuardContext, session: &SessionSnapshot) -> Decision {
    RULES.iter().find_map(|rule| rule.check(ctx, session)).unwrap_or(allow("default-allow"))
}

/// Decide against the live session and apply the decision's side effect.
pub fn evaluate(session: &Session, ctx: &GuardContext) -> Decision {
    let decision = decide(ctx, &session.snapshot());
    if decision.end_session {
        session.set_logged_out();
    }
    if let Verdict::Redirect(to) = decision.verdict {
        tracing::debug!(rule = decision.rule, %to, "navigation redirected");
    }
    decision
}
