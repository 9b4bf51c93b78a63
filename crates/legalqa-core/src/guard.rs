//! Access guard: maps session state plus a requested view to a routing decision.

use crate::auth::SessionState;

/// Views the client can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    /// Public question form, the default view
    Ask,
    Login,
    Register,
    /// Upload, URL ingestion and drift tabs
    Dashboard,
    Monitoring,
}

impl ViewId {
    pub const ALL: [ViewId; 5] = [
        ViewId::Ask,
        ViewId::Login,
        ViewId::Register,
        ViewId::Dashboard,
        ViewId::Monitoring,
    ];

    /// Parse a route path. Leading/trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim().trim_matches('/') {
            "" | "ask" => Some(ViewId::Ask),
            "login" => Some(ViewId::Login),
            "register" => Some(ViewId::Register),
            "dashboard" => Some(ViewId::Dashboard),
            "monitoring" => Some(ViewId::Monitoring),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ViewId::Ask => "/",
            ViewId::Login => "/login",
            ViewId::Register => "/register",
            ViewId::Dashboard => "/dashboard",
            ViewId::Monitoring => "/monitoring",
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, ViewId::Dashboard | ViewId::Monitoring)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render,
    /// Session still bootstrapping; show nothing and ask again once settled
    Suspend,
    RedirectTo(ViewId),
}

/// Route a raw path. Unknown paths go to the public default view.
pub fn decide(state: &SessionState, requested: &str) -> Decision {
    match ViewId::from_path(requested) {
        Some(view) => decide_view(state, view),
        None => Decision::RedirectTo(ViewId::Ask),
    }
}

pub fn decide_view(state: &SessionState, view: ViewId) -> Decision {
    if !view.requires_auth() {
        return match (view, state) {
            (ViewId::Login | ViewId::Register, SessionState::Authenticated(_)) => {
                Decision::RedirectTo(ViewId::Dashboard)
            }
            _ => Decision::Render,
        };
    }

    match state {
        SessionState::Authenticated(_) => Decision::Render,
        SessionState::Bootstrapping => Decision::Suspend,
        SessionState::Unauthenticated | SessionState::AuthError(_) => {
            Decision::RedirectTo(ViewId::Login)
        }
    }
}
