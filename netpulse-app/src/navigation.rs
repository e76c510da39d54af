//! View gating.
//!
//! These redirects keep anonymous users out of views that need an identity.
//! They run entirely in the client and are not an access control: anything
//! that must be protected has to be checked again where the data is used
//! (see [`crate::export`]).

use netpulse_core::{Identity, UnknownVariant, View};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error(transparent)]
    UnknownView(#[from] UnknownVariant),
}

/// Parses a view name as typed by the user.
pub fn parse_view(name: &str) -> Result<View, NavigationError> {
    Ok(name.parse()?)
}

/// The view actually shown for a request to `target`.
pub fn resolve(target: View, identity: Option<&Identity>) -> View {
    match target {
        View::Admin if !identity.is_some_and(|i| i.is_privileged) => View::AdminLogin,
        View::Report | View::Dashboard if identity.is_none() => View::Login,
        _ => target,
    }
}

#[derive(Debug, Default)]
pub struct Navigator {
    current: View,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn go_to(&mut self, target: View, identity: Option<&Identity>) -> View {
        let resolved = resolve(target, identity);
        if resolved != target {
            debug!(requested = %target, shown = %resolved, "navigation redirected");
        }
        self.current = resolved;
        resolved
    }

    /// Returns to the landing view, as after logout.
    pub fn home(&mut self) -> View {
        self.current = View::Home;
        self.current
    }
}
