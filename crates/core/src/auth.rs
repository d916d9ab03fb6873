use crate::errors::CoreError;
use crate::models::user::UserIdentity;

/// The identity provider the plan page defers authentication to.
pub trait IdentityProvider {
    /// True while the provider is still restoring the session.
    fn is_loading(&self) -> bool;

    fn is_authenticated(&self) -> bool;

    /// The signed-in user, if any.
    fn user(&self) -> Option<UserIdentity>;

    /// Send the user to the provider's login page.
    fn login_with_redirect(&self) -> Result<(), CoreError>;
}

/// What the plan page may show for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAccess {
    /// Session still loading: render nothing yet.
    Pending,
    /// Not logged in: render the login prompt.
    LoginRequired,
    /// Logged in: rules and projections may be requested for this user.
    Ready(UserIdentity),
}

impl PlanAccess {
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            PlanAccess::Ready(user) => Some(user),
            _ => None,
        }
    }
}

/// Decide what the plan page may show. No backend request is allowed
/// unless this returns `Ready`.
pub fn plan_access<P: IdentityProvider + ?Sized>(provider: &P) -> PlanAccess {
    if provider.is_loading() {
        return PlanAccess::Pending;
    }
    if !provider.is_authenticated() {
        return PlanAccess::LoginRequired;
    }
    match provider.user() {
        Some(user) if !user.sub.is_empty() => PlanAccess::Ready(user),
        _ => {
            tracing::warn!("identity provider reports a session without a user id");
            PlanAccess::LoginRequired
        }
    }
}

/// Login prompt shown by `PlanAccess::LoginRequired`.
pub const LOGIN_PROMPT: &str = "You need to be logged in!";
