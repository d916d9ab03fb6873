use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Opaque subject id; this is the `userid` sent with every request
    pub sub: String,

    #[serde(default)]
    pub given_name: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

impl UserIdentity {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            given_name: None,
            name: None,
        }
    }

    /// Greeting name: given name, then full name, then the subject id.
    pub fn display_name(&self) -> &str {
        self.given_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.sub)
    }
}
