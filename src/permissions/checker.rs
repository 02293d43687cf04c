//! Permission-gap checks against a capability snapshot.

use super::scope::Scope;
use super::vocabulary::PERMISSIONS;

/// The permissions a check is asked about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requested {
    /// The whole canonical vocabulary, in canonical order.
    #[default]
    All,
    /// Specific tokens, in caller order. Unknown tokens are allowed.
    Tokens(Vec<String>),
}

impl Requested {
    fn tokens(&self) -> Vec<&str> {
        match self {
            Self::All => PERMISSIONS.to_vec(),
            Self::Tokens(tokens) => tokens.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Requested {
    fn from(token: &str) -> Self {
        Self::Tokens(vec![token.to_string()])
    }
}

impl From<String> for Requested {
    fn from(token: String) -> Self {
        Self::Tokens(vec![token])
    }
}

impl From<&[&str]> for Requested {
    fn from(tokens: &[&str]) -> Self {
        Self::Tokens(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Requested {
    fn from(tokens: [&str; N]) -> Self {
        Self::from(&tokens[..])
    }
}

impl From<Vec<&str>> for Requested {
    fn from(tokens: Vec<&str>) -> Self {
        Self::from(tokens.as_slice())
    }
}

impl From<Vec<String>> for Requested {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl<T: Into<Requested>> From<Option<T>> for Requested {
    fn from(tokens: Option<T>) -> Self {
        tokens.map(Into::into).unwrap_or_default()
    }
}

/// Requested permissions the bot does not hold in `scope`.
///
/// Order follows the request. Tokens outside the vocabulary are reported
/// as missing.
pub fn missing(scope: &Scope, requested: impl Into<Requested>) -> Vec<String> {
    filter(scope, &requested.into(), false)
}

/// Requested permissions the bot holds in `scope`.
pub fn held(scope: &Scope, requested: impl Into<Requested>) -> Vec<String> {
    filter(scope, &requested.into(), true)
}

/// Every vocabulary permission the bot holds in `scope`.
pub fn granted_permissions(scope: &Scope) -> Vec<String> {
    held(scope, Requested::All)
}

fn filter(scope: &Scope, requested: &Requested, want: bool) -> Vec<String> {
    let capabilities = scope.capabilities();
    requested
        .tokens()
        .into_iter()
        .filter(|token| capabilities.holds(token) == want)
        .map(str::to_string)
        .collect()
}
