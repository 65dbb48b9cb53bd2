//! Request-scoped metadata carried alongside every command.

/// Header a boundary reads to enable fault injection.
pub const CHAOS_TYPE_HEADER: &str = "chaos-type";

/// Failure modes that can be forced on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChaosType {
    /// Every `CreateUser` in the request fails as if persistence were down.
    CreateUserDown,
}

impl ChaosType {
    /// Parses the value of [`CHAOS_TYPE_HEADER`]. Matching is case-insensitive;
    /// unknown values yield `None`.
    pub fn from_header(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "create-user-down" => Some(ChaosType::CreateUserDown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChaosType::CreateUserDown => "create-user-down",
        }
    }
}

/// Cross-cutting metadata for one caller request.
///
/// Nothing in here is persisted. With the default value the core behaves
/// exactly as if no observability collaborator were attached.
///
/// ```
/// use user_management::framework::{ChaosType, RequestContext};
///
/// let ctx = RequestContext::default()
///     .with_correlation_id("req-42")
///     .with_chaos(ChaosType::CreateUserDown);
/// assert!(ctx.has_chaos(ChaosType::CreateUserDown));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: Option<String>,
    pub chaos: Option<ChaosType>,
}

impl RequestContext {
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_chaos(mut self, chaos: ChaosType) -> Self {
        self.chaos = Some(chaos);
        self
    }

    pub fn has_chaos(&self, chaos: ChaosType) -> bool {
        self.chaos == Some(chaos)
    }
}
