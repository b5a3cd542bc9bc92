//! Toggle states
//!
//! The per-provider answer to "is this feature enabled?".

use serde::{Deserialize, Serialize};

/// Result of asking a single provider about a feature.
///
/// `NotConfigured` is not the same as `Disabled`: it means the provider has
/// no opinion and the next provider should be asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleState {
    /// The provider enables the feature
    Enabled,

    /// The provider disables the feature
    Disabled,

    /// The provider does not know the feature
    NotConfigured,
}

impl ToggleState {
    /// Map a definitive boolean onto a state
    pub fn from_bool(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    /// `Some(enabled)` for definitive answers, `None` for `NotConfigured`
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Enabled => Some(true),
            Self::Disabled => Some(false),
            Self::NotConfigured => None,
        }
    }

    pub fn is_configured(self) -> bool {
        self != Self::NotConfigured
    }
}

impl From<bool> for ToggleState {
    fn from(enabled: bool) -> Self {
        Self::from_bool(enabled)
    }
}

impl From<Option<bool>> for ToggleState {
    fn from(enabled: Option<bool>) -> Self {
        enabled.map_or(Self::NotConfigured, Self::from_bool)
    }
}

impl From<ToggleState> for Option<bool> {
    fn from(state: ToggleState) -> Self {
        state.as_bool()
    }
}

/// Lenient boolean parse: `true`/`false` in any ASCII case, surrounding
/// whitespace ignored. Anything else is `false`.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
