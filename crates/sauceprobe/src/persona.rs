//! Personas and the behavior policy each one implies.
//!
//! Saucedemo ships four demo accounts with deliberately different behavior.
//! Everything persona-dependent in the tasks reads a [`PersonaPolicy`] from
//! the [`PolicyTable`] held by the actor, so the branching lives here and
//! nowhere else.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Demo account identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Persona {
    /// Behaves normally
    StandardUser,
    /// Broken images, one broken add button, last-name field bug
    ProblemUser,
    /// Rejected at login
    LockedOutUser,
    /// Slow login and checkout
    PerformanceGlitchUser,
    /// Any name without a policy
    Unrecognized(String),
}

impl Persona {
    /// Known personas in documentation order
    pub const KNOWN: [Self; 4] = [
        Self::StandardUser,
        Self::ProblemUser,
        Self::LockedOutUser,
        Self::PerformanceGlitchUser,
    ];

    /// Parse a username; never fails
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "standard_user" => Self::StandardUser,
            "problem_user" => Self::ProblemUser,
            "locked_out_user" => Self::LockedOutUser,
            "performance_glitch_user" => Self::PerformanceGlitchUser,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Login username
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::StandardUser => "standard_user",
            Self::ProblemUser => "problem_user",
            Self::LockedOutUser => "locked_out_user",
            Self::PerformanceGlitchUser => "performance_glitch_user",
            Self::Unrecognized(name) => name,
        }
    }

    /// Whether a policy exists for this persona
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.username())
    }
}

impl From<String> for Persona {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Persona> for String {
    fn from(value: Persona) -> Self {
        value.username().to_string()
    }
}

// =============================================================================
// POLICY TYPES
// =============================================================================

/// What a successful login submission leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginExpectation {
    /// The inventory list appears
    Inventory,
    /// The lockout error appears
    LockedOut,
}

/// How many products to add to the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemQuota {
    /// Exactly n (capped at what is available)
    Exactly(usize),
    /// At most n
    UpTo(usize),
}

impl ItemQuota {
    /// Number of items to pick given `available` products
    #[must_use]
    pub fn resolve(self, available: usize) -> usize {
        match self {
            Self::Exactly(n) | Self::UpTo(n) => n.min(available),
        }
    }
}

/// Expected cart count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartExpectation {
    /// Exactly n items
    Exactly(usize),
    /// At least n items
    AtLeast(usize),
}

impl CartExpectation {
    /// Whether `count` satisfies the expectation
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for CartExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// How checkout step two is confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutWait {
    /// Poll the URL for the step-two marker, then assert it
    UrlMarker,
    /// No usable signal: settle for a fixed time
    Settle,
}

/// Behavior policy for one persona
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaPolicy {
    /// Login outcome
    pub login: LoginExpectation,
    /// Extra wait added to the inventory wait after login
    pub login_grace: Duration,
    /// Items to add
    pub quota: ItemQuota,
    /// Expected cart count
    pub cart: CartExpectation,
    /// Step-two confirmation and finish handling
    pub checkout: CheckoutWait,
}

impl PersonaPolicy {
    const STANDARD: Self = Self {
        login: LoginExpectation::Inventory,
        login_grace: Duration::ZERO,
        quota: ItemQuota::UpTo(4),
        cart: CartExpectation::Exactly(4),
        checkout: CheckoutWait::UrlMarker,
    };
}

/// Lookup table persona → policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    standard: PersonaPolicy,
    problem: PersonaPolicy,
    locked_out: PersonaPolicy,
    glitch: PersonaPolicy,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::with_glitch_grace(Duration::from_secs(10))
    }
}

impl PolicyTable {
    /// Stock Saucedemo policies with the given glitch login grace
    #[must_use]
    pub const fn with_glitch_grace(grace: Duration) -> Self {
        Self {
            standard: PersonaPolicy::STANDARD,
            problem: PersonaPolicy {
                quota: ItemQuota::Exactly(2),
                cart: CartExpectation::AtLeast(1),
                ..PersonaPolicy::STANDARD
            },
            locked_out: PersonaPolicy {
                login: LoginExpectation::LockedOut,
                ..PersonaPolicy::STANDARD
            },
            glitch: PersonaPolicy {
                login_grace: grace,
                checkout: CheckoutWait::Settle,
                ..PersonaPolicy::STANDARD
            },
        }
    }

    /// Policy for a persona
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownPersona`] for unrecognized names
    pub fn policy_for(&self, persona: &Persona) -> ProbeResult<PersonaPolicy> {
        match persona {
            Persona::StandardUser => Ok(self.standard),
            Persona::ProblemUser => Ok(self.problem),
            Persona::LockedOutUser => Ok(self.locked_out),
            Persona::PerformanceGlitchUser => Ok(self.glitch),
            Persona::Unrecognized(name) => Err(ProbeError::UnknownPersona { name: name.clone() }),
        }
    }
}
