//! One-time notifications carried across a redirect.
//!
//! A handler stores a flash in the session right before redirecting; the
//! next page that renders takes it out, so it is shown exactly once.

use std::fmt;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

/// Outcome a flash reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashStatus {
    Success,
    Failure,
}

/// Renders as the CSS modifier used by the templates.
impl fmt::Display for FlashStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
        }
    }
}

/// A message to show on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    pub status: FlashStatus,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: FlashStatus::Success,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: FlashStatus::Failure,
        }
    }

    /// Store this flash for the next rendered page, replacing any pending one.
    ///
    /// # Errors
    ///
    /// Returns a session error if the session store fails.
    pub async fn push(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::FLASH, self).await
    }

    /// Take the pending flash out of the session, if any.
    ///
    /// # Errors
    ///
    /// Returns a session error if the session store fails.
    pub async fn take(session: &Session) -> Result<Option<Self>, tower_sessions::session::Error> {
        session.remove::<Self>(session_keys::FLASH).await
    }
}
