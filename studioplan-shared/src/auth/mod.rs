/// Authentication primitives
///
/// - [`session`]: session-token validation and extraction
///
/// [`AuthContext`] is what request handlers see once a token checks out.

pub mod session;

use serde::{Deserialize, Serialize};
use session::SessionClaims;
use uuid::Uuid;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Owner id used to scope every datastore call
    pub user_id: Uuid,

    pub email: Option<String>,
}

impl From<SessionClaims> for AuthContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}
