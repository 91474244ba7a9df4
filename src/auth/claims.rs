use serde::{Deserialize, Serialize};

/// JWT payload. The role is kept as the raw literal so the use cases
/// validate it themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub role: String, // "employee" | "moderator"
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,  // issuer
    pub aud: String,  // audience
}
