use sqlx::FromRow;

/// A registered principal.
///
/// `email` is treated as an opaque, case-sensitive unique string; no
/// normalization happens anywhere. No serde derives here: `pass_hash` must
/// never be serialized or logged.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub pass_hash: String,
    pub is_admin: bool,
}

/// A client application permitted to request tokens. Provisioned
/// out-of-band; read-only to this service. `secret` signs the tokens issued
/// to users authenticating through this app.
#[derive(Debug, Clone, FromRow)]
pub struct App {
    pub id: i64,
    pub name: String,
    pub secret: String,
}
