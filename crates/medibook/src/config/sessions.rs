/// Session validity config
#[derive(Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// How long session tokens should last for (in seconds)
    pub expire_session: i64,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            expire_session: 3600 * 24,
        }
    }
}
