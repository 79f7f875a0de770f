/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field names map to upper-case
/// env vars (`database_url` <- `DATABASE_URL`). A `.env` file in the working
/// directory is loaded first when present; real env vars win over it.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        let _ = dotenvy::dotenv();
        envy::from_env()
    }

    /// Load from an explicit key/value list. Used by tests to avoid touching the
    /// process environment.
    fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }
}
