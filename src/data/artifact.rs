//! Model artifact fetch.
//!
//! The forecasting model is trained offline and published as an opaque byte
//! blob. This module only retrieves the bytes; turning them into a usable
//! model is the forecast service's job.

use reqwest::blocking::Client;

use crate::error::{FetchError, LoadError};

/// Published location of the serialized forecasting model.
const DEFAULT_MODEL_URL: &str =
    "https://raw.githubusercontent.com/Baaprado/Pos_Tech_FIAP_Fase_4/main/modelo_prophet.json";

/// Environment override for the artifact location.
const MODEL_URL_VAR: &str = "BRENT_MODEL_URL";

pub struct ArtifactSource {
    client: Client,
    url: String,
}

impl ArtifactSource {
    /// Resolve the artifact URL: explicit override → `BRENT_MODEL_URL` → default.
    pub fn from_env(url_override: Option<&str>) -> Self {
        dotenvy::dotenv().ok();
        let url = url_override
            .map(str::to_string)
            .or_else(|| std::env::var(MODEL_URL_VAR).ok())
            .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the artifact bytes. Single attempt, fail fast.
    ///
    /// A zero-byte body is a load failure (`LoadError::EmptyPayload`), not a
    /// valid artifact.
    pub fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()).into());
        }

        let bytes = resp
            .bytes()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if bytes.is_empty() {
            return Err(LoadError::EmptyPayload);
        }

        Ok(bytes.to_vec())
    }
}
