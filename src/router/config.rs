use serde::{Deserialize, Serialize};

/// Fallback policy switches for a [`Router`](super::Router).
///
/// Every flag defaults to `true`. Missing fields in a serialized document
/// fall back to their defaults, so a config file only needs to name the
/// switches it turns off.
///
/// # Examples
///
/// ```
/// use radixroute::router::RouterConfig;
///
/// let config = RouterConfig::from_json(r#"{ "redirect_fixed_path": false }"#).unwrap();
/// assert!(!config.redirect_fixed_path);
/// assert!(config.redirect_trailing_slash);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Redirect `/foo/` to `/foo` (and back) when only the other form is
    /// registered. `GET`/`HEAD` get 301, everything else 307.
    pub redirect_trailing_slash: bool,

    /// On a miss, clean the path and retry case-insensitively; redirect to
    /// the registered spelling when that finds a route.
    pub redirect_fixed_path: bool,

    /// Answer 405 with an `Allow` header when the path exists for another
    /// method.
    pub handle_method_not_allowed: bool,

    /// Answer `OPTIONS` requests automatically unless an `OPTIONS` handler
    /// is registered for the path.
    pub handle_options: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
        }
    }
}

impl RouterConfig {
    /// Parses a JSON object into a config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
