//! Widget configuration.
//!
//! Precedence: built-in defaults, then an optional TOML file, then `AULA_*`
//! environment variables. The file path comes from `AULA_CONFIG`, falling
//! back to `config/widget.toml`. The endpoint is fixed for the lifetime of a
//! widget instance; it is not editable from the panel.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chat endpoint used when nothing is configured. Matches the backend's
/// default local port.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8787/chat";

const DEFAULT_PANEL_TITLE: &str = "Assistant";
const DEFAULT_GREETING: &str = "Hi 👋 Ask me anything and I will try to help.";
const DEFAULT_FOOTER_HINT: &str = "Answers are generated automatically and may be incomplete.";

/// Widget configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Chat endpoint the widget POSTs each exchange to.
    pub endpoint: String,
    /// Title shown in the panel header.
    pub panel_title: String,
    /// Assistant greeting injected when the panel is first opened. Display
    /// only; never sent to the backend as history.
    pub greeting: String,
    /// Hint line shown under the input bar.
    pub footer_hint: String,
    /// Optional per-request timeout in seconds. Unset means platform
    /// defaults apply.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            panel_title: DEFAULT_PANEL_TITLE.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            footer_hint: DEFAULT_FOOTER_HINT.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl WidgetConfig {
    /// Load config from file and environment. Precedence: env `AULA_CONFIG`
    /// path > `config/widget.toml` > defaults; `AULA_*` variables override
    /// whatever the file says.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("AULA_CONFIG").unwrap_or_else(|_| "config/widget.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`load`](Self::load) with an explicit file path. The file may
    /// be absent; defaults and environment still apply.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("panel_title", DEFAULT_PANEL_TITLE)?
            .set_default("greeting", DEFAULT_GREETING)?
            .set_default("footer_hint", DEFAULT_FOOTER_HINT)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        builder
            .add_source(config::Environment::with_prefix("AULA").separator("__"))
            .build()?
            .try_deserialize()
    }
}
