//! AULA core: conversation data model, citation normalization, and the chat
//! transport behind the embeddable assistant widget.
//!
//! The egui widget itself lives in the `aula-widget-ui` add-on; this crate
//! holds everything that does not touch a UI toolkit, so the transport can be
//! reused from test harnesses or other frontends.

pub mod config;
pub mod model;
pub mod transport;

pub use config::{WidgetConfig, DEFAULT_ENDPOINT};
pub use model::{ChatReply, ChatRequest, Citation, ConversationTurn, Role, FALLBACK_ANSWER};
pub use transport::{
    ChatClient, ChatError, ChatResult, CONNECTION_FAILED_TEXT, SERVER_ERROR_TEXT,
};
