//! Embeddable assistant chat widget for egui hosts.
//!
//! Construct a [`ChatWidget`] once with a [`aula_core::WidgetConfig`] and
//! call [`ChatWidget::ui`] at the end of each frame, after the host's own
//! panels. The launcher button floats bottom-right above whatever the host
//! draws; the chat panel anchors above it.

pub mod widget;

pub use widget::{BubbleId, ChatWidget, PLACEHOLDER_TEXT};
