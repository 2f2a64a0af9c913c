//! The chat widget: floating launcher, chat panel, and the send
//! orchestration between them.
//!
//! [`ChatWidget`] is self-contained instance state; several widgets can
//! coexist in one host because every egui id is salted with the instance
//! number.
//!
//! Send path: the user turn and a "composing…" placeholder bubble are
//! appended immediately, the request runs on the widget's tokio runtime, and
//! the frame loop polls one channel per in-flight exchange until the
//! placeholder can be resolved in place. A failed exchange resolves its
//! placeholder to a fixed error string and leaves history untouched, so the
//! backend never sees a turn that did not complete.

use aula_core::{
    ChatClient, ChatError, ChatReply, ChatRequest, ChatResult, Citation, ConversationTurn, Role,
    WidgetConfig,
};
use eframe::egui;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;

/// Fixed text shown in an assistant bubble while its exchange is in flight.
pub const PLACEHOLDER_TEXT: &str = "composing…";

const PANEL_WIDTH: f32 = 320.0;
const PANEL_HEIGHT: f32 = 420.0;
const BUBBLE_MAX_WIDTH: f32 = 240.0;

static NEXT_INSTANCE: AtomicUsize = AtomicUsize::new(0);

/// Opaque handle to one rendered bubble, returned by `append_bubble` and
/// consumed by `resolve_bubble`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleId(usize);

/// One rendered transcript entry. Display only; the wire history is kept
/// separately so greeting and placeholder bubbles never reach the backend.
struct Bubble {
    role: Role,
    text: String,
    citations: Vec<Citation>,
}

/// One in-flight send: the placeholder to resolve plus the channel its
/// result arrives on.
struct Exchange {
    bubble: BubbleId,
    rx: mpsc::Receiver<ChatResult<ChatReply>>,
}

pub struct ChatWidget {
    config: WidgetConfig,
    client: ChatClient,
    runtime: tokio::runtime::Runtime,
    instance: usize,
    open: bool,
    focus_input: bool,
    input: String,
    transcript: Vec<Bubble>,
    history: Vec<ConversationTurn>,
    in_flight: Vec<Exchange>,
    scroll_to_bottom: bool,
}

impl ChatWidget {
    /// Build a widget from configuration. Fails when the endpoint URL does
    /// not parse. Panics if the background runtime cannot start.
    pub fn new(config: WidgetConfig) -> ChatResult<Self> {
        let client = ChatClient::from_config(&config)?;
        let runtime = tokio::runtime::Runtime::new().expect("start chat widget runtime");
        Ok(Self {
            client,
            runtime,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            open: false,
            focus_input: false,
            input: String::new(),
            transcript: Vec::new(),
            history: Vec::new(),
            in_flight: Vec::new(),
            scroll_to_bottom: false,
            config,
        })
    }

    /// Panel visibility. The launcher toggles it; the header close button
    /// resets it.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flip the panel. The first open with an empty transcript injects the
    /// configured greeting as a display-only assistant bubble; it is never
    /// part of the history sent to the backend. Opening queues input focus.
    pub fn toggle_open(&mut self) {
        self.open = !self.open;
        if self.open {
            if self.transcript.is_empty() {
                let greeting = self.config.greeting.clone();
                self.append_bubble(Role::Assistant, greeting, Vec::new());
            }
            self.focus_input = true;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Append a bubble and hand back its handle for later in-place update.
    pub fn append_bubble(
        &mut self,
        role: Role,
        text: impl Into<String>,
        citations: Vec<Citation>,
    ) -> BubbleId {
        self.transcript.push(Bubble {
            role,
            text: text.into(),
            citations,
        });
        self.scroll_to_bottom = true;
        BubbleId(self.transcript.len() - 1)
    }

    /// Replace a bubble's text and citations in place. Invalid handles are
    /// ignored.
    pub fn resolve_bubble(&mut self, id: BubbleId, text: impl Into<String>, citations: Vec<Citation>) {
        if let Some(bubble) = self.transcript.get_mut(id.0) {
            bubble.text = text.into();
            bubble.citations = citations;
            self.scroll_to_bottom = true;
        }
    }

    /// Send the current input.
    ///
    /// Empty or whitespace-only input is ignored outright: no bubble, no
    /// network call. Otherwise the user turn goes into the transcript and
    /// the history, a placeholder bubble is appended, and the exchange runs
    /// in the background. History gains the assistant turn only when the
    /// exchange succeeds.
    pub fn send(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.input.clear();

        self.append_bubble(Role::User, text.clone(), Vec::new());
        self.history.push(ConversationTurn::user(text.clone()));

        let placeholder = self.append_bubble(Role::Assistant, PLACEHOLDER_TEXT, Vec::new());
        let request = ChatRequest {
            message: text,
            history: self.history.clone(),
        };

        let client = self.client.clone();
        let (tx, rx) = mpsc::channel();
        self.in_flight.push(Exchange {
            bubble: placeholder,
            rx,
        });
        self.runtime.spawn(async move {
            let _ = tx.send(client.ask(&request).await);
        });
    }

    /// Drain finished exchanges without blocking. Called once per frame
    /// before rendering. A disconnected channel means the worker died without
    /// reporting; its placeholder resolves like a connection failure so no
    /// bubble is left composing forever.
    pub fn poll(&mut self) {
        let mut finished: Vec<(BubbleId, ChatResult<ChatReply>)> = Vec::new();
        self.in_flight.retain(|exchange| match exchange.rx.try_recv() {
            Ok(outcome) => {
                finished.push((exchange.bubble, outcome));
                false
            }
            Err(mpsc::TryRecvError::Empty) => true,
            Err(mpsc::TryRecvError::Disconnected) => {
                finished.push((
                    exchange.bubble,
                    Err(ChatError::Connection("exchange worker vanished".to_string())),
                ));
                false
            }
        });
        for (bubble, outcome) in finished {
            self.finish_exchange(bubble, outcome);
        }
    }

    /// Resolve one placeholder from its exchange outcome.
    fn finish_exchange(&mut self, bubble: BubbleId, outcome: ChatResult<ChatReply>) {
        match outcome {
            Ok(reply) => {
                self.history
                    .push(ConversationTurn::assistant(reply.answer.clone()));
                self.resolve_bubble(bubble, reply.answer, reply.citations);
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat exchange failed");
                self.resolve_bubble(bubble, err.user_message(), Vec::new());
            }
        }
    }

    /// Draw the launcher and, when open, the panel. Call after the host's
    /// own panels so the widget floats above them.
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.poll();
        if !self.in_flight.is_empty() {
            // Keep polling even while the user is idle.
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::Area::new(egui::Id::new(("aula_launcher", self.instance)))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .show(ctx, |ui| {
                let glyph = egui::RichText::new("💬").size(22.0);
                let launcher = egui::Button::new(glyph)
                    .min_size(egui::vec2(48.0, 48.0))
                    .rounding(24.0);
                if ui.add(launcher).clicked() {
                    self.toggle_open();
                }
            });

        if !self.open {
            return;
        }

        egui::Window::new("")
            .id(egui::Id::new(("aula_panel", self.instance)))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -76.0))
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .fixed_size(egui::vec2(PANEL_WIDTH, PANEL_HEIGHT))
            .show(ctx, |ui| {
                self.header_ui(ui);
                ui.separator();
                self.messages_ui(ui);
                ui.separator();
                self.input_ui(ui);
                self.footer_ui(ui);
            });
    }

    fn header_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(self.config.panel_title.as_str()).strong());
            ui.label(egui::RichText::new("Beta").small().weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").clicked() {
                    self.close();
                }
            });
        });
    }

    fn messages_ui(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt(("aula_messages", self.instance))
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .max_height(PANEL_HEIGHT - 130.0)
            .show(ui, |ui| {
                for bubble in &self.transcript {
                    bubble_ui(ui, bubble);
                }
                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
        self.scroll_to_bottom = false;
    }

    fn input_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let edit = egui::TextEdit::singleline(&mut self.input)
                .id(egui::Id::new(("aula_input", self.instance)))
                .hint_text("Type your question…")
                .desired_width(BUBBLE_MAX_WIDTH);
            let response = ui.add(edit);
            if self.focus_input {
                response.request_focus();
                self.focus_input = false;
            }
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Send").clicked() || submitted {
                self.send();
                if submitted {
                    response.request_focus();
                }
            }
        });
    }

    fn footer_ui(&self, ui: &mut egui::Ui) {
        ui.add_space(2.0);
        ui.label(egui::RichText::new(self.config.footer_hint.as_str()).small().weak());
    }
}

fn bubble_ui(ui: &mut egui::Ui, bubble: &Bubble) {
    let (align, fill) = match bubble.role {
        Role::User => (egui::Align::Max, ui.visuals().widgets.inactive.bg_fill),
        Role::Assistant => (egui::Align::Min, ui.visuals().faint_bg_color),
    };
    ui.with_layout(egui::Layout::top_down(align), |ui| {
        egui::Frame::none()
            .fill(fill)
            .rounding(6.0)
            .inner_margin(egui::Margin::symmetric(8.0, 6.0))
            .show(ui, |ui| {
                ui.set_max_width(BUBBLE_MAX_WIDTH);
                ui.label(bubble.text.as_str());
                if !bubble.citations.is_empty() {
                    citations_ui(ui, &bubble.citations);
                }
            });
        ui.add_space(4.0);
    });
}

/// Comma-separated inline source list: hyperlinks for resolved URLs, plain
/// labels otherwise.
fn citations_ui(ui: &mut egui::Ui, citations: &[Citation]) {
    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.label(egui::RichText::new("Sources: ").small().weak());
        for (i, citation) in citations.iter().enumerate() {
            if i > 0 {
                ui.label(egui::RichText::new(", ").small());
            }
            match citation {
                Citation::Text(name) => {
                    ui.label(egui::RichText::new(name.as_str()).small());
                }
                Citation::Linked { name, url } => {
                    ui.hyperlink_to(egui::RichText::new(name.as_str()).small(), url.as_str());
                }
            }
        }
    });
}
