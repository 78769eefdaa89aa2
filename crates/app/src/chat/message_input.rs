use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::chat::events::Submit;

/// Single-line question composer.
///
/// While an exchange is awaiting its answer the field locks and the submitted
/// text stays visible; it is cleared once the exchange settles.
pub struct MessageInput {
    input_state: Entity<InputState>,
    is_awaiting: bool,
    pending_clear: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Ask a question...")
                .clean_on_escape()
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, _window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(cx);
                }
            },
        )
        .detach();

        Self {
            input_state,
            is_awaiting: false,
            pending_clear: false,
        }
    }

    pub fn set_awaiting(&mut self, awaiting: bool, cx: &mut Context<Self>) {
        if self.is_awaiting && !awaiting {
            self.pending_clear = true;
        }
        self.is_awaiting = awaiting;
        cx.notify();
    }

    pub fn is_awaiting(&self) -> bool {
        self.is_awaiting
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        if self.is_awaiting {
            return;
        }

        let content = self.input_state.read(cx).value().to_string();
        if content.trim().is_empty() {
            return;
        }

        cx.emit(Submit::new(content));
    }

    /// Clears the field after a settle.
    ///
    /// Settlement arrives off the layout pass without a window handle, so the
    /// clear is deferred to the next render.
    fn apply_pending_clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if !self.pending_clear {
            return;
        }

        self.pending_clear = false;
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
    }
}

impl Render for MessageInput {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.apply_pending_clear(window, cx);

        let theme = cx.theme();
        let is_awaiting = self.is_awaiting;
        let action = if is_awaiting {
            // Submission is rejected while awaiting, so the button loses its handler.
            Button::new("send")
                .small()
                .primary()
                .child("Thinking...")
                .into_any_element()
        } else {
            Button::new("send")
                .small()
                .primary()
                .icon(IconName::ArrowUp)
                .child("Send")
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.handle_submit(cx);
                }))
                .into_any_element()
        };

        h_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .items_center()
            .child(
                div()
                    .flex_1()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .child(
                        Input::new(&self.input_state)
                            .w_full()
                            .disabled(is_awaiting),
                    ),
            )
            .child(action)
    }
}
