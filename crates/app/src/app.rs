use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, v_flex};
use kiosk_client::AnswerBackend;

use crate::chat::ChatView;

pub const APP_TITLE: &str = "University FAQ Bot";
pub const APP_SUBTITLE: &str = "Ask me anything about campus life, courses, or facilities!";

gpui::actions!(shell, [Quit]);

/// Main application shell: a fixed header above the chat view.
pub struct KioskShell {
    chat_view: Entity<ChatView>,
}

impl KioskShell {
    pub fn new(
        backend: Arc<dyn AnswerBackend>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(backend, window, cx));
        Self { chat_view }
    }
}

impl Render for KioskShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .size_full()
            .bg(theme.background)
            .child(
                v_flex()
                    .id("shell-header")
                    .w_full()
                    .items_center()
                    .gap_1()
                    .pt_6()
                    .pb_4()
                    .child(
                        div()
                            .text_lg()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(theme.primary)
                            .child(APP_TITLE),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(APP_SUBTITLE),
                    ),
            )
            .child(
                div()
                    .id("shell-content")
                    .flex_1()
                    .min_h_0()
                    .overflow_hidden()
                    .child(self.chat_view.clone()),
            )
    }
}
