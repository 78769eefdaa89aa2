use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, v_flex};
use gpui_tokio_bridge::Tokio;
use kiosk_client::{Answer, AnswerBackend, AnswerReply, AskHandle, AskRequest, DeliveryResult};

use crate::chat::events::Submit;
use crate::chat::message::{Conversation, ExchangeId, ExchangeOutcome};
use crate::chat::message_input::MessageInput;
use crate::chat::message_list::MessageList;

/// Parent coordinator for the transcript, the composer, and answer delivery.
pub struct ChatView {
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    backend: Arc<dyn AnswerBackend>,
    conversation: Conversation,
    ask_worker_task: Option<Task<Result<(), gpui_tokio_bridge::JoinError>>>,
    ask_reader_task: Option<Task<()>>,
}

impl ChatView {
    pub fn new(
        backend: Arc<dyn AnswerBackend>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe(&message_input, |this, _, event: &Submit, cx| {
            this.handle_submit(event.clone(), cx);
        })
        .detach();

        let mut this = Self {
            message_list,
            message_input,
            backend,
            conversation: Conversation::new(),
            ask_worker_task: None,
            ask_reader_task: None,
        };

        this.sync_messages(cx);
        this
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    fn handle_submit(&mut self, event: Submit, cx: &mut Context<Self>) {
        let exchange = match self.conversation.begin_exchange(&event.text) {
            Ok(exchange) => exchange,
            Err(rejection) => {
                // The composer already guards these, so a rejected event is stale.
                tracing::debug!(?rejection, "submission rejected");
                return;
            }
        };

        self.message_input.update(cx, |input, cx| {
            input.set_awaiting(true, cx);
        });
        self.sync_messages(cx);

        match self.backend.ask(AskRequest::new(event.text)) {
            Ok(handle) => self.spawn_ask_pipeline(exchange, handle, cx),
            Err(error) => {
                tracing::warn!(error = %error, "question could not be handed to the backend");
                self.settle(exchange, &ExchangeOutcome::Failed, cx);
            }
        }

        cx.notify();
    }

    fn spawn_ask_pipeline(
        &mut self,
        exchange: ExchangeId,
        handle: AskHandle,
        cx: &mut Context<Self>,
    ) {
        let AskHandle { reply, worker } = handle;
        self.ask_worker_task = Some(Tokio::spawn(cx, worker));
        self.spawn_reply_reader(exchange, reply, cx);
    }

    fn spawn_reply_reader(
        &mut self,
        exchange: ExchangeId,
        reply: AnswerReply,
        cx: &mut Context<Self>,
    ) {
        self.ask_reader_task = Some(cx.spawn(async move |this, cx| {
            let outcome = reply.recv().await;

            let _ = this.update(cx, |this, cx| {
                this.handle_reply(exchange, outcome, cx);
            });
        }));
    }

    fn handle_reply(
        &mut self,
        exchange: ExchangeId,
        outcome: Option<DeliveryResult<Answer>>,
        cx: &mut Context<Self>,
    ) {
        let outcome = match outcome {
            Some(Ok(answer)) => ExchangeOutcome::Answered(answer.answer),
            Some(Err(error)) => {
                tracing::warn!(error = %error, "question delivery failed");
                ExchangeOutcome::Failed
            }
            None => {
                tracing::warn!("answer worker stopped before reporting an outcome");
                ExchangeOutcome::Failed
            }
        };

        self.settle(exchange, &outcome, cx);
    }

    fn settle(&mut self, exchange: ExchangeId, outcome: &ExchangeOutcome, cx: &mut Context<Self>) {
        if let Err(rejection) = self.conversation.settle_exchange(exchange, outcome) {
            // A late reply for a superseded exchange must not touch the log.
            tracing::debug!(?rejection, "dropping stale exchange settlement");
            return;
        }

        self.ask_worker_task = None;
        self.ask_reader_task = None;

        self.message_input.update(cx, |input, cx| {
            input.set_awaiting(false, cx);
        });
        self.sync_messages(cx);
        cx.notify();
    }

    fn sync_messages(&mut self, cx: &mut Context<Self>) {
        let messages = self.conversation.messages().to_vec();
        self.message_list.update(cx, |list, cx| {
            list.set_messages(messages, cx);
        });
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
