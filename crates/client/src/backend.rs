use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use snafu::Snafu;
use tokio::sync::oneshot;

/// One question ready for delivery. The text is carried verbatim; callers
/// decide what counts as submittable before building a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Answer payload returned by the ask endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Answer {
    pub answer: String,
}

pub type AskWorker = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
pub type DeliveryResult<T> = Result<T, DeliveryError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeliveryError {
    #[snafu(display("question is empty after trimming"))]
    EmptyQuestion { stage: &'static str },
    #[snafu(display("failed to send question on `{stage}`, {source}"))]
    SendRequest {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("failed to read answer response on `{stage}`, {source}"))]
    ReadResponse {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("answer endpoint returned status {status}: {body}"))]
    AnswerStatus {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to parse answer payload on `{stage}`, {source}"))]
    AnswerParse {
        stage: &'static str,
        source: serde_json::Error,
    },
}

pub struct AnswerReply {
    reply: oneshot::Receiver<DeliveryResult<Answer>>,
}

impl AnswerReply {
    pub(crate) fn new(reply: oneshot::Receiver<DeliveryResult<Answer>>) -> Self {
        Self { reply }
    }

    /// Resolves once the exchange settles. `None` means the worker was dropped
    /// before it could report an outcome.
    pub async fn recv(self) -> Option<DeliveryResult<Answer>> {
        self.reply.await.ok()
    }
}

pub struct AskHandle {
    pub reply: AnswerReply,
    pub worker: AskWorker,
}

pub trait AnswerBackend: Send + Sync {
    fn name(&self) -> &str;
    fn ask(&self, request: AskRequest) -> DeliveryResult<AskHandle>;
}

pub(crate) fn make_reply_channel() -> (oneshot::Sender<DeliveryResult<Answer>>, AnswerReply) {
    let (reply_tx, reply_rx) = oneshot::channel();
    (reply_tx, AnswerReply::new(reply_rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_decodes_from_wire_payload() {
        let answer: Answer =
            serde_json::from_str(r#"{"answer":"Visit the registrar's office."}"#)
                .expect("decode answer");
        assert_eq!(answer.answer, "Visit the registrar's office.");
    }

    #[test]
    fn answer_requires_a_string_payload() {
        assert!(serde_json::from_str::<Answer>(r#"{"answer":7}"#).is_err());
        assert!(serde_json::from_str::<Answer>(r#"{}"#).is_err());
        assert!(serde_json::from_str::<Answer>(r#"{"answer":null}"#).is_err());
    }

    #[test]
    fn ask_request_keeps_text_verbatim() {
        let request = AskRequest::new("  spaced out  ");
        assert_eq!(request.question, "  spaced out  ");
    }

    #[tokio::test]
    async fn reply_resolves_none_when_worker_is_dropped() {
        let (reply_tx, reply) = make_reply_channel();
        drop(reply_tx);
        assert!(reply.recv().await.is_none());
    }
}
