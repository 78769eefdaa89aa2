use serde::Serialize;
use snafu::{ResultExt, ensure};
use tokio::sync::oneshot;

use crate::backend::{
    Answer, AnswerBackend, AnswerParseSnafu, AnswerStatusSnafu, AskHandle, AskRequest, AskWorker,
    DeliveryResult, EmptyQuestionSnafu, ReadResponseSnafu, SendRequestSnafu, make_reply_channel,
};

/// JSON body posted to the ask endpoint.
#[derive(Debug, Serialize)]
struct QuestionBody<'a> {
    question: &'a str,
}

/// Backend speaking the plain question/answer JSON protocol over HTTP.
pub struct HttpAnswerBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnswerBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim().to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn deliver(
        client: reqwest::Client,
        endpoint: String,
        question: String,
    ) -> DeliveryResult<Answer> {
        let response = client
            .post(&endpoint)
            .json(&QuestionBody {
                question: &question,
            })
            .send()
            .await
            .context(SendRequestSnafu {
                stage: "send-question",
            })?;

        let status = response.status();
        let payload = response.text().await.context(ReadResponseSnafu {
            stage: "read-answer-body",
        })?;

        if !status.is_success() {
            return AnswerStatusSnafu {
                stage: "answer-http-status",
                status: status.as_u16(),
                body: payload,
            }
            .fail();
        }

        serde_json::from_str(&payload).context(AnswerParseSnafu {
            stage: "parse-answer-body",
        })
    }

    async fn run_ask_worker(
        client: reqwest::Client,
        endpoint: String,
        question: String,
        reply_tx: oneshot::Sender<DeliveryResult<Answer>>,
    ) {
        let outcome = Self::deliver(client, endpoint.clone(), question).await;
        if let Err(error) = &outcome {
            tracing::warn!(endpoint = %endpoint, error = %error, "question delivery failed");
        }
        // The receiver may be gone if the window closed mid-flight.
        let _ = reply_tx.send(outcome);
    }
}

impl AnswerBackend for HttpAnswerBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn ask(&self, request: AskRequest) -> DeliveryResult<AskHandle> {
        ensure!(
            !request.question.trim().is_empty(),
            EmptyQuestionSnafu { stage: "ask" }
        );

        let (reply_tx, reply) = make_reply_channel();
        let worker: AskWorker = Box::pin(Self::run_ask_worker(
            self.client.clone(),
            self.endpoint.clone(),
            request.question,
            reply_tx,
        ));

        Ok(AskHandle { reply, worker })
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::backend::DeliveryError;

    fn json_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn request_complete(raw: &[u8]) -> bool {
        let Some(header_end) = raw.windows(4).position(|window| window == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&raw[..header_end]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= header_end + 4 + body_len
    }

    /// Serves one canned response on an ephemeral loopback port and returns
    /// the endpoint plus a task resolving to the raw request it captured.
    async fn one_shot_server(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener address");

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept connection");
            let mut raw = Vec::new();
            let mut buf = [0_u8; 1024];
            loop {
                let read = socket.read(&mut buf).await.expect("read request bytes");
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..read]);
                if request_complete(&raw) {
                    break;
                }
            }
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write canned response");
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://{addr}"), server)
    }

    #[test]
    fn question_body_serializes_to_wire_shape() {
        let body = QuestionBody {
            question: "Where is the library?",
        };
        let json = serde_json::to_value(&body).expect("serialize question body");
        assert_eq!(json, serde_json::json!({ "question": "Where is the library?" }));
    }

    #[test]
    fn endpoint_whitespace_is_trimmed() {
        let backend = HttpAnswerBackend::new("  http://localhost:8000  ");
        assert_eq!(backend.endpoint(), "http://localhost:8000");
    }

    #[test]
    fn blank_question_is_rejected_before_any_network_io() {
        let backend = HttpAnswerBackend::new("http://127.0.0.1:9");
        let error = backend
            .ask(AskRequest::new("   \n\t"))
            .err()
            .expect("blank question must not produce a handle");
        assert!(matches!(error, DeliveryError::EmptyQuestion { .. }));
    }

    #[tokio::test]
    async fn delivers_question_and_decodes_answer() {
        let (endpoint, server) = one_shot_server(json_response(
            "200 OK",
            r#"{"answer":"The library opens at 8am."}"#,
        ))
        .await;
        let backend = HttpAnswerBackend::new(&endpoint);

        let handle = backend
            .ask(AskRequest::new("  When does the library open? "))
            .expect("ask handle");
        tokio::spawn(handle.worker);

        let answer = handle
            .reply
            .recv()
            .await
            .expect("worker reports an outcome")
            .expect("delivery succeeds");
        assert_eq!(answer.answer, "The library opens at 8am.");

        let captured = server.await.expect("server task");
        let request_line = captured.lines().next().unwrap_or_default();
        assert!(
            request_line.starts_with("POST / "),
            "expected a POST to the endpoint root, got {request_line:?}"
        );
        assert!(
            captured
                .to_ascii_lowercase()
                .contains("content-type: application/json")
        );
        // Question text crosses the wire untrimmed.
        assert!(captured.contains(r#"{"question":"  When does the library open? "}"#));
    }

    #[tokio::test]
    async fn non_success_status_is_a_delivery_failure() {
        let (endpoint, server) = one_shot_server(json_response(
            "500 Internal Server Error",
            r#"{"detail":"model crashed"}"#,
        ))
        .await;
        let backend = HttpAnswerBackend::new(&endpoint);

        let handle = backend.ask(AskRequest::new("hello")).expect("ask handle");
        tokio::spawn(handle.worker);

        let outcome = handle
            .reply
            .recv()
            .await
            .expect("worker reports an outcome");
        match outcome {
            Err(DeliveryError::AnswerStatus { status, body, .. }) => {
                assert_eq!(status, 500);
                assert!(body.contains("model crashed"));
            }
            other => panic!("expected a status failure, got {other:?}"),
        }
        server.await.expect("server task");
    }

    #[tokio::test]
    async fn malformed_answer_payload_is_a_delivery_failure() {
        let (endpoint, _server) =
            one_shot_server(json_response("200 OK", r#"{"answer":42}"#)).await;
        let backend = HttpAnswerBackend::new(&endpoint);

        let handle = backend.ask(AskRequest::new("hello")).expect("ask handle");
        tokio::spawn(handle.worker);

        let outcome = handle
            .reply
            .recv()
            .await
            .expect("worker reports an outcome");
        assert!(matches!(outcome, Err(DeliveryError::AnswerParse { .. })));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_delivery_failure() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe listener");
        let endpoint = format!("http://{}", listener.local_addr().expect("probe address"));
        drop(listener);

        let backend = HttpAnswerBackend::new(&endpoint);
        let handle = backend
            .ask(AskRequest::new("anyone home?"))
            .expect("ask handle");
        tokio::spawn(handle.worker);

        let outcome = handle
            .reply
            .recv()
            .await
            .expect("worker reports an outcome");
        assert!(matches!(outcome, Err(DeliveryError::SendRequest { .. })));
    }
}
