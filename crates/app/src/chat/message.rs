use chrono::{DateTime, Local};

/// Bot message every conversation is seeded with.
pub const GREETING: &str = "Hi! I'm FAQ Bot. Ask me anything about the university!";

/// Bot message appended whenever an exchange fails to deliver an answer.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I'm having trouble connecting to the server. Please try again later.";

/// Compile-time validation of the seeded texts.
const _: () = {
    assert!(!GREETING.is_empty());
    assert!(!FALLBACK_ANSWER.is_empty());
};

/// Stable identifier for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Identifier for one question/answer exchange.
///
/// This must change on every accepted submission so a late reply can be told
/// apart from the exchange currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExchangeId(pub u64);

impl ExchangeId {
    /// Creates a typed exchange identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Bot,
}

/// Core immutable message model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub sent_at: DateTime<Local>,
}

impl Message {
    /// Creates a message stamped with the current local time.
    pub fn new(id: MessageId, role: Role, text: impl Into<String>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            sent_at: Local::now(),
        }
    }
}

/// Request lifecycle boundary for the single-flight submission rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    AwaitingResponse(ExchangeId),
}

/// State transition input for the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransition {
    Begin(ExchangeId),
    Settle(ExchangeId),
}

/// Rejection reason for illegal request transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransitionRejection {
    AlreadyAwaiting {
        active: ExchangeId,
        attempted: ExchangeId,
    },
    NoActiveExchange {
        attempted: ExchangeId,
    },
    ExchangeMismatch {
        active: ExchangeId,
        attempted: ExchangeId,
    },
}

/// Result type for request transition application.
pub type RequestTransitionResult = Result<RequestState, RequestTransitionRejection>;

impl RequestState {
    /// Returns the in-flight exchange if and only if state is `AwaitingResponse`.
    pub fn active_exchange(&self) -> Option<ExchangeId> {
        match self {
            Self::AwaitingResponse(exchange) => Some(*exchange),
            Self::Idle => None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::AwaitingResponse(_))
    }

    /// Applies one transition deterministically.
    ///
    /// `Begin` is legal only from `Idle`; `Settle` must name the exchange that
    /// is actually in flight.
    pub fn apply(&self, transition: RequestTransition) -> RequestTransitionResult {
        match transition {
            RequestTransition::Begin(exchange) => self.apply_begin(exchange),
            RequestTransition::Settle(exchange) => self.apply_settle(exchange),
        }
    }

    fn apply_begin(&self, exchange: ExchangeId) -> RequestTransitionResult {
        match self {
            Self::Idle => Ok(Self::AwaitingResponse(exchange)),
            Self::AwaitingResponse(active) => Err(RequestTransitionRejection::AlreadyAwaiting {
                active: *active,
                attempted: exchange,
            }),
        }
    }

    fn apply_settle(&self, exchange: ExchangeId) -> RequestTransitionResult {
        match self {
            Self::AwaitingResponse(active) if *active == exchange => Ok(Self::Idle),
            Self::AwaitingResponse(active) => Err(RequestTransitionRejection::ExchangeMismatch {
                active: *active,
                attempted: exchange,
            }),
            Self::Idle => Err(RequestTransitionRejection::NoActiveExchange {
                attempted: exchange,
            }),
        }
    }
}

/// Terminal outcome of one exchange delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Answered(String),
    Failed,
}

impl ExchangeOutcome {
    /// Text of the bot message this outcome appends.
    pub fn bot_text(&self) -> &str {
        match self {
            Self::Answered(answer) => answer,
            Self::Failed => FALLBACK_ANSWER,
        }
    }
}

/// Rejection reason for a submission that must not start an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyQuestion,
    AwaitingResponse { active: ExchangeId },
}

/// Conversation aggregate: the append-only message log plus the request machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
    request_state: RequestState,
    next_message_id: u64,
    next_exchange_id: u64,
}

impl Conversation {
    /// Creates the conversation seeded with the fixed greeting.
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            request_state: RequestState::Idle,
            next_message_id: 1,
            next_exchange_id: 1,
        };

        let greeting_id = conversation.alloc_message_id();
        conversation
            .messages
            .push(Message::new(greeting_id, Role::Bot, GREETING));
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state
    }

    pub fn is_awaiting(&self) -> bool {
        self.request_state.is_awaiting()
    }

    pub fn active_exchange(&self) -> Option<ExchangeId> {
        self.request_state.active_exchange()
    }

    /// Applies a deterministic request transition.
    pub fn apply_request_transition(
        &mut self,
        transition: RequestTransition,
    ) -> RequestTransitionResult {
        let next_state = self.request_state.apply(transition)?;
        self.request_state = next_state;
        Ok(next_state)
    }

    /// Accepts one submission: appends the user message and moves the request
    /// machine into `AwaitingResponse`.
    ///
    /// The emptiness check trims only for the decision; accepted text is stored
    /// exactly as typed.
    pub fn begin_exchange(&mut self, text: &str) -> Result<ExchangeId, SubmitRejection> {
        if text.trim().is_empty() {
            return Err(SubmitRejection::EmptyQuestion);
        }

        let exchange = ExchangeId::new(self.next_exchange_id);
        if self
            .apply_request_transition(RequestTransition::Begin(exchange))
            .is_err()
        {
            // Begin is only rejected while a request is in flight.
            let active = self.active_exchange().unwrap_or(exchange);
            return Err(SubmitRejection::AwaitingResponse { active });
        }

        // Reserve the next exchange id immediately so follow-up submissions never reuse one.
        self.next_exchange_id = self.next_exchange_id.saturating_add(1);

        let message_id = self.alloc_message_id();
        self.messages.push(Message::new(message_id, Role::User, text));
        Ok(exchange)
    }

    /// Settles the in-flight exchange: appends the bot message for the outcome
    /// and returns the request machine to `Idle`.
    ///
    /// Stale settlements name an exchange other than the active one and leave
    /// the log untouched.
    pub fn settle_exchange(
        &mut self,
        exchange: ExchangeId,
        outcome: &ExchangeOutcome,
    ) -> RequestTransitionResult {
        let next_state = self.apply_request_transition(RequestTransition::Settle(exchange))?;

        let message_id = self.alloc_message_id();
        self.messages
            .push(Message::new(message_id, Role::Bot, outcome.bot_text()));
        Ok(next_state)
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
