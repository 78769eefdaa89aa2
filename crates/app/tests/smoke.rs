use kiosk::chat::{Conversation, ExchangeOutcome, FALLBACK_ANSWER, GREETING, Role};
use kiosk::settings::{DEFAULT_API_URL, Settings};

#[test]
fn smoke_marker_is_stable() {
    assert_eq!(kiosk::smoke_marker(), "kiosk");
}

#[test]
fn conversation_round_trip_through_the_public_surface() {
    let mut conversation = Conversation::new();
    assert_eq!(conversation.messages()[0].text, GREETING);

    let exchange = conversation
        .begin_exchange("Where can I watch recorded lectures?")
        .expect("submission accepted");
    conversation
        .settle_exchange(
            exchange,
            &ExchangeOutcome::Answered("On the portal media page.".to_string()),
        )
        .expect("settlement accepted");

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[2].role, Role::Bot);
    assert_eq!(messages[2].text, "On the portal media page.");
}

#[test]
fn failed_exchange_reports_the_fallback_answer() {
    let mut conversation = Conversation::new();
    let exchange = conversation
        .begin_exchange("anyone there?")
        .expect("submission accepted");

    conversation
        .settle_exchange(exchange, &ExchangeOutcome::Failed)
        .expect("settlement accepted");

    let last = conversation.messages().last().expect("bot message");
    assert_eq!(last.text, FALLBACK_ANSWER);
}

#[test]
fn row_metrics_are_available_without_a_window() {
    use kiosk::chat::message_list::virtualization_metrics;

    let mut conversation = Conversation::new();
    let exchange = conversation
        .begin_exchange("Where do I find the course list?")
        .expect("submission accepted");
    conversation
        .settle_exchange(
            exchange,
            &ExchangeOutcome::Answered(
                "Check https://catalog.ulm.edu/courses for the full list.".to_string(),
            ),
        )
        .expect("settlement accepted");

    let metrics = virtualization_metrics(conversation.messages(), 680.0);

    assert_eq!(metrics.len(), conversation.messages().len());
    assert!(metrics.iter().all(|metric| metric.estimated_height > 0.0));
}

#[test]
fn settings_default_to_the_local_endpoint() {
    assert_eq!(Settings::default().api_url, DEFAULT_API_URL);
}
