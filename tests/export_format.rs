use chatbase_client::ConversationPage;
use chatbase_transcript::render_report;
use serde_json::json;

#[test]
fn test_round_trip_response_renders_transcript() {
    let body = json!({
        "conversations": [{
            "id": "c1",
            "sessionId": "s1",
            "messages": [
                {"role": "user", "content": "hi", "timestamp": "2025-11-04T10:00:00Z"},
                {"role": "assistant", "content": "hello"}
            ]
        }]
    });

    let page = ConversationPage::from_value(body);
    let report = render_report(&page.conversations, &page.raw).unwrap();

    assert!(report.contains("FOUND 1 CONVERSATION(S)"));
    assert!(report.contains("CONVERSATION #1 of 1"));
    assert!(report.contains("CONVERSATION ID: c1"));
    assert!(report.contains("Session ID: s1"));
    assert!(report.contains("TRANSCRIPT:"));
    assert!(report.contains("[USER] [2025-11-04 10:00:00 UTC]\nhi"));
    assert!(report.contains("[BOT]\nhello"));
}

#[test]
fn test_empty_body_dumps_raw_response() {
    let page = ConversationPage::from_value(json!({}));
    let report = render_report(&page.conversations, &page.raw).unwrap();

    assert!(report.contains("No conversations found for the specified date range."));
    assert!(report.contains("Raw API Response:"));
    assert!(report.contains("{}"));
}
