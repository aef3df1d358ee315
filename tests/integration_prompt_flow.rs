//! Template-to-client integration tests
//!
//! Drives the full flow with the mock chat client: build a template,
//! partially bind it, render, invoke, and aggregate a streamed response.

use promptr::error::Result;
use promptr::llm::{ChatClient, MockChatClient, create_stream_channel};
use promptr::template::{Bindings, PromptTemplate, RenderedMessage, Role, bindings};

/// Integration test: the end-to-end tutor example
#[test]
fn test_render_tutor_example() -> Result<()> {
    let template = PromptTemplate::from_messages([
        ("system", "You are a {role}."),
        ("human", "Explain {topic}."),
    ])?;

    let messages = template.render(&bindings([("role", "tutor"), ("topic", "recursion")]))?;

    assert_eq!(
        messages,
        vec![
            RenderedMessage::system("You are a tutor."),
            RenderedMessage::human("Explain recursion."),
        ]
    );
    Ok(())
}

/// Integration test: rendered messages flow into a client unchanged
#[tokio::test]
async fn test_render_then_invoke() -> Result<()> {
    let template = PromptTemplate::from_messages([
        ("system", "You are a helpful assistant."),
        ("human", "Answer this question: {question}"),
    ])?;

    let messages = template.render(&bindings([("question", "What is recursion?")]))?;
    let client = MockChatClient::new("Recursion is a function calling itself.");
    let response = client.invoke(&messages).await?;

    assert_eq!(response.content, "Recursion is a function calling itself.");
    Ok(())
}

/// Integration test: a partially-bound template reused across calls
#[tokio::test]
async fn test_partial_template_reuse() -> Result<()> {
    let template = PromptTemplate::from_messages([
        ("system", "You are a {role} specializing in {domain}."),
        ("human", "{request}"),
    ])?;

    let consultant = template.partial(bindings([
        ("role", "consultant"),
        ("domain", "databases"),
    ]));

    // Original is untouched; the partial layer renders with each request
    assert_eq!(template.input_variables()?, vec!["role", "domain", "request"]);
    assert_eq!(consultant.input_variables()?, vec!["request"]);

    for request in ["Design a schema.", "Tune this query."] {
        let messages = consultant.render(&bindings([("request", request)]))?;
        assert_eq!(messages[0].content, "You are a consultant specializing in databases.");
        assert_eq!(messages[1].role, Role::Human);
        assert_eq!(messages[1].content, request);
    }
    Ok(())
}

/// Integration test: streamed fragments aggregate in arrival order
#[tokio::test]
async fn test_stream_aggregation() -> Result<()> {
    let template = PromptTemplate::from_messages([("human", "Say hello.")])?;
    let messages = template.render(&Bindings::new())?;

    let client =
        MockChatClient::new("").with_fragments(vec!["He".to_string(), "llo".to_string()]);
    let (tx, mut handle) = create_stream_channel(8);

    let mut seen = Vec::new();
    let (stream_result, collected) = tokio::join!(
        client.stream(&messages, tx),
        handle.forward(|fragment| seen.push(fragment.to_string()))
    );
    stream_result?;

    assert_eq!(collected?, "Hello");
    assert_eq!(seen, vec!["He".to_string(), "llo".to_string()]);
    Ok(())
}

/// Integration test: a mid-stream failure surfaces the partial result
#[tokio::test]
async fn test_stream_failure_preserves_partial() -> Result<()> {
    let client = MockChatClient::new("")
        .with_fragments(vec!["He".to_string(), "llo".to_string()])
        .fail_after(1);
    let (tx, mut handle) = create_stream_channel(8);

    let messages = [RenderedMessage::human("hi")];
    let (stream_result, collected) =
        tokio::join!(client.stream(&messages, tx), handle.collect());
    stream_result?;

    let err = collected.unwrap_err();
    assert_eq!(err.partial_content(), Some("He"));
    Ok(())
}

/// Integration test: render failures happen before any client call
#[test]
fn test_missing_binding_fails_before_transport() {
    let template = PromptTemplate::from_messages([("human", "Explain {topic}.")]).unwrap();
    let result = template.render(&bindings([("unrelated", "value")]));
    assert!(result.is_err());
}
