//! Tests for streaming generation through a session.

mod test_utils;

use futures::StreamExt;
use ondevice_bridge::{CancellationToken, GenerationSession, PreparationState, collect_stream};
use ondevice_core::{FinishReason, GenerationRequest, ResponseChunk};
use ondevice_error::{BridgeErrorKind, NativeError, NativeErrorKind, PreparationErrorKind};
use ondevice_interface::{NativePartial, PartialKind};
use std::time::Duration;
use test_utils::{MockEngine, PrepareBehavior, StreamScript, drain};

fn texts(chunks: &[ResponseChunk]) -> Vec<&str> {
    chunks.iter().map(|c| c.text_delta().as_str()).collect()
}

#[tokio::test]
async fn test_stream_ends_with_single_final_chunk() {
    let (engine, _calls) = MockEngine::new()
        .with_stream(StreamScript::deltas(&["Hi", "Hi there"]))
        .into_shared();
    let session = GenerationSession::new(engine);

    let chunks: Vec<ResponseChunk> =
        drain(session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new()))
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .expect("Stream succeeds");

    assert_eq!(chunks.len(), 3);
    assert!(chunks[..2].iter().all(|c| !*c.is_final()));
    assert_eq!(texts(&chunks[..2]), vec!["Hi", "Hi there"]);
    let last = &chunks[2];
    assert!(*last.is_final());
    assert_eq!(*last.finish_reason(), Some(FinishReason::Stop));
    assert_eq!(chunks.iter().filter(|c| *c.is_final()).count(), 1);
}

#[tokio::test]
async fn test_cumulative_partials_become_deltas() {
    let (engine, _calls) = MockEngine::new()
        .with_partial_kind(PartialKind::Cumulative)
        .with_stream(StreamScript::deltas(&["Hi", "Hi there", "Hi there!"]))
        .into_shared();
    let session = GenerationSession::new(engine);

    let chunks: Vec<ResponseChunk> =
        drain(session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new()))
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .expect("Stream succeeds");

    assert_eq!(texts(&chunks), vec!["Hi", " there", "!", ""]);
}

#[tokio::test]
async fn test_native_final_partial_is_the_final_chunk() {
    let script = StreamScript {
        partials: vec![NativePartial::partial("One"), NativePartial::last(" two")],
        ..StreamScript::default()
    };
    let (engine, _calls) = MockEngine::new().with_stream(script).into_shared();
    let session = GenerationSession::new(engine);

    let chunks: Vec<ResponseChunk> =
        drain(session.generate_stream(GenerationRequest::prompt("Count"), CancellationToken::new()))
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .expect("Stream succeeds");

    assert_eq!(texts(&chunks), vec!["One", " two"]);
    assert!(*chunks[1].is_final());
}

#[tokio::test]
async fn test_stream_error_has_no_final_chunk() {
    let script = StreamScript {
        partials: vec![NativePartial::partial("Hi")],
        completion: Some(NativeError::failed("decoder fault")),
        ..StreamScript::default()
    };
    let (engine, _calls) = MockEngine::new().with_stream(script).into_shared();
    let session = GenerationSession::new(engine);

    let items =
        drain(session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new()))
            .await;

    assert_eq!(items.len(), 2);
    let first = items[0].as_ref().expect("Partial delivered");
    assert_eq!(first.text_delta(), "Hi");
    assert!(!*first.is_final());
    let err = items[1].as_ref().expect_err("Then the failure");
    assert!(matches!(err.kind(), BridgeErrorKind::Generation(_)));
}

#[tokio::test]
async fn test_cancel_mid_stream_ends_with_cancelled() {
    let script = StreamScript {
        partials: vec![NativePartial::partial("Hi")],
        hang_after_partials: true,
        ..StreamScript::default()
    };
    let (engine, calls) = MockEngine::new()
        .with_stream(script)
        .reporting_cancellation()
        .into_shared();
    let session = GenerationSession::new(engine);
    let cancel = CancellationToken::new();

    let mut stream = session.generate_stream(GenerationRequest::prompt("Hello"), cancel.clone());
    let first = stream.next().await.expect("First item").expect("Chunk");
    assert_eq!(first.text_delta(), "Hi");

    cancel.cancel();
    let err = stream
        .next()
        .await
        .expect("Terminal item")
        .expect_err("Cancelled");
    assert!(err.is_cancelled());
    assert!(stream.next().await.is_none());
    assert_eq!(calls.cancel(), 1);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let (engine, calls) = MockEngine::new().into_shared();
    let session = GenerationSession::new(engine);

    let stream = session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.native_total(), 0);
    drop(stream);
    assert_eq!(calls.native_total(), 0);
}

#[tokio::test]
async fn test_dropping_stream_cancels_native_operation() {
    let script = StreamScript {
        partials: vec![NativePartial::partial("Hi")],
        hang_after_partials: true,
        ..StreamScript::default()
    };
    let (engine, calls) = MockEngine::new().with_stream(script).into_shared();
    let session = GenerationSession::new(engine);

    let mut stream = session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new());
    stream.next().await.expect("First item").expect("Chunk");
    drop(stream);

    assert_eq!(calls.cancel(), 1);
}

#[tokio::test]
async fn test_items_after_completion_are_dropped() {
    let script = StreamScript {
        partials: vec![NativePartial::partial("a"), NativePartial::partial("b")],
        items_after_completion: vec![NativePartial::partial("late")],
        ..StreamScript::default()
    };
    let (engine, _calls) = MockEngine::new().with_stream(script).into_shared();
    let session = GenerationSession::new(engine);

    let response = collect_stream(
        session.generate_stream(GenerationRequest::prompt("Hi"), CancellationToken::new()),
        "mock-model",
    )
    .await
    .expect("Stream succeeds");
    assert_eq!(response.text(), "ab");
}

#[tokio::test]
async fn test_close_ends_open_stream() {
    let script = StreamScript {
        partials: vec![NativePartial::partial("Hi")],
        hang_after_partials: true,
        ..StreamScript::default()
    };
    let (engine, _calls) = MockEngine::new().with_stream(script).into_shared();
    let session = GenerationSession::new(engine);

    let mut stream = session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new());
    stream.next().await.expect("First item").expect("Chunk");
    session.close();

    let err = stream
        .next()
        .await
        .expect("Terminal item")
        .expect_err("Disposed");
    assert!(matches!(err.kind(), BridgeErrorKind::Disposed(_)));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_empty_partials_are_skipped() {
    let (engine, _calls) = MockEngine::new()
        .with_stream(StreamScript::deltas(&["", "text", ""]))
        .into_shared();
    let session = GenerationSession::new(engine);

    let chunks: Vec<ResponseChunk> =
        drain(session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new()))
            .await
            .into_iter()
            .collect::<Result<_, _>>()
            .expect("Stream succeeds");
    assert_eq!(texts(&chunks), vec!["text", ""]);
}

#[tokio::test]
async fn test_failed_preparation_ends_stream_without_native_call() {
    let ineligible = NativeError::new(NativeErrorKind::DeviceIneligible, "device ineligible");
    let (engine, calls) = MockEngine::new()
        .with_prepare(PrepareBehavior::Fail(ineligible))
        .into_shared();
    let session = GenerationSession::new(engine);

    let items =
        drain(session.generate_stream(GenerationRequest::prompt("Hello"), CancellationToken::new()))
            .await;

    assert_eq!(items.len(), 1);
    let err = items[0].as_ref().expect_err("Preparation failure");
    match err.kind() {
        BridgeErrorKind::Preparation(prep) => {
            assert_eq!(prep.kind(), &PreparationErrorKind::DeviceIneligible)
        }
        other => panic!("Expected preparation error, got {other}"),
    }
    assert_eq!(calls.prepare(), 1);
    assert_eq!(calls.stream(), 0);
    assert_eq!(session.state(), PreparationState::Failed);
}

#[tokio::test]
async fn test_cancel_while_preparing_ends_stream_with_cancelled() {
    let (engine, calls) = MockEngine::new()
        .with_prepare(PrepareBehavior::Hang)
        .into_shared();
    let session = GenerationSession::new(engine);
    let cancel = CancellationToken::new();

    let mut stream = session.generate_stream(GenerationRequest::prompt("Hello"), cancel.clone());
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        })
    };

    let err = stream
        .next()
        .await
        .expect("Terminal item")
        .expect_err("Cancelled");
    assert!(err.is_cancelled());
    assert!(stream.next().await.is_none());
    canceller.await.expect("Canceller joined");

    assert_eq!(calls.stream(), 0);
    assert_eq!(session.state(), PreparationState::Preparing);
}
