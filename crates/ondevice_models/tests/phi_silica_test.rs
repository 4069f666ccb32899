//! Tests for the promise adapter.

#![cfg(feature = "phi-silica")]

mod test_utils;

use futures::StreamExt;
use ondevice_bridge::GenerationSession;
use ondevice_core::{GenerationOptions, GenerationRequest, Turn};
use ondevice_error::{BridgeErrorKind, NativeError};
use ondevice_models::phi_silica::{PhiSilicaEngine, to_phi3_prompt};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{FakePromiseModel, answer};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

fn session(model: FakePromiseModel) -> (GenerationSession, Arc<FakePromiseModel>) {
    let model = Arc::new(model);
    let engine = PhiSilicaEngine::new(model.clone(), Handle::current());
    (GenerationSession::new(Arc::new(engine)), model)
}

#[test]
fn test_prompt_renders_every_turn() {
    let prompt = to_phi3_prompt(&[
        Turn::system("Rules"),
        Turn::user("Hi"),
        Turn::assistant("Hello"),
        Turn::user("Bye"),
    ]);
    assert_eq!(
        prompt,
        "<|system|>\nRules<|end|>\n<|user|>\nHi<|end|>\n<|assistant|>\nHello<|end|>\n<|user|>\nBye<|end|>\n<|assistant|>\n"
    );
}

#[tokio::test]
async fn test_generate_sends_rendered_prompt() {
    let (session, model) = session(FakePromiseModel::new());
    assert_eq!(session.metadata().provider_name(), "Microsoft Phi Silica");

    let request = GenerationRequest::new(
        vec![Turn::user("Hi")],
        GenerationOptions::default().with_instructions("Be brief."),
    );
    let response = session
        .generate(request, CancellationToken::new())
        .await
        .expect("Generated");
    assert_eq!(response.text(), answer());
    assert_eq!(response.model_id(), "Phi-3.5-mini-instruct");

    let prompt = model.last_prompt.lock().clone().expect("Prompt captured");
    assert!(prompt.starts_with("<|system|>\nBe brief.<|end|>\n"));
    assert!(prompt.ends_with("<|assistant|>\n"));
}

#[tokio::test]
async fn test_progress_streams_deltas() {
    let (session, _model) = session(FakePromiseModel::new());

    let texts: Vec<String> = session
        .generate_stream(GenerationRequest::prompt("Hi"), CancellationToken::new())
        .map(|chunk| chunk.expect("Chunk").text_delta().clone())
        .collect()
        .await;
    assert_eq!(texts, vec!["Hello", " from", " device", ""]);
}

#[tokio::test]
async fn test_rejected_promise_is_generation_error() {
    let mut model = FakePromiseModel::new();
    model.failure = Some(NativeError::failed("content moderation").with_code(0x8000_4005));
    let (session, _model) = session(model);

    let items: Vec<_> = session
        .generate_stream(GenerationRequest::prompt("Hi"), CancellationToken::new())
        .collect()
        .await;
    let last = items.last().expect("Items").as_ref().expect_err("Failure last");
    assert!(matches!(last.kind(), BridgeErrorKind::Generation(_)));
    assert!(items.iter().filter_map(|item| item.as_ref().ok()).all(|c| !*c.is_final()));
}

#[tokio::test]
async fn test_cancel_aborts_promise() {
    let mut model = FakePromiseModel::new();
    model.hang = true;
    let (session, _model) = session(model);
    session.prepare().await.expect("Ready");

    let cancel = CancellationToken::new();
    let call = {
        let session = session.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { session.generate(GenerationRequest::prompt("Hi"), cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    cancel.cancel();

    let err = call.await.expect("Task joined").expect_err("Cancelled");
    assert!(err.is_cancelled());
}
