//! Generate command handler.

use futures::StreamExt;
use ondevice::{
    AiConfig, Backend, BridgeResult, CancellationToken, GenerationRequest, GenerationSession,
    open_session,
};
use std::io::Write;
use std::path::PathBuf;

/// Handle the `generate` command.
///
/// Ctrl+C cancels the in-flight generation.
#[tracing::instrument(skip(prompt))]
pub async fn handle_generate_command(
    prompt: String,
    streaming: Option<bool>,
    config_path: Option<PathBuf>,
    backend: Option<Backend>,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => AiConfig::from_file(path)?,
        None => AiConfig::default(),
    };
    if let Some(backend) = backend {
        config = config.with_backend(backend);
    }

    let session = open_session(&config)?;
    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, cancelling generation");
                cancel.cancel();
            }
        }
    });

    let request = GenerationRequest::prompt(prompt);
    let result = if streaming.unwrap_or(*config.use_streaming()) {
        print_stream(&session, request, cancel).await
    } else {
        print_response(&session, request, cancel).await
    };

    interrupt.abort();
    session.close();

    match result {
        Err(e) if e.is_cancelled() => {
            eprintln!("\nCancelled");
            Ok(())
        }
        other => Ok(other?),
    }
}

async fn print_response(
    session: &GenerationSession,
    request: GenerationRequest,
    cancel: CancellationToken,
) -> BridgeResult<()> {
    let response = session.generate(request, cancel).await?;
    println!("{}", response.text());
    Ok(())
}

async fn print_stream(
    session: &GenerationSession,
    request: GenerationRequest,
    cancel: CancellationToken,
) -> BridgeResult<()> {
    let mut stream = session.generate_stream(request, cancel);
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        print!("{}", chunk.text_delta());
        // A closed stdout only loses output.
        let _ = stdout.flush();
        if *chunk.is_final() {
            break;
        }
    }
    println!();
    Ok(())
}
