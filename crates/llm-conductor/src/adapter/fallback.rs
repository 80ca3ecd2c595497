// Simulated streaming for backends without native streaming.

use llm_conductor_types::{
    BoxStream, Error, Provider, ProviderRequest, SimulatedStreamConfig, TextStreamDelta,
};

/// Split text into chunks of `words_per_chunk` whitespace-separated words.
///
/// Each chunk starts at a word boundary and keeps the whitespace that follows
/// its last word, so concatenating every chunk reproduces `text` exactly.
pub fn chunk_words(text: &str, words_per_chunk: usize) -> Vec<String> {
    let per_chunk = words_per_chunk.max(1);
    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut words = 0;
    let mut in_word = false;

    for (offset, c) in text.char_indices() {
        if c.is_whitespace() {
            in_word = false;
            continue;
        }
        if !in_word {
            in_word = true;
            if words > 0 && words % per_chunk == 0 {
                chunks.push(text[chunk_start..offset].to_string());
                chunk_start = offset;
            }
            words += 1;
        }
    }
    if chunk_start < text.len() {
        chunks.push(text[chunk_start..].to_string());
    }
    chunks
}

/// Generate once, then re-emit the response as a delta stream.
///
/// Emits one `TextDelta` per chunk with `chunk_delay` between chunks, one
/// `ToolCall` per response tool call, then `Done`.
pub fn simulated_stream<'a>(
    provider: &'a dyn Provider,
    request: ProviderRequest,
    config: SimulatedStreamConfig,
) -> BoxStream<'a, Result<TextStreamDelta, Error>> {
    Box::pin(async_stream::stream! {
        let response = match provider.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                yield Err(e);
                return;
            }
        };
        let finish_reason = response.effective_finish_reason();

        for (i, chunk) in chunk_words(&response.text, config.words_per_chunk)
            .into_iter()
            .enumerate()
        {
            if i > 0 && !config.chunk_delay.is_zero() {
                tokio::time::sleep(config.chunk_delay).await;
            }
            yield Ok(TextStreamDelta::text(chunk));
        }

        for tool_call in response.tool_calls.unwrap_or_default() {
            yield Ok(TextStreamDelta::ToolCall { tool_call });
        }

        yield Ok(TextStreamDelta::done(response.usage, finish_reason));
    })
}
