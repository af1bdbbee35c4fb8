//! Engine argument construction
//!
//! Pure functions turning the stream configuration and a dequeued item into
//! the ffmpeg HLS invocation.

use crate::audio::AudioInfo;
use crate::config::StreamConfig;

/// Flags for the HLS segment lifecycle: rolling window, no end marker
pub const HLS_FLAGS: &str = "append_list+delete_segments+omit_endlist";

/// Per-variant bitrate and stream mapping for an N-way ladder
///
/// For each variant `i`: `-b:a:<i> <rate> -map a:0`, followed by one
/// `-var_stream_map "a:0 a:1 ..."` in ladder order.
pub fn bitrate_ladder_args<S: AsRef<str>>(rates: &[S]) -> Vec<String> {
    let mut args = Vec::with_capacity(rates.len() * 4 + 2);
    let mut stream_map = String::new();

    for (i, rate) in rates.iter().enumerate() {
        args.push(format!("-b:a:{}", i));
        args.push(rate.as_ref().to_string());
        args.push("-map".to_string());
        args.push("a:0".to_string());
        stream_map.push_str(&format!(" a:{}", i));
    }

    args.push("-var_stream_map".to_string());
    args.push(stream_map.trim().to_string());
    args
}

/// Codec for an item: its override, else the configured default
pub fn effective_encoding<'a>(config: &'a StreamConfig, audio: &'a AudioInfo) -> &'a str {
    match audio.override_encoding.as_deref() {
        Some(encoding) if !encoding.is_empty() => encoding,
        _ => &config.encoding,
    }
}

/// Full argument list for encoding one item
pub fn encoder_args(config: &StreamConfig, audio: &AudioInfo) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-re", "-i", "pipe:", "-c:a"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(effective_encoding(config, audio).to_string());

    args.extend(bitrate_ladder_args(config.bitrates.as_slice()));

    args.push("-hls_time".to_string());
    args.push(config.hls_time.to_string());
    args.push("-hls_list_size".to_string());
    args.push(config.hls_list_size.to_string());
    args.push("-hls_flags".to_string());
    args.push(HLS_FLAGS.to_string());

    args.push("-metadata".to_string());
    args.push(format!("title={}", config.metadata_title(audio)));
    for (key, value) in audio.metadata.iter().filter(|(k, _)| k.as_str() != "title") {
        args.push("-metadata".to_string());
        args.push(format!("{}={}", key, value));
    }

    args.push("-master_pl_name".to_string());
    args.push(config.master_playlist_name.clone());
    args.push("-hls_segment_filename".to_string());
    args.push(config.segment_filename.clone());
    args.push(config.playlist_name.clone());
    args
}
