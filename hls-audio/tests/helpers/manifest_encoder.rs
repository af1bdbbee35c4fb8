//! Stub engine producing HLS playlists on disk
//!
//! Mimics the files ffmpeg's HLS muxer writes for a `-var_stream_map` ladder:
//! the master playlist sits in the directory above the `%v` variant
//! directories and lists one `#EXT-X-STREAM-INF` per variant with a bandwidth
//! of the nominal bitrate plus 10%.

use async_trait::async_trait;
use hls_audio::{AudioData, EncodeError, Encoder};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// AAC-LC codec tag
pub const AAC_CODEC_TAG: &str = "mp4a.40.2";

/// Engine stub writing master/variant playlists under `root`
#[derive(Debug, Clone)]
pub struct ManifestEncoder {
    root: PathBuf,
}

impl ManifestEncoder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn invalid(msg: &str) -> EncodeError {
    EncodeError::Io(io::Error::new(io::ErrorKind::InvalidInput, msg.to_string()))
}

/// "128k" → 128000, "1M" → 1000000, "96000" → 96000
fn parse_bitrate(rate: &str) -> Option<u64> {
    let rate = rate.trim();
    let (digits, multiplier) = match rate.chars().last()? {
        'k' | 'K' => (&rate[..rate.len() - 1], 1_000),
        'm' | 'M' => (&rate[..rate.len() - 1], 1_000_000),
        _ => (rate, 1),
    };
    digits.parse::<u64>().ok().map(|n| n * multiplier)
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

/// Split a template at the first component holding `%v`
///
/// `_test/test-%v/playlist.m3u8` → (`_test`, `test-%v/playlist.m3u8`)
fn split_at_variant(template: &str) -> (PathBuf, String) {
    let parts: Vec<&str> = template.split('/').collect();
    let at = parts.iter().position(|p| p.contains("%v")).unwrap_or(parts.len() - 1);
    (
        parts[..at].iter().collect::<PathBuf>(),
        parts[at..].join("/"),
    )
}

async fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
}

#[async_trait]
impl Encoder for ManifestEncoder {
    async fn encode(
        &self,
        args: Vec<String>,
        mut input: AudioData,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes).await?;

        let master_name = value_after(&args, "-master_pl_name")
            .ok_or_else(|| invalid("missing -master_pl_name"))?;
        let segment_template = value_after(&args, "-hls_segment_filename")
            .ok_or_else(|| invalid("missing -hls_segment_filename"))?;
        let playlist_template = args.last().ok_or_else(|| invalid("missing output"))?;
        let codec_tag = match value_after(&args, "-c:a") {
            Some("aac") => AAC_CODEC_TAG,
            Some(_) => "unknown",
            None => return Err(invalid("missing -c:a")),
        };

        let mut rates = Vec::new();
        for i in 0.. {
            match value_after(&args, &format!("-b:a:{}", i)) {
                Some(rate) => {
                    rates.push(parse_bitrate(rate).ok_or_else(|| invalid("bad bitrate"))?)
                }
                None => break,
            }
        }

        let (master_dir, variant_playlist) = split_at_variant(playlist_template);
        let mut master = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");
        for (i, rate) in rates.iter().enumerate() {
            let bandwidth = rate * 11 / 10;
            let variant = i.to_string();
            master.push_str(&format!(
                "#EXT-X-STREAM-INF:BANDWIDTH={},CODECS=\"{}\"\n{}\n\n",
                bandwidth,
                codec_tag,
                variant_playlist.replace("%v", &variant)
            ));

            let segment = segment_template
                .replace("%v", &variant)
                .replace("%06d", "000000")
                .replace("%d", "0");
            write_file(&self.root.join(&segment), &bytes).await?;

            let segment_name = Path::new(&segment)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let playlist = format!(
                concat!(
                    "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:{}\n",
                    "#EXT-X-MEDIA-SEQUENCE:0\n#EXTINF:1.0,\n{}\n",
                ),
                value_after(&args, "-hls_time").unwrap_or("5"),
                segment_name
            );
            let playlist_path = self.root.join(playlist_template.replace("%v", &variant));
            write_file(&playlist_path, playlist.as_bytes()).await?;
        }

        write_file(&self.root.join(master_dir).join(master_name), master.as_bytes()).await?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bitrate() {
        assert_eq!(parse_bitrate("128k"), Some(128_000));
        assert_eq!(parse_bitrate("1M"), Some(1_000_000));
        assert_eq!(parse_bitrate("96000"), Some(96_000));
        assert_eq!(parse_bitrate("fast"), None);
    }

    #[test]
    fn test_split_at_variant() {
        let (dir, rest) = split_at_variant("_test/test-%v/playlist.m3u8");
        assert_eq!(dir, PathBuf::from("_test"));
        assert_eq!(rest, "test-%v/playlist.m3u8");

        let (dir, rest) = split_at_variant("hls-%v/hls-playlist.m3u8");
        assert_eq!(dir, PathBuf::new());
        assert_eq!(rest, "hls-%v/hls-playlist.m3u8");
    }
}
