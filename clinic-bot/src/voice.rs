//! Voice messages: download the clip, transcode it to WAV and hand it to the backend.

use dialogue_flow::Reply;
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info, warn};

use crate::{
    audio,
    error::{GatewayError, GatewayResult},
    format::format_audio_result,
    gateway::Backend,
    menus,
};

pub struct VoicePipeline {
    backend: Arc<dyn Backend>,
    voices_dir: PathBuf,
}

impl VoicePipeline {
    pub fn new(backend: Arc<dyn Backend>, voices_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            voices_dir: voices_dir.into(),
        }
    }

    /// Where the transcoded clip of a chat is written; one file per chat, overwritten each time.
    pub fn clip_path(&self, chat_id: &str) -> PathBuf {
        self.voices_dir
            .join(format!("voice_{}.wav", escape_file_component(chat_id)))
    }

    /// Run the whole pipeline for one clip and produce the message to send back.
    pub async fn handle(&self, chat_id: &str, file_url: &str) -> Reply {
        let clip = match download(file_url).await {
            Ok(clip) => clip,
            Err(e) => {
                warn!(chat_id, "voice clip download failed: {}", e);
                return Reply::text(menus::VOICE_DOWNLOAD_FAILED);
            }
        };

        let path = self.clip_path(chat_id);
        if let Err(e) = audio::transcode_to_file(clip, &path).await {
            error!(chat_id, "voice clip transcoding failed: {}", e);
            return Reply::text(menus::VOICE_PROCESSING_FAILED);
        }
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            error!(chat_id, path = %path.display(), "transcoded clip is missing");
            return Reply::text(menus::VOICE_PROCESSING_FAILED);
        }

        match self.backend.submit_audio(&path).await {
            Ok(result) => {
                info!(chat_id, "voice clip processed");
                Reply::text(format_audio_result(&result))
            }
            Err(e) => {
                warn!(chat_id, "voice clip rejected by backend: {}", e);
                Reply::text(menus::VOICE_BACKEND_FAILED)
            }
        }
    }
}

/// Keeps ASCII letters, digits and `-`; every other byte becomes `_xx` (hex), `_` included,
/// so distinct chat ids never share a file name.
fn escape_file_component(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("_{byte:02x}"));
        }
    }
    escaped
}

async fn download(url: &str) -> GatewayResult<Vec<u8>> {
    let response = reqwest::Client::new().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status(status.as_u16()));
    }
    Ok(response.bytes().await?.to_vec())
}
