use crate::context::{AppContext, CREDENTIAL_HINT};
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use llm::live::{
    pcm16_duration_secs, played_pcm16_bytes, LiveConfig, LiveEvent, LiveSession,
    PlaybackScheduler, CHUNK_SAMPLES, INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE,
};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info, warn};

#[derive(Debug, Args)]
pub struct VoiceCommand {
    /// 16 kHz mono s16le PCM, `-` for stdin
    #[arg(long)]
    input: PathBuf,

    /// Receives the 24 kHz mono s16le PCM reply
    #[arg(long)]
    output: PathBuf,
}

impl VoiceCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let audio = read_input(&self.input).await?;
        if audio.len() < 2 {
            bail!("Input audio is empty");
        }
        info!(
            seconds = pcm16_duration_secs(audio.len(), INPUT_SAMPLE_RATE),
            "Streaming input audio"
        );

        let mut session = match LiveSession::connect(LiveConfig::from_config(&ctx.config)).await {
            Ok(session) => session,
            Err(e) => {
                if e.is_credential_error() {
                    eprintln!("{} {}", "→".yellow(), CREDENTIAL_HINT);
                }
                return Err(e.into());
            }
        };

        for chunk in audio.chunks(CHUNK_SAMPLES * 2) {
            session.send_audio(chunk).await?;
        }
        session.end_audio().await?;

        let mut output = tokio::fs::File::create(&self.output)
            .await
            .with_context(|| format!("Failed to create {}", self.output.display()))?;

        let started = Instant::now();
        let mut scheduler = PlaybackScheduler::new();
        // bytes kept in the file; the current segment starts at `segment_offset`
        let mut reply_bytes = 0usize;
        let mut segment_offset = 0usize;
        let mut segment_start: Option<f64> = None;

        loop {
            let event = session.next_event().await?;
            let now = started.elapsed().as_secs_f64();
            match event {
                LiveEvent::Audio(pcm) => {
                    let duration = pcm16_duration_secs(pcm.len(), OUTPUT_SAMPLE_RATE);
                    let start = scheduler.schedule(now, duration);
                    segment_start.get_or_insert(start);
                    debug!(start, duration, "Reply audio chunk");
                    output.write_all(&pcm).await?;
                    reply_bytes += pcm.len();
                }
                LiveEvent::Text(text) => println!("{} {}", "Assistant:".blue().bold(), text),
                LiveEvent::Interrupted => {
                    if let Some(first_start) = segment_start.take() {
                        let heard = played_pcm16_bytes(
                            reply_bytes - segment_offset,
                            first_start,
                            now,
                            OUTPUT_SAMPLE_RATE,
                        );
                        let keep = segment_offset + heard;
                        output.flush().await?;
                        output.set_len(keep as u64).await?;
                        output.seek(SeekFrom::Start(keep as u64)).await?;
                        info!(
                            dropped_bytes = reply_bytes - keep,
                            "Reply interrupted, discarding unplayed audio"
                        );
                        reply_bytes = keep;
                    } else {
                        info!("Reply interrupted");
                    }
                    segment_offset = reply_bytes;
                    scheduler.reset(now);
                }
                LiveEvent::TurnComplete => break,
                LiveEvent::Closed(reason) => {
                    if let Some(reason) = reason {
                        info!(reason = %reason, "Live session closed by server");
                    }
                    break;
                }
            }
        }

        output.flush().await?;
        if let Err(e) = session.close().await {
            warn!(error = %e, "Live session did not close cleanly");
        }

        println!(
            "{} Wrote {:.1}s of reply audio to {}",
            "✓".green(),
            pcm16_duration_secs(reply_bytes, OUTPUT_SAMPLE_RATE),
            self.output.display()
        );
        Ok(())
    }
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut audio = Vec::new();
    if path == Path::new("-") {
        tokio::io::stdin().read_to_end(&mut audio).await?;
    } else {
        audio = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read audio {}", path.display()))?;
    }
    Ok(audio)
}
