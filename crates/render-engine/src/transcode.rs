//! Frame-sequence to video transcoding through ffmpeg.

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Instant;

use propshot_common::error::{PropshotError, PropshotResult};
use propshot_project_model::request::{frame_sequence_pattern, VideoFormat};

/// Longest stderr excerpt kept in a transcode error.
const STDERR_TAIL_BYTES: usize = 4096;

/// One frame sequence to merge into a container.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    /// Directory holding `<name>0001.png ...`.
    pub sequence_dir: PathBuf,
    pub asset_name: String,
    pub fps: u32,
    pub format: VideoFormat,
    pub output_path: PathBuf,
}

impl TranscodeJob {
    /// ffmpeg arguments for this job.
    pub fn args(&self) -> Vec<String> {
        let fps = self.fps.max(1).to_string();
        let input = frame_sequence_pattern(&self.sequence_dir, &self.asset_name)
            .to_string_lossy()
            .into_owned();
        let output = self.output_path.to_string_lossy().into_owned();

        let mut args: Vec<String> = vec!["-y".into()];
        match self.format {
            VideoFormat::Gif => {
                args.extend(["-r".into(), fps.clone(), "-i".into(), input]);
                args.extend(["-pix_fmt".into(), "yuv420p".into()]);
                args.extend(["-vf".into(), format!("fps={fps}")]);
            }
            VideoFormat::Mov => {
                args.extend(["-framerate".into(), fps, "-i".into(), input]);
                args.extend(["-c:v".into(), "libx264".into()]);
                args.extend(["-pix_fmt".into(), "yuv420p".into()]);
                args.extend(["-acodec".into(), "copy".into()]);
                args.extend(["-vcodec".into(), "copy".into()]);
                args.extend(["-f".into(), "mov".into()]);
            }
        }
        args.push(output);
        args
    }
}

/// Launches ffmpeg as a supervised child process.
#[derive(Debug, Clone)]
pub struct Transcoder {
    binary: PathBuf,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Transcoder {
    /// Transcoder running `binary`. A bare name is looked up on `PATH`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether the binary can be launched.
    pub fn is_available(&self) -> bool {
        if self.binary.components().count() > 1 {
            return self.binary.is_file();
        }
        command_exists(&self.binary)
    }

    /// Start `job` and return immediately.
    pub fn launch(&self, job: &TranscodeJob) -> PropshotResult<TranscodeHandle> {
        let args = job.args();
        tracing::debug!(binary = %self.binary.display(), args = ?args, "Running transcoder");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PropshotError::ToolMissing {
                        path: self.binary.clone(),
                    }
                } else {
                    PropshotError::render(format!("Failed to start transcoder: {e}"))
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| PropshotError::render("Failed to capture transcoder stderr"))?;

        // Drain stderr concurrently so the child never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read transcoder stderr: {err}>"),
            }
        });

        tracing::info!(
            pid = child.id(),
            format = ?job.format,
            output = %job.output_path.display(),
            "Transcoder started"
        );

        Ok(TranscodeHandle {
            child,
            stderr_task: Some(stderr_task),
            output_path: job.output_path.clone(),
            started: Instant::now(),
        })
    }
}

/// A running transcoder process.
#[derive(Debug)]
pub struct TranscodeHandle {
    child: Child,
    stderr_task: Option<JoinHandle<String>>,
    output_path: PathBuf,
    started: Instant,
}

impl TranscodeHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// The container being produced.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Non-blocking status check: `Ok(None)` while running, the output path
    /// on success.
    pub fn try_status(&mut self) -> PropshotResult<Option<PathBuf>> {
        match self.child.try_wait()? {
            Some(status) => self.finish(status).map(Some),
            None => Ok(None),
        }
    }

    /// Block until the process exits.
    pub fn wait(mut self) -> PropshotResult<PathBuf> {
        let status = self.child.wait()?;
        self.finish(status)
    }

    fn finish(&mut self, status: ExitStatus) -> PropshotResult<PathBuf> {
        let stderr = self
            .stderr_task
            .take()
            .map(|task| {
                task.join()
                    .unwrap_or_else(|_| "<transcoder stderr reader panicked>".to_string())
            })
            .unwrap_or_default();

        if !status.success() {
            tracing::warn!(%status, "Transcoder failed");
            return Err(PropshotError::Transcode {
                status: status.to_string(),
                stderr: stderr_tail(&stderr),
            });
        }

        tracing::info!(
            output = %self.output_path.display(),
            elapsed_secs = self.started.elapsed().as_secs_f64(),
            "Exported video"
        );
        Ok(self.output_path.clone())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

fn command_exists(binary: &Path) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg("command -v \"$1\" >/dev/null 2>&1")
        .arg("sh")
        .arg(binary)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
