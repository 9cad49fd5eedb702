//! Text extraction backends.

use std::future::Future;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::PickerError;

/// Turns image bytes into plain text.
pub trait TextExtractor: Send + Sync + 'static {
    /// Extracts the text found in `image`.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Recognition`] if the image cannot be read.
    fn extract(&self, image: Vec<u8>) -> impl Future<Output = Result<String, PickerError>> + Send;
}

/// Extractor that pipes the image through an external OCR program.
///
/// The program receives the image on stdin and must print the recognized
/// text on stdout, as `tesseract stdin stdout` does.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    /// Creates an extractor running `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The configured program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl TextExtractor for CommandExtractor {
    fn extract(&self, image: Vec<u8>) -> impl Future<Output = Result<String, PickerError>> + Send {
        async move {
            let mut child = Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    PickerError::Recognition(format!("starting `{}`: {e}", self.program))
                })?;

            let Some(mut stdin) = child.stdin.take() else {
                return Err(PickerError::Recognition(
                    "OCR process has no stdin".to_string(),
                ));
            };
            // stdin must be fed while stdout is drained
            let feeder = tokio::spawn(async move {
                stdin.write_all(&image).await?;
                stdin.shutdown().await
            });

            let output = child.wait_with_output().await.map_err(|e| {
                PickerError::Recognition(format!("waiting for `{}`: {e}", self.program))
            })?;
            match feeder.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(error = %e, "OCR process closed stdin early"),
                Err(e) => tracing::debug!(error = %e, "stdin feeder task failed"),
            }

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(PickerError::Recognition(format!(
                    "`{}` exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                )));
            }
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn pipes_image_through_program() {
        let extractor = CommandExtractor::new("cat", Vec::new());
        let Ok(text) = extractor.extract(b"Ada\nBea\n".to_vec()).await else {
            panic!("cat should echo its input");
        };
        assert_eq!(text, "Ada\nBea\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_is_a_recognition_error() {
        let extractor = CommandExtractor::new("false", Vec::new());
        let result = extractor.extract(Vec::new()).await;
        assert!(matches!(result, Err(PickerError::Recognition(_))));
    }

    #[tokio::test]
    async fn missing_program_is_a_recognition_error() {
        let extractor = CommandExtractor::new("rollcall-no-such-ocr-binary", Vec::new());
        let result = extractor.extract(vec![0_u8; 4]).await;
        let Err(PickerError::Recognition(message)) = result else {
            panic!("expected recognition error");
        };
        assert!(message.contains("rollcall-no-such-ocr-binary"));
    }
}
