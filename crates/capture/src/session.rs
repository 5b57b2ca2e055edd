//! The capture run loop.

use mimic_common::error::MimicResult;
use mimic_recording_model::Recording;

use crate::recorder::Recorder;
use crate::source::InputSource;

/// Drives an [`InputSource`] into a [`Recorder`] until recording is
/// stopped via the shared flag.
pub struct CaptureSession {
    source: Box<dyn InputSource>,
    recorder: Recorder,
}

impl CaptureSession {
    pub fn new(source: Box<dyn InputSource>, recorder: Recorder) -> Self {
        Self { source, recorder }
    }

    /// Poll the source until the recording flag clears, then return the
    /// finished recording. Source errors are logged and skipped; a
    /// transient device hiccup should not abort the whole run.
    pub async fn run(mut self) -> MimicResult<Recording> {
        self.recorder.start();
        tracing::info!(source = %self.source.name(), "Capture session started");

        while self.recorder.is_recording() {
            match self.source.poll() {
                Ok(Some(reading)) => self.recorder.ingest(reading),
                Ok(None) => {
                    tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Input source error");
                }
            }
        }

        // The flag flipped externally but the recorder still owns the
        // buffered events; stop() drains held keys and freezes them.
        let recording = self
            .recorder
            .stop()
            .unwrap_or_else(|| Recording::new(Default::default(), false));

        tracing::info!(events = recording.len(), "Capture session finished");
        Ok(recording)
    }

    /// Shared flag used to end the session from another task.
    pub fn recording_flag(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.recorder.recording_flag()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use mimic_recording_model::{MouseButton, VirtualScreen};

    use super::*;
    use crate::source::{RawInput, ScriptedSource};

    /// Source that clears the recording flag once its script is drained,
    /// so the session loop terminates.
    struct DrainingSource {
        inner: ScriptedSource,
        flag: std::sync::Arc<std::sync::atomic::AtomicBool>,
    }

    impl InputSource for DrainingSource {
        fn poll(&mut self) -> MimicResult<Option<RawInput>> {
            let reading = self.inner.poll()?;
            if reading.is_none() {
                self.flag.store(false, Ordering::SeqCst);
            }
            Ok(reading)
        }

        fn name(&self) -> &str {
            "draining"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_session_records_scripted_input() {
        let recorder = Recorder::new(VirtualScreen::new(1920, 1080, 0, 0), false);
        let flag = recorder.recording_flag();
        let source = DrainingSource {
            inner: ScriptedSource::new(vec![
                RawInput::PointerMove { x: 100, y: 100 },
                RawInput::PointerMove { x: 500, y: 500 },
                RawInput::Button {
                    x: 500,
                    y: 500,
                    button: MouseButton::Left,
                    pressed: true,
                },
                RawInput::Button {
                    x: 500,
                    y: 500,
                    button: MouseButton::Left,
                    pressed: false,
                },
            ]),
            flag: flag.clone(),
        };

        let recording = CaptureSession::new(Box::new(source), recorder)
            .run()
            .await
            .unwrap();

        assert_eq!(recording.len(), 4);
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_session_stops_on_external_flag() {
        let recorder = Recorder::new(VirtualScreen::new(1920, 1080, 0, 0), false);
        let session = CaptureSession::new(Box::new(ScriptedSource::empty()), recorder);
        let flag = session.recording_flag();

        let handle = tokio::spawn(session.run());
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        flag.store(false, Ordering::SeqCst);

        let recording = handle.await.unwrap().unwrap();
        assert!(recording.is_empty());
    }
}
