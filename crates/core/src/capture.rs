//! Frame polling feed that turns camera frames into decoded payloads.
//!
//! The feed never touches the workflow. It samples one frame per tick,
//! hands it to a decoder and forwards whatever string comes out over a
//! channel; the consumer feeds those strings to
//! [`ScanPairingWorkflow::handle_payload`](crate::ScanPairingWorkflow::handle_payload).

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

const FEED_CHANNEL_CAPACITY: usize = 32;

/// One captured frame, RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// A camera that has not produced video yet reports zero dimensions.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Camera or other frame producer. Captures synchronously.
pub trait FrameSource: Send + 'static {
    fn capture(&mut self) -> Option<Frame>;
}

/// External QR decoder.
pub trait FrameDecoder: Send + Sync + 'static {
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// Polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub frame_interval: Duration,
    /// The same payload seen again inside this window is dropped.
    pub repeat_suppression: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            repeat_suppression: Duration::from_millis(1500),
        }
    }
}

/// Drops a payload identical to the previous one if it arrives within the window.
#[derive(Debug, Clone)]
pub struct RepeatFilter {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl RepeatFilter {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true if `payload` should be forwarded.
    pub fn admit(&mut self, payload: &str, now: Instant) -> bool {
        if let Some((last, seen_at)) = &self.last {
            if last == payload && now.saturating_duration_since(*seen_at) < self.window {
                return false;
            }
        }
        self.last = Some((payload.to_string(), now));
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Restartable polling loop over a frame source.
pub struct ScanFeed<S, D>
where
    S: FrameSource,
    D: FrameDecoder,
{
    source: Arc<Mutex<S>>,
    decoder: Arc<D>,
    config: FeedConfig,
    handle: Option<JoinHandle<()>>,
}

impl<S, D> ScanFeed<S, D>
where
    S: FrameSource,
    D: FrameDecoder,
{
    pub fn new(source: S, decoder: D, config: FeedConfig) -> Self {
        Self {
            source: Arc::new(Mutex::new(source)),
            decoder: Arc::new(decoder),
            config,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start polling and return the receiving end of the payload channel.
    ///
    /// Calling `start` on a running feed restarts it; the previous
    /// receiver then sees the channel close.
    pub fn start(&mut self) -> mpsc::Receiver<String> {
        self.stop();

        let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        let source = self.source.clone();
        let decoder = self.decoder.clone();
        let config = self.config;

        info!("Scan feed started");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut filter = RepeatFilter::new(config.repeat_suppression);

            loop {
                ticker.tick().await;

                let frame = source.lock().capture();
                let Some(frame) = frame else { continue };
                if frame.is_empty() {
                    continue;
                }

                let Some(payload) = decoder.decode(&frame) else { continue };
                if !filter.admit(&payload, Instant::now()) {
                    continue;
                }

                debug!("Decoded payload: {}", payload);
                if tx.send(payload).await.is_err() {
                    debug!("Scan feed receiver dropped");
                    break;
                }
            }
        }));

        rx
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Scan feed stopped");
        }
    }
}

impl<S, D> Drop for ScanFeed<S, D>
where
    S: FrameSource,
    D: FrameDecoder,
{
    fn drop(&mut self) {
        self.stop();
    }
}
