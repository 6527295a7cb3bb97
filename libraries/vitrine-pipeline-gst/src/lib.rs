//! GStreamer backend for the Vitrine kiosk
//!
//! A thin `MediaPipeline` over `playbin`: state changes map to transport
//! calls, seeks are flushing key-unit seeks, and the bus is polled for
//! end-of-stream and error messages. Construction failure is fatal to the
//! kiosk, unlike the degradable hardware sensors.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::Path;
use std::time::Duration;
use vitrine_playback::{MediaPipeline, PipelineEvent, PlaybackError, Result};

/// `playbin`-backed media pipeline
pub struct GstPipeline {
    playbin: gst::Element,
    bus: gst::Bus,
}

impl GstPipeline {
    /// Initialize GStreamer and build an idle `playbin`
    pub fn new() -> Result<Self> {
        gst::init().map_err(|e| PlaybackError::Pipeline(format!("GStreamer init: {e}")))?;

        let playbin = gst::ElementFactory::make("playbin")
            .build()
            .map_err(|e| PlaybackError::Pipeline(format!("creating playbin: {e}")))?;
        let bus = playbin
            .bus()
            .ok_or_else(|| PlaybackError::Pipeline("playbin has no message bus".to_string()))?;

        tracing::info!("GStreamer pipeline initialized");
        Ok(Self { playbin, bus })
    }

    fn set_state(&self, state: gst::State) -> Result<()> {
        self.playbin
            .set_state(state)
            .map_err(|e| PlaybackError::Pipeline(format!("state change to {state:?}: {e}")))?;
        Ok(())
    }
}

impl MediaPipeline for GstPipeline {
    fn set_source(&mut self, path: &Path) -> Result<()> {
        // playbin only accepts a new uri while NULL.
        self.set_state(gst::State::Null)?;
        let uri = gst::glib::filename_to_uri(path, None)
            .map_err(|e| PlaybackError::Pipeline(format!("building file uri: {e}")))?;
        self.playbin.set_property("uri", uri.as_str());
        tracing::debug!(uri = %uri, "pipeline source set");
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.set_state(gst::State::Playing)
    }

    fn pause(&mut self) -> Result<()> {
        self.set_state(gst::State::Paused)
    }

    fn stop(&mut self) -> Result<()> {
        self.set_state(gst::State::Null)
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let target = gst::ClockTime::from_nseconds(position.as_nanos() as u64);
        self.playbin
            .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT, target)
            .map_err(|e| PlaybackError::Pipeline(format!("seek: {e}")))
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.playbin.set_property("volume", volume.clamp(0.0, 1.0));
        Ok(())
    }

    fn position(&self) -> Option<Duration> {
        self.playbin
            .query_position::<gst::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    fn duration(&self) -> Option<Duration> {
        self.playbin
            .query_duration::<gst::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    fn poll_event(&mut self) -> Option<PipelineEvent> {
        // Non-blocking drain; unrelated bus traffic is skipped.
        while let Some(message) = self.bus.pop() {
            match message.view() {
                gst::MessageView::Eos(_) => return Some(PipelineEvent::EndOfStream),
                gst::MessageView::Error(err) => {
                    tracing::error!(
                        source = ?message.src().map(|s| s.path_string()),
                        debug = ?err.debug(),
                        "GStreamer error"
                    );
                    return Some(PipelineEvent::Error(err.error().to_string()));
                }
                _ => {}
            }
        }
        None
    }
}

impl Drop for GstPipeline {
    fn drop(&mut self) {
        // Release decoder and display resources on every exit route.
        let _ = self.playbin.set_state(gst::State::Null);
    }
}
