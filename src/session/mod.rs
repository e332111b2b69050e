//! Edit sessions.
//!
//! An [`EditSession`] is owned by the caller and holds everything the single
//! editing screen needs: the current filter and sliders, the source image
//! and the last successful render. Each mutation re-renders synchronously.
//! A failed render keeps the previous image on display and marks the session
//! stale until the next successful render.

pub mod review;
pub mod state;
pub mod store;

pub use review::{ReviewDecision, ReviewTracker};
pub use state::FilterState;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

use crate::core::error::{PipelineResult, SessionId};
use crate::core::types::{RenderedImage, SourceImage};
use crate::execution::pipeline::Pipeline;
use crate::filters::variant::FilterVariant;
use log::{debug, info, warn};

/// One editing session over a single source image at a time.
#[derive(Debug)]
pub struct EditSession {
    id: SessionId,
    pipeline: Pipeline,
    state: FilterState,
    source: Option<SourceImage>,
    rendered: Option<RenderedImage>,
    stale: bool,
    review: Option<ReviewTracker>,
}

impl EditSession {
    /// Session with default state and no review tracking.
    pub fn new(pipeline: Pipeline) -> Self {
        Self::with_state(pipeline, FilterState::default())
    }

    /// Session starting from `state`.
    pub fn with_state(pipeline: Pipeline, state: FilterState) -> Self {
        let id = SessionId::new();
        debug!("Session {} created with {:?}", id, state);
        Self {
            id,
            pipeline,
            state,
            source: None,
            rendered: None,
            stale: false,
            review: None,
        }
    }

    /// Attach a review tracker that counts filter changes.
    pub fn with_review_tracker(mut self, tracker: ReviewTracker) -> Self {
        self.review = Some(tracker);
        self
    }

    /// Session identifier, used in log lines.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current filter and slider positions.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Current source image, if one has been set.
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Last successful render, if any.
    pub fn rendered(&self) -> Option<&RenderedImage> {
        self.rendered.as_ref()
    }

    /// True if the displayed render no longer matches the current inputs.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Sliders and filter button only make sense once an image is loaded.
    pub fn sliders_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Replace the source image and render it.
    pub fn set_source(&mut self, source: SourceImage) -> PipelineResult<()> {
        info!(
            "Session {}: new source {}x{}",
            self.id,
            source.width(),
            source.height()
        );
        self.source = Some(source);
        self.refresh()
    }

    /// Switch filter, keeping the slider values, and count the change.
    ///
    /// The render outcome is logged rather than returned; use
    /// [`EditSession::is_stale`] to check whether it succeeded. Returns the
    /// review decision when a tracker is attached.
    pub fn set_filter(&mut self, variant: FilterVariant) -> Option<ReviewDecision> {
        self.state.set_variant(variant);
        // Failures are already logged and reflected in `is_stale`.
        let _ = self.refresh();

        self.review.as_mut().map(ReviewTracker::record_filter_change)
    }

    /// Move the intensity slider.
    pub fn set_intensity(&mut self, value: f64) -> PipelineResult<()> {
        self.state.set_intensity(value);
        self.refresh()
    }

    /// Move the radius slider.
    pub fn set_radius(&mut self, value: f64) -> PipelineResult<()> {
        self.state.set_radius(value);
        self.refresh()
    }

    /// Re-render from the current state. Without a source this does nothing.
    pub fn refresh(&mut self) -> PipelineResult<()> {
        let Some(source) = self.source.as_ref() else {
            return Ok(());
        };

        match self.pipeline.apply(
            source,
            self.state.variant(),
            self.state.intensity(),
            self.state.radius(),
        ) {
            Ok(rendered) => {
                self.rendered = Some(rendered);
                self.stale = false;
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Session {}: render failed ({}), keeping previous image: {}",
                    self.id,
                    e.kind(),
                    e
                );
                self.stale = true;
                Err(e)
            }
        }
    }
}
