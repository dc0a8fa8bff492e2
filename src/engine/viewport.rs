use eframe::egui::{Rect, Vec2};

pub const ZOOM_MAX_SCALE: f32 = 2.0;
pub const ZOOM_MIN_SCALE: f32 = 0.1;
pub const ZOOM_IN_STEP: f32 = 1.3;
pub const ZOOM_OUT_STEP: f32 = 0.7;
/// Fraction of each viewport dimension kept clear on both sides of a fitted
/// bounding box.
pub const FIT_PADDING: f32 = 0.1;

const SCALE_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomType {
    In,
    Out,
    Fit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoomLimits {
    pub at_min: bool,
    pub at_max: bool,
}

/// Result of feeding a wheel event through the modifier-key policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelOutcome {
    Applied(ZoomLimits),
    /// First wheel event suppressed by the policy; the host should surface an
    /// info message. Later suppressions stay silent.
    SuppressedFirst,
    Suppressed,
}

/// Owns the model-to-screen transform: a scale clamped to
/// `[min_scale, ZOOM_MAX_SCALE]` and a translation relative to the viewport
/// center. The minimum is adaptive: fit-to-viewport lowers it so a fitted
/// view is never below the allowed range.
pub struct Viewport {
    scale: f32,
    min_scale: f32,
    translation: Vec2,
    width: f32,
    height: f32,
    is_fullscreen: bool,
    wheel_zoom_requires_modifier: bool,
    wheel_info_shown: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            min_scale: ZOOM_MIN_SCALE,
            translation: Vec2::ZERO,
            width: 0.0,
            height: 0.0,
            is_fullscreen: false,
            wheel_zoom_requires_modifier: false,
            wheel_info_shown: false,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn min_scale(&self) -> f32 {
        self.min_scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.translation += delta;
    }

    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Tracks the measured viewport rect; called every frame by the host.
    /// Never touches the user-chosen scale.
    pub fn set_dimensions(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn resize(
        &mut self,
        width: f32,
        height: f32,
        is_fullscreen: bool,
        wheel_zoom_requires_modifier: bool,
    ) {
        self.set_dimensions(width, height);
        self.is_fullscreen = is_fullscreen;
        if wheel_zoom_requires_modifier != self.wheel_zoom_requires_modifier {
            self.wheel_zoom_requires_modifier = wheel_zoom_requires_modifier;
            self.wheel_info_shown = false;
        }
    }

    pub fn limits(&self) -> ZoomLimits {
        ZoomLimits {
            at_min: self.scale <= self.min_scale + SCALE_EPSILON,
            at_max: self.scale >= ZOOM_MAX_SCALE - SCALE_EPSILON,
        }
    }

    /// Rescales while keeping the world point under `focus` (screen offset
    /// from the viewport center) stationary.
    fn apply_scale(&mut self, target: f32, focus: Vec2) -> ZoomLimits {
        let clamped = target.clamp(self.min_scale, ZOOM_MAX_SCALE);
        if self.scale > 0.0 {
            let world = (focus - self.translation) / self.scale;
            self.translation = focus - world * clamped;
        }
        self.scale = clamped;
        self.limits()
    }

    pub fn zoom_by_type(&mut self, zoom_type: ZoomType, bounds: Rect) -> ZoomLimits {
        match zoom_type {
            ZoomType::In => self.apply_scale(self.scale * ZOOM_IN_STEP, Vec2::ZERO),
            ZoomType::Out => self.apply_scale(self.scale * ZOOM_OUT_STEP, Vec2::ZERO),
            ZoomType::Fit => self.zoom_to_fit(bounds),
        }
    }

    /// Fits `bounds` (model space) into the viewport with `FIT_PADDING` kept
    /// clear, centers it, and lowers the adaptive minimum so the fitted scale
    /// is itself in range. A not-yet-sized viewport is a no-op; an empty or
    /// point-sized box yields the identity scale.
    pub fn zoom_to_fit(&mut self, bounds: Rect) -> ZoomLimits {
        if self.width < 1.0 || self.height < 1.0 {
            return self.limits();
        }

        let box_width = bounds.width().max(0.0);
        let box_height = bounds.height().max(0.0);
        if box_width <= 0.0 && box_height <= 0.0 {
            self.min_scale = self.min_scale.min(1.0);
            self.scale = 1.0;
            self.translation = -bounds.center().to_vec2();
            return self.limits();
        }

        let available_width = self.width * (1.0 - 2.0 * FIT_PADDING);
        let available_height = self.height * (1.0 - 2.0 * FIT_PADDING);
        let width_ratio = if box_width > 0.0 {
            available_width / box_width
        } else {
            f32::INFINITY
        };
        let height_ratio = if box_height > 0.0 {
            available_height / box_height
        } else {
            f32::INFINITY
        };

        let fitted = width_ratio.min(height_ratio).min(ZOOM_MAX_SCALE);
        self.min_scale = self.min_scale.min(fitted).min(ZOOM_MIN_SCALE);
        self.scale = fitted.max(self.min_scale);
        self.translation = -bounds.center().to_vec2() * self.scale;
        self.limits()
    }

    pub fn wheel_zoom(&mut self, scroll_delta: f32, modifier_held: bool, focus: Vec2) -> WheelOutcome {
        if self.wheel_zoom_requires_modifier && !modifier_held {
            if self.wheel_info_shown {
                return WheelOutcome::Suppressed;
            }
            self.wheel_info_shown = true;
            return WheelOutcome::SuppressedFirst;
        }

        let factor = (1.0 + scroll_delta * 0.0018).clamp(0.85, 1.15);
        WheelOutcome::Applied(self.apply_scale(self.scale * factor, focus))
    }
}
