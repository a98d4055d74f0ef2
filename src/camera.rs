//! Pan/zoom state and animated focus transitions.

use log::{debug, trace};

use crate::arena::GraphArena;
use crate::config::CameraConfig;
use crate::model::PersonId;

/// Screen = world × k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { x: 0.0, y: 0.0, k: 1.0 };

    pub fn apply(&self, (wx, wy): (f32, f32)) -> (f32, f32) {
        (wx * self.k + self.x, wy * self.k + self.y)
    }

    pub fn invert(&self, (sx, sy): (f32, f32)) -> (f32, f32) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    fn lerp(&self, to: &Transform, t: f32) -> Transform {
        Transform {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            k: self.k + (to.k - self.k) * t,
        }
    }
}

/// Request to centre the camera on a person.
///
/// `trigger` identifies the request (typically a timestamp); repeating the
/// last handled trigger is a no-op, a fresh trigger for the same person
/// animates again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub target: PersonId,
    pub trigger: u64,
}

#[derive(Debug, Clone)]
struct FocusAnimation {
    target: PersonId,
    from: Transform,
    to: Transform,
    elapsed: f32,
    duration: f32,
}

/// Cubic in-out easing on [0, 1].
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    viewport: (f32, f32),
    config: CameraConfig,
    last_trigger: Option<u64>,
    animation: Option<FocusAnimation>,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            transform: Transform::IDENTITY,
            viewport: (0.0, 0.0),
            config: config.clone(),
            last_trigger: None,
            animation: None,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Replace the transform, clamping the scale. Cancels any animation.
    pub fn set_transform(&mut self, transform: Transform) {
        self.animation = None;
        self.transform = Transform { k: self.clamp_zoom(transform.k), ..transform };
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    /// A camera with no viewport yet cannot map pointer input.
    pub fn is_ready(&self) -> bool {
        self.viewport.0 > 0.0 && self.viewport.1 > 0.0
    }

    /// World coordinate under the viewport centre.
    pub fn view_center(&self) -> (f32, f32) {
        self.screen_to_world(self.viewport.0 / 2.0, self.viewport.1 / 2.0)
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32) -> (f32, f32) {
        self.transform.invert((sx, sy))
    }

    pub fn world_to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        self.transform.apply((wx, wy))
    }

    fn clamp_zoom(&self, k: f32) -> f32 {
        k.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Translate by a screen-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.animation = None;
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Scale by `factor`, keeping the world point under `(sx, sy)` fixed.
    pub fn zoom_at(&mut self, sx: f32, sy: f32, factor: f32) {
        self.animation = None;
        let new_k = self.clamp_zoom(self.transform.k * factor);
        let ratio = new_k / self.transform.k;
        self.transform = Transform {
            x: sx - (sx - self.transform.x) * ratio,
            y: sy - (sy - self.transform.y) * ratio,
            k: new_k,
        };
    }

    /// Wheel zoom anchored at the cursor; positive `delta_y` zooms out.
    pub fn wheel(&mut self, sx: f32, sy: f32, delta_y: f32) {
        let factor = if delta_y > 0.0 {
            1.0 / self.config.wheel_step
        } else {
            self.config.wheel_step
        };
        self.zoom_at(sx, sy, factor);
    }

    /// Transform that centres `world` at `k` in the current viewport.
    pub fn centered_on(&self, (wx, wy): (f32, f32), k: f32) -> Transform {
        let k = self.clamp_zoom(k);
        Transform {
            x: self.viewport.0 / 2.0 - wx * k,
            y: self.viewport.1 / 2.0 - wy * k,
            k,
        }
    }

    /// Start a focus animation. Returns whether the request was accepted.
    ///
    /// Ignored when its trigger was already handled or the target is not in
    /// `arena`.
    pub fn request_focus(&mut self, request: FocusRequest, arena: &GraphArena) -> bool {
        if self.last_trigger == Some(request.trigger) {
            trace!("focus trigger {} already handled", request.trigger);
            return false;
        }
        self.last_trigger = Some(request.trigger);

        let Some(node) = arena.node(request.target) else {
            debug!("focus target {} is not in view", request.target);
            return false;
        };
        let to = self.centered_on(node.position(), self.config.focus_scale);
        debug!("focusing person {} at {:?}", request.target, node.position());

        if self.config.focus_duration <= 0.0 {
            self.transform = to;
            self.animation = None;
        } else {
            self.animation = Some(FocusAnimation {
                target: request.target,
                from: self.transform,
                to,
                elapsed: 0.0,
                duration: self.config.focus_duration,
            });
        }
        true
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Person the running animation is heading for.
    pub fn focus_target(&self) -> Option<PersonId> {
        self.animation.as_ref().map(|a| a.target)
    }

    /// Step the focus animation by `dt` seconds. Returns whether it is still running.
    pub fn advance(&mut self, dt: f32) -> bool {
        let Some(anim) = self.animation.as_mut() else {
            return false;
        };
        anim.elapsed += dt;
        let t = (anim.elapsed / anim.duration).min(1.0);
        self.transform = anim.from.lerp(&anim.to, ease_cubic_in_out(t));

        if t >= 1.0 {
            self.transform = anim.to;
            self.animation = None;
        }
        self.animation.is_some()
    }

    /// Transform framing the world rectangle `(min_x, min_y, max_x, max_y)`.
    pub fn fit_transform(&self, bounds: (f32, f32, f32, f32)) -> Transform {
        let (min_x, min_y, max_x, max_y) = bounds;
        let pad = self.config.fit_padding;
        let avail_w = (self.viewport.0 - 2.0 * pad).max(1.0);
        let avail_h = (self.viewport.1 - 2.0 * pad).max(1.0);
        let (w, h) = (max_x - min_x, max_y - min_y);

        let k = match (w > 0.0, h > 0.0) {
            (true, true) => (avail_w / w).min(avail_h / h),
            (true, false) => avail_w / w,
            (false, true) => avail_h / h,
            (false, false) => self.transform.k,
        };
        self.centered_on(((min_x + max_x) / 2.0, (min_y + max_y) / 2.0), k)
    }

    /// Frame every node of `arena`. No-op for an empty arena.
    pub fn fit(&mut self, arena: &GraphArena) {
        if let Some(bounds) = arena.bounds() {
            let transform = self.fit_transform(bounds);
            self.set_transform(transform);
        }
    }
}
