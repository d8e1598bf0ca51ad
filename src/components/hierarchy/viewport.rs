use super::layout::{Bounds, Point};

pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 2.0;
pub const DEFAULT_SCALE: f64 = 0.8;
pub const ZOOM_STEP: f64 = 0.1;
/// Scale change per pixel of wheel delta; one notch (~100px) is 0.05.
pub const WHEEL_SENSITIVITY: f64 = 0.0005;
const FIT_PADDING: f64 = 48.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanState {
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Pan offset and zoom of the chart, independent of its content.
///
/// Screen = world * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub k: f64,
	pan: Option<PanState>,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: DEFAULT_SCALE,
			pan: None,
		}
	}
}

impl Viewport {
	pub fn zoom_in(&mut self) {
		self.set_scale(self.k + ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.set_scale(self.k - ZOOM_STEP);
	}

	/// Zoom from a wheel event, keeping the world point under
	/// (`sx`, `sy`) fixed on screen.
	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		let anchor = self.screen_to_world(sx, sy);
		self.k = clamp_scale(self.k - delta_y * WHEEL_SENSITIVITY);
		self.x = sx - anchor.x * self.k;
		self.y = sy - anchor.y * self.k;
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = Some(PanState {
			start_x: sx,
			start_y: sy,
			transform_start_x: self.x,
			transform_start_y: self.y,
		});
	}

	/// Follow the pointer during a pan. Relative to where the gesture
	/// started, so missed events do not accumulate error.
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if let Some(pan) = self.pan {
			self.x = pan.transform_start_x + (sx - pan.start_x);
			self.y = pan.transform_start_y + (sy - pan.start_y);
		}
	}

	pub fn end_pan(&mut self) {
		self.pan = None;
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}

	/// Centre `bounds` in a `width` x `height` surface, never zooming in
	/// past the default scale.
	pub fn fit(&mut self, bounds: &Bounds, width: f64, height: f64) {
		let (bw, bh) = (bounds.width().max(1.0), bounds.height().max(1.0));
		let k = ((width - FIT_PADDING * 2.0) / bw)
			.min((height - FIT_PADDING * 2.0) / bh)
			.min(DEFAULT_SCALE);
		self.k = clamp_scale(k);
		let c = bounds.center();
		self.x = width / 2.0 - c.x * self.k;
		self.y = height / 2.0 - c.y * self.k;
		self.pan = None;
	}

	/// World coordinates of the screen point (`sx`, `sy`).
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn css_transform(&self) -> String {
		format!("translate({}px, {}px) scale({})", self.x, self.y, self.k)
	}

	fn set_scale(&mut self, k: f64) {
		// Rounded so repeated button steps land on exact tenths.
		self.k = clamp_scale((k * 1000.0).round() / 1000.0);
	}
}

fn clamp_scale(k: f64) -> f64 {
	k.clamp(MIN_SCALE, MAX_SCALE)
}
