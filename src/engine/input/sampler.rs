// Per-tick physical input samples

use super::source::{MouseAxis, PhysicalSource};
use glam::Vec2;
use std::collections::HashMap;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta};
use winit::keyboard::PhysicalKey;

/// Pixels of smooth scrolling that count as one wheel notch
const PIXELS_PER_LINE: f32 = 40.0;

/// Default scale from mouse motion pixels to axis units
const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.05;

/// Raw values for physical sources, read once per tick
///
/// Buttons report 0 or 1, axes -1..1 (or 0..1 for triggers). Unknown sources
/// report 0.
pub trait InputSampler {
    fn raw_value(&self, source: PhysicalSource) -> f32;
}

impl InputSampler for HashMap<PhysicalSource, f32> {
    fn raw_value(&self, source: PhysicalSource) -> f32 {
        self.get(&source).copied().unwrap_or(0.0)
    }
}

/// Sample table fed from window events and the device polling layer
#[derive(Debug)]
pub struct SampleTable {
    /// Absolute values for keys, buttons and device axes
    values: HashMap<PhysicalSource, f32>,

    /// Mouse motion accumulated since the last tick (pixels)
    mouse_delta: Vec2,

    /// Wheel motion accumulated since the last tick (notches)
    wheel_delta: Vec2,

    /// Pixels -> axis units
    mouse_sensitivity: f32,
}

impl SampleTable {
    /// Create an empty sample table
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            mouse_delta: Vec2::ZERO,
            wheel_delta: Vec2::ZERO,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
        }
    }

    /// Set how many axis units one pixel of mouse motion is worth
    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        // Only physical keys, repeats carry no new state
        if event.repeat {
            return;
        }
        if let PhysicalKey::Code(key_code) = event.physical_key {
            let source = PhysicalSource::key(key_code);
            match event.state {
                ElementState::Pressed => self.press(source),
                ElementState::Released => self.release(source),
            }
        }
    }

    /// Process a mouse button event from winit
    pub fn process_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        let source = PhysicalSource::mouse(button);
        match state {
            ElementState::Pressed => self.press(source),
            ElementState::Released => self.release(source),
        }
    }

    /// Process raw mouse motion (device event delta)
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_delta += Vec2::new(delta.0 as f32, delta.1 as f32);
    }

    /// Process a mouse wheel event from winit
    pub fn process_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.wheel_delta += match delta {
            MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
            MouseScrollDelta::PixelDelta(pos) => {
                Vec2::new(pos.x as f32, pos.y as f32) / PIXELS_PER_LINE
            }
        };
    }

    /// Mark a button source as held
    pub fn press(&mut self, source: PhysicalSource) {
        self.values.insert(source, 1.0);
    }

    /// Mark a button source as released
    pub fn release(&mut self, source: PhysicalSource) {
        self.values.remove(&source);
    }

    /// Set an absolute value for any non-relative source, clamped to -1..1
    pub fn set(&mut self, source: PhysicalSource, value: f32) {
        if source.is_relative() {
            log::warn!("Ignoring absolute value for relative source {:?}", source);
            return;
        }
        let value = if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        if value == 0.0 {
            self.values.remove(&source);
        } else {
            self.values.insert(source, value);
        }
    }

    pub fn set_gamepad_button(&mut self, pad: u8, button: u8, pressed: bool) {
        self.set_button(PhysicalSource::gamepad_button(pad, button), pressed);
    }

    pub fn set_gamepad_axis(&mut self, pad: u8, axis: u8, value: f32) {
        self.set(PhysicalSource::gamepad_axis(pad, axis), value);
    }

    pub fn set_joystick_button(&mut self, device: u8, button: u8, pressed: bool) {
        self.set_button(PhysicalSource::joystick_button(device, button), pressed);
    }

    pub fn set_joystick_axis(&mut self, device: u8, axis: u8, value: f32) {
        self.set(PhysicalSource::joystick_axis(device, axis), value);
    }

    fn set_button(&mut self, source: PhysicalSource, pressed: bool) {
        if pressed {
            self.press(source);
        } else {
            self.release(source);
        }
    }

    /// Check if a source is currently non-zero
    pub fn is_active(&self, source: PhysicalSource) -> bool {
        self.raw_value(source) != 0.0
    }

    /// Clear relative axes. Call once per tick after the engine update.
    pub fn end_tick(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.wheel_delta = Vec2::ZERO;
    }

    /// Release everything (focus loss, device reset)
    pub fn clear(&mut self) {
        self.values.clear();
        self.end_tick();
    }
}

impl Default for SampleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSampler for SampleTable {
    fn raw_value(&self, source: PhysicalSource) -> f32 {
        match source {
            PhysicalSource::MouseAxis(axis) => {
                let value = match axis {
                    MouseAxis::X => self.mouse_delta.x * self.mouse_sensitivity,
                    MouseAxis::Y => self.mouse_delta.y * self.mouse_sensitivity,
                    MouseAxis::WheelX => self.wheel_delta.x,
                    MouseAxis::WheelY => self.wheel_delta.y,
                };
                value.clamp(-1.0, 1.0)
            }
            _ => self.values.get(&source).copied().unwrap_or(0.0),
        }
    }
}
