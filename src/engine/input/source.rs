// Physical input identifiers

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Relative mouse axes (per-tick deltas)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAxis {
    X,
    Y,
    WheelX,
    WheelY,
}

/// One physical input the sampler can report a raw value for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalSource {
    Key(KeyCode),
    MouseButton(MouseButton),
    GamepadButton { pad: u8, button: u8 },
    JoystickButton { device: u8, button: u8 },
    GamepadAxis { pad: u8, axis: u8 },
    MouseAxis(MouseAxis),
    JoystickAxis { device: u8, axis: u8 },
}

impl PhysicalSource {
    /// Create a keyboard key source
    pub fn key(code: KeyCode) -> Self {
        Self::Key(code)
    }

    /// Create a mouse button source
    pub fn mouse(button: MouseButton) -> Self {
        Self::MouseButton(button)
    }

    /// Create a gamepad button source
    pub fn gamepad_button(pad: u8, button: u8) -> Self {
        Self::GamepadButton { pad, button }
    }

    /// Create a gamepad axis source
    pub fn gamepad_axis(pad: u8, axis: u8) -> Self {
        Self::GamepadAxis { pad, axis }
    }

    /// Create a joystick button source
    pub fn joystick_button(device: u8, button: u8) -> Self {
        Self::JoystickButton { device, button }
    }

    /// Create a joystick axis source
    pub fn joystick_axis(device: u8, axis: u8) -> Self {
        Self::JoystickAxis { device, axis }
    }

    /// True for two-state sources (keys and buttons)
    pub fn is_button(&self) -> bool {
        matches!(
            self,
            Self::Key(_) | Self::MouseButton(_) | Self::GamepadButton { .. } | Self::JoystickButton { .. }
        )
    }

    /// True for continuous sources
    pub fn is_axis(&self) -> bool {
        !self.is_button()
    }

    /// True for sources whose samples are deltas that reset every tick
    pub fn is_relative(&self) -> bool {
        matches!(self, Self::MouseAxis(_))
    }
}
