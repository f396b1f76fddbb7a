// Binding records: one physical source tied to an action, with its modifiers
//
// The shape of `BindingInput` decides which modifiers exist. Buttons and
// chords always carry a trigger; axes carry a side, an accumulator flag and a
// mode, and only digital-mode axes carry a trigger. Invalid combinations are
// rejected when the binding is built, so the flat query enums below only need
// their `NotApplicable` variants at the plugin boundary.

use super::source::{MouseAxis, PhysicalSource};
use super::{InputError, InputResult};

/// Whether a trigger fires plainly or flips a persistent on/off state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Hold,
    Toggle,
}

/// When a trigger fires relative to the press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerPress {
    /// Fire on the press itself (no duration semantics)
    Immediate,
    /// Fire on release, if released before the long-press threshold
    Short,
    /// Fire once the press has been held for the long-press threshold
    Long,
}

/// Activation modifiers of a digital-triggering binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub behavior: Behavior,
    pub press: TriggerPress,
}

impl Trigger {
    /// Build a trigger from its parts
    pub fn new(behavior: Behavior, press: TriggerPress) -> Self {
        Self { behavior, press }
    }

    /// Hold behavior firing on the press edge
    pub fn on_press() -> Self {
        Self::new(Behavior::Hold, TriggerPress::Immediate)
    }

    /// Hold behavior with the given press type
    pub fn hold(press: TriggerPress) -> Self {
        Self::new(Behavior::Hold, press)
    }

    /// Toggle behavior with the given press type
    pub fn toggle(press: TriggerPress) -> Self {
        Self::new(Behavior::Toggle, press)
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::on_press()
    }
}

/// Which half of an axis a binding listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Positive,
    Negative,
    Both,
}

/// How an axis binding reports its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisMode {
    Analog,
    /// Thresholded to 0/1 and run through the trigger like a button
    Digital(Trigger),
}

/// Physical shape of a binding
#[derive(Debug, Clone, PartialEq)]
pub enum BindingInput {
    Button {
        source: PhysicalSource,
        trigger: Trigger,
    },
    Chord {
        sources: Vec<PhysicalSource>,
        trigger: Trigger,
    },
    Axis {
        source: PhysicalSource,
        side: Side,
        accumulate: bool,
        mode: AxisMode,
    },
}

/// Binding type as reported to plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    Keyboard,
    Gamepad,
    Mouse,
    Joystick,
    Chord,
    GamepadAxis,
    MouseAxis,
    JoystickAxis,
    Unknown,
}

impl BindingType {
    /// True for the `*Axis` types
    pub fn is_axis(&self) -> bool {
        matches!(self, Self::GamepadAxis | Self::MouseAxis | Self::JoystickAxis)
    }

    /// True for button, key and chord types
    pub fn is_digital(&self) -> bool {
        matches!(
            self,
            Self::Keyboard | Self::Gamepad | Self::Mouse | Self::Joystick | Self::Chord
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingMode {
    Analog,
    Digital,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingSide {
    Positive,
    Negative,
    Both,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccumulatorMode {
    Off,
    On,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingBehavior {
    Hold,
    Toggle,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressType {
    Short,
    Long,
    NotApplicable,
}

/// One physical source bound to an action. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    input: BindingInput,
    display_name: String,
}

impl Binding {
    /// Bind a key or button
    pub fn button(source: PhysicalSource, trigger: Trigger) -> InputResult<Self> {
        if !source.is_button() {
            return Err(InputError::InvalidBinding(format!(
                "{source:?} is not a button"
            )));
        }
        Ok(Self::from_input(BindingInput::Button { source, trigger }))
    }

    /// Bind a chord: every member must be held at once
    pub fn chord<I>(sources: I, trigger: Trigger) -> InputResult<Self>
    where
        I: IntoIterator<Item = PhysicalSource>,
    {
        let sources: Vec<PhysicalSource> = sources.into_iter().collect();
        if sources.len() < 2 {
            return Err(InputError::InvalidBinding(
                "chord needs at least two members".to_string(),
            ));
        }
        if let Some(axis) = sources.iter().find(|s| !s.is_button()) {
            return Err(InputError::InvalidBinding(format!(
                "chord member {axis:?} is not a button"
            )));
        }
        for (i, source) in sources.iter().enumerate() {
            if sources[..i].contains(source) {
                return Err(InputError::InvalidBinding(format!(
                    "chord member {source:?} repeated"
                )));
            }
        }
        Ok(Self::from_input(BindingInput::Chord { sources, trigger }))
    }

    /// Bind an analog axis
    pub fn axis(source: PhysicalSource, side: Side) -> InputResult<Self> {
        Self::axis_with_mode(source, side, AxisMode::Analog)
    }

    /// Bind an axis thresholded into a digital trigger
    pub fn axis_digital(source: PhysicalSource, side: Side, trigger: Trigger) -> InputResult<Self> {
        Self::axis_with_mode(source, side, AxisMode::Digital(trigger))
    }

    fn axis_with_mode(source: PhysicalSource, side: Side, mode: AxisMode) -> InputResult<Self> {
        if !source.is_axis() {
            return Err(InputError::InvalidBinding(format!(
                "{source:?} is not an axis"
            )));
        }
        Ok(Self::from_input(BindingInput::Axis {
            source,
            side,
            accumulate: false,
            mode,
        }))
    }

    /// Turn an axis binding into a virtual knob that integrates deltas
    pub fn accumulating(mut self) -> InputResult<Self> {
        let BindingInput::Axis { accumulate, .. } = &mut self.input else {
            return Err(InputError::InvalidBinding(
                "only axis bindings can accumulate".to_string(),
            ));
        };
        *accumulate = true;
        Ok(self)
    }

    /// Override the generated display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    fn from_input(input: BindingInput) -> Self {
        let display_name = default_display_name(&input);
        Self {
            input,
            display_name,
        }
    }

    /// Physical shape of this binding
    pub fn input(&self) -> &BindingInput {
        &self.input
    }

    /// Human-readable label
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Every physical source this binding reads
    pub fn sources(&self) -> &[PhysicalSource] {
        match &self.input {
            BindingInput::Button { source, .. } | BindingInput::Axis { source, .. } => {
                std::slice::from_ref(source)
            }
            BindingInput::Chord { sources, .. } => sources,
        }
    }

    /// Trigger modifiers, if this binding fires callbacks
    pub fn trigger(&self) -> Option<Trigger> {
        match &self.input {
            BindingInput::Button { trigger, .. } | BindingInput::Chord { trigger, .. } => {
                Some(*trigger)
            }
            BindingInput::Axis {
                mode: AxisMode::Digital(trigger),
                ..
            } => Some(*trigger),
            BindingInput::Axis { .. } => None,
        }
    }

    /// True if this binding accumulates deltas
    pub fn accumulates(&self) -> bool {
        matches!(self.input, BindingInput::Axis { accumulate: true, .. })
    }

    pub fn binding_type(&self) -> BindingType {
        match &self.input {
            BindingInput::Chord { .. } => BindingType::Chord,
            BindingInput::Button { source, .. } | BindingInput::Axis { source, .. } => {
                match source {
                    PhysicalSource::Key(_) => BindingType::Keyboard,
                    PhysicalSource::MouseButton(_) => BindingType::Mouse,
                    PhysicalSource::GamepadButton { .. } => BindingType::Gamepad,
                    PhysicalSource::JoystickButton { .. } => BindingType::Joystick,
                    PhysicalSource::GamepadAxis { .. } => BindingType::GamepadAxis,
                    PhysicalSource::MouseAxis(_) => BindingType::MouseAxis,
                    PhysicalSource::JoystickAxis { .. } => BindingType::JoystickAxis,
                }
            }
        }
    }

    pub fn mode(&self) -> BindingMode {
        match &self.input {
            BindingInput::Axis {
                mode: AxisMode::Analog,
                ..
            } => BindingMode::Analog,
            BindingInput::Axis {
                mode: AxisMode::Digital(_),
                ..
            } => BindingMode::Digital,
            _ => BindingMode::NotApplicable,
        }
    }

    pub fn side(&self) -> BindingSide {
        match &self.input {
            BindingInput::Axis { side, .. } => match side {
                Side::Positive => BindingSide::Positive,
                Side::Negative => BindingSide::Negative,
                Side::Both => BindingSide::Both,
            },
            _ => BindingSide::NotApplicable,
        }
    }

    pub fn accumulator_mode(&self) -> AccumulatorMode {
        match &self.input {
            BindingInput::Axis { accumulate: true, .. } => AccumulatorMode::On,
            BindingInput::Axis { .. } => AccumulatorMode::Off,
            _ => AccumulatorMode::NotApplicable,
        }
    }

    pub fn behavior(&self) -> BindingBehavior {
        match self.trigger() {
            Some(Trigger {
                behavior: Behavior::Hold,
                ..
            }) => BindingBehavior::Hold,
            Some(Trigger {
                behavior: Behavior::Toggle,
                ..
            }) => BindingBehavior::Toggle,
            None => BindingBehavior::NotApplicable,
        }
    }

    pub fn press_type(&self) -> PressType {
        match self.trigger().map(|t| t.press) {
            Some(TriggerPress::Short) => PressType::Short,
            Some(TriggerPress::Long) => PressType::Long,
            Some(TriggerPress::Immediate) | None => PressType::NotApplicable,
        }
    }
}

fn source_label(source: &PhysicalSource) -> String {
    match source {
        PhysicalSource::Key(code) => format!("{code:?}"),
        PhysicalSource::MouseButton(button) => format!("Mouse {button:?}"),
        PhysicalSource::GamepadButton { pad, button } => format!("Pad{pad} Button{button}"),
        PhysicalSource::JoystickButton { device, button } => {
            format!("Joy{device} Button{button}")
        }
        PhysicalSource::GamepadAxis { pad, axis } => format!("Pad{pad} Axis{axis}"),
        PhysicalSource::JoystickAxis { device, axis } => format!("Joy{device} Axis{axis}"),
        PhysicalSource::MouseAxis(axis) => match axis {
            MouseAxis::X => "Mouse X".to_string(),
            MouseAxis::Y => "Mouse Y".to_string(),
            MouseAxis::WheelX => "Wheel X".to_string(),
            MouseAxis::WheelY => "Wheel Y".to_string(),
        },
    }
}

fn default_display_name(input: &BindingInput) -> String {
    match input {
        BindingInput::Button { source, .. } => source_label(source),
        BindingInput::Chord { sources, .. } => sources
            .iter()
            .map(source_label)
            .collect::<Vec<_>>()
            .join("+"),
        BindingInput::Axis { source, side, .. } => {
            let mut label = source_label(source);
            match side {
                Side::Positive => label.push('+'),
                Side::Negative => label.push('-'),
                Side::Both => {}
            }
            label
        }
    }
}

/// Label used by hosts for a list of bindings, e.g. in a prompt
pub fn describe_bindings(bindings: &[Binding]) -> String {
    let mut out = String::new();
    for (i, binding) in bindings.iter().enumerate() {
        if i > 0 {
            out.push_str(" / ");
        }
        out.push_str(binding.display_name());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::MouseButton;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_keyboard_binding_modifiers() {
        let binding = Binding::button(
            PhysicalSource::key(KeyCode::KeyE),
            Trigger::toggle(TriggerPress::Short),
        )
        .unwrap();

        assert_eq!(binding.binding_type(), BindingType::Keyboard);
        assert_eq!(binding.behavior(), BindingBehavior::Toggle);
        assert_eq!(binding.press_type(), PressType::Short);
        assert_eq!(binding.mode(), BindingMode::NotApplicable);
        assert_eq!(binding.side(), BindingSide::NotApplicable);
        assert_eq!(binding.accumulator_mode(), AccumulatorMode::NotApplicable);
    }

    #[test]
    fn test_immediate_press_reports_not_applicable() {
        let binding =
            Binding::button(PhysicalSource::mouse(MouseButton::Left), Trigger::on_press()).unwrap();
        assert_eq!(binding.binding_type(), BindingType::Mouse);
        assert_eq!(binding.behavior(), BindingBehavior::Hold);
        assert_eq!(binding.press_type(), PressType::NotApplicable);
    }

    #[test]
    fn test_button_rejects_axis_source() {
        let result = Binding::button(PhysicalSource::gamepad_axis(0, 0), Trigger::on_press());
        assert!(matches!(result, Err(InputError::InvalidBinding(_))));
    }

    #[test]
    fn test_axis_rejects_button_source() {
        let result = Binding::axis(PhysicalSource::key(KeyCode::KeyW), Side::Both);
        assert!(result.is_err());
    }

    #[test]
    fn test_analog_axis_modifiers() {
        let binding = Binding::axis(PhysicalSource::gamepad_axis(0, 1), Side::Negative).unwrap();

        assert_eq!(binding.binding_type(), BindingType::GamepadAxis);
        assert_eq!(binding.mode(), BindingMode::Analog);
        assert_eq!(binding.side(), BindingSide::Negative);
        assert_eq!(binding.accumulator_mode(), AccumulatorMode::Off);
        assert_eq!(binding.behavior(), BindingBehavior::NotApplicable);
        assert_eq!(binding.press_type(), PressType::NotApplicable);
        assert!(binding.trigger().is_none());
    }

    #[test]
    fn test_digital_axis_carries_trigger() {
        let binding = Binding::axis_digital(
            PhysicalSource::joystick_axis(1, 2),
            Side::Positive,
            Trigger::hold(TriggerPress::Long),
        )
        .unwrap();

        assert_eq!(binding.binding_type(), BindingType::JoystickAxis);
        assert_eq!(binding.mode(), BindingMode::Digital);
        assert_eq!(binding.behavior(), BindingBehavior::Hold);
        assert_eq!(binding.press_type(), PressType::Long);
    }

    #[test]
    fn test_accumulating_axis() {
        let binding = Binding::axis(PhysicalSource::MouseAxis(MouseAxis::WheelY), Side::Both)
            .and_then(Binding::accumulating)
            .unwrap();
        assert_eq!(binding.binding_type(), BindingType::MouseAxis);
        assert_eq!(binding.accumulator_mode(), AccumulatorMode::On);
        assert!(binding.accumulates());
    }

    #[test]
    fn test_button_cannot_accumulate() {
        let binding =
            Binding::button(PhysicalSource::key(KeyCode::KeyQ), Trigger::on_press()).unwrap();
        assert!(binding.accumulating().is_err());
    }

    #[test]
    fn test_chord_validation() {
        let ctrl = PhysicalSource::key(KeyCode::ControlLeft);
        let s = PhysicalSource::key(KeyCode::KeyS);

        assert!(Binding::chord([ctrl], Trigger::on_press()).is_err());
        assert!(Binding::chord([ctrl, ctrl], Trigger::on_press()).is_err());
        assert!(
            Binding::chord([ctrl, PhysicalSource::gamepad_axis(0, 0)], Trigger::on_press())
                .is_err()
        );

        let chord = Binding::chord([ctrl, s], Trigger::on_press()).unwrap();
        assert_eq!(chord.binding_type(), BindingType::Chord);
        assert_eq!(chord.sources(), &[ctrl, s]);
        assert_eq!(chord.display_name(), "ControlLeft+KeyS");
    }

    #[test]
    fn test_display_names() {
        let axis = Binding::axis(PhysicalSource::gamepad_axis(0, 3), Side::Positive).unwrap();
        assert_eq!(axis.display_name(), "Pad0 Axis3+");

        let renamed = axis.with_display_name("Right Trigger");
        assert_eq!(renamed.display_name(), "Right Trigger");
    }

    #[test]
    fn test_describe_bindings() {
        let bindings = vec![
            Binding::button(PhysicalSource::key(KeyCode::Space), Trigger::on_press()).unwrap(),
            Binding::button(PhysicalSource::gamepad_button(0, 0), Trigger::on_press()).unwrap(),
        ];
        assert_eq!(describe_bindings(&bindings), "Space / Pad0 Button0");
    }
}
