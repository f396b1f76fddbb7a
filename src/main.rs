use action_binds::engine::input::binding::describe_bindings;
use action_binds::engine::input::{ConsumePolicy, MouseAxis, Side, Trigger, TriggerPress};
use action_binds::{
    ActionEngine, ActionLayout, Binding, EngineConfig, LayoutBuilder, PhysicalSource, PluginApi,
    SampleTable, TickTimer,
};
use anyhow::Result;
use log::info;
use std::time::Instant;
use winit::{
    event::{DeviceEvent, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::KeyCode,
    window::WindowBuilder,
};

fn build_layout() -> Result<ActionLayout> {
    let mut builder = LayoutBuilder::new();

    let jump = builder.define_action("player", "jump", ConsumePolicy::Never)?;
    builder.add_binding(
        &jump,
        Binding::button(PhysicalSource::key(KeyCode::Space), Trigger::on_press())?,
    )?;
    builder.add_binding(
        &jump,
        Binding::button(PhysicalSource::gamepad_button(0, 0), Trigger::on_press())?,
    )?;

    let crouch = builder.define_action("player", "crouch", ConsumePolicy::Never)?;
    builder.add_binding(
        &crouch,
        Binding::button(
            PhysicalSource::key(KeyCode::KeyC),
            Trigger::toggle(TriggerPress::Short),
        )?,
    )?;

    let interact = builder.define_action("world", "interact", ConsumePolicy::Manual)?;
    builder.add_binding(
        &interact,
        Binding::button(
            PhysicalSource::key(KeyCode::KeyE),
            Trigger::hold(TriggerPress::Long),
        )?,
    )?;

    let save = builder.define_action("menu", "quick_save", ConsumePolicy::Always)?;
    builder.add_binding(
        &save,
        Binding::chord(
            [
                PhysicalSource::key(KeyCode::ControlLeft),
                PhysicalSource::key(KeyCode::KeyS),
            ],
            Trigger::on_press(),
        )?,
    )?;

    let fire = builder.define_action("player", "fire", ConsumePolicy::Never)?;
    builder.add_binding(
        &fire,
        Binding::button(
            PhysicalSource::mouse(winit::event::MouseButton::Left),
            Trigger::on_press(),
        )?,
    )?;

    let zoom = builder.define_action("camera", "zoom", ConsumePolicy::Never)?;
    builder.add_binding(
        &zoom,
        Binding::axis(PhysicalSource::MouseAxis(MouseAxis::WheelY), Side::Both)?
            .accumulating()?,
    )?;

    let look = builder.define_action("camera", "look_x", ConsumePolicy::Never)?;
    builder.add_binding(
        &look,
        Binding::axis(PhysicalSource::MouseAxis(MouseAxis::X), Side::Both)?,
    )?;

    Ok(builder.finalize()?)
}

fn attach_demo_plugin(api: &PluginApi) {
    let ctx = api.attach("demo");

    for action in ["player.jump", "player.crouch", "player.fire", "menu.quick_save"] {
        api.register(ctx, action, move || info!("Action fired: {}", action));
    }

    // Holding E long enough claims the key for the plugin
    let inner = api.clone();
    api.register(ctx, "world.interact", move || {
        info!("Interact held, blocking world.interact");
        inner.set_block_state(ctx, "world.interact", true);
    });

    let mut name = [0u8; 32];
    let len = api.get_binding_name(ctx, "menu.quick_save", 0, &mut name);
    let shown = len.min(name.len() - 1);
    info!(
        "Quick save bound to {}",
        String::from_utf8_lossy(&name[..shown])
    );
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting action binds demo...");

    let config = EngineConfig::default().with_accumulator_scale(0.1);
    let mut engine = ActionEngine::new(config, build_layout()?)?;
    for (_, entry) in engine.layout().iter() {
        info!("{} -> {}", entry.name(), describe_bindings(entry.bindings()));
    }
    let api = engine.plugin_api();
    attach_demo_plugin(&api);
    let ctx = api.get_context("demo");

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Action Binds Demo")
        .with_inner_size(winit::dpi::LogicalSize::new(640, 360))
        .build(&event_loop)?;

    info!("Window created successfully");

    let mut table = SampleTable::new();
    let mut timer = TickTimer::new(Instant::now());
    let mut last_zoom = 0.0f32;

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => table.process_keyboard_event(&event),
                WindowEvent::MouseInput { state, button, .. } => {
                    table.process_mouse_button(state, button)
                }
                WindowEvent::MouseWheel { delta, .. } => table.process_mouse_wheel(delta),
                WindowEvent::Focused(false) => {
                    table.clear();
                    engine.reset_all();
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => table.process_mouse_motion(delta),
            Event::AboutToWait => {
                let ticks = timer.begin_frame(Instant::now());
                for _ in 0..ticks {
                    let tick_time = timer.step();
                    engine.update(&table, tick_time);
                    table.end_tick();
                }

                if let Some(ctx) = ctx {
                    let zoom = api.get_action_value(ctx, "camera.zoom");
                    if (zoom - last_zoom).abs() > f32::EPSILON {
                        info!("Zoom: {:.2}", zoom);
                        last_zoom = zoom;
                    }
                }
                let save_key = PhysicalSource::key(KeyCode::KeyS);
                if engine.is_consumed(save_key) {
                    for id in engine.layout().actions_for_source(save_key) {
                        if let Some(entry) = engine.layout().action(id) {
                            log::debug!("KeyS consumed, bound to {}", entry.name());
                        }
                    }
                }
                if table.is_active(PhysicalSource::key(KeyCode::Escape)) {
                    info!("Escape pressed, shutting down...");
                    elwt.exit();
                }

                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
