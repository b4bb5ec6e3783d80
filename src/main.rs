use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};
use log::{error, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Fullscreen, WindowBuilder};

use component_framework::app::{
    map_keycode, mouse_button, print_summary, Diagnostics, FrameCounter, LogTextRenderer,
};
use component_framework::{
    components, Bootstrap, Core, EngineSettings, GameContext, InputSource, Looping, QueuedInput,
    RunMode, TextRenderer,
};

const DEFAULT_SETTINGS_PATH: &str = "settings.toml";
const DEFAULT_HEADLESS_FRAMES: u64 = 60;

fn main() {
    env_logger::init();
    install_panic_hook();
    if let Err(err) = run() {
        error!("{err:?}");
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        error!("unhandled panic: {info}");
        default_hook(info);
    }));
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let game = GameContext::load(&options.settings_path)
        .with_context(|| format!("failed to load settings {}", options.settings_path.display()))?;

    let mut settings = game.settings.engine_settings();
    if let Some(preview) = &options.preview {
        settings.preview_mode = true;
        settings.startup_scene = preview.scene.clone();
        settings.startup_camera_position = preview.camera_position;
        settings.startup_camera_look_at = preview.camera_look_at;
        // Editor previews always run windowed.
        settings.fullscreen = false;
    }

    let result = if options.headless {
        run_headless(settings, options.frames)
    } else {
        match run_interactive(settings.clone()) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<WindowInitError>().is_some() {
                    eprintln!("{err}. Falling back to --headless mode.");
                    run_headless(settings, options.frames)
                } else {
                    Err(err)
                }
            }
        }
    };

    game.save()
        .with_context(|| format!("failed to save settings {}", game.path().display()))?;
    result
}

struct Session {
    core: Core,
    input: Arc<QueuedInput>,
    frames: Arc<AtomicU64>,
}

fn start_session(settings: EngineSettings) -> Result<Session> {
    let frames = Arc::new(AtomicU64::new(0));
    let input = Arc::new(QueuedInput::new());
    let mut core = Core::new(settings)
        .with_render_hooks(Box::new(FrameCounter::new(Arc::clone(&frames))));

    let source: Arc<dyn InputSource> = input.clone();
    core.register_service(source);
    let text: Arc<dyn TextRenderer> = Arc::new(LogTextRenderer);
    core.register_service(text);

    let bootstrap =
        components::bootstrap(Bootstrap::new()).auto_load::<Diagnostics>(RunMode::Debug);
    core.initialize(bootstrap)
        .context("failed to initialize components")?;

    println!("Loaded {} component(s)", core.component_count());
    info!(
        "startup scene {:?}, preview {}",
        core.settings().startup_scene,
        core.settings().preview_mode
    );
    Ok(Session {
        core,
        input,
        frames,
    })
}

fn run_headless(settings: EngineSettings, frames: u64) -> Result<()> {
    let step = settings.update_step();
    let mut session = start_session(settings)?;
    let mut looping = Looping::new(step);

    for _ in 0..frames {
        looping.frame(&mut session.core, step)?;
        if session.core.is_disposed() {
            break;
        }
    }

    print_summary(&session.core, session.frames.load(Ordering::Relaxed));
    session.core.exit();
    Ok(())
}

fn run_interactive(settings: EngineSettings) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;

    let mode = settings.screen_mode;
    let mut builder = WindowBuilder::new()
        .with_title("Cubica")
        .with_inner_size(LogicalSize::new(mode.width as f64, mode.height as f64));
    if settings.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| WindowInitError::from_error("window", err))?;

    let step = settings.update_step();
    let mut session = start_session(settings)?;
    let mut looping = Looping::new(step);
    let mut last_frame = Instant::now();
    let mut last_error = None;

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => control_flow.set_exit(),
                WindowEvent::Focused(focused) => {
                    if focused {
                        looping.resume();
                    } else {
                        looping.pause();
                    }
                }
                WindowEvent::KeyboardInput { input, .. } => {
                    handle_keyboard(&session.input, &input);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    session
                        .input
                        .set_mouse_button(mouse_button(button), state == ElementState::Pressed);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    session
                        .input
                        .move_cursor(Vec2::new(position.x as f32, position.y as f32));
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    let turns = match delta {
                        MouseScrollDelta::LineDelta(_, lines) => lines.round() as i32,
                        MouseScrollDelta::PixelDelta(pixels) => (pixels.y / 120.0).round() as i32,
                    };
                    session.input.scroll(turns);
                }
                _ => {}
            },
            Event::MainEventsCleared => {
                let now = Instant::now();
                let elapsed = now - last_frame;
                last_frame = now;
                if let Err(err) = looping.frame(&mut session.core, elapsed) {
                    last_error = Some(anyhow!(err));
                    control_flow.set_exit();
                } else if session.core.is_disposed() {
                    control_flow.set_exit();
                }
            }
            _ => {}
        }
    });

    print_summary(&session.core, session.frames.load(Ordering::Relaxed));
    session.core.exit();
    match last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_keyboard(input: &QueuedInput, event: &KeyboardInput) {
    let Some(key) = event.virtual_keycode.and_then(map_keycode) else {
        return;
    };
    match event.state {
        ElementState::Pressed => input.set_key_down(key),
        ElementState::Released => input.set_key_up(key),
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

/// Scene and camera handed over by the editor.
struct Preview {
    scene: String,
    camera_position: Vec3,
    camera_look_at: Vec3,
}

struct CliOptions {
    preview: Option<Preview>,
    headless: bool,
    frames: u64,
    settings_path: PathBuf,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::from_args(env::args().skip(1))
    }

    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut positional = Vec::new();
        let mut headless = false;
        let mut frames = DEFAULT_HEADLESS_FRAMES;
        let mut settings_path = PathBuf::from(DEFAULT_SETTINGS_PATH);

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => headless = true,
                "--frames" => {
                    let value = args.next().ok_or_else(|| anyhow!("--frames needs a value"))?;
                    frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "--settings" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--settings needs a path"))?;
                    settings_path = PathBuf::from(value);
                }
                "-h" | "--help" => {
                    return Err(anyhow!(
                        "usage: cubica [scene camx camy camz lookx looky lookz] [--headless] [--frames N] [--settings PATH]"
                    ));
                }
                flag if flag.starts_with("--") => {
                    return Err(anyhow!("unknown option {flag}"));
                }
                _ => positional.push(arg),
            }
        }

        let preview = match positional.as_slice() {
            [] => None,
            [scene, rest @ ..] if rest.len() == 6 => {
                let mut numbers = [0.0f32; 6];
                for (slot, text) in numbers.iter_mut().zip(rest) {
                    *slot = text
                        .parse()
                        .with_context(|| format!("invalid camera coordinate {text:?}"))?;
                }
                Some(Preview {
                    scene: scene.clone(),
                    camera_position: Vec3::new(numbers[0], numbers[1], numbers[2]),
                    camera_look_at: Vec3::new(numbers[3], numbers[4], numbers[5]),
                })
            }
            _ => {
                return Err(anyhow!(
                    "preview needs a scene followed by six camera coordinates"
                ))
            }
        };

        Ok(Self {
            preview,
            headless,
            frames,
            settings_path,
        })
    }
}
