use log::{error, info, warn};
use std::path::PathBuf;
use std::rc::Rc;

mod clouds;
mod compositor;
mod error;
mod frame_limiter;
mod gui;
mod input_system;
mod net;
mod script;
mod sdl_video;
mod settings;
mod shell;
mod sound;
mod text;
mod texture_layers;
mod video;

use frame_limiter::{Clock, SystemClock};
use input_system::InputSystem;
use sdl_video::SdlVideo;
use settings::MenuSettings;
use shell::MenuShell;
use sound::{SoundManager, SoundSlot, DUMMY_SOUND_MANAGER};

/// Command line: `voxel-menu [--error MESSAGE] [SETTINGS_FILE]`
struct Args {
    settings_path: PathBuf,
    error_message: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        settings_path: MenuSettings::default_path(),
        error_message: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--error" => args.error_message = iter.next(),
            _ => args.settings_path = PathBuf::from(arg),
        }
    }
    args
}

#[cfg(feature = "sound")]
fn create_sound_manager(settings: &MenuSettings) -> Option<Box<dyn SoundManager>> {
    let fetcher = sound::SoundFetcher::new(&settings.path_share, &settings.path_user);
    match sound::MixerSoundManager::new(fetcher) {
        Ok(manager) => Some(Box::new(manager)),
        Err(e) => {
            warn!("Audio unavailable, menu will be silent: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "sound"))]
fn create_sound_manager(_settings: &MenuSettings) -> Option<Box<dyn SoundManager>> {
    warn!("Built without sound support");
    None
}

fn run(args: Args) -> Result<(), String> {
    let settings = MenuSettings::load_or_default(&args.settings_path);

    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;
    let _image_context = sdl2::image::init(sdl2::image::InitFlag::PNG | sdl2::image::InitFlag::JPG)?;

    let window = video_subsystem
        .window(&settings.version_label, settings.screen_w, settings.screen_h)
        .position_centered()
        .resizable()
        .build()
        .map_err(|e| e.to_string())?;

    let canvas = window
        .into_canvas()
        .accelerated()
        .build()
        .map_err(|e| e.to_string())?;
    let texture_creator = canvas.texture_creator();
    let mut input = InputSystem::new(sdl_context.event_pump()?);

    #[cfg(feature = "sound")]
    let _audio = sdl_context.audio()?;
    let sound = SoundSlot::new(create_sound_manager(&settings), &DUMMY_SOUND_MANAGER);

    let clock: Rc<dyn Clock> = Rc::new(SystemClock::new());
    let mut shell = MenuShell::new(
        SdlVideo::new(canvas, &texture_creator),
        settings,
        sound,
        clock,
        args.error_message.as_deref(),
    )?;

    shell.run(&mut input)?;

    if shell.host().settings_dirty() {
        match shell.host().settings().save_to_file(&args.settings_path) {
            Ok(()) => info!("Saved settings to {}", args.settings_path.display()),
            Err(e) => warn!("Could not save settings: {}", e),
        }
    }

    shell.teardown();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(parse_args()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
