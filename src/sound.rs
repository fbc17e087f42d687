//! Menu sound
//!
//! The shell talks to a [`SoundManager`]. When no audio backend is available
//! it borrows [`DUMMY_SOUND_MANAGER`], a process-wide no-op instance that the
//! shell never owns or drops.

use log::debug;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Number of numbered variants probed per sound name (`name.0.ogg` .. `name.9.ogg`)
const SOUND_VARIANTS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSoundSpec {
    pub name: String,
    pub gain: f32,
}

impl SimpleSoundSpec {
    pub fn new(name: &str) -> Self {
        SimpleSoundSpec {
            name: name.to_string(),
            gain: 1.0,
        }
    }
}

pub trait SoundManager {
    /// Starts playing `spec`. Returns a handle, or -1 if nothing was played.
    fn play_sound(&self, spec: &SimpleSoundSpec, looped: bool) -> i32;

    fn stop_sound(&self, handle: i32);
}

/// Sound manager that plays nothing
pub struct DummySoundManager;

impl SoundManager for DummySoundManager {
    fn play_sound(&self, spec: &SimpleSoundSpec, _looped: bool) -> i32 {
        debug!("No audio backend, not playing \"{}\"", spec.name);
        -1
    }

    fn stop_sound(&self, _handle: i32) {}
}

pub static DUMMY_SOUND_MANAGER: DummySoundManager = DummySoundManager;

/// The shell's sound manager: owned if it created one, borrowed otherwise
pub enum SoundSlot {
    Owned(Box<dyn SoundManager>),
    Shared(&'static (dyn SoundManager + Sync)),
}

impl SoundSlot {
    pub fn new(owned: Option<Box<dyn SoundManager>>, fallback: &'static (dyn SoundManager + Sync)) -> Self {
        match owned {
            Some(manager) => SoundSlot::Owned(manager),
            None => SoundSlot::Shared(fallback),
        }
    }

    pub fn get(&self) -> &dyn SoundManager {
        match self {
            SoundSlot::Owned(manager) => manager.as_ref(),
            SoundSlot::Shared(manager) => *manager,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, SoundSlot::Owned(_))
    }
}

/// Resolves sound names to candidate files under the share and user dirs
///
/// Each name is resolved only once; later requests return nothing.
pub struct SoundFetcher {
    search_dirs: Vec<PathBuf>,
    fetched: RefCell<HashSet<String>>,
}

impl SoundFetcher {
    pub fn new(path_share: &Path, path_user: &Path) -> Self {
        SoundFetcher {
            search_dirs: vec![path_share.join("sounds"), path_user.join("sounds")],
            fetched: RefCell::new(HashSet::new()),
        }
    }

    /// Candidate paths for `name`, whether or not they exist
    pub fn fetch_sounds(&self, name: &str) -> Vec<PathBuf> {
        if !self.fetched.borrow_mut().insert(name.to_string()) {
            return Vec::new();
        }

        let mut paths = Vec::new();
        for base in &self.search_dirs {
            paths.push(base.join(format!("{}.ogg", name)));
            for i in 0..SOUND_VARIANTS {
                paths.push(base.join(format!("{}.{}.ogg", name, i)));
            }
        }
        paths
    }
}

#[cfg(feature = "sound")]
pub use mixer::MixerSoundManager;

#[cfg(feature = "sound")]
mod mixer {
    //! SDL2_mixer backend

    use super::{SimpleSoundSpec, SoundFetcher, SoundManager};
    use log::{info, warn};
    use rand::seq::IndexedRandom;
    use sdl2::mixer::{self, Channel, Chunk, Sdl2MixerContext, AUDIO_S16LSB, DEFAULT_CHANNELS};
    use std::cell::RefCell;
    use std::collections::HashMap;

    pub struct MixerSoundManager {
        _context: Sdl2MixerContext,
        fetcher: SoundFetcher,
        /// Loaded variants per sound name
        sounds: RefCell<HashMap<String, Vec<Chunk>>>,
    }

    impl MixerSoundManager {
        pub fn new(fetcher: SoundFetcher) -> Result<Self, String> {
            mixer::open_audio(44_100, AUDIO_S16LSB, DEFAULT_CHANNELS, 1_024)?;
            let context = mixer::init(mixer::InitFlag::OGG)?;
            mixer::allocate_channels(16);
            info!("Audio initialised (SDL2_mixer)");
            Ok(MixerSoundManager {
                _context: context,
                fetcher,
                sounds: RefCell::new(HashMap::new()),
            })
        }

        fn load(&self, name: &str) {
            let mut sounds = self.sounds.borrow_mut();
            if sounds.contains_key(name) {
                return;
            }
            let chunks: Vec<Chunk> = self
                .fetcher
                .fetch_sounds(name)
                .into_iter()
                .filter(|p| p.exists())
                .filter_map(|p| match Chunk::from_file(&p) {
                    Ok(chunk) => Some(chunk),
                    Err(e) => {
                        warn!("Failed to load sound {}: {}", p.display(), e);
                        None
                    }
                })
                .collect();
            sounds.insert(name.to_string(), chunks);
        }
    }

    impl SoundManager for MixerSoundManager {
        fn play_sound(&self, spec: &SimpleSoundSpec, looped: bool) -> i32 {
            self.load(&spec.name);
            let sounds = self.sounds.borrow();
            let Some(chunk) = sounds
                .get(&spec.name)
                .and_then(|chunks| chunks.choose(&mut rand::rng()))
            else {
                warn!("Sound \"{}\" not found", spec.name);
                return -1;
            };

            let loops = if looped { -1 } else { 0 };
            match Channel::all().play(chunk, loops) {
                Ok(channel) => {
                    channel.set_volume((spec.gain.clamp(0.0, 1.0) * mixer::MAX_VOLUME as f32) as i32);
                    channel.0
                }
                Err(e) => {
                    warn!("Failed to play \"{}\": {}", spec.name, e);
                    -1
                }
            }
        }

        fn stop_sound(&self, handle: i32) {
            if handle >= 0 {
                Channel(handle).halt();
            }
        }
    }

    impl Drop for MixerSoundManager {
        fn drop(&mut self) {
            Channel::all().halt();
            self.sounds.borrow_mut().clear();
            mixer::close_audio();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingSound {
        played: Rc<Cell<u32>>,
    }

    impl SoundManager for CountingSound {
        fn play_sound(&self, _spec: &SimpleSoundSpec, _looped: bool) -> i32 {
            self.played.set(self.played.get() + 1);
            self.played.get() as i32
        }

        fn stop_sound(&self, _handle: i32) {}
    }

    #[test]
    fn test_dummy_plays_nothing() {
        let slot = SoundSlot::new(None, &DUMMY_SOUND_MANAGER);
        assert!(!slot.is_owned());
        assert_eq!(slot.get().play_sound(&SimpleSoundSpec::new("click"), false), -1);
        slot.get().stop_sound(-1);
    }

    #[test]
    fn test_owned_manager_is_used() {
        let played = Rc::new(Cell::new(0));
        let slot = SoundSlot::new(
            Some(Box::new(CountingSound { played: Rc::clone(&played) })),
            &DUMMY_SOUND_MANAGER,
        );
        assert!(slot.is_owned());
        assert_eq!(slot.get().play_sound(&SimpleSoundSpec::new("theme"), true), 1);
        assert_eq!(played.get(), 1);
    }

    #[test]
    fn test_fetcher_candidates() {
        let fetcher = SoundFetcher::new(Path::new("/share"), Path::new("/user"));
        let paths = fetcher.fetch_sounds("main_menu");

        assert_eq!(paths.len(), 22);
        assert_eq!(paths[0], PathBuf::from("/share/sounds/main_menu.ogg"));
        assert_eq!(paths[1], PathBuf::from("/share/sounds/main_menu.0.ogg"));
        assert_eq!(paths[11], PathBuf::from("/user/sounds/main_menu.ogg"));
        assert_eq!(paths[21], PathBuf::from("/user/sounds/main_menu.9.ogg"));
    }

    #[test]
    fn test_fetcher_resolves_each_name_once() {
        let fetcher = SoundFetcher::new(Path::new("/share"), Path::new("/user"));
        assert!(!fetcher.fetch_sounds("click").is_empty());
        assert!(fetcher.fetch_sounds("click").is_empty());
        assert!(!fetcher.fetch_sounds("theme").is_empty());
    }
}
