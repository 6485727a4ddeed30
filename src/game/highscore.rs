//! High score persistence.
//!
//! A single best score is saved to a local JSON file in the user's data
//! directory as `{"high_score": n}`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::state::{GameEvent, Simulation, SimulationSystems};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HighScore>();
    app.init_resource::<HighScoreStore>();
    app.register_type::<HighScore>();

    // Load the high score on startup
    app.add_systems(Startup, load_high_score);
    app.add_systems(Update, record_high_score.after(SimulationSystems));
}

/// Resource holding the best score seen so far.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct HighScore {
    pub high_score: u32,
}

impl HighScore {
    /// Keep `score` if it beats the current best.
    /// Returns true if the high score changed.
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    /// Load the high score from `path`, starting fresh if it is missing or
    /// unreadable.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No high score file found at {:?}, starting fresh", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(high_score) => {
                    info!("Loaded high score from {:?}", path);
                    high_score
                }
                Err(e) => {
                    warn!("Failed to parse high score: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read high score file: {}", e);
                Self::default()
            }
        }
    }

    /// Save the high score to `path`.
    pub fn save_to(&self, path: &Path) {
        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("Failed to create high score directory: {}", e);
            return;
        }

        match serde_json::to_string(self) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => info!("Saved high score to {:?}", path),
                Err(e) => warn!("Failed to write high score: {}", e),
            },
            Err(e) => warn!("Failed to serialize high score: {}", e),
        }
    }
}

/// Where the high score file lives.
///
/// Defaults to the user's data directory. Insert a store before adding the
/// plugin to use another file.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    path: Option<PathBuf>,
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self {
            path: dirs::data_local_dir().map(|dir| dir.join("bubble-grid").join("high_score.json")),
        }
    }
}

impl HighScoreStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> HighScore {
        let Some(path) = self.path() else {
            warn!("Could not determine data directory for high score");
            return HighScore::default();
        };
        HighScore::load_from(path)
    }

    pub fn save(&self, high_score: &HighScore) {
        let Some(path) = self.path() else {
            warn!("Could not determine data directory for saving high score");
            return;
        };
        high_score.save_to(path);
    }
}

/// Load the high score on startup.
fn load_high_score(store: Res<HighScoreStore>, mut high_score: ResMut<HighScore>) {
    *high_score = store.load();
}

/// Save a new high score when a game ends.
fn record_high_score(
    mut events: MessageReader<GameEvent>,
    simulation: Res<Simulation>,
    store: Res<HighScoreStore>,
    mut high_score: ResMut<HighScore>,
) {
    for event in events.read() {
        if event.ends_game() && high_score.record(simulation.score().score) {
            info!("New high score: {}", high_score.high_score);
            store.save(&high_score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("bubble-grid-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_record_keeps_maximum() {
        let mut high = HighScore::default();
        assert!(!high.record(0));
        assert!(high.record(120));
        assert!(!high.record(80));
        assert!(!high.record(120));
        assert_eq!(high.high_score, 120);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip.json");
        let high = HighScore { high_score: 4200 };
        high.save_to(&path);

        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"high_score":4200}"#);
        assert_eq!(HighScore::load_from(&path), high);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_store_reads_and_writes_its_path() {
        let path = temp_path("store.json");
        let store = HighScoreStore::at(&path);
        assert_eq!(store.path(), Some(path.as_path()));

        store.save(&HighScore { high_score: 75 });
        assert_eq!(store.load().high_score, 75);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_or_corrupt_file_starts_fresh() {
        assert_eq!(HighScore::load_from(&temp_path("missing.json")), HighScore::default());

        let path = temp_path("corrupt.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        assert_eq!(HighScore::load_from(&path), HighScore::default());

        let _ = fs::remove_file(&path);
    }
}
