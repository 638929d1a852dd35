//! Persistent game options and their JSON store.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::rules::{Ruleset, builtin_rulesets};

/// Default options file name, relative to the working directory.
pub const DEFAULT_OPTIONS_FILE: &str = "default.json";

/// Number of players when nothing else is configured.
pub const DEFAULT_PLAYER_COUNT: usize = 2;

/// Palette name used when nothing else is configured.
pub const DEFAULT_PALETTE: &str = "warhammer";

/// Clock display format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
pub enum TimeFormat {
    /// Twelve-hour clock with AM/PM suffix.
    #[default]
    #[serde(rename = "AMPM")]
    #[strum(serialize = "AMPM")]
    AmPm,
    /// Twenty-four-hour clock.
    #[serde(rename = "24-hour", alias = "24h")]
    #[strum(serialize = "24-hour")]
    TwentyFourHour,
}

impl TimeFormat {
    /// Returns the `chrono` format string for this clock style.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::AmPm => "%I:%M:%S %p",
            Self::TwentyFourHour => "%H:%M:%S",
        }
    }

    /// Switches between the two formats.
    pub fn toggle(self) -> Self {
        match self {
            Self::AmPm => Self::TwentyFourHour,
            Self::TwentyFourHour => Self::AmPm,
        }
    }
}

/// User-configurable options, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[setters(prefix = "with_")]
pub struct Options {
    /// Index of the selected ruleset in `rules`.
    #[serde(rename = "default")]
    default_ruleset: usize,
    /// Available rulesets.
    rules: Vec<Ruleset>,
    /// Number of players at the table.
    player_count: usize,
    /// Player names by seat.
    player_names: Vec<String>,
    /// Name of the colour palette.
    color_palette: String,
    /// Clock display format.
    time_format: TimeFormat,
    /// Whether handler entries are appended to the CSV trail.
    logging_enabled: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_ruleset: 0,
            rules: builtin_rulesets(),
            player_count: DEFAULT_PLAYER_COUNT,
            player_names: default_player_names(DEFAULT_PLAYER_COUNT),
            color_palette: DEFAULT_PALETTE.to_string(),
            time_format: TimeFormat::default(),
            logging_enabled: true,
        }
    }
}

/// Returns `"Player 1"`, `"Player 2"`, ... for `count` seats.
#[instrument]
pub fn default_player_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Player {}", i)).collect()
}

impl Options {
    /// Returns the selected ruleset, if the index is in range.
    pub fn active_ruleset(&self) -> Option<&Ruleset> {
        self.rules.get(self.default_ruleset)
    }

    /// Returns the name for a seat, falling back to the default name.
    pub fn player_name(&self, seat: usize) -> String {
        self.player_names
            .get(seat)
            .filter(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Player {}", seat + 1))
    }

    /// Repairs values that would break the game state invariants.
    ///
    /// Empty rule tables are replaced with the built-in table, an
    /// out-of-range ruleset index becomes 0, a zero player count becomes
    /// the default, and the name list is padded to the player count.
    #[instrument(skip(self))]
    pub fn normalized(mut self) -> Self {
        if self.rules.is_empty() {
            warn!("Options contain no rulesets, using built-in table");
            self.rules = builtin_rulesets();
        }
        if self.default_ruleset >= self.rules.len() {
            warn!(
                index = self.default_ruleset,
                available = self.rules.len(),
                "Selected ruleset out of range, using first ruleset"
            );
            self.default_ruleset = 0;
        }
        if self.player_count == 0 {
            warn!("Player count is zero, using default");
            self.player_count = DEFAULT_PLAYER_COUNT;
        }
        self.pad_player_names();
        self
    }

    /// Pads the name list with default names up to the player count.
    pub(crate) fn pad_player_names(&mut self) {
        while self.player_names.len() < self.player_count {
            let seat = self.player_names.len();
            self.player_names.push(format!("Player {}", seat + 1));
        }
    }

    pub(crate) fn set_default_ruleset(&mut self, index: usize) {
        self.default_ruleset = index;
    }

    pub(crate) fn set_player_count(&mut self, count: usize) {
        self.player_count = count;
    }

    pub(crate) fn player_names_mut(&mut self) -> &mut Vec<String> {
        &mut self.player_names
    }

    pub(crate) fn set_color_palette(&mut self, name: String) {
        self.color_palette = name;
    }

    pub(crate) fn set_time_format(&mut self, format: TimeFormat) {
        self.time_format = format;
    }

    pub(crate) fn set_logging_enabled(&mut self, value: bool) {
        self.logging_enabled = value;
    }

    pub(crate) fn set_one_turn_for_all_players(&mut self, value: bool) {
        if let Some(rule) = self.rules.get_mut(self.default_ruleset) {
            *rule = rule.clone().with_one_turn_for_all_players(value);
        }
    }
}

/// Options store error.
#[derive(Debug, Clone, Display, Error)]
#[display("Options error: {} at {}:{}", message, file, line)]
pub struct OptionsError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OptionsError {
    /// Creates a new options error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Loads and saves [`Options`] as JSON.
///
/// Loading never fails; every failure falls back to the default file and
/// then to built-in defaults.
#[derive(Debug, Clone, Getters)]
pub struct OptionsStore {
    /// File the store reads first and saves to.
    path: PathBuf,
    /// Fallback file used when `path` cannot be loaded.
    default_path: PathBuf,
}

impl OptionsStore {
    /// Creates a store for `path` that falls back to [`DEFAULT_OPTIONS_FILE`].
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            default_path: PathBuf::from(DEFAULT_OPTIONS_FILE),
        }
    }

    /// Overrides the fallback file.
    pub fn with_default_path(mut self, default_path: impl AsRef<Path>) -> Self {
        self.default_path = default_path.as_ref().to_path_buf();
        self
    }

    /// Loads options, falling back as described on [`OptionsStore`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Options {
        let options = match read_options(&self.path) {
            Ok(Some(options)) => options,
            Ok(None) if self.path == self.default_path => {
                info!("Default options file not found, creating it");
                let defaults = Options::default();
                if let Err(e) = write_options(&self.default_path, &defaults) {
                    warn!(error = %e, "Could not create default options file");
                }
                defaults
            }
            Ok(None) => {
                warn!("Options file not found, using default options file");
                Self::new(&self.default_path)
                    .with_default_path(&self.default_path)
                    .load()
            }
            Err(e) if self.path != self.default_path => {
                warn!(error = %e, "Falling back to default options file");
                Self::new(&self.default_path)
                    .with_default_path(&self.default_path)
                    .load()
            }
            Err(e) => {
                warn!(error = %e, "Falling back to built-in options");
                Options::default()
            }
        };
        options.normalized()
    }

    /// Saves options to the store's path.
    #[instrument(skip(self, options), fields(path = %self.path.display()))]
    pub fn save(&self, options: &Options) -> Result<(), OptionsError> {
        write_options(&self.path, options)?;
        debug!("Options saved");
        Ok(())
    }
}

/// Reads an options file; `Ok(None)` means the file does not exist.
#[instrument(skip_all, fields(path = %path.display()))]
fn read_options(path: &Path) -> Result<Option<Options>, OptionsError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(OptionsError::new(format!(
                "Failed to read options file: {}",
                e
            )));
        }
    };
    let options = serde_json::from_str(&content)
        .map_err(|e| OptionsError::new(format!("Failed to parse options file: {}", e)))?;
    Ok(Some(options))
}

#[instrument(skip_all, fields(path = %path.display()))]
fn write_options(path: &Path, options: &Options) -> Result<(), OptionsError> {
    let json = serde_json::to_string_pretty(options)
        .map_err(|e| OptionsError::new(format!("Failed to serialize options: {}", e)))?;
    std::fs::write(path, json)
        .map_err(|e| OptionsError::new(format!("Failed to write options file: {}", e)))?;
    Ok(())
}
