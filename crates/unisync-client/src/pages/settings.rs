use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use unisync_shared::constants::SETTINGS_STORAGE_KEY;
use unisync_store::Database;

use crate::error::ClientError;

pub const SPEECH_SPEED_STEP: u8 = 10;
pub const TEXT_SIZE_STEP: u8 = 25;
const SLIDER_MAX: u8 = 100;

pub const PRIVACY_NOTE: &str = "UniSync accesses your academic data only when you ask a question. \
We don't store your emails, assignments, or calendar events.";

/// Clamp `value` to 0..=100 and snap it to the nearest multiple of `step`.
pub fn snap(value: i64, step: u8) -> u8 {
    let clamped = value.clamp(0, SLIDER_MAX as i64);
    let step = step.max(1) as i64;
    let snapped = ((clamped + step / 2) / step) * step;
    snapped.min(SLIDER_MAX as i64) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub dark_mode: bool,
    pub voice_input: bool,
    pub speech_speed: u8,
    pub captions: bool,
    pub text_size: u8,
    pub high_contrast: bool,
    pub assignment_reminders: bool,
    pub calendar_alerts: bool,
    pub weekly_digest: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            voice_input: true,
            speech_speed: 50,
            captions: false,
            text_size: 50,
            high_contrast: false,
            assignment_reminders: true,
            calendar_alerts: true,
            weekly_digest: false,
        }
    }
}

/// A single editable setting, addressed by name from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    DarkMode,
    VoiceInput,
    SpeechSpeed,
    Captions,
    TextSize,
    HighContrast,
    AssignmentReminders,
    CalendarAlerts,
    WeeklyDigest,
}

impl FromStr for SettingKey {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dark-mode" => SettingKey::DarkMode,
            "voice-input" => SettingKey::VoiceInput,
            "speech-speed" => SettingKey::SpeechSpeed,
            "captions" => SettingKey::Captions,
            "text-size" => SettingKey::TextSize,
            "high-contrast" => SettingKey::HighContrast,
            "assignment-reminders" => SettingKey::AssignmentReminders,
            "calendar-alerts" => SettingKey::CalendarAlerts,
            "weekly-digest" => SettingKey::WeeklyDigest,
            other => return Err(ClientError::Config(format!("unknown setting: {other}"))),
        })
    }
}

fn parse_switch(value: &str) -> Result<bool, ClientError> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(ClientError::Config(format!("expected on/off, got {other}"))),
    }
}

fn parse_slider(value: &str, step: u8) -> Result<u8, ClientError> {
    value
        .parse::<i64>()
        .map(|v| snap(v, step))
        .map_err(|_| ClientError::Config(format!("expected a number, got {value}")))
}

impl AppSettings {
    /// Stored settings, or the defaults when nothing was saved yet.
    pub fn load(db: &Database) -> Result<Self, ClientError> {
        let mut settings: AppSettings = db.get_json(SETTINGS_STORAGE_KEY)?.unwrap_or_default();
        settings.speech_speed = snap(settings.speech_speed.into(), SPEECH_SPEED_STEP);
        settings.text_size = snap(settings.text_size.into(), TEXT_SIZE_STEP);
        Ok(settings)
    }

    pub fn save(&self, db: &Database) -> Result<(), ClientError> {
        db.set_json(SETTINGS_STORAGE_KEY, self)?;
        info!("Settings updated");
        Ok(())
    }

    pub fn set_speech_speed(&mut self, value: i64) {
        self.speech_speed = snap(value, SPEECH_SPEED_STEP);
    }

    pub fn set_text_size(&mut self, value: i64) {
        self.text_size = snap(value, TEXT_SIZE_STEP);
    }

    /// Apply `value` to `key`: switches take on/off, sliders take a number.
    pub fn apply(&mut self, key: SettingKey, value: &str) -> Result<(), ClientError> {
        match key {
            SettingKey::DarkMode => self.dark_mode = parse_switch(value)?,
            SettingKey::VoiceInput => self.voice_input = parse_switch(value)?,
            SettingKey::SpeechSpeed => {
                self.speech_speed = parse_slider(value, SPEECH_SPEED_STEP)?
            }
            SettingKey::Captions => self.captions = parse_switch(value)?,
            SettingKey::TextSize => self.text_size = parse_slider(value, TEXT_SIZE_STEP)?,
            SettingKey::HighContrast => self.high_contrast = parse_switch(value)?,
            SettingKey::AssignmentReminders => self.assignment_reminders = parse_switch(value)?,
            SettingKey::CalendarAlerts => self.calendar_alerts = parse_switch(value)?,
            SettingKey::WeeklyDigest => self.weekly_digest = parse_switch(value)?,
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let on = |b: bool| if b { "on" } else { "off" };
        let mut out = String::from("Settings\n");
        let _ = writeln!(out, "\nAppearance");
        let _ = writeln!(out, "  dark-mode             {}", on(self.dark_mode));
        let _ = writeln!(out, "\nVoice");
        let _ = writeln!(out, "  voice-input           {}", on(self.voice_input));
        let _ = writeln!(out, "  speech-speed          {}", self.speech_speed);
        let _ = writeln!(out, "\nAccessibility");
        let _ = writeln!(out, "  captions              {}", on(self.captions));
        let _ = writeln!(out, "  text-size             {}", self.text_size);
        let _ = writeln!(out, "  high-contrast         {}", on(self.high_contrast));
        let _ = writeln!(out, "\nPrivacy & Data\n  {PRIVACY_NOTE}");
        let _ = writeln!(out, "\nNotifications");
        let _ = writeln!(
            out,
            "  assignment-reminders  {}",
            on(self.assignment_reminders)
        );
        let _ = writeln!(out, "  calendar-alerts       {}", on(self.calendar_alerts));
        let _ = writeln!(out, "  weekly-digest         {}", on(self.weekly_digest));
        out
    }
}
