//! Emergency alerts.
//!
//! An alert composes two messages from the selected template: the officer
//! message carries the guardian's number, the guardian message omits it.
//! The guardian is texted first, then every officer of the registration area,
//! and finally the guardian is called directly.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sathi_core::config::{OfficerConfig, ProfileConfig};
use sathi_core::phone;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatcher::{Dispatcher, SendOptions};
use crate::traits::UserNotifier;

static GUARDIAN_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Guardian:\s*\{parentMobile\},?\s*").expect("invalid regex"));

/// Errors that stop an alert before any message is sent.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Name or guardian number missing from the profile.
    #[error("User name or parent contact missing")]
    MissingProfile,

    /// Unknown alert type.
    #[error("Invalid emergency type: {0}")]
    UnknownKind(String),

    /// Current location could not be determined.
    #[error("Location unavailable: {0}")]
    Location(String),

    /// The call could not be placed.
    #[error("Call failed: {0}")]
    Call(String),
}

/// Emergency alert types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Pregnancy,
    Harassment,
    Accident,
    Other,
}

impl AlertKind {
    /// Every alert type, in display order.
    pub const ALL: [AlertKind; 4] = [
        AlertKind::Pregnancy,
        AlertKind::Harassment,
        AlertKind::Accident,
        AlertKind::Other,
    ];

    /// English label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pregnancy => "Pregnancy",
            Self::Harassment => "Eve-Teasing",
            Self::Accident => "Accident",
            Self::Other => "Other",
        }
    }

    /// Bengali label.
    pub fn bengali_label(&self) -> &'static str {
        match self {
            Self::Pregnancy => "গর্ভাবস্থা",
            Self::Harassment => "নারী উত্ত্যক্তকরণ",
            Self::Accident => "দুর্ঘটনা",
            Self::Other => "অন্যান্য",
        }
    }

    /// Message template with `{name}`, `{parentMobile}` and `{locationUrl}`.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Pregnancy => "Hurry! {name}, facing pregnancy issue. Please reach out. Guardian: {parentMobile}, Location: {locationUrl} - Sathi App",
            Self::Harassment => "Urgent! {name} is experiencing eve-teasing. Guardian: {parentMobile}, Location: {locationUrl} - Sathi App",
            Self::Accident => "Emergency! {name} met with an accident. Immediate help needed. Guardian: {parentMobile}, Location: {locationUrl} - Sathi App",
            Self::Other => "Help! {name} has an emergency. Guardian: {parentMobile}, Location: {locationUrl} - Sathi App",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AlertKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pregnancy" => Ok(Self::Pregnancy),
            "harassment" | "eve-teasing" | "eveteasing" | "eve_teasing" => Ok(Self::Harassment),
            "accident" => Ok(Self::Accident),
            "other" => Ok(Self::Other),
            _ => Err(AlertError::UnknownKind(s.to_string())),
        }
    }
}

/// A device position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Map link for a location.
pub fn location_url(location: &Location) -> String {
    format!(
        "https://maps.google.com/?q={},{}",
        location.latitude, location.longitude
    )
}

/// Message sent to officers.
pub fn officer_message(kind: AlertKind, profile: &ProfileConfig, location_url: &str) -> String {
    kind.template()
        .replace("{name}", &profile.name)
        .replace("{parentMobile}", &profile.parent_mobile)
        .replace("{locationUrl}", location_url)
}

/// Message sent to the guardian, without the guardian's own number.
pub fn guardian_message(kind: AlertKind, profile: &ProfileConfig, location_url: &str) -> String {
    GUARDIAN_FRAGMENT
        .replace_all(kind.template(), "")
        .replace("{name}", &profile.name)
        .replace("{locationUrl}", location_url)
}

/// Officer numbers to text, skipping blanks and the guardian.
pub fn officer_numbers(officers: &[OfficerConfig], guardian: &str) -> Vec<String> {
    officers
        .iter()
        .map(|o| o.officer_number.trim())
        .filter(|n| !n.is_empty() && !phone::same_number(n, guardian))
        .map(str::to_string)
        .collect()
}

/// Source of the current device location.
#[async_trait]
pub trait Locator: Send + Sync {
    async fn current_location(&self) -> Result<Location, AlertError>;
}

/// Places direct phone calls.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Return whether call permission is granted, prompting at most once.
    async fn ensure_call_permission(&self) -> bool;

    /// Call `number`.
    async fn dial(&self, number: &str) -> Result<(), AlertError>;
}

/// Result of a triggered alert.
#[derive(Debug, Clone)]
pub struct AlertReport {
    pub kind: AlertKind,
    pub location_url: String,
    pub guardian_message: String,
    pub officer_message: String,
    /// Whether the guardian SMS was delivered.
    pub guardian_sent: bool,
    /// Officer numbers with their delivery result.
    pub officers: Vec<(String, bool)>,
    /// Whether the guardian call was placed.
    pub call_placed: bool,
}

/// Triggers emergency alerts for one registered user.
pub struct EmergencyAlert {
    dispatcher: Arc<Dispatcher>,
    locator: Arc<dyn Locator>,
    dialer: Arc<dyn Dialer>,
    notifier: Arc<dyn UserNotifier>,
    profile: ProfileConfig,
    officers: Vec<OfficerConfig>,
    call_delay: Duration,
}

impl EmergencyAlert {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        locator: Arc<dyn Locator>,
        dialer: Arc<dyn Dialer>,
        profile: ProfileConfig,
        officers: Vec<OfficerConfig>,
    ) -> Self {
        let notifier = dispatcher.notifier();
        Self {
            dispatcher,
            locator,
            dialer,
            notifier,
            profile,
            officers,
            call_delay: Duration::from_secs(1),
        }
    }

    /// Set the pause between the last SMS and the guardian call.
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Text the guardian and officers, then call the guardian.
    pub async fn trigger(&self, kind: AlertKind) -> Result<AlertReport, AlertError> {
        if self.profile.name.trim().is_empty() || self.profile.parent_mobile.trim().is_empty() {
            self.notifier
                .notify("Missing Info", "User name or parent contact missing");
            return Err(AlertError::MissingProfile);
        }

        let location = self.locator.current_location().await?;
        let url = location_url(&location);
        let officer_text = officer_message(kind, &self.profile, &url);
        let guardian_text = guardian_message(kind, &self.profile, &url);
        info!(kind = %kind, "Triggering emergency alert");

        let guardian = self.profile.parent_mobile.as_str();
        let guardian_sent = self
            .dispatcher
            .send_silent_sms(guardian, &guardian_text, SendOptions::default())
            .await;

        let mut officers = Vec::new();
        for number in officer_numbers(&self.officers, guardian) {
            let sent = self
                .dispatcher
                .send_silent_sms(number.as_str(), &officer_text, SendOptions::default())
                .await;
            officers.push((number, sent));
        }

        tokio::time::sleep(self.call_delay).await;
        let call_placed = self.call_guardian(guardian).await;

        Ok(AlertReport {
            kind,
            location_url: url,
            guardian_message: guardian_text,
            officer_message: officer_text,
            guardian_sent,
            officers,
            call_placed,
        })
    }

    async fn call_guardian(&self, guardian: &str) -> bool {
        if !self.dialer.ensure_call_permission().await {
            warn!("CALL_PHONE permission denied");
            return false;
        }
        match self.dialer.dial(guardian).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Error placing call: {}", e);
                false
            }
        }
    }
}
