use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentLevel {
    All,
    Necessary,
}

impl ConsentLevel {
    pub fn parse(raw: &str) -> Option<ConsentLevel> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(ConsentLevel::All),
            "necessary" => Some(ConsentLevel::Necessary),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsentLevel::All => "all",
            ConsentLevel::Necessary => "necessary",
        }
    }
}

/// Per-session settings, read once when the session starts and passed down
/// explicitly.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionConfig {
    consent: Option<ConsentLevel>,
}

impl SessionConfig {
    pub fn new(consent: Option<ConsentLevel>) -> Self {
        Self { consent }
    }

    pub fn consent(&self) -> Option<ConsentLevel> {
        self.consent
    }

    // No decision recorded yet.
    pub fn banner_visible(&self) -> bool {
        self.consent.is_none()
    }

    pub fn analytics_enabled(&self) -> bool {
        self.consent == Some(ConsentLevel::All)
    }
}
