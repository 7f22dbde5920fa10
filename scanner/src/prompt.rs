use std::io::{self, BufRead, Write};
use wifiidcore::prelude::KnownNetworkPrompt;

/// Accepts `#rgb` and `#rrggbb` color codes.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Asks on the terminal whether a newly connected access point should be remembered.
pub struct StdinPrompt;

impl StdinPrompt {
    fn ask(question: &str) -> Option<String> {
        print!("{}", question);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        Some(line.trim().to_string())
    }
}

impl KnownNetworkPrompt for StdinPrompt {
    fn confirm(&self, ssid: &str, bssid: &str) -> Option<String> {
        let answer = Self::ask(&format!(
            "You just connected to '{}' ({}). Assign a color to this WiFi? [y/N] ",
            ssid, bssid
        ))?;
        if !answer.eq_ignore_ascii_case("y") && !answer.eq_ignore_ascii_case("yes") {
            return None;
        }

        loop {
            let color = Self::ask(&format!("Pick a color for '{}' (e.g. #33aa55, empty to skip): ", ssid))?;
            if color.is_empty() {
                return None;
            }
            if is_hex_color(&color) {
                return Some(color);
            }
            println!("'{}' is not a hex color code.", color);
        }
    }
}

/// Tags every new access point with the same color without asking.
pub struct FixedColorPrompt {
    color: String,
}

impl FixedColorPrompt {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
        }
    }
}

impl KnownNetworkPrompt for FixedColorPrompt {
    fn confirm(&self, _ssid: &str, _bssid: &str) -> Option<String> {
        Some(self.color.clone())
    }
}

pub struct DeclinePrompt;

impl KnownNetworkPrompt for DeclinePrompt {
    fn confirm(&self, _ssid: &str, _bssid: &str) -> Option<String> {
        None
    }
}
