//! Command-line surface

use clap::Parser;

/// Push-to-talk voice assistant frontend for the device board.
#[derive(Parser, Debug)]
#[command(name = "assistant-device", version, about)]
pub struct Args {
    /// BCP-47 language code for the exchange.
    #[arg(long, default_value_t = locale_language())]
    pub language: String,

    /// Playback volume percentage, 0 to 100.
    #[arg(long, default_value_t = 50, value_parser = parse_volume)]
    pub volume: u8,
}

/// Parse and range-check a volume percentage.
///
/// Both non-numeric input and values outside [0, 100] are fatal
/// before any hardware is touched.
pub fn parse_volume(raw: &str) -> Result<u8, String> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not an integer"))?;
    if !(0..=100).contains(&value) {
        return Err(format!("volume must be between 0 and 100, got {value}"));
    }
    Ok(value as u8)
}

/// Language of the system locale, in BCP-47 form.
///
/// Reads the usual POSIX variables in precedence order; `en-US` when
/// nothing usable is set.
pub fn locale_language() -> String {
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            if let Some(language) = bcp47_from_posix(&value) {
                return language;
            }
        }
    }
    "en-US".into()
}

/// Extract `ll-CC` from a POSIX locale string like `en_US.UTF-8`.
fn bcp47_from_posix(raw: &str) -> Option<String> {
    // language[_territory][.codeset][@modifier]
    let tag = raw.split(['.', '@']).next().unwrap_or(raw);
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}
