use keybot_types::models::ExtractedKey;

/// Command token stripped from the front of a set-key message.
pub const SET_KEY_COMMAND: &str = "/set_key";

/// Markers that start key material, in priority order. The first marker in
/// this list that occurs anywhere in the message wins, regardless of where
/// other markers sit in the text.
pub const KEY_MARKERS: [&str; 3] = ["-----BEGIN", "----- BEGIN", "ssh-rsa"];

/// Pull the key type and key material out of a set-key message.
///
/// * A leading `/set_key ` token is dropped.
/// * Every whitespace-separated `type=<value>` token (name matched
///   case-insensitively) sets the key type; the last one wins.
/// * Material runs from the highest-priority marker to the end of the
///   message. Keys must terminate the message; trailing text is kept as
///   part of the material, and so are any lower-priority markers.
///
/// Missing markers give empty material, which callers must treat as a
/// failed extraction.
pub fn extract_key(message: &str, user_id: i64) -> ExtractedKey {
    let text = strip_command(message);

    ExtractedKey {
        key_type: key_type(text).to_string(),
        material: key_material(text).to_string(),
        user_id,
    }
}

fn strip_command(message: &str) -> &str {
    let trimmed = message.trim_start();
    trimmed
        .strip_prefix(SET_KEY_COMMAND)
        .and_then(|rest| rest.strip_prefix(' '))
        .unwrap_or(message)
}

fn key_type(text: &str) -> &str {
    text.split_whitespace()
        .filter_map(|token| token.split_once('='))
        .filter(|(name, _)| name.eq_ignore_ascii_case("type"))
        .map(|(_, value)| value)
        .last()
        .unwrap_or_default()
}

fn key_material(text: &str) -> &str {
    KEY_MARKERS
        .iter()
        .find_map(|marker| text.find(marker))
        .map(|start| &text[start..])
        .unwrap_or_default()
}
