//! Remote key construction.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random token in a key.
const TOKEN_LEN: usize = 10;

/// Longest file name suffix still treated as an extension.
const MAX_EXTENSION_LEN: usize = 5;

/// Builds `{owner_id}/{timestamp_millis}-{random_token}.{extension}`.
pub fn build_remote_key(owner_id: &str, file_name: &str, content_type: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!(
        "{owner}/{timestamp}-{token}.{extension}",
        owner = owner_id.trim_matches('/'),
        timestamp = Utc::now().timestamp_millis(),
        token = token,
        extension = extension_for(file_name, content_type),
    )
}

/// Picks the extension of the original selection.
///
/// Uses the file name suffix (case preserved) when it looks like one, then
/// the lowercased MIME subtype, then `bin`.
pub fn extension_for(file_name: &str, content_type: &str) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });
    if let Some(ext) = from_name {
        return ext.to_string();
    }

    content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.split(['+', ';']).next().unwrap_or(subtype).trim())
        .filter(|subtype| !subtype.is_empty() && subtype.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|subtype| subtype.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}
