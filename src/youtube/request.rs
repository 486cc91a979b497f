//! Request construction for the three polling modes.

use http::header::{ACCEPT, HeaderValue};
use url::Url;

use crate::config::{ConfigError, ResolvedOptions, field};
use crate::transport::HttpRequest;

use super::Mode;

/// Channel details endpoint.
pub const CHANNELS_ENDPOINT: &str = "https://youtube.googleapis.com/youtube/v3/channels";

/// Playlist items endpoint.
pub const PLAYLIST_ITEMS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/playlistItems";

/// Search endpoint.
pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";

/// Builds the read-only request for the resolved options.
///
/// | Mode | Endpoint | Query |
/// |---|---|---|
/// | `check_channel` | [`CHANNELS_ENDPOINT`] | `part=snippet,contentDetails,statistics`, `id`, `key` |
/// | `check_playlist` | [`PLAYLIST_ITEMS_ENDPOINT`] | `key`, `playlistId`, `part=snippet,contentDetails,status`, `maxResults` |
/// | `check_videos` | [`SEARCH_ENDPOINT`] | `key`, `channelId`, `part=snippet,id`, `order=date`, `maxResults` |
///
/// Every request asks for `Accept: application/json`. Query values are
/// percent-encoded.
///
/// # Errors
///
/// Returns [`ConfigError::MissingForMode`] if the API key or the id the
/// mode needs is empty, instead of producing a malformed request.
pub fn build_request(options: &ResolvedOptions) -> Result<HttpRequest, ConfigError> {
    let mode = options.mode;
    let key = required(field::API_KEY, &options.api_key, mode)?;
    let limit = options.limit.to_string();

    let (endpoint, params) = match mode {
        Mode::CheckChannel => {
            let channel_id = required(field::CHANNEL_ID, &options.channel_id, mode)?;
            (
                CHANNELS_ENDPOINT,
                vec![
                    ("part", "snippet,contentDetails,statistics"),
                    ("id", channel_id),
                    ("key", key),
                ],
            )
        }
        Mode::CheckPlaylist => {
            let playlist_id = required(field::PLAYLIST_ID, &options.playlist_id, mode)?;
            (
                PLAYLIST_ITEMS_ENDPOINT,
                vec![
                    ("key", key),
                    ("playlistId", playlist_id),
                    ("part", "snippet,contentDetails,status"),
                    ("maxResults", limit.as_str()),
                ],
            )
        }
        Mode::CheckVideos => {
            let channel_id = required(field::CHANNEL_ID, &options.channel_id, mode)?;
            (
                SEARCH_ENDPOINT,
                vec![
                    ("key", key),
                    ("channelId", channel_id),
                    ("part", "snippet,id"),
                    ("order", "date"),
                    ("maxResults", limit.as_str()),
                ],
            )
        }
    };

    let url = Url::parse_with_params(endpoint, &params).map_err(|e| ConfigError::InvalidUrl {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    Ok(HttpRequest::get(url).with_header(ACCEPT, HeaderValue::from_static("application/json")))
}

fn required<'a>(
    field: &'static str,
    value: &'a str,
    mode: Mode,
) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingForMode { field, mode });
    }
    Ok(value)
}
