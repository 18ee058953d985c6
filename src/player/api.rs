//! Media source and playlist providers backed by the REST API.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::player::config::ApiConfig;
use crate::player::errors::ApiError;
use crate::player::types::{PlaylistContext, VideoDescriptor};

/// Media references come either as a bare URL or as an uploaded-asset object.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MediaRef {
    Url(String),
    Asset { url: String },
}

impl MediaRef {
    pub fn url(&self) -> &str {
        match self {
            MediaRef::Url(url) => url,
            MediaRef::Asset { url } => url,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub video_file: MediaRef,
    pub thumbnail: Option<MediaRef>,
    pub duration: Option<f64>,
}

impl From<VideoResponse> for VideoDescriptor {
    fn from(video: VideoResponse) -> Self {
        VideoDescriptor {
            id: video.id,
            title: video.title,
            media_url: video.video_file.url().to_string(),
            poster_url: video.thumbnail.map(|t| t.url().to_string()),
            duration_hint: video.duration.filter(|d| d.is_finite() && *d > 0.0),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlaylistEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub thumbnail: Option<MediaRef>,
    pub duration: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlaylistResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub videos: Vec<PlaylistEntry>,
}

impl From<PlaylistResponse> for PlaylistContext {
    fn from(playlist: PlaylistResponse) -> Self {
        PlaylistContext::new(
            playlist.id,
            playlist.videos.into_iter().map(|entry| entry.id).collect(),
        )
    }
}

/// The backend wraps payloads as `{statusCode, data, message, success}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseBody<T> {
    Envelope {
        data: T,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(T),
}

pub(crate) fn parse_body<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
    match serde_json::from_str::<ResponseBody<T>>(body) {
        Ok(ResponseBody::Envelope { data, message }) => {
            if let Some(message) = message {
                log::debug!("{}: {}", url, message);
            }
            Ok(data)
        }
        Ok(ResponseBody::Bare(data)) => Ok(data),
        Err(e) => Err(ApiError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        ApiClient {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(ApiClient::new(ApiConfig::from_env()?))
    }

    pub(crate) fn endpoint(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.config.base_url, collection, urlencoding::encode(id))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Request { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("GET {} -> {}", url, status);
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Request { url: url.clone(), source })?;
        parse_body(&url, &body)
    }

    /// `GET /videos/{id}`: playable URL and poster for a video.
    pub async fn fetch_video(&self, video_id: &str) -> Result<VideoDescriptor, ApiError> {
        let video: VideoResponse = self.get_json(self.endpoint("videos", video_id)).await?;
        log::info!("Resolved video '{}' ({})", video.id, video.title);
        Ok(video.into())
    }

    /// `GET /playlists/{id}`: ordered video ids of a playlist.
    pub async fn fetch_playlist_context(&self, playlist_id: &str) -> Result<PlaylistContext, ApiError> {
        let playlist: PlaylistResponse = self.get_json(self.endpoint("playlists", playlist_id)).await?;
        log::info!(
            "Resolved playlist '{}' ({:?}) with {} videos",
            playlist.id,
            playlist.name,
            playlist.videos.len()
        );
        Ok(playlist.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_envelope_maps_to_descriptor() {
        let body = r#"{
            "statusCode": 200,
            "data": {
                "_id": "v1",
                "title": "Intro",
                "videoFile": {"url": "https://cdn.example/v1.mp4", "public_id": "x"},
                "thumbnail": {"url": "https://cdn.example/v1.jpg"},
                "duration": 93.5,
                "owner": {"username": "someone"}
            },
            "message": "Video fetched",
            "success": true
        }"#;
        let video: VideoDescriptor = parse_body::<VideoResponse>("u", body).unwrap().into();
        assert_eq!(video.id, "v1");
        assert_eq!(video.media_url, "https://cdn.example/v1.mp4");
        assert_eq!(video.poster_url.as_deref(), Some("https://cdn.example/v1.jpg"));
        assert_eq!(video.duration_hint, Some(93.5));
    }

    #[test]
    fn bare_playlist_keeps_order() {
        let body = r#"{
            "_id": "pl",
            "name": "Mix",
            "videos": [
                {"_id": "a", "title": "A", "thumbnail": "https://cdn.example/a.jpg", "duration": 10},
                {"_id": "b", "title": "B", "thumbnail": {"url": "https://cdn.example/b.jpg"}},
                {"_id": "c"}
            ]
        }"#;
        let context: PlaylistContext = parse_body::<PlaylistResponse>("u", body).unwrap().into();
        assert_eq!(context.playlist_id, "pl");
        assert_eq!(context.ordered_video_ids, vec!["a", "b", "c"]);
        assert_eq!(context.current_index, 0);
        assert!(context.auto_advance);
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = parse_body::<VideoResponse>("http://api/videos/x", r#"{"data": {"title": 3}}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }

    #[test]
    fn endpoint_encodes_ids() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8000/api/v1/"));
        assert_eq!(client.endpoint("videos", "a b"), "http://localhost:8000/api/v1/videos/a%20b");
    }
}
