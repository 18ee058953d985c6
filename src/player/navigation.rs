use std::collections::BTreeMap;
use std::fmt;

use crate::player::errors::RouteError;

const WATCH_PREFIX: &str = "/watch/";
const PLAYLIST_PARAM: &str = "playlist";
const INDEX_PARAM: &str = "index";

/// A client-side route: path plus decoded query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Route {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    /// `/watch/{videoId}` with optional `playlist` and `index` parameters.
    pub fn watch(video_id: &str, playlist: Option<(&str, usize)>) -> Self {
        let mut route = Route::new(format!("{}{}", WATCH_PREFIX, urlencoding::encode(video_id)));
        if let Some((playlist_id, index)) = playlist {
            route.query.insert(PLAYLIST_PARAM.to_string(), playlist_id.to_string());
            route.query.insert(INDEX_PARAM.to_string(), index.to_string());
        }
        route
    }

    pub fn parse(raw: &str) -> Route {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };
        let mut route = Route::new(path);
        for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            route.query.insert(key.to_string(), value);
        }
        route
    }

    /// The video id if this is a watch route.
    pub fn watch_video_id(&self) -> Option<String> {
        let rest = self.path.strip_prefix(WATCH_PREFIX)?;
        let id = rest.trim_end_matches('/');
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(urlencoding::decode(id).map(|v| v.into_owned()).unwrap_or_else(|_| id.to_string()))
    }

    pub fn is_watch_page_for(&self, video_id: &str) -> bool {
        self.watch_video_id().as_deref() == Some(video_id)
    }

    /// Playlist id and index carried by a watch route, if both are present.
    pub fn playlist_params(&self) -> Result<Option<(String, usize)>, RouteError> {
        let Some(playlist_id) = self.query.get(PLAYLIST_PARAM) else {
            return Ok(None);
        };
        let index = match self.query.get(INDEX_PARAM) {
            Some(raw) => raw.parse::<usize>().map_err(|_| RouteError::InvalidIndex(raw.clone()))?,
            None => 0,
        };
        Ok(Some((playlist_id.clone(), index)))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        let mut sep = '?';
        // Keep `playlist` before `index` to match the links the UI builds.
        let ordered = [PLAYLIST_PARAM, INDEX_PARAM]
            .into_iter()
            .filter_map(|k| self.query.get_key_value(k))
            .chain(
                self.query
                    .iter()
                    .filter(|(k, _)| k.as_str() != PLAYLIST_PARAM && k.as_str() != INDEX_PARAM),
            );
        for (key, value) in ordered {
            write!(f, "{}{}={}", sep, key, urlencoding::encode(value))?;
            sep = '&';
        }
        Ok(())
    }
}

/// Route/navigation service of the embedding UI.
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Route;
    fn navigate(&self, target: &Route);
    fn scroll_main_into_view(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_route_carries_playlist_params() {
        let route = Route::watch("abc", Some(("pl 1", 2)));
        assert_eq!(route.to_string(), "/watch/abc?playlist=pl%201&index=2");
        assert_eq!(route.playlist_params().unwrap(), Some(("pl 1".to_string(), 2)));
    }

    #[test]
    fn parse_reads_watch_id_and_query() {
        let route = Route::parse("/watch/v42?playlist=p9&index=3&t=10");
        assert_eq!(route.watch_video_id().as_deref(), Some("v42"));
        assert!(route.is_watch_page_for("v42"));
        assert!(!route.is_watch_page_for("v4"));
        assert_eq!(route.query.get("t").map(String::as_str), Some("10"));
        assert_eq!(route.to_string(), "/watch/v42?playlist=p9&index=3&t=10");
    }

    #[test]
    fn non_watch_routes_have_no_video() {
        assert_eq!(Route::parse("/").watch_video_id(), None);
        assert_eq!(Route::parse("/watch/").watch_video_id(), None);
        assert_eq!(Route::parse("/channel/xyz").watch_video_id(), None);
    }

    #[test]
    fn bad_index_is_rejected() {
        let route = Route::parse("/watch/v1?playlist=p&index=two");
        assert_eq!(route.playlist_params(), Err(RouteError::InvalidIndex("two".into())));
        let route = Route::parse("/watch/v1?playlist=p");
        assert_eq!(route.playlist_params(), Ok(Some(("p".to_string(), 0))));
    }
}
