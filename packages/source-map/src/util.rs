//! Path and URL helpers
//!
//! Sources and source roots may be plain paths or URLs. These helpers parse,
//! normalize, join and relativize both kinds with the same rules.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([\w+\-.]+):)?//(?:(\w+:\w+)@)?([\w.]*)(?::(\d+))?(\S*)$").unwrap()
});

static DATA_URL_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^data:.+,.+$").unwrap());

static PATH_SEPARATOR_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"/+").unwrap());

static EXHAUSTED_ROOT_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^/]+:/)?/*$").unwrap());

/// The components of a URL. Empty host and path are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    pub scheme: Option<String>,
    pub auth: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub path: Option<String>,
}

pub fn url_parse(url: &str) -> Option<Url> {
    let captures = URL_REGEXP.captures(url)?;
    let group = |i: usize| {
        captures
            .get(i)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some(Url {
        scheme: group(1),
        auth: group(2),
        host: group(3),
        port: group(4),
        path: group(5),
    })
}

pub fn url_generate(url: &Url) -> String {
    let mut out = String::new();
    if let Some(scheme) = &url.scheme {
        out.push_str(scheme);
        out.push(':');
    }
    out.push_str("//");
    if let Some(auth) = &url.auth {
        out.push_str(auth);
        out.push('@');
    }
    if let Some(host) = &url.host {
        out.push_str(host);
    }
    if let Some(port) = &url.port {
        out.push(':');
        out.push_str(port);
    }
    if let Some(path) = &url.path {
        out.push_str(path);
    }
    out
}

/// Normalizes a path, or the path portion of a URL:
///
/// - Replaces consecutive slashes with one slash.
/// - Removes unnecessary '.' parts.
/// - Removes unnecessary '<dir>/..' parts.
///
/// Based on code in the Node.js 'path' core module.
pub fn normalize(path: &str) -> String {
    let mut url = url_parse(path);
    let path = match &url {
        Some(parsed) => match &parsed.path {
            Some(p) => p.clone(),
            None => return path.to_string(),
        },
        None => path.to_string(),
    };
    let absolute = is_absolute(&path);

    let mut parts: Vec<&str> = PATH_SEPARATOR_REGEXP.split(&path).collect();
    let mut up = 0;
    let mut i = parts.len();
    while i > 0 {
        i -= 1;
        let part = parts[i];
        match part {
            "." => {
                parts.remove(i);
            }
            ".." => up += 1,
            _ if up > 0 => {
                if part.is_empty() {
                    // The first part is blank if the path is absolute. Going above
                    // the root is a no-op, so drop every '..' right after it.
                    let end = (i + 1 + up).min(parts.len());
                    parts.drain(i + 1..end);
                    up = 0;
                } else {
                    let end = (i + 2).min(parts.len());
                    parts.drain(i..end);
                    up -= 1;
                }
            }
            _ => {}
        }
    }

    let mut normalized = parts.join("/");
    if normalized.is_empty() {
        normalized = if absolute { "/" } else { "." }.to_string();
    }

    match url.as_mut() {
        Some(parsed) => {
            parsed.path = Some(normalized);
            url_generate(parsed)
        }
        None => normalized,
    }
}

/// Joins two paths/URLs.
///
/// - If `path` is a URL or a data URI, `path` is returned.
/// - If `path` is absolute, `path` is returned with the scheme and host of
///   `root` (when `root` is a URL).
/// - Otherwise the two paths are joined and normalized.
pub fn join(root: &str, path: &str) -> String {
    let root = if root.is_empty() { "." } else { root };
    let path = if path.is_empty() { "." } else { path };

    let path_url = url_parse(path);
    let mut root_url = url_parse(root);
    let root_path = match &root_url {
        Some(parsed) => parsed.path.clone().unwrap_or_else(|| "/".to_string()),
        None => root.to_string(),
    };

    // `join(foo, '//www.example.org')`
    if let Some(mut parsed) = path_url {
        if parsed.scheme.is_none() {
            if let Some(root_url) = &root_url {
                parsed.scheme = root_url.scheme.clone();
            }
            return url_generate(&parsed);
        }
        return path.to_string();
    }

    if DATA_URL_REGEXP.is_match(path) {
        return path.to_string();
    }

    // `join('http://', 'www.example.com')`
    if let Some(parsed) = root_url.as_mut() {
        if parsed.host.is_none() && parsed.path.is_none() {
            parsed.host = Some(path.to_string());
            return url_generate(parsed);
        }
    }

    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        normalize(&format!("{}/{}", root_path.trim_end_matches('/'), path))
    };

    match root_url.as_mut() {
        Some(parsed) => {
            parsed.path = Some(joined);
            url_generate(parsed)
        }
        None => joined,
    }
}

pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || URL_REGEXP.is_match(path)
}

/// Make a path relative to a URL or another path.
pub fn relative(root: &str, path: &str) -> String {
    let root = if root.is_empty() { "." } else { root };
    let mut root = root.strip_suffix('/').unwrap_or(root);

    // The path may sit above the root, so strip components from the root one
    // at a time until it becomes a prefix of the path.
    let mut level = 0;
    while !path.starts_with(&format!("{}/", root)) {
        let Some(index) = root.rfind('/') else {
            return path.to_string();
        };

        // Only a scheme, slashes or nothing at all left: the path is not
        // relative to the root.
        root = &root[..index];
        if EXHAUSTED_ROOT_REGEXP.is_match(root) {
            return path.to_string();
        }

        level += 1;
    }

    format!("{}{}", "../".repeat(level), &path[root.len() + 1..])
}
