//! Blocking file download for menu scripts
//!
//! Built only with the `network` feature. Without it every download reports
//! failure.

use log::error;
use std::path::Path;

/// Downloads `url` into the file at `target`
///
/// # Parameters
/// - `url`: address to fetch with a blocking GET
/// - `target`: file to create; only created once the server answers 2xx
/// - `user_agent`: value of the `User-Agent` header, the version label
///
/// # Returns
/// `true` if the whole body was written. Failures are logged as
/// [`MenuError::NetworkFetch`](crate::error::MenuError::NetworkFetch).
#[cfg(feature = "network")]
pub fn download_file(url: &str, target: &Path, user_agent: &str) -> bool {
    match fetch_to_file(url, target, user_agent) {
        Ok(bytes) => {
            log::info!("Downloaded {} ({} bytes) to {}", url, bytes, target.display());
            true
        }
        Err(err) => {
            error!("{}", err);
            false
        }
    }
}

#[cfg(feature = "network")]
fn fetch_to_file(url: &str, target: &Path, user_agent: &str) -> Result<u64, crate::error::MenuError> {
    use crate::error::MenuError;
    use std::fs::File;

    let fetch_error = |reason: String| MenuError::NetworkFetch {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| fetch_error(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| fetch_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }

    let mut file = File::create(target).map_err(|e| fetch_error(format!("{}: {}", target.display(), e)))?;
    let bytes = response
        .copy_to(&mut file)
        .map_err(|e| fetch_error(e.to_string()))?;
    Ok(bytes)
}

/// Always fails: built without network support
#[cfg(not(feature = "network"))]
pub fn download_file(url: &str, _target: &Path, _user_agent: &str) -> bool {
    error!("Cannot download {}: built without network support", url);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.zip");
        assert!(!download_file("http://127.0.0.1:1/file.zip", &target, "voxel-menu test"));
    }

    #[test]
    fn test_malformed_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.zip");
        assert!(!download_file("not a url", &target, "voxel-menu test"));
    }

    /// Serves one canned HTTP response on a local port and returns its URL
    #[cfg(feature = "network")]
    fn serve_once(status: &'static str, body: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/file.txt", addr)
    }

    #[cfg(feature = "network")]
    #[test]
    fn test_successful_download_writes_body() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.txt");
        let url = serve_once("200 OK", "hello");

        assert!(download_file(&url, &target, "voxel-menu test"));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    }

    #[cfg(feature = "network")]
    #[test]
    fn test_error_status_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.txt");
        let url = serve_once("404 Not Found", "missing");

        assert!(!download_file(&url, &target, "voxel-menu test"));
        assert!(!target.exists());
    }

    #[cfg(feature = "network")]
    #[test]
    fn test_unwritable_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("no_such_dir").join("file.txt");
        let url = serve_once("200 OK", "hello");

        assert!(!download_file(&url, &target, "voxel-menu test"));
    }
}
