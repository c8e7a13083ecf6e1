//! HTML fetcher: one HTTP/1.1 GET over a raw socket (TLS via `native_tls` for
//! `https`, plain `TcpStream` otherwise). No `reqwest`/`hyper` — the wire protocol is
//! hand-written per the fetch wire format contract.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use url::Url;

use crate::error::FetchError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(20);

/// Sentinel key for a response line that has no `": "` separator, per the fetch wire
/// format contract.
const NO_NAME: &str = "no-name";

struct ParsedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
}

/// `fetch(url, redirects) -> body` if the final response is status 200 with an
/// `text/html` content type; `None` for any other outcome (non-HTML, non-2xx/3xx
/// status, I/O error, malformed URL, or an exhausted redirect budget). Never raises.
pub fn fetch(url: &str, redirects: u32) -> Option<String> {
    match fetch_inner(url, redirects) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(url, error = %e, "fetch failed");
            None
        }
    }
}

fn fetch_inner(url: &str, redirects: u32) -> Result<Option<String>, FetchError> {
    let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
    let host = parsed.host_str().ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?.to_string();
    let https = match parsed.scheme() {
        "https" => true,
        "http" => false,
        _ => return Err(FetchError::InvalidUrl(url.to_string())),
    };
    let port = parsed.port_or_known_default().unwrap_or(if https { 443 } else { 80 });

    let path_and_query = {
        let mut p = parsed.path().to_string();
        if p.is_empty() {
            p.push('/');
        }
        if let Some(q) = parsed.query() {
            p.push('?');
            p.push_str(q);
        }
        p
    };

    let request = format!(
        "GET {path_and_query} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n"
    );

    let raw = TcpStream::connect_timeout(
        &format!("{host}:{port}")
            .parse()
            .or_else(|_| resolve(&host, port))
            .map_err(|_| FetchError::InvalidUrl(url.to_string()))?,
        CONNECT_TIMEOUT,
    )?;
    raw.set_read_timeout(Some(READ_TIMEOUT))?;

    let bytes = if https {
        let connector = native_tls::TlsConnector::new()?;
        let mut stream = connector.connect(&host, raw)?;
        stream.write_all(request.as_bytes())?;
        read_to_end(&mut stream)?
    } else {
        let mut stream = raw;
        stream.write_all(request.as_bytes())?;
        read_to_end(&mut stream)?
    };

    let response = parse_response(&bytes)?;

    if response.status == 200 {
        let content_type = header(&response.headers, "content-type").unwrap_or("");
        if content_type.trim_start().to_ascii_lowercase().starts_with("text/html") {
            return Ok(Some(String::from_utf8_lossy(&response.body).into_owned()));
        }
        return Ok(None);
    }

    if (300..=399).contains(&response.status) && redirects > 0 {
        if let Some(location) = header(&response.headers, "location") {
            if let Ok(target) = parsed.join(location) {
                return fetch_inner(target.as_str(), redirects - 1);
            }
        }
    }

    Ok(None)
}

fn resolve(host: &str, port: u16) -> std::io::Result<std::net::SocketAddr> {
    use std::net::ToSocketAddrs;
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address found"))
}

fn read_to_end<S: Read>(stream: &mut S) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

fn parse_response(bytes: &[u8]) -> Result<ParsedResponse, FetchError> {
    let text = String::from_utf8_lossy(bytes);
    let header_end = text.find("\r\n\r\n").unwrap_or(text.len());
    let head = &text[..header_end];
    let body_start = bytes.len().min(
        text.find("\r\n\r\n").map(|i| i + 4).unwrap_or(bytes.len()),
    );
    let body = bytes[body_start..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or("");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        match line.split_once(": ") {
            Some((name, value)) => headers.push((name.to_string(), value.to_string())),
            None => headers.push((NO_NAME.to_string(), line.to_string())),
        }
    }

    Ok(ParsedResponse { status, headers, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use std::net::TcpListener;
    use std::thread;

    /// Spawn a one-shot HTTP server on localhost that replies with `response` to its
    /// single connection, then shuts down. Returns the bound address.
    fn spawn_one_shot(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut reader = std::io::BufReader::new(&stream);
                let mut line = String::new();
                loop {
                    line.clear();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn fetches_html_body_on_200() {
        let base = spawn_one_shot(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\r\n<html>hi</html>",
        );
        let body = fetch(&base, 3);
        assert_eq!(body.as_deref(), Some("<html>hi</html>"));
    }

    #[test]
    fn non_html_content_type_returns_none() {
        let base = spawn_one_shot("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{}");
        assert_eq!(fetch(&base, 3), None);
    }

    #[test]
    fn non_2xx_3xx_status_returns_none() {
        let base = spawn_one_shot("HTTP/1.1 500 Internal Server Error\r\n\r\n");
        assert_eq!(fetch(&base, 3), None);
    }

    #[test]
    fn malformed_url_returns_none() {
        assert_eq!(fetch("not a url", 3), None);
    }
}
