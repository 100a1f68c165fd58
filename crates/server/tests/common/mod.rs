use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, header};
use axum::response::Response;
use filedock_server::{AppState, ServerConfig, create_router};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "filedock-test-boundary";

pub struct TestServer {
    temp: TempDir,
    router: Router,
}

impl TestServer {
    pub fn new() -> Self {
        Self::build(false)
    }

    pub fn with_public_dir() -> Self {
        Self::build(true)
    }

    fn build(with_public_dir: bool) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut config = ServerConfig {
            upload_root: temp.path().join("uploads"),
            archive_root: temp.path().join("zip"),
            ..ServerConfig::default()
        };
        if with_public_dir {
            let public_dir = temp.path().join("public");
            fs::create_dir_all(&public_dir).expect("create public dir");
            config.public_dir = Some(public_dir);
        }

        let state = AppState::new(&config.upload_root, &config.archive_root);
        state.prepare().expect("create storage directories");
        let router = create_router(Arc::new(state), &config);

        Self { temp, router }
    }

    pub fn temp_path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    pub fn upload_path(&self, relative: &str) -> PathBuf {
        self.temp.path().join("uploads").join(relative)
    }

    pub fn archive_path(&self, relative: &str) -> PathBuf {
        self.temp.path().join("zip").join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.upload_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, contents).expect("write fixture file");
    }

    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.upload_path(relative)).expect("create fixture dir");
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.request(request).await
    }

    pub async fn post_multipart(&self, uri: &str, body: Vec<u8>) -> Response {
        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        self.request(request).await
    }
}

/// Builds a `multipart/form-data` body from text fields and `(field, filename, contents)` files.
pub fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (name, file_name, contents) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body.into_bytes()
}

pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
}

pub async fn body_string(response: Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("ascii location")
        .to_string()
}

/// Decoded `notice` query parameter of a redirect.
pub fn notice(response: &Response) -> String {
    let location = location(response);
    let (_, encoded) = location.split_once("notice=").expect("redirect carries a notice");
    urlencoding::decode(encoded)
        .expect("valid percent-encoding")
        .into_owned()
}
