mod common;

use std::fs;
use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::TestServer;
use filedock_api_types::{DirectoryListing, EntryKind, ErrorResponse};

#[tokio::test]
async fn test_index_lists_root() {
    let server = TestServer::new();
    server.write("docs/a.txt", "a");
    server.write("readme.md", "hello");

    let response = server.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = common::body_string(response).await;
    assert!(html.contains("docs"));
    assert!(html.contains("readme.md"));
}

#[tokio::test]
async fn test_index_shows_carried_notice() {
    let server = TestServer::new();

    let response = server
        .get("/?path=&level=success&notice=%E5%88%9B%E5%BB%BA%E6%88%90%E5%8A%9F")
        .await;
    let html = common::body_string(response).await;

    assert!(html.contains(r#"class="notice success""#));
    assert!(html.contains("创建成功"));
}

#[tokio::test]
async fn test_index_unknown_notice_level_falls_back_to_success() {
    let server = TestServer::new();

    let response = server.get("/?path=&level=warning&notice=hi").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = common::body_string(response).await;
    assert!(html.contains(r#"class="notice success""#));
    assert!(html.contains("hi"));
}

#[tokio::test]
async fn test_index_missing_path_reports_not_found() {
    let server = TestServer::new();

    let response = server.get("/?path=missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = common::body_string(response).await;
    assert!(html.contains("missing 不存在"));
}

#[tokio::test]
async fn test_json_listing_classifies_entries() {
    let server = TestServer::new();
    server.write("docs/a.txt", "a");
    server.mkdir("docs/sub");

    let response = server.get("/api/fs/list?path=docs").await;
    assert_eq!(response.status(), StatusCode::OK);

    let listing: DirectoryListing =
        serde_json::from_str(&common::body_string(response).await).expect("listing json");
    assert_eq!(listing.current_path, "docs");
    assert_eq!(listing.parent_path.as_deref(), Some(""));

    let entries: Vec<_> = listing
        .entries
        .iter()
        .map(|e| (e.name.as_str(), e.kind, e.relative_path.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("a.txt", EntryKind::File, "docs/a.txt"),
            ("sub", EntryKind::Folder, "docs/sub"),
        ]
    );
}

#[tokio::test]
async fn test_json_listing_rejects_traversal() {
    let server = TestServer::new();

    let response = server.get("/api/fs/list?path=..%2F..").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse =
        serde_json::from_str(&common::body_string(response).await).expect("error json");
    assert_eq!(error.code, "INVALID_PATH");
}

#[cfg(unix)]
#[tokio::test]
async fn test_json_listing_refuses_links_outside_root() {
    let server = TestServer::new();
    server.mkdir("docs");
    fs::create_dir(server.temp_path("outside")).expect("create dir");
    fs::write(server.temp_path("outside/key"), "secret").expect("write file");
    std::os::unix::fs::symlink(server.temp_path("outside"), server.upload_path("docs/link"))
        .expect("create symlink");

    let response = server.get("/api/fs/list?path=docs/link").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let error: ErrorResponse =
        serde_json::from_str(&common::body_string(response).await).expect("error json");
    assert_eq!(error.code, "OUTSIDE_ROOT");
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::new();

    let response = server.get("/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_create_folder_then_duplicate() {
    let server = TestServer::new();

    let response = server.post_form("/create_folder", "path=&folder_name=docs").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location(&response).starts_with("/?path=&level=success"));
    assert!(server.upload_path("docs").is_dir());

    let response = server.post_form("/create_folder", "path=&folder_name=docs").await;
    let notice = common::notice(&response);
    assert!(common::location(&response).starts_with("/?path=&level=error"));
    assert_eq!(notice, "docs 已存在");
}

#[tokio::test]
async fn test_create_file_in_subfolder() {
    let server = TestServer::new();
    server.mkdir("docs");

    let response = server
        .post_form("/create_file", "path=docs&file_name=notes.txt")
        .await;
    assert!(common::location(&response).starts_with("/?path=docs&level=success"));
    assert_eq!(fs::read(server.upload_path("docs/notes.txt")).expect("file"), b"");

    server.write("docs/notes.txt", "keep");
    let response = server
        .post_form("/create_file", "path=docs&file_name=notes.txt")
        .await;
    assert!(common::location(&response).contains("level=error"));
    assert_eq!(
        fs::read_to_string(server.upload_path("docs/notes.txt")).expect("file"),
        "keep"
    );
}

#[tokio::test]
async fn test_create_file_outside_root_is_rejected() {
    let server = TestServer::new();

    let response = server
        .post_form("/create_file", "path=..&file_name=escape.txt")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location(&response).starts_with("/?path=&level=error"));
    assert!(!server.temp_path("escape.txt").exists());
}

#[tokio::test]
async fn test_unhandled_failure_redirects_with_generic_notice() {
    let server = TestServer::new();
    let too_long = "a".repeat(300);

    let response = server
        .post_form("/create_file", &format!("path=&file_name={too_long}"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location(&response).starts_with("/?path=&level=error"));
    assert_eq!(common::notice(&response), "操作失败，请稍后重试");
}

#[tokio::test]
async fn test_delete_file_folder_and_missing() {
    let server = TestServer::new();
    server.write("docs/sub/b.txt", "b");
    server.write("a.txt", "a");

    let response = server.post_form("/delete/a.txt", "path=").await;
    assert!(common::location(&response).contains("level=success"));
    assert!(!server.upload_path("a.txt").exists());

    let response = server.post_form("/delete/docs", "path=").await;
    assert!(common::location(&response).contains("level=success"));
    assert!(!server.upload_path("docs").exists());

    let response = server.post_form("/delete/ghost", "path=").await;
    assert_eq!(common::notice(&response), "ghost 不存在");
}

#[tokio::test]
async fn test_rename_moves_entry() {
    let server = TestServer::new();
    server.write("docs/old.txt", "payload");

    let response = server
        .post_form("/rename", "path=docs&old_name=old.txt&new_name=new.txt")
        .await;
    assert!(common::location(&response).starts_with("/?path=docs&level=success"));
    assert!(!server.upload_path("docs/old.txt").exists());
    assert_eq!(
        fs::read_to_string(server.upload_path("docs/new.txt")).expect("renamed"),
        "payload"
    );

    let response = server
        .post_form("/rename", "path=docs&old_name=old.txt&new_name=other.txt")
        .await;
    assert_eq!(common::notice(&response), "old.txt 不存在");
    assert!(!server.upload_path("docs/other.txt").exists());
}

#[tokio::test]
async fn test_upload_decodes_latin1_filename() {
    let server = TestServer::new();
    let mangled: String = "日本語.txt".bytes().map(char::from).collect();

    let body = common::multipart(&[("path", "")], &[("file", mangled.as_str(), "content")]);
    let response = server.post_multipart("/upload", body).await;

    assert!(common::location(&response).contains("level=success"));
    assert_eq!(
        fs::read(server.upload_path("日本語.txt")).expect("uploaded file"),
        b"content"
    );
}

#[tokio::test]
async fn test_upload_into_subfolder_keeps_utf8_names() {
    let server = TestServer::new();
    server.mkdir("docs");

    let body = common::multipart(&[("path", "docs")], &[("file", "报告.pdf", "pdf")]);
    let response = server.post_multipart("/upload", body).await;

    assert!(common::location(&response).starts_with("/?path=docs&level=success"));
    assert_eq!(fs::read(server.upload_path("docs/报告.pdf")).expect("uploaded"), b"pdf");
}

#[tokio::test]
async fn test_upload_folder_preserves_structure() {
    let server = TestServer::new();

    let body = common::multipart(
        &[("path", "")],
        &[
            ("files", "album/a.txt", "a"),
            ("files", "album/sub/b.txt", "b"),
        ],
    );
    let response = server.post_multipart("/upload_folder", body).await;

    assert!(common::location(&response).contains("level=success"));
    assert_eq!(fs::read(server.upload_path("album/a.txt")).expect("a"), b"a");
    assert_eq!(fs::read(server.upload_path("album/sub/b.txt")).expect("b"), b"b");
}

#[tokio::test]
async fn test_upload_folder_onto_existing_folder_writes_nothing() {
    let server = TestServer::new();
    server.mkdir("album/a.txt");

    let body = common::multipart(
        &[("path", "")],
        &[("files", "album/b.txt", "b"), ("files", "album/a.txt", "a")],
    );
    let response = server.post_multipart("/upload_folder", body).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location(&response).starts_with("/?path=&level=error"));
    assert_eq!(common::notice(&response), "album/a.txt 是文件夹");
    assert!(!server.upload_path("album/b.txt").exists());
    assert!(server.upload_path("album/a.txt").is_dir());
}

#[tokio::test]
async fn test_upload_folder_rejects_traversal_in_filenames() {
    let server = TestServer::new();

    let body = common::multipart(&[("path", "")], &[("files", "../escape.txt", "x")]);
    let response = server.post_multipart("/upload_folder", body).await;

    assert!(common::location(&response).contains("level=error"));
    assert!(!server.temp_path("escape.txt").exists());
}

#[tokio::test]
async fn test_download_file() {
    let server = TestServer::new();
    server.write("docs/a.txt", "alpha");

    let response = server.get("/download/a.txt?path=docs").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"a.txt\"; filename*=UTF-8''a.txt"
    );
    assert_eq!(common::body_string(response).await, "alpha");
}

#[tokio::test]
async fn test_download_missing_file_redirects_with_error() {
    let server = TestServer::new();

    let response = server.get("/download/ghost.txt?path=").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::notice(&response), "ghost.txt 不存在");
}

#[tokio::test]
async fn test_download_folder_zip_has_no_wrapper() {
    let server = TestServer::new();
    server.write("docs/a.txt", "alpha");
    server.write("docs/sub/b.txt", "beta");

    let response = server.get("/download_folder/docs?path=").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .expect("ascii header")
            .contains("filename=\"docs.zip\"")
    );

    let bytes = common::body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip body");
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["a.txt", "sub/", "sub/b.txt"]);

    let mut content = String::new();
    archive
        .by_name("sub/b.txt")
        .expect("entry")
        .read_to_string(&mut content)
        .expect("read entry");
    assert_eq!(content, "beta");

    assert!(server.archive_path("docs.zip").is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn test_download_folder_skips_dangling_links() {
    let server = TestServer::new();
    server.write("docs/a.txt", "alpha");
    std::os::unix::fs::symlink(server.upload_path("docs/gone"), server.upload_path("docs/dangling"))
        .expect("create symlink");

    let response = server.get("/download_folder/docs?path=").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = common::body_bytes(response).await;
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip body");
    let names: Vec<_> = archive.file_names().collect();
    assert_eq!(names, vec!["a.txt"]);
}

#[tokio::test]
async fn test_download_missing_folder_redirects_with_error() {
    let server = TestServer::new();

    let response = server.get("/download_folder/ghost?path=").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::notice(&response), "ghost 不存在");
    assert!(!server.archive_path("ghost.zip").exists());
}

#[tokio::test]
async fn test_open_folder_redirects() {
    let server = TestServer::new();

    let response = server.get("/open_folder/docs/sub").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/?path=docs%2Fsub");

    let response = server.get("/open_folder/").await;
    assert_eq!(common::location(&response), "/?path=");
}

#[tokio::test]
async fn test_static_files_are_served_from_public_dir() {
    let server = TestServer::with_public_dir();
    fs::write(server.temp_path("public/app.css"), "body {}").expect("write asset");

    let response = server
        .request(Request::get("/static/app.css").body(Body::empty()).expect("request"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_string(response).await, "body {}");
}
