//! 目录页面渲染。

use filedock_api_types::{DirectoryEntry, DirectoryListing, EntryKind, Notice};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use urlencoding::encode;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2rem auto; max-width: 960px; color: #222; }
h1 { font-size: 1.3rem; word-break: break-all; }
table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
th, td { border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }
form { display: inline; margin-right: .5rem; }
.toolbar form { display: inline-block; margin: .3rem .8rem .3rem 0; }
.notice { padding: .6rem .8rem; border-radius: 4px; margin: .8rem 0; }
.notice.success { background: #e6f4ea; color: #1e4620; }
.notice.error { background: #fdecea; color: #611a15; }
"#;

// 提示只显示一次：渲染后把提示参数从地址栏移除。
const CLEAR_NOTICE_SCRIPT: &str = r#"
(function () {
  var url = new URL(window.location.href);
  if (url.searchParams.has('notice')) {
    url.searchParams.delete('notice');
    url.searchParams.delete('level');
    window.history.replaceState(null, '', url.pathname + url.search);
  }
})();
"#;

/// 渲染目录页面。`listing` 为 `None` 时只显示提示与返回根目录的链接。
pub fn directory_page(
    current_path: &str,
    listing: Option<&DirectoryListing>,
    notice: Option<&Notice>,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="zh-CN" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "文件管理 - /" (current_path) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "/" (current_path) }
                @if let Some(notice) = notice {
                    div class=(format!("notice {}", notice.level.as_str())) { (notice.message) }
                }
                @if let Some(listing) = listing {
                    @if let Some(parent) = &listing.parent_path {
                        p { a href=(open_folder_href(parent)) { "返回上级" } }
                    }
                    (toolbar(current_path))
                    table {
                        thead {
                            tr { th { "类型" } th { "名称" } th { "操作" } }
                        }
                        tbody {
                            @for entry in &listing.entries {
                                (entry_row(current_path, entry))
                            }
                        }
                    }
                } @else {
                    p { a href="/" { "返回根目录" } }
                }
                script { (PreEscaped(CLEAR_NOTICE_SCRIPT)) }
            }
        }
    }
}

fn toolbar(current_path: &str) -> Markup {
    html! {
        div class="toolbar" {
            form method="post" action="/create_folder" {
                input type="hidden" name="path" value=(current_path);
                input type="text" name="folder_name" placeholder="文件夹名" required;
                button type="submit" { "新建文件夹" }
            }
            form method="post" action="/create_file" {
                input type="hidden" name="path" value=(current_path);
                input type="text" name="file_name" placeholder="文件名" required;
                button type="submit" { "新建文件" }
            }
            form method="post" action="/upload" enctype="multipart/form-data" {
                input type="hidden" name="path" value=(current_path);
                input type="file" name="file" required;
                button type="submit" { "上传文件" }
            }
            form method="post" action="/upload_folder" enctype="multipart/form-data" {
                input type="hidden" name="path" value=(current_path);
                input type="file" name="files" multiple webkitdirectory required;
                button type="submit" { "上传文件夹" }
            }
        }
    }
}

fn entry_row(current_path: &str, entry: &DirectoryEntry) -> Markup {
    let query = format!("?path={}", encode(current_path));
    let name = encode(&entry.name);

    html! {
        tr {
            td {
                @match entry.kind {
                    EntryKind::Folder => { "文件夹" }
                    EntryKind::File => { "文件" }
                }
            }
            td {
                @if entry.kind.is_folder() {
                    a href=(open_folder_href(&entry.relative_path)) { (entry.name) }
                } @else {
                    (entry.name)
                }
            }
            td {
                @if entry.kind.is_folder() {
                    a href=(format!("/download_folder/{name}{query}")) { "打包下载" }
                } @else {
                    a href=(format!("/download/{name}{query}")) { "下载" }
                }
                " "
                form
                    method="post"
                    action=(format!("/delete/{name}"))
                    onsubmit="return confirm('确定删除？');"
                {
                    input type="hidden" name="path" value=(current_path);
                    button type="submit" { "删除" }
                }
                form method="post" action="/rename" {
                    input type="hidden" name="path" value=(current_path);
                    input type="hidden" name="old_name" value=(entry.name);
                    input type="text" name="new_name" value=(entry.name) required;
                    button type="submit" { "重命名" }
                }
            }
        }
    }
}

/// `/open_folder/<path>`，逐段编码以保留分隔符。
fn open_folder_href(relative_path: &str) -> String {
    if relative_path.is_empty() {
        return "/".to_string();
    }

    let encoded: Vec<_> = relative_path.split('/').map(encode).collect();
    format!("/open_folder/{}", encoded.join("/"))
}
