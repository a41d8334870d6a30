use std::fmt::Write;

use application::SyncSnapshot;
use domain::{ErrorKind, Message};

/// 新快照是否改变了界面上可见的内容。
/// 每次成功同步都会刷新 `last_synced_at`，它本身不触发重绘。
pub fn needs_redraw(previous: Option<&SyncSnapshot>, next: &SyncSnapshot) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    previous.messages != next.messages
        || previous.unread != next.unread
        || previous.last_error != next.last_error
}

/// 渲染消息面板：未读徽标、可选的搜索提示、消息列表以及最近的同步错误
pub fn render(
    visible: &[Message],
    unread: usize,
    search: &str,
    last_error: Option<ErrorKind>,
) -> String {
    let mut out = String::from("--- Unread Messages");
    if unread > 0 {
        let _ = write!(out, " ({unread} new)");
    }
    out.push_str(" ---\n");

    if !search.is_empty() {
        let _ = writeln!(out, "[search: \"{search}\", {} match(es)]", visible.len());
    }

    for message in visible {
        let _ = writeln!(out, "{}: {}", message.sender, message.content);
    }

    if let Some(kind) = last_error {
        let _ = writeln!(out, "(last refresh failed: {kind} error, retrying)");
    }
    out
}
