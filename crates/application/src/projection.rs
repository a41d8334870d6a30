use domain::Message;

/// 按搜索词过滤消息：内容不区分大小写地包含搜索词即保留，保持原有顺序。
/// 空搜索词返回原列表。
pub fn project(cache: &[Message], search_term: &str) -> Vec<Message> {
    if search_term.is_empty() {
        return cache.to_vec();
    }

    let needle = search_term.to_lowercase();
    cache
        .iter()
        .filter(|message| message.content_contains_lowercase(&needle))
        .cloned()
        .collect()
}
