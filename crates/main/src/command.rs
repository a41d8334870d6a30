/// 一行终端输入对应的用户意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 发送原文
    Send(String),
    /// 设置搜索词；空串表示清除
    Search(String),
    /// 标记已读
    Read,
    Quit,
    Help,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Send(line.to_owned());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest.trim_end(), ""),
        };

        match name {
            "search" | "s" => Command::Search(arg.to_owned()),
            "read" => Command::Read,
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "h" | "?" => Command::Help,
            // 未知命令按普通消息发送
            _ => Command::Send(line.to_owned()),
        }
    }
}

pub const HELP: &str = "\
Type a message and press Enter to send it.
  /search <term>  filter messages (no term clears the filter)
  /read           mark all messages as read
  /quit           leave the chat";
