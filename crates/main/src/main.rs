//! 主应用程序入口
//!
//! 终端聊天客户端：加载配置、恢复或选择显示名称，然后进入行输入循环。

mod command;
mod view;

use std::io::Write;

use application::{ChatSession, IdentityError, MessageTransport, SessionMode, SyncSnapshot};
use config::ClientConfig;
use infrastructure::Infrastructure;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, HELP};

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志写到 stderr，stdout 留给聊天界面
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::load()?;
    let infra = Infrastructure::connect(&config)?;

    match infra.transport.channel_name().await {
        Ok(name) => println!("== {name} =="),
        Err(err) => tracing::warn!(error = %err, "Channel health probe failed"),
    }

    let mut session = infra.chat_session();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let onboarding = matches!(session.restore().await, SessionMode::Onboarding);
    if onboarding && !onboard(&mut session, &mut lines).await? {
        return Ok(());
    }
    if let Some(name) = session.display_name() {
        println!("Chatting as {name}. Type /help for commands.");
    }

    run(&mut session, &mut lines).await?;

    session.shutdown().await;
    Ok(())
}

/// 选择显示名称；输入结束时返回 false
async fn onboard(session: &mut ChatSession, lines: &mut InputLines) -> anyhow::Result<bool> {
    loop {
        prompt("Enter username: ")?;
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };

        match session.submit_name(&line).await {
            Ok(name) => {
                println!("Welcome, {name}!");
                return Ok(true);
            }
            Err(IdentityError::InvalidName(err)) => println!("{err}"),
            Err(err) => println!("Could not use that name: {err}"),
        }
    }
}

async fn run(session: &mut ChatSession, lines: &mut InputLines) -> anyhow::Result<()> {
    let mut updates = session.subscribe();
    let mut last_rendered: Option<SyncSnapshot> = None;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if view::needs_redraw(last_rendered.as_ref(), &snapshot) {
                    render(session, &snapshot);
                    last_rendered = Some(snapshot);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Search(term) => {
                        session.set_search(term);
                        render(session, &session.snapshot());
                    }
                    Command::Read => {
                        session.mark_read();
                        render(session, &session.snapshot());
                    }
                    Command::Send(text) => {
                        session.set_input(text);
                        if let Err(err) = session.send_input().await {
                            println!("! {}", err.user_message());
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn render(session: &ChatSession, snapshot: &SyncSnapshot) {
    print!(
        "{}",
        view::render(
            &session.visible_messages(),
            snapshot.unread,
            session.search(),
            snapshot.last_error,
        )
    );
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}
