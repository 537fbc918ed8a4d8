//! 终端输入
//!
//! 把标准输入的每一行翻译成 [`UserCommand`]

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::orchestrator::session::UserCommand;
use crate::workflow::Trigger;

pub const HELP: &str = "\
Comandos:
  <texto>       escribir en el paso actual
  (línea vacía) siguiente paso
  .             enviar respuesta (Enter)
  :add / +      agregar paso
  :del / -      quitar el último paso
  :edit N texto reemplazar el paso N
  :hint         mostrar / ocultar pista
  :send         enviar respuesta
  :!            enviar respuesta (Ctrl+Enter)
  :q            salir";

/// 解析一行输入
///
/// 无法识别的 `:` 命令返回 `None`
pub fn parse_command(line: &str) -> Option<UserCommand> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Some(UserCommand::NextField);
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Some(match line {
            "+" => UserCommand::AddStep,
            "-" => UserCommand::RemoveStep,
            "." => UserCommand::Submit(Trigger::EnterKey),
            text => UserCommand::Type(text.to_string()),
        });
    };

    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match name {
        "add" => Some(UserCommand::AddStep),
        "del" => Some(UserCommand::RemoveStep),
        "hint" => Some(UserCommand::ToggleHint),
        "send" => Some(UserCommand::Submit(Trigger::Button)),
        "!" => Some(UserCommand::Submit(Trigger::CtrlEnter)),
        "q" => Some(UserCommand::Quit),
        "edit" => {
            let (index, text) = arg.split_once(' ').unwrap_or((arg, ""));
            let index: usize = index.parse().ok()?;
            Some(UserCommand::EditStep {
                index: index.checked_sub(1)?,
                text: text.to_string(),
            })
        }
        _ => None,
    }
}

/// 后台读取标准输入，直到 EOF 或会话结束
pub fn spawn_stdin_reader(tx: Sender<UserCommand>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(command) => {
                        if tx.send(command).await.is_err() {
                            debug!("会话已结束，停止读取输入");
                            break;
                        }
                    }
                    None => println!("{}", HELP),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("读取输入失败: {}", e);
                    break;
                }
            }
        }
    })
}
