use crate::agent::AgentLoop;
use crate::config::Config;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const BANNER: &str = "Chat iniciado! (Digite 'sair' para terminar)";
pub const FAREWELL: &str = "Até mais!";
pub const FAILURE_PREFIX: &str = "Falha ao gerar resposta:";

#[derive(Debug, Clone)]
pub struct ReplOptions {
    pub assistant_name: String,
    pub input_prompt: String,
    pub exit_command: String,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ReplOptions {
    fn from(config: &Config) -> Self {
        Self {
            assistant_name: config.assistant_name.clone(),
            input_prompt: config.input_prompt.clone(),
            exit_command: config.exit_command.clone(),
        }
    }
}

/// Why [`Repl::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    ExitCommand,
    EndOfInput,
    Shutdown,
}

/// Line-oriented chat loop over any async reader/writer pair.
pub struct Repl {
    agent: AgentLoop,
    options: ReplOptions,
}

impl Repl {
    pub fn new(agent: AgentLoop, options: ReplOptions) -> Self {
        Self { agent, options }
    }

    pub fn agent(&self) -> &AgentLoop {
        &self.agent
    }

    fn is_exit_command(&self, input: &str) -> bool {
        input.to_lowercase() == self.options.exit_command.to_lowercase()
    }

    /// Runs until the exit command, end of input, or `shutdown` resolves.
    ///
    /// Exchange failures are reported on `err` and never end the loop. A
    /// shutdown during an exchange abandons the in-flight model call.
    pub async fn run<R, W, E>(
        &mut self,
        mut reader: R,
        out: &mut W,
        err: &mut E,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<ReplExit>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        tokio::pin!(shutdown);
        let mut buf = Vec::new();

        out.write_all(format!("{BANNER}\n").as_bytes()).await?;

        loop {
            out.write_all(self.options.input_prompt.as_bytes()).await?;
            out.flush().await?;

            buf.clear();
            let read = tokio::select! {
                _ = &mut shutdown => return Ok(ReplExit::Shutdown),
                read = reader.read_until(b'\n', &mut buf) => read?,
            };

            if read == 0 {
                out.write_all(b"\n").await?;
                return Ok(ReplExit::EndOfInput);
            }

            let input = decode_line(&buf);

            if self.is_exit_command(&input) {
                out.write_all(format!("{FAREWELL}\n").as_bytes()).await?;
                out.flush().await?;
                return Ok(ReplExit::ExitCommand);
            }

            if input.trim().is_empty() {
                continue;
            }

            let result = tokio::select! {
                _ = &mut shutdown => return Ok(ReplExit::Shutdown),
                result = self.agent.process(&input) => result,
            };

            match result {
                Ok(answer) => {
                    let line = format!("{}: {}\n", self.options.assistant_name, answer);
                    out.write_all(line.as_bytes()).await?;
                }
                Err(e) => {
                    tracing::error!(error = %e, "exchange failed");
                    err.write_all(format!("{FAILURE_PREFIX} {e}\n").as_bytes())
                        .await?;
                    err.flush().await?;
                }
            }
        }
    }
}

/// Strips the line terminator. Invalid UTF-8 is replaced, not rejected.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ContextBuilder, ToolRegistry};
    use crate::memory::BufferMemory;
    use crate::testing::{FailingTool, ScriptedProvider, tool_calls, transport_error};
    use crate::traits::ChatResponse;
    use std::sync::Arc;

    fn repl_with(provider: Arc<ScriptedProvider>, registry: ToolRegistry) -> Repl {
        let agent = AgentLoop::new(
            provider,
            ContextBuilder::default(),
            Arc::new(registry),
            Box::new(BufferMemory::new()),
        );
        Repl::new(agent, ReplOptions::default())
    }

    fn repl(provider: Arc<ScriptedProvider>) -> Repl {
        repl_with(provider, ToolRegistry::builtin())
    }

    async fn run_script(repl: &mut Repl, input: impl AsRef<[u8]>) -> (ReplExit, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let exit = repl
            .run(input.as_ref(), &mut out, &mut err, std::future::pending())
            .await
            .unwrap();
        (
            exit,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn exit_command_is_case_insensitive_and_skips_the_model() {
        for sentinel in ["sair", "SAIR", "Sair"] {
            let provider = Arc::new(ScriptedProvider::default());
            let mut repl = repl(provider.clone());

            let (exit, out, _) = run_script(&mut repl, &format!("{sentinel}\noi\n")).await;

            assert_eq!(exit, ReplExit::ExitCommand);
            assert!(out.ends_with("Até mais!\n"));
            assert!(provider.requests().is_empty());
        }
    }

    #[tokio::test]
    async fn prints_answer_with_assistant_name() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_calls(&[("call_1", "obter_idade_atual")])),
            Ok(ChatResponse::text("Você tem 30 anos!")),
        ]));
        let mut repl = repl(provider);

        let (exit, out, err) = run_script(&mut repl, "qual a idade?\nsair\n").await;

        assert_eq!(exit, ReplExit::ExitCommand);
        assert!(out.starts_with(BANNER));
        assert!(out.contains("Fala meu cumpade: Gema: Você tem 30 anos!\n"));
        assert!(err.is_empty());
        assert_eq!(repl.agent().memory().turn_count(), 1);
    }

    #[tokio::test]
    async fn failure_is_reported_and_loop_continues() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(transport_error()),
            Ok(ChatResponse::text("Olá!")),
        ]));
        let mut repl = repl(provider.clone());

        let (exit, out, err) = run_script(&mut repl, "oi\noi de novo\nsair\n").await;

        assert_eq!(exit, ReplExit::ExitCommand);
        assert_eq!(err, "Falha ao gerar resposta: API error 503: unavailable\n");
        assert!(out.contains("Gema: Olá!\n"));
        assert_eq!(provider.requests().len(), 2);
        assert_eq!(repl.agent().memory().turn_count(), 1);
    }

    #[tokio::test]
    async fn tool_failure_is_reported_and_loop_continues() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailingTool));
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_calls(&[("call_1", "quebrada")])),
            Ok(ChatResponse::text("Olá!")),
        ]));
        let mut repl = repl_with(provider.clone(), registry);

        let (exit, out, err) = run_script(&mut repl, "quebra\noi\nsair\n").await;

        assert_eq!(exit, ReplExit::ExitCommand);
        assert_eq!(
            err,
            "Falha ao gerar resposta: tool 'quebrada' failed: callback exploded\n"
        );
        assert!(out.contains("Gema: Olá!\n"));
        assert_eq!(provider.requests().len(), 2);
        assert_eq!(repl.agent().memory().turn_count(), 1);
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_end_the_session() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(ChatResponse::text("Olá de novo!")),
            Ok(ChatResponse::text("Oi!")),
        ]));
        let mut repl = repl(provider.clone());

        let (exit, out, err) = run_script(&mut repl, b"ol\xe1\noi\r\nsair\n").await;

        assert_eq!(exit, ReplExit::ExitCommand);
        assert!(err.is_empty());
        assert!(out.contains("Gema: Oi!\n"));
        assert!(out.ends_with("Até mais!\n"));

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].messages.last().unwrap().content, "ol\u{fffd}");
        assert_eq!(requests[1].messages.last().unwrap().content, "oi");
    }

    #[tokio::test]
    async fn blank_lines_do_not_reach_the_model() {
        let provider = Arc::new(ScriptedProvider::default());
        let mut repl = repl(provider.clone());

        let (exit, _, _) = run_script(&mut repl, "\n   \n").await;

        assert_eq!(exit, ReplExit::EndOfInput);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn shutdown_interrupts_waiting_for_input() {
        let provider = Arc::new(ScriptedProvider::default());
        let mut repl = repl(provider);
        // Keep the writer half open so the read never completes.
        let (_client, server) = tokio::io::duplex(64);
        let reader = tokio::io::BufReader::new(server);
        let mut out = Vec::new();
        let mut err = Vec::new();

        let exit = repl
            .run(reader, &mut out, &mut err, async {})
            .await
            .unwrap();

        assert_eq!(exit, ReplExit::Shutdown);
    }
}
