use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use gestor_agent::{AssistantRuntime, Input, SessionId, TurnReport};
use gestor_core::config::AppConfig;
use gestor_core::context::SuggestionSet;
use gestor_core::dispatch::Assistant;
use gestor_core::messages::Block;
use gestor_core::reports::ReportFile;
use gestor_gateway::HttpGateway;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

use super::CommandResult;

const EXIT_COMMAND: &str = "/salir";
const UNRECOGNIZED: &str =
    "Comando no reconocido. Escribe «ver comandos» para ver lo que puedo hacer.";

/// Totals for one terminal conversation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChatSummary {
    pub turns: usize,
    pub files: Vec<PathBuf>,
}

pub async fn run(config: &AppConfig) -> CommandResult {
    let runtime = match build_runtime(config) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("chat", "startup", format!("{error:#}"), 1),
    };

    let session = runtime.open_session(config.conversation_user()).await;
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    let outcome =
        run_session(&runtime, session, &config.reports.output_dir, stdin, &mut stdout).await;
    let _ = runtime.close_session(session).await;

    match outcome {
        Ok(summary) => CommandResult::success(
            "chat",
            format!("{} turns, {} report files written", summary.turns, summary.files.len()),
        ),
        Err(error) => CommandResult::failure("chat", "io", format!("{error:#}"), 1),
    }
}

fn build_runtime(config: &AppConfig) -> Result<AssistantRuntime> {
    let gateway = HttpGateway::new(&config.backend).context("failed to build backend client")?;
    let assistant = Assistant::standard(Arc::new(gateway), config.product_catalog())
        .context("failed to compile intent registry")?;
    Ok(AssistantRuntime::new(assistant))
}

/// Reads one utterance per line until EOF or `/salir`. `#n` clicks the n-th
/// suggestion of the last rendered set.
pub async fn run_session<R, W>(
    runtime: &AssistantRuntime,
    session: SessionId,
    output_dir: &Path,
    reader: R,
    writer: &mut W,
) -> Result<ChatSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = ChatSummary::default();
    let mut rendered = SuggestionSet::default();
    let mut lines = reader.lines();

    write_line(writer, "Asistente listo. Escribe «ver comandos» para empezar o /salir para terminar.")
        .await?;
    writer.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == EXIT_COMMAND {
            break;
        }

        let input = match suggestion_input(line, &rendered) {
            Some(Ok(input)) => input,
            Some(Err(message)) => {
                write_line(writer, &format!("> {message}")).await?;
                continue;
            }
            None => Input::typed(line),
        };

        summary.turns += 1;
        match runtime.submit(session, input).await {
            Ok(report) => {
                rendered = report.suggestions.clone();
                render_report(writer, &report).await?;
                for file in &report.files {
                    let path = save_report(output_dir, file).await?;
                    write_line(writer, &format!("  guardado en {}", path.display())).await?;
                    summary.files.push(path);
                }
            }
            Err(error) => write_line(writer, &format!("! {error}")).await?,
        }
        writer.flush().await?;
    }

    Ok(summary)
}

fn suggestion_input(line: &str, rendered: &SuggestionSet) -> Option<Result<Input, String>> {
    let index = line.strip_prefix('#')?.trim().parse::<usize>().ok()?;
    let option = index.checked_sub(1).and_then(|position| rendered.options.get(position));
    Some(match option {
        Some(text) => Ok(Input::Suggestion { text: text.clone(), generation: rendered.generation }),
        None => Err(format!("No hay una sugerencia #{index}.")),
    })
}

async fn render_report<W: AsyncWrite + Unpin>(writer: &mut W, report: &TurnReport) -> Result<()> {
    if report.is_unrecognized() {
        return write_line(writer, &format!("> {UNRECOGNIZED}")).await;
    }

    for message in &report.messages {
        write_line(writer, &format!("> {}", message.text)).await?;
        for block in &message.blocks {
            match block {
                Block::List { title, items } => {
                    if let Some(title) = title {
                        write_line(writer, &format!("  {title}")).await?;
                    }
                    for item in items {
                        write_line(writer, &format!("  - {item}")).await?;
                    }
                }
                Block::Suggestions { generation, options } => {
                    // Only the current set is clickable; superseded menus stay as plain text.
                    let rendered = if *generation == report.suggestions.generation {
                        options
                            .iter()
                            .enumerate()
                            .map(|(index, option)| format!("[#{}] {option}", index + 1))
                            .collect::<Vec<_>>()
                            .join("  ")
                    } else {
                        format!("({})", options.join(", "))
                    };
                    write_line(writer, &format!("  {rendered}")).await?;
                }
                Block::File { file_name, size_bytes } => {
                    write_line(writer, &format!("  archivo: {file_name} ({size_bytes} bytes)"))
                        .await?;
                }
            }
        }
    }
    Ok(())
}

/// Writes the report under `output_dir`, keeping only the final path
/// component of the server-provided name.
async fn save_report(output_dir: &Path, file: &ReportFile) -> Result<PathBuf> {
    let name = Path::new(&file.file_name)
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "reporte".into());
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let path = output_dir.join(name);
    tokio::fs::write(&path, &file.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        event_name = "cli.report.saved",
        path = %path.display(),
        size_bytes = file.bytes.len(),
        "report saved"
    );
    Ok(path)
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    Ok(())
}
