use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    gestor_cli::run().await
}
