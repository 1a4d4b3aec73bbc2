use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    labslip_lib::init_tracing();
    match labslip_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
