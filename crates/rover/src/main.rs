use rover::runtime::{boot, run, stop};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let booted = boot::boot(std::env::args().nth(1)).await?;
    run::run(
        booted.controller,
        booted.link.as_ref(),
        booted.inbound,
        &booted.config,
        stop::shutdown_signal(),
    )
    .await;
    Ok(())
}
