#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use shift_rota::config::RotaConfig;
    use shift_rota::http_api;
    use shift_rota::logging::init_logging;
    use shift_rota::service::open_sqlite;

    let config = RotaConfig::from_env()?;
    init_logging(config.log_format, "info");

    let service = open_sqlite(&config)?;
    println!("shift-rota HTTP API listening on http://{}", config.http_addr);
    http_api::serve(config.http_addr, service).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
