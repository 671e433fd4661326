#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use project_cpm::{AnalyzerConfig, Portfolio, http_api};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = std::env::var("PROJECT_CPM_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = match std::env::var("PROJECT_CPM_CONFIG") {
        Ok(path) => AnalyzerConfig::from_json_file(path)?,
        Err(_) => AnalyzerConfig::default(),
    };

    println!("project-cpm HTTP API listening on http://{addr}");
    http_api::serve(addr, Portfolio::new(), config).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
