//! Manual smoke test: uploads one image to a running service and prints
//! the verdict.

use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smoke_test")]
#[command(about = "Upload an image to /api/detect-person and print the response")]
struct Args {
    /// Image to upload
    image: PathBuf,

    /// Service base URL
    #[arg(default_value = "http://localhost:8000/")]
    api_url: String,

    /// Value for the `api-key` header
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: String,
}

fn endpoint(api_url: &str) -> String {
    let mut base = api_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    format!("{}api/detect-person", base)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if !args.image.exists() {
        bail!("file {} does not exist", args.image.display());
    }

    let data = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let file_name = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());

    let url = endpoint(&args.api_url);
    println!("Sending request to {}...", url);

    let part = Part::bytes(data).file_name(file_name).mime_str("image/jpeg")?;
    let response = reqwest::Client::new()
        .post(&url)
        .header("api-key", &args.api_key)
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .context("request failed")?;

    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        let parsed: serde_json::Value = serde_json::from_str(&body).context("response is not JSON")?;
        println!("Request succeeded.");
        println!("Result: {}", serde_json::to_string_pretty(&parsed)?);
        Ok(())
    } else {
        println!("Request failed with status {}", status);
        println!("Server response: {}", body);
        bail!("service returned {}", status)
    }
}

#[cfg(test)]
mod tests {
    use super::endpoint;

    #[test]
    fn normalises_trailing_slash() {
        assert_eq!(endpoint("http://host:8000"), "http://host:8000/api/detect-person");
        assert_eq!(endpoint("http://host:8000/"), "http://host:8000/api/detect-person");
    }
}
