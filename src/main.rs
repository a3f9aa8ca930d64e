use clap::{Parser, Subcommand};
use imgpress::imaging::{ImageBackend, RustBackend};
use imgpress::pipeline::Pipeline;
use imgpress::query::RawParams;
use imgpress::upload::UploadedFile;
use imgpress::{config, output, server};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            concat!(env!("CARGO_PKG_VERSION"), "-dev")
        } else {
            // Small leak per call; only called at startup
            Box::leak(format!("{}-dev@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgpress")]
#[command(about = "Image transformation service: validate, resize, re-encode")]
#[command(long_about = "\
Image transformation service: validate, resize, re-encode

Upload an image to POST /process as multipart field `image` and control the
transform with query parameters:

  width=N     fit inside N pixels wide (never enlarges)
  height=N    fit inside N pixels tall (never enlarges)
  quality=N   encoder quality, 1-100 (default 80)
  format=F    jpeg | jpg | png | webp (default: keep the input format)

Example:

  curl -F image=@photo.png 'http://localhost:3000/process?width=300&format=webp'

The `transform` command runs the same pipeline on a local file.

Run 'imgpress gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Service config file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Transform parameters, mirroring the HTTP query string.
#[derive(clap::Args, Clone)]
struct TransformArgs {
    /// Bounding-box width in pixels
    #[arg(long)]
    width: Option<String>,
    /// Bounding-box height in pixels
    #[arg(long)]
    height: Option<String>,
    /// Encoder quality (1-100)
    #[arg(long)]
    quality: Option<String>,
    /// Output format: jpeg, jpg, png, webp
    #[arg(long)]
    format: Option<String>,
}

impl From<TransformArgs> for RawParams {
    fn from(args: TransformArgs) -> Self {
        RawParams {
            width: args.width,
            height: args.height,
            quality: args.quality,
            format: args.format,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Listen port (replaces the port in server.bind)
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Transform a local image file through the processing pipeline
    Transform {
        /// Image to transform
        input: PathBuf,
        #[command(flatten)]
        params: TransformArgs,
        /// Where to write the result (default: <stem>.processed.<ext> next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print the JSON response payload instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port } => {
            let service_config = config::load_config(cli.config.as_deref())?;
            init_logging(&service_config.logging);

            let mut addr = service_config.bind_addr()?;
            if let Some(port) = port {
                addr.set_port(port);
            }

            let pipeline = Pipeline::new(service_config.pipeline_config());
            let state = server::AppState::new(pipeline, version_string());
            let app = server::router(state, service_config.limits.max_request_bytes as usize);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, version = version_string(), "Server listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            tracing::info!("Server stopped");
        }
        Command::Transform {
            input,
            params,
            output: output_path,
            json,
        } => {
            let service_config = config::load_config(cli.config.as_deref())?;
            init_logging(&service_config.logging);

            let file = read_upload(&input)?;
            let original = RustBackend::new()
                .identify(&file.content)
                .ok()
                .map(|info| info.dimensions);
            let raw = RawParams::from(params);
            let pipeline = Pipeline::new(service_config.pipeline_config());

            match pipeline.run(Some(file), &raw) {
                Ok(processed) => {
                    let output_path = output_path.unwrap_or_else(|| {
                        default_output_path(&input, processed.result.output_format.extension())
                    });
                    std::fs::write(&output_path, &processed.result.encoded_bytes)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&processed.to_response())?);
                    } else {
                        output::print_transform_output(&processed, original, &output_path);
                    }
                }
                Err(err) => {
                    output::print_error(&err);
                    std::process::exit(1);
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the config level.
fn init_logging(logging: &config::LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Build an upload from a local file. The media type is guessed from the extension.
fn read_upload(path: &Path) -> std::io::Result<UploadedFile> {
    let content = std::fs::read(path)?;
    let media_type = image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedFile::new(name, media_type, content))
}

/// `photos/cat.png` + `webp` → `photos/cat.processed.webp`
fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}.processed.{extension}"))
}
