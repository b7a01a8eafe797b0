use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tts_batch::config::{DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};
use tts_batch::engines::google::{
    Credentials, GoogleInferenceParams, GoogleTtsClient, GoogleTtsEngine, DEFAULT_ENDPOINT,
    DEFAULT_LANGUAGE, DEFAULT_VOICE,
};
use tts_batch::{AudioEncoding, BatchConfigBuilder, BatchConverter, ConsoleProgress};

/// Exit code when `--strict` is set and at least one key failed.
const EXIT_KEYS_FAILED: u8 = 2;

const NO_CREDENTIALS: &str =
    "No credentials: set GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN (or pass --api-key / --access-token)";

/// Convert a JSON map of phrases into one speech audio file per key.
#[derive(Parser, Debug)]
#[command(name = "tts-batch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON object mapping output file names to the text to speak
    #[arg(default_value = DEFAULT_INPUT, env = "TTS_INPUT")]
    input: PathBuf,

    /// Directory that receives `<key>.<ext>` files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "TTS_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// BCP-47 language code
    #[arg(short, long, default_value = DEFAULT_LANGUAGE, env = "TTS_LANGUAGE")]
    language: String,

    /// Voice name (empty string lets the service choose)
    #[arg(long, default_value = DEFAULT_VOICE, env = "TTS_VOICE")]
    voice: String,

    /// Audio encoding: LINEAR16, MP3, OGG_OPUS, MULAW or ALAW
    #[arg(short, long, default_value = "LINEAR16", env = "TTS_ENCODING")]
    encoding: AudioEncoding,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 24000, env = "TTS_SAMPLE_RATE")]
    sample_rate: u32,

    /// Speaking rate multiplier (0.25 - 4.0)
    #[arg(long)]
    speaking_rate: Option<f32>,

    /// Regenerate files that already exist
    #[arg(short, long)]
    force: bool,

    /// Exit with code 2 if any key failed
    #[arg(long)]
    strict: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Text-to-Speech REST endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "TTS_ENDPOINT")]
    endpoint: String,

    /// Google Cloud API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth access token, used when no API key is set
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// List voices for the language and exit
    #[arg(long)]
    list_voices: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    // Load env files before parsing so clap sees their values (silently ignore if missing)
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (api_key, access_token) = (cli.api_key.as_deref(), cli.access_token.as_deref());
    let credentials = Credentials::from_options(api_key, access_token).ok_or(NO_CREDENTIALS)?;
    let client = GoogleTtsClient::with_options(
        credentials,
        cli.endpoint,
        Duration::from_secs(cli.timeout_secs),
    )?;

    let params = GoogleInferenceParams {
        language_code: cli.language,
        voice_name: Some(cli.voice).filter(|v| !v.trim().is_empty()),
        encoding: cli.encoding,
        sample_rate_hertz: cli.sample_rate,
        speaking_rate: cli.speaking_rate,
    };
    let engine = GoogleTtsEngine::with_params(client, params);

    if cli.list_voices {
        let voices = engine.list_voices()?;
        for voice in &voices {
            println!(
                "{:<32} {:<8} {} Hz",
                voice.name,
                voice.ssml_gender.as_deref().unwrap_or("-"),
                voice.natural_sample_rate_hertz.unwrap_or_default()
            );
        }
        log::info!("{} voices for {}", voices.len(), engine.params().language_code);
        return Ok(ExitCode::SUCCESS);
    }

    let config = BatchConfigBuilder::default()
        .input(cli.input)
        .output_dir(cli.output_dir)
        .overwrite(cli.force)
        .build()?;

    println!(
        "Converting text to speech ({}, {})...",
        engine.params().language_code,
        engine.params().voice_name.as_deref().unwrap_or("default voice")
    );
    let mut converter = BatchConverter::new(engine, config);
    let report = converter.run_input(&mut ConsoleProgress::stdout())?;

    if cli.strict && report.summary.failed > 0 {
        return Ok(ExitCode::from(EXIT_KEYS_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}
