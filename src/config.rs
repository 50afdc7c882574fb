use clap::Parser;

// CLI argument structure - every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "saathi-gateway")]
#[command(about = "Rate limited legal assistant chat gateway in front of Gemini")]
pub struct Args {
    // Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    // Gemini API key; chat answers API_NOT_CONFIGURED without it
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = "https://generativelanguage.googleapis.com")]
    pub gemini_base_url: String,

    #[arg(long, env = "MAX_TOKENS", default_value_t = 500)]
    pub max_tokens: u32,

    #[arg(long, env = "TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,

    // Rate limit max requests per window, per client
    #[arg(long, env = "RATE_LIMIT_REQUESTS", default_value_t = 3)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // How often idle rate limit windows are evicted, in seconds
    #[arg(long, env = "RATE_LIMIT_SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval: u64,

    // Pending upstream calls before chat requests wait for room
    #[arg(long, env = "QUEUE_SIZE", default_value_t = 100)]
    pub queue_size: usize,

    // Messages kept per conversation
    #[arg(long, env = "HISTORY_LIMIT", default_value_t = 20)]
    pub history_limit: usize,
}
