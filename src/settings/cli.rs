use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Token lifecycle and access-control API")]
pub struct Cli {
    /// Path to a settings TOML file.
    #[arg(long)]
    pub settings: Option<String>,
}
