//! `hrsync config` command implementation

use colored::Colorize;

use crate::config::ClientConfig;
use crate::error::Result;

/// Show the resolved configuration
pub async fn show(config: &ClientConfig) -> Result<()> {
    println!("{}", "hrsync Configuration:".cyan().bold());
    println!();
    for (key, value) in config.display_rows() {
        println!("{:<22} {}", format!("{}:", key), value);
    }
    println!();
    println!("{}", "Environment Variables:".cyan());
    for (key, _) in config.display_rows() {
        println!("  {}", format_env_var(key));
    }

    Ok(())
}

/// Format config key as environment variable name
fn format_env_var(key: &str) -> String {
    format!("HRSYNC_{}", key.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_env_var() {
        assert_eq!(format_env_var("batch_size"), "HRSYNC_BATCH_SIZE");
        assert_eq!(format_env_var("token_url"), "HRSYNC_TOKEN_URL");
    }
}
