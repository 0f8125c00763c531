use clap::Args;

use crate::auth::TokenAuthority;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Audience claim (defaults to JWT_AUDIENCE)")]
    pub audience: Option<String>,
}

pub fn handle(args: TokenArgs, config: &AppConfig) -> anyhow::Result<()> {
    let authority = TokenAuthority::from_config(&config.security);
    let audience = args
        .audience
        .unwrap_or_else(|| authority.audience().to_string());

    let token = authority.issue_for(&audience)?;
    println!("{}", token);
    Ok(())
}
