use anyhow::{Context as _, Result};

use super::Context;

pub fn login(ctx: &Context, token: String) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token must not be empty");
    }

    ctx.session
        .login(token)
        .context("Failed to store credentials")?;
    println!("✓ Logged in to {}", ctx.api.config().origin());
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.session
        .logout()
        .context("Failed to remove stored credentials")?;
    println!("✓ Logged out");
    Ok(())
}
