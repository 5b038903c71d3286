use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Subcommand;
use dialoguer::{Input, Password};
use isirt_auth::{google_login_url, validate_redirect_uri};
use isirt_schema::User;

use crate::context::AppContext;
use crate::output::render;

#[derive(Subcommand)]
pub enum GoogleCommands {
    #[command(about = "Print the browser URL that starts Google sign-in")]
    Url,
    #[command(about = "Exchange an authorization code for a session")]
    Exchange {
        #[arg(help = "Authorization code returned to the redirect URI")]
        code: String,
        #[arg(long, help = "Redirect URI registered for this client")]
        redirect_uri: String,
        #[arg(long = "allow-origin", help = "Extra origin accepted for the redirect URI")]
        allowed_origins: Vec<String>,
    },
}

pub async fn login(ctx: &AppContext, username: Option<String>, password_stdin: bool) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("failed to read email")?,
    };
    let password = if password_stdin {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read password from stdin")?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        Password::new()
            .with_prompt("Password")
            .allow_empty_password(false)
            .interact()
            .context("failed to read password")?
    };

    let user = ctx.session.login(username.trim(), &password).await?;
    ctx.persist_session(&user)?;
    println!("Signed in to {} as {} ({}).", ctx.origin(), user.username, user.role);
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout().await;
    ctx.forget_session()?;
    println!("Signed out of {}.", ctx.origin());
    Ok(())
}

pub fn whoami(ctx: &AppContext, user: &User) -> Result<()> {
    render(ctx.json, user, |user| {
        println!("{} (id {})", user.username, user.id);
        println!("role:   {}", user.role);
        println!("active: {}", user.is_active);
        println!("server: {}", ctx.origin());
    })
}

pub async fn google(ctx: &AppContext, cmd: GoogleCommands) -> Result<()> {
    match cmd {
        GoogleCommands::Url => {
            println!("{}", google_login_url(&ctx.origin()));
        }
        GoogleCommands::Exchange {
            code,
            redirect_uri,
            mut allowed_origins,
        } => {
            allowed_origins.push(ctx.origin());
            validate_redirect_uri(&redirect_uri, &allowed_origins)?;

            let profile = ctx.client().exchange_google_code(&code, &redirect_uri).await?;
            let user = User::from(profile);
            ctx.persist_session(&user)?;
            println!("Signed in to {} as {} ({}).", ctx.origin(), user.username, user.role);
        }
    }
    Ok(())
}
