//! `sessiongate` — drive the session layer against a live API from a
//! terminal. Credentials persist between invocations in the configured
//! credential file.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::io::BufRead;
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};

    use sessiongate_auth::{Action, explain_permission, role_color};
    use sessiongate_client::{
        ClientConfig, GuardOutcome, MenuResolver, Navigator, Redirect, Registration, RouteGuard,
        RouteRequirement, SessionManager,
    };

    #[derive(Parser)]
    #[command(name = "sessiongate")]
    #[command(about = "Sign in, inspect roles and menus, and check route access")]
    struct Args {
        /// API base URL (overrides SESSIONGATE_API_URL)
        #[arg(long)]
        api_url: Option<String>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Sign in and store the credential pair
        Login {
            username: String,
            /// Read from stdin when omitted
            #[arg(long)]
            password: Option<String>,
        },
        /// Create an account and sign in
        Register {
            username: String,
            email: String,
            #[arg(long)]
            password: Option<String>,
            #[arg(long)]
            first_name: Option<String>,
            #[arg(long)]
            last_name: Option<String>,
        },
        /// Show the signed-in user as the server sees it now
        Whoami,
        /// Show the navigation tree and feature flags
        Menu,
        /// Run the route guard for a path
        Check {
            path: String,
            #[arg(long)]
            role: Option<String>,
        },
        /// Explain whether the signed-in user holds a permission
        Can { resource: String, action: String },
        /// Sign out locally and notify the server
        Logout {
            /// Revoke every session of this user
            #[arg(long)]
            all: bool,
        },
    }

    struct PrintNavigator;

    impl Navigator for PrintNavigator {
        fn navigate(&self, redirect: &Redirect, location: &str) {
            match redirect {
                Redirect::Login { .. } => println!("redirect (sign-in required): {location}"),
                Redirect::AccessDenied { required_role } => {
                    println!("redirect (role '{required_role}' required): {location}")
                }
            }
        }
    }

    pub async fn run() -> Result<()> {
        sessiongate_observability::init();
        let args = Args::parse();

        let mut config = ClientConfig::from_env();
        if let Some(url) = args.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        let session = Arc::new(SessionManager::from_config(config).context("failed to set up session")?);

        match args.command {
            Command::Login { username, password } => {
                let password = password_or_stdin(password)?;
                let user = session.login(&username, &password).await?;
                println!("signed in as {} ({})", user.display_name(), user.username);
            }
            Command::Register {
                username,
                email,
                password,
                first_name,
                last_name,
            } => {
                let password = password_or_stdin(password)?;
                let mut profile = Registration::new(username, email, password);
                profile.first_name = first_name;
                profile.last_name = last_name;
                let user = session.register(&profile).await?;
                println!("registered and signed in as {}", user.username);
            }
            Command::Whoami => {
                let user = session.current_user().await?;
                println!("{} <{}>", user.display_name(), user.email);
                println!("active: {}", user.is_active);
                for role in &user.roles {
                    println!("  {} [{}]", role.name, role_color(&role.name).as_str());
                }
            }
            Command::Menu => {
                let access = MenuResolver::new(session).menu_access().await?;
                for node in access.visible_menus() {
                    println!("{:<24} {}", node.label, node.path);
                    for child in &node.children {
                        println!("  {:<22} {}", child.label, child.path);
                    }
                }
                println!("features: {}", serde_json::to_string(&access.features)?);
            }
            Command::Check { path, role } => {
                let route = match role {
                    Some(role) => RouteRequirement::role(path, role),
                    None => RouteRequirement::authenticated(path),
                };
                let guard = RouteGuard::new(session, Arc::new(PrintNavigator));
                match guard.check(&route).await {
                    GuardOutcome::Authorized(_) => println!("authorized: {}", route.path),
                    other => tracing::debug!(?other, "route refused"),
                }
            }
            Command::Can { resource, action } => {
                let user = session.current_user().await?;
                let explanation = explain_permission(&resource, &Action::from(action.as_str()), Some(&user));
                println!("{}", serde_json::to_string_pretty(&explanation)?);
            }
            Command::Logout { all } => {
                if all {
                    session.logout_all().await;
                } else {
                    session.logout().await;
                }
                println!("signed out");
            }
        }

        Ok(())
    }

    fn password_or_stdin(password: Option<String>) -> Result<String> {
        if let Some(password) = password {
            return Ok(password);
        }
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read password from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
