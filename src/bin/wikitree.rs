// Usage: wikitree -k key [-f 'fields'] [-b bioFormat] [-r]
use wikitree_api::cli::{self, USAGE};
use wikitree_api::logging::init_tracing;
use wikitree_api::{Config, WikiTreeClient};

#[tokio::main]
async fn main() {
    init_tracing();

    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            println!("{err}\n\n{USAGE}");
            return;
        }
    };
    if args.help {
        println!("{USAGE}");
        return;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            println!("{err}");
            return;
        }
    };
    let client = match WikiTreeClient::from_config(&config) {
        Ok(client) => client,
        Err(err) => {
            println!("{}", wikitree_api::ApiError::from(err));
            return;
        }
    };

    let session = match cli::resolve_session(&args, &config, &client).await {
        Ok(session) => session,
        Err(err) => {
            println!("{err}");
            return;
        }
    };
    if args.logout {
        println!("Session cleared.");
        return;
    }
    if let Some(session) = &session {
        tracing::info!(user = %session.user_name, "using stored session");
    }

    println!("{}", cli::run(&args, &client, session.as_ref()).await);
}
