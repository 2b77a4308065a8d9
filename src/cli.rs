// Command-line front end: one profile lookup per invocation.
use thiserror::Error;
use tracing::warn;

use crate::api::WikiTreeClient;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::render::{pretty_json, render_html, render_js_example, render_text};
use crate::request::{ACTION_GET_PROFILE, ProfileQuery};
use crate::session::{Session, SessionStore};

pub const USAGE: &str = "\
Usage: wikitree -k key [-f fields] [-b bioFormat] [-r] [options]

  -k, --key KEY          WikiTree ID or user id of the profile to retrieve
  -f, --fields LIST      comma-separated list of fields to retrieve
  -b, --bio-format FMT   bio format: html, wiki or both
  -r, --resolve-redirect follow redirected profiles
  -a, --action NAME      API action (default getProfile)
      --html             print the reply as an HTML table
      --json             print the reply as indented JSON
      --example          print a JavaScript example of the request and exit
      --login            log in with LOGIN_EMAIL/LOGIN_PASSWORD and keep the session
      --logout           forget the stored session
  -h, --help             show this help
";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Html,
    Example,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    pub query: ProfileQuery,
    pub action: String,
    pub output: OutputFormat,
    pub login: bool,
    pub logout: bool,
    pub help: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            query: ProfileQuery::default(),
            action: ACTION_GET_PROFILE.to_string(),
            output: OutputFormat::default(),
            login: false,
            logout: false,
            help: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseArgsError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("unknown argument: {0}")]
    Unknown(String),
}

/// Parses arguments (without the program name). Short options accept their
/// value attached (`-kShoshone-1`) or as the next argument.
pub fn parse_args<I>(args: I) -> Result<CliArgs, ParseArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let (flag, attached) = split_short(&arg);
        let mut value = |name: &str| -> Result<String, ParseArgsError> {
            match &attached {
                Some(v) => Ok(v.clone()),
                None => args
                    .next()
                    .ok_or_else(|| ParseArgsError::MissingValue(name.to_string())),
            }
        };
        match flag.as_str() {
            "-k" | "--key" => parsed.query.key = value(&flag)?,
            "-f" | "--fields" => parsed.query.fields = value(&flag)?,
            "-b" | "--bio-format" => parsed.query.bio_format = value(&flag)?,
            "-a" | "--action" => parsed.action = value(&flag)?,
            "-r" | "--resolve-redirect" if attached.is_none() => parsed.query.resolve_redirect = true,
            "--html" => parsed.output = OutputFormat::Html,
            "--json" => parsed.output = OutputFormat::Json,
            "--example" => parsed.output = OutputFormat::Example,
            "--login" => parsed.login = true,
            "--logout" => parsed.logout = true,
            "-h" | "--help" => parsed.help = true,
            _ => return Err(ParseArgsError::Unknown(arg)),
        }
    }

    Ok(parsed)
}

// "-kvalue" -> ("-k", Some("value")); anything else is returned whole.
fn split_short(arg: &str) -> (String, Option<String>) {
    if arg.len() > 2 && arg.starts_with('-') && !arg.starts_with("--") && arg.is_char_boundary(2) {
        (arg[..2].to_string(), Some(arg[2..].to_string()))
    } else {
        (arg.to_string(), None)
    }
}

/// Applies `--login` / `--logout`, otherwise reuses a stored session if one exists.
pub async fn resolve_session(
    args: &CliArgs,
    config: &Config,
    client: &WikiTreeClient,
) -> ApiResult<Option<Session>> {
    let store = config.session_store()?;
    if args.logout {
        store.clear()?;
        return Ok(None);
    }
    if args.login {
        let (email, password) = config.credentials().ok_or_else(|| {
            ApiError::Config("--login needs LOGIN_EMAIL and LOGIN_PASSWORD".to_string())
        })?;
        let session = client.authenticate(email, password).await?;
        store.save(&session)?;
        return Ok(Some(session));
    }
    Ok(load_quietly(&store))
}

/// Stored session, or `None` with a warning when the file cannot be read.
pub fn load_quietly(store: &SessionStore) -> Option<Session> {
    match store.load() {
        Ok(session) => session,
        Err(err) => {
            warn!(path = %store.path().display(), error = %err, "ignoring unreadable session file");
            None
        }
    }
}

/// Performs the lookup and returns what should be printed. Failures come back
/// as their message; the process still exits normally.
pub async fn run(args: &CliArgs, client: &WikiTreeClient, session: Option<&Session>) -> String {
    if args.output == OutputFormat::Example {
        return render_js_example(client.endpoint(), &args.query.to_request(&args.action));
    }

    match client.profile_call(&args.action, &args.query, session).await {
        Ok(json) => match args.output {
            OutputFormat::Html => render_html(&json),
            OutputFormat::Json => pretty_json(&json),
            OutputFormat::Text | OutputFormat::Example => render_text(&json),
        },
        Err(err) => err.to_string(),
    }
}
