//! Command-line parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use legalqa_core::ViewId;

pub const USAGE: &str = "\
Usage: legalqa [--ephemeral] <command> [args]

Commands:
  login                      Sign in (prompts for username and password)
  register                   Create an account and sign in
  logout                     Forget the stored session
  whoami                     Show the signed-in user
  ask <question...>          Ask a legal question
  add-url <url>              Ingest a web page or PDF by URL
  upload <file>...           Upload documents for ingestion
  metrics                    Show usage monitoring
  drift [--from <unix>] [--to <unix>]
                             Compare production and shadow answers
  open <path>                Show what the access guard decides for a route

Options:
  --ephemeral                Keep the session in memory only
";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login,
    Register,
    Logout,
    WhoAmI,
    Ask(String),
    AddUrl(String),
    Upload(Vec<PathBuf>),
    Metrics,
    Drift {
        from: Option<i64>,
        to: Option<i64>,
    },
    Open(String),
    Help,
}

impl Command {
    /// The view a command renders, if it is gated at all
    pub fn view(&self) -> Option<ViewId> {
        match self {
            Command::Login => Some(ViewId::Login),
            Command::Register => Some(ViewId::Register),
            Command::Ask(_) => Some(ViewId::Ask),
            Command::AddUrl(_) | Command::Upload(_) | Command::Drift { .. } => {
                Some(ViewId::Dashboard)
            }
            Command::Metrics => Some(ViewId::Monitoring),
            Command::Logout | Command::WhoAmI | Command::Open(_) | Command::Help => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub ephemeral: bool,
    pub command: Command,
}

/// Parse arguments, excluding the program name
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut ephemeral = false;
    let mut rest = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--ephemeral" => ephemeral = true,
            _ => rest.push(arg.as_str()),
        }
    }

    let Some((name, params)) = rest.split_first() else {
        return Ok(Invocation {
            ephemeral,
            command: Command::Help,
        });
    };

    let command = match *name {
        "login" => Command::Login,
        "register" => Command::Register,
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,
        "metrics" => Command::Metrics,
        "help" | "--help" | "-h" => Command::Help,
        "ask" => {
            let question = params.join(" ");
            if question.trim().is_empty() {
                bail!("ask needs a question");
            }
            Command::Ask(question)
        }
        "add-url" => match params {
            [url] => Command::AddUrl(url.to_string()),
            _ => bail!("add-url takes exactly one URL"),
        },
        "upload" => {
            if params.is_empty() {
                bail!("upload needs at least one file");
            }
            Command::Upload(params.iter().map(PathBuf::from).collect())
        }
        "drift" => parse_drift(params)?,
        "open" => match params {
            [path] => Command::Open(path.to_string()),
            _ => bail!("open takes exactly one route path"),
        },
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    };

    Ok(Invocation { ephemeral, command })
}

fn parse_drift(params: &[&str]) -> Result<Command> {
    let mut from = None;
    let mut to = None;
    let mut iter = params.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("{} needs a unix timestamp", flag))?;
        let parsed: i64 = value
            .parse()
            .with_context(|| format!("'{}' is not a unix timestamp", value))?;
        match *flag {
            "--from" => from = Some(parsed),
            "--to" => to = Some(parsed),
            other => bail!("Unknown drift option '{}'", other),
        }
    }
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            bail!("--from must not be after --to");
        }
    }
    Ok(Command::Drift { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_is_help() {
        let parsed = parse_args(&[]).expect("parses");
        assert_eq!(parsed.command, Command::Help);
        assert!(!parsed.ephemeral);
    }

    #[test]
    fn test_ask_joins_words() {
        let parsed = parse_args(&args(&["ask", "What", "is", "tort?"])).expect("parses");
        assert_eq!(parsed.command, Command::Ask("What is tort?".to_string()));
        assert!(parse_args(&args(&["ask"])).is_err());
    }

    #[test]
    fn test_ephemeral_flag_anywhere() {
        let parsed = parse_args(&args(&["login", "--ephemeral"])).expect("parses");
        assert!(parsed.ephemeral);
        assert_eq!(parsed.command, Command::Login);
    }

    #[test]
    fn test_drift_bounds() {
        let parsed = parse_args(&args(&["drift", "--from", "10", "--to", "20"])).expect("parses");
        assert_eq!(
            parsed.command,
            Command::Drift {
                from: Some(10),
                to: Some(20)
            }
        );
        assert!(parse_args(&args(&["drift", "--from"])).is_err());
        assert!(parse_args(&args(&["drift", "--from", "soon"])).is_err());
        assert!(parse_args(&args(&["drift", "--from", "20", "--to", "10"])).is_err());
    }

    #[test]
    fn test_commands_map_to_views() {
        assert_eq!(Command::Metrics.view(), Some(ViewId::Monitoring));
        assert_eq!(Command::AddUrl("u".to_string()).view(), Some(ViewId::Dashboard));
        assert_eq!(Command::Ask("q".to_string()).view(), Some(ViewId::Ask));
        assert_eq!(Command::Logout.view(), None);
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }
}
