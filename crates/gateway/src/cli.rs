use clap::{Parser, Subcommand};

/// lingoloop — event-driven exercise generation pipeline.
#[derive(Debug, Parser)]
#[command(name = "lingoloop", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP surface, class monitor, and transcript worker together
    /// in one process. The default when no subcommand is given.
    Serve,
    /// Run only the class monitor polling loop.
    Monitor,
    /// Run only the transcript worker polling loop.
    Worker,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses_with_none_command() {
        let cli = Cli::parse_from(["lingoloop"]);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn explicit_subcommands_parse() {
        assert_eq!(Cli::parse_from(["lingoloop", "monitor"]).command, Some(Command::Monitor));
        assert_eq!(Cli::parse_from(["lingoloop", "worker"]).command, Some(Command::Worker));
        assert_eq!(Cli::parse_from(["lingoloop", "serve"]).command, Some(Command::Serve));
    }
}
