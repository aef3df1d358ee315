//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - render: format a template and print the messages
//! - invoke: render a template and request a completion
//! - stream: render a template and stream the response
//! - demo: scripted walkthrough of the template features

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use promptr::{Bindings, PromptTemplate, Result};

/// promptr - chat prompt templates with partial application
#[derive(Parser, Debug)]
#[command(name = "promptr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a template and print the messages without calling a model
    Render {
        #[command(flatten)]
        template: TemplateArgs,
    },

    /// Render a template and request a completion
    Invoke {
        #[command(flatten)]
        template: TemplateArgs,
    },

    /// Render a template and stream the response fragment by fragment
    Stream {
        #[command(flatten)]
        template: TemplateArgs,
    },

    /// Run the scripted template walkthrough
    Demo {
        /// Call the configured endpoint instead of the offline mock
        #[arg(long)]
        live: bool,
    },
}

/// Template and binding arguments shared by render/invoke/stream
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// System message template
    #[arg(short, long, conflicts_with = "messages")]
    pub system: Option<String>,

    /// Human message template (repeatable, in order)
    #[arg(
        short = 'u',
        long = "human",
        required_unless_present = "messages",
        conflicts_with = "messages"
    )]
    pub human: Vec<String>,

    /// Message template as role=text (repeatable, in order; roles:
    /// system, human/user, assistant). Use for multi-turn conversations
    /// with assistant messages.
    #[arg(short = 'm', long = "message", value_parser = parse_message)]
    pub messages: Vec<(String, String)>,

    /// Variable binding as key=value (repeatable)
    #[arg(long = "var", value_parser = parse_binding)]
    pub vars: Vec<(String, String)>,
}

impl TemplateArgs {
    /// Build the prompt template. With --message, the role-tagged entries
    /// are used verbatim in the given order; otherwise the system message
    /// comes first if given, then the human messages in order.
    pub fn to_template(&self) -> Result<PromptTemplate> {
        if !self.messages.is_empty() {
            return PromptTemplate::from_messages(
                self.messages.iter().map(|(role, text)| (role.as_str(), text.clone())),
            );
        }

        let mut entries: Vec<(&str, String)> = Vec::new();
        if let Some(system) = &self.system {
            entries.push(("system", system.clone()));
        }
        for human in &self.human {
            entries.push(("human", human.clone()));
        }
        PromptTemplate::from_messages(entries)
    }

    /// Collect the --var pairs into a bindings map
    pub fn to_bindings(&self) -> Bindings {
        self.vars.iter().cloned().collect()
    }
}

/// Parse a `key=value` binding argument
fn parse_binding(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", arg)),
    }
}

/// Parse a `role=text` message argument. Role validity is checked when
/// the template is built.
fn parse_message(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((role, text)) if !role.is_empty() => Ok((role.to_string(), text.to_string())),
        _ => Err(format!("expected role=text, got '{}'", arg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use promptr::Role;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["promptr"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["promptr", "-v", "render", "-u", "hi"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli =
            Cli::try_parse_from(["promptr", "-c", "/path/to/config.yml", "render", "-u", "hi"])
                .unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/config.yml")));
    }

    #[test]
    fn test_render_command() {
        let cli = Cli::try_parse_from([
            "promptr",
            "render",
            "-s",
            "You are a {role}.",
            "-u",
            "Explain {topic}.",
            "--var",
            "role=tutor",
            "--var",
            "topic=recursion",
        ])
        .unwrap();

        match cli.command {
            Commands::Render { template } => {
                assert_eq!(template.system.as_deref(), Some("You are a {role}."));
                assert_eq!(template.human, vec!["Explain {topic}."]);
                assert_eq!(template.vars.len(), 2);
            }
            _ => panic!("Expected render command"),
        }
    }

    #[test]
    fn test_render_requires_human_message() {
        let result = Cli::try_parse_from(["promptr", "render", "-s", "only system"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_multiple_human_messages_keep_order() {
        let cli =
            Cli::try_parse_from(["promptr", "render", "-u", "first", "-u", "second"]).unwrap();
        match cli.command {
            Commands::Render { template } => {
                assert_eq!(template.human, vec!["first", "second"]);
            }
            _ => panic!("Expected render command"),
        }
    }

    #[test]
    fn test_invoke_command() {
        let cli = Cli::try_parse_from(["promptr", "invoke", "-u", "hello"]).unwrap();
        assert!(matches!(cli.command, Commands::Invoke { .. }));
    }

    #[test]
    fn test_stream_command() {
        let cli = Cli::try_parse_from(["promptr", "stream", "-u", "hello"]).unwrap();
        assert!(matches!(cli.command, Commands::Stream { .. }));
    }

    #[test]
    fn test_demo_command() {
        let cli = Cli::try_parse_from(["promptr", "demo"]).unwrap();
        match cli.command {
            Commands::Demo { live } => assert!(!live),
            _ => panic!("Expected demo command"),
        }
    }

    #[test]
    fn test_demo_live_flag() {
        let cli = Cli::try_parse_from(["promptr", "demo", "--live"]).unwrap();
        match cli.command {
            Commands::Demo { live } => assert!(live),
            _ => panic!("Expected demo command"),
        }
    }

    #[test]
    fn test_message_arg_builds_conversation_with_assistant() {
        let cli = Cli::try_parse_from([
            "promptr",
            "render",
            "-m",
            "system=You are a {character}.",
            "-m",
            "human={previous_question}",
            "-m",
            "assistant={previous_answer}",
            "-m",
            "human={current_question}",
        ])
        .unwrap();

        let Commands::Render { template } = cli.command else {
            panic!("Expected render command");
        };
        let tmpl = template.to_template().unwrap();
        assert_eq!(tmpl.messages().len(), 4);
        assert_eq!(tmpl.messages()[2].role, Role::Assistant);
        assert_eq!(tmpl.messages()[2].text, "{previous_answer}");
    }

    #[test]
    fn test_message_arg_satisfies_human_requirement() {
        let cli = Cli::try_parse_from(["promptr", "render", "-m", "human=hi"]).unwrap();
        assert!(matches!(cli.command, Commands::Render { .. }));
    }

    #[test]
    fn test_message_arg_conflicts_with_human() {
        let result =
            Cli::try_parse_from(["promptr", "render", "-u", "hi", "-m", "assistant=ok"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_message_arg_conflicts_with_system() {
        let result =
            Cli::try_parse_from(["promptr", "render", "-s", "sys", "-m", "human=hi"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_message_arg_invalid_role_rejected_at_build() {
        let cli = Cli::try_parse_from(["promptr", "render", "-m", "narrator=hi"]).unwrap();
        let Commands::Render { template } = cli.command else {
            panic!("Expected render command");
        };
        assert!(template.to_template().is_err());
    }

    #[test]
    fn test_parse_message_rejects_missing_equals() {
        assert!(parse_message("norole").is_err());
        assert!(parse_message("=orphan").is_err());
    }

    #[test]
    fn test_parse_binding_valid() {
        assert_eq!(
            parse_binding("topic=recursion").unwrap(),
            ("topic".to_string(), "recursion".to_string())
        );
    }

    #[test]
    fn test_parse_binding_value_may_contain_equals() {
        assert_eq!(
            parse_binding("eq=a=b").unwrap(),
            ("eq".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn test_parse_binding_rejects_missing_equals() {
        assert!(parse_binding("novalue").is_err());
        assert!(parse_binding("=orphan").is_err());
    }

    #[test]
    fn test_template_args_to_template() {
        let cli = Cli::try_parse_from([
            "promptr", "render", "-s", "sys", "-u", "one", "-u", "two",
        ])
        .unwrap();

        let Commands::Render { template } = cli.command else {
            panic!("Expected render command");
        };
        let tmpl = template.to_template().unwrap();
        assert_eq!(tmpl.messages().len(), 3);
        assert_eq!(tmpl.messages()[0].role, Role::System);
        assert_eq!(tmpl.messages()[1].text, "one");
        assert_eq!(tmpl.messages()[2].text, "two");
    }

    #[test]
    fn test_template_args_to_bindings() {
        let cli = Cli::try_parse_from([
            "promptr", "render", "-u", "{x}", "--var", "x=1", "--var", "y=2",
        ])
        .unwrap();

        let Commands::Render { template } = cli.command else {
            panic!("Expected render command");
        };
        let vars = template.to_bindings();
        assert_eq!(vars.get("x"), Some(&"1".to_string()));
        assert_eq!(vars.get("y"), Some(&"2".to_string()));
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["promptr", "--version"]);
        // Version flag causes early exit with error (expected)
        assert!(result.is_err());
    }
}
