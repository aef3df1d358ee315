use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, TemplateArgs};
use config::Config;

use promptr::{
    ChatClient, MockChatClient, OpenAiClient, PromptTemplate, RenderedMessage, bindings,
    create_stream_channel,
};

/// Log to a file under the local data directory. The filter comes from
/// RUST_LOG when set, otherwise from the config's `log_level`.
fn setup_logging(config: &Config) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("promptr.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let env = env_logger::Env::default().default_filter_or(config.log_filter());
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Render { template } => handle_render(template),
        Commands::Invoke { template } => handle_invoke(template, config).await,
        Commands::Stream { template } => handle_stream(template, config).await,
        Commands::Demo { live } => handle_demo(*live, config).await,
    }
}

fn handle_render(args: &TemplateArgs) -> Result<()> {
    let template = args.to_template()?;
    let messages = template.render(&args.to_bindings())?;
    print_messages(&messages);
    Ok(())
}

async fn handle_invoke(args: &TemplateArgs, config: &Config) -> Result<()> {
    let template = args.to_template()?;
    let messages = template.render(&args.to_bindings())?;
    print_messages(&messages);

    let client = OpenAiClient::new(config.to_openai_config())?;
    info!("Invoking model {}", client.model());

    let response = client.invoke(&messages).await?;
    println!("\n{}", response.content);
    info!(
        "Completed: {} prompt tokens, {} completion tokens",
        response.usage.prompt_tokens, response.usage.completion_tokens
    );
    Ok(())
}

async fn handle_stream(args: &TemplateArgs, config: &Config) -> Result<()> {
    let template = args.to_template()?;
    let messages = template.render(&args.to_bindings())?;
    print_messages(&messages);
    println!();

    let client = OpenAiClient::new(config.to_openai_config())?;
    let text = stream_to_stdout(&client, &messages).await?;
    info!("Streamed {} chars", text.len());
    Ok(())
}

/// Stream a response, printing each fragment as it arrives, and return
/// the aggregated text.
async fn stream_to_stdout(client: &dyn ChatClient, messages: &[RenderedMessage]) -> Result<String> {
    let (tx, mut handle) = create_stream_channel(32);

    let (stream_result, collected) = tokio::join!(
        client.stream(messages, tx),
        handle.forward(|fragment| {
            print!("{}", fragment);
            let _ = std::io::stdout().flush();
        })
    );
    stream_result?;
    let text = collected?;
    println!();
    Ok(text)
}

fn print_messages(messages: &[RenderedMessage]) {
    for message in messages {
        println!("{} {}", format!("{}:", message.role).cyan().bold(), message.content);
    }
}

// Scripted walkthrough of the template features, offline against the mock
// client unless --live

async fn handle_demo(live: bool, config: &Config) -> Result<()> {
    demo_basic(live, config).await?;
    demo_multi_variable(live, config).await?;
    demo_partial(live, config).await?;
    demo_conversation(live, config).await?;
    demo_streaming(live, config).await?;
    println!("\n{}", "All demos complete".green().bold());
    Ok(())
}

fn demo_client(live: bool, config: &Config, canned: &str) -> Result<Box<dyn ChatClient>> {
    if live {
        Ok(Box::new(OpenAiClient::new(config.to_openai_config())?))
    } else {
        Ok(Box::new(MockChatClient::new(canned)))
    }
}

fn demo_heading(title: &str) {
    println!("\n{}", format!("== {} ==", title).bold());
}

async fn demo_basic(live: bool, config: &Config) -> Result<()> {
    demo_heading("Basic template");

    let template = PromptTemplate::from_messages([
        ("system", "You are a helpful assistant."),
        ("human", "Answer this question: {question}"),
    ])?;

    let messages = template.render(&bindings([("question", "What is a prompt template?")]))?;
    print_messages(&messages);

    let client = demo_client(live, config, "A prompt template is a reusable message layout.")?;
    let response = client.invoke(&messages).await?;
    println!("\n{}", response.content);
    Ok(())
}

async fn demo_multi_variable(live: bool, config: &Config) -> Result<()> {
    demo_heading("Multiple variables");

    let template = PromptTemplate::from_messages([
        ("system", "You are a {role} helping users with {task}."),
        ("human", "Explain {topic} in a {style} way."),
    ])?;

    let messages = template.render(&bindings([
        ("role", "programming tutor"),
        ("task", "learning Rust"),
        ("topic", "ownership"),
        ("style", "beginner-friendly"),
    ]))?;
    print_messages(&messages);

    let client = demo_client(live, config, "Ownership means each value has one owner.")?;
    let response = client.invoke(&messages).await?;
    println!("\n{}", response.content);
    Ok(())
}

async fn demo_partial(live: bool, config: &Config) -> Result<()> {
    demo_heading("Partial application");

    let template = PromptTemplate::from_messages([
        ("system", "You are a {role} specializing in {domain}."),
        ("human", "Please {task}: {content}"),
    ])?;

    // Pre-bind the persona; only the request varies per call
    let consultant = template.partial(bindings([
        ("role", "technical consultant"),
        ("domain", "software development"),
    ]));
    println!(
        "pre-bound: role, domain; remaining: {}",
        consultant.input_variables()?.join(", ")
    );

    let messages = consultant.render(&bindings([
        ("task", "review this design"),
        ("content", "a prompt template library"),
    ]))?;
    print_messages(&messages);

    let client = demo_client(live, config, "The design separates rendering from transport.")?;
    let response = client.invoke(&messages).await?;
    println!("\n{}", response.content);
    Ok(())
}

/// A multi-turn exchange where the prior assistant reply is itself a
/// templated message
fn conversation_template() -> Result<PromptTemplate> {
    Ok(PromptTemplate::from_messages([
        ("system", "You are a {character}. Stay in character."),
        ("human", "{previous_question}"),
        ("assistant", "{previous_answer}"),
        ("human", "{current_question}"),
    ])?)
}

async fn demo_conversation(live: bool, config: &Config) -> Result<()> {
    demo_heading("Multi-turn conversation");

    let template = conversation_template()?;
    let messages = template.render(&bindings([
        ("character", "friendly librarian"),
        ("previous_question", "Can you recommend a history book?"),
        ("previous_answer", "Try 'A Short History of Nearly Everything'."),
        ("current_question", "Anything similar, but about mathematics?"),
    ]))?;
    print_messages(&messages);

    let client = demo_client(live, config, "You might enjoy 'The Joy of x'.")?;
    let response = client.invoke(&messages).await?;
    println!("\n{}", response.content);
    Ok(())
}

async fn demo_streaming(live: bool, config: &Config) -> Result<()> {
    demo_heading("Streaming");

    let template = PromptTemplate::from_messages([
        ("system", "You are a creative writing assistant."),
        ("human", "Write a {length} story about {theme}."),
    ])?;

    let messages = template.render(&bindings([
        ("length", "very short"),
        ("theme", "a machine that writes prompts"),
    ]))?;
    print_messages(&messages);
    println!();

    let client = demo_client(
        live,
        config,
        "Once there was a machine that filled in every blank it found.",
    )?;
    stream_to_stdout(client.as_ref(), &messages).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    setup_logging(&config)?;
    run_application(&cli, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptr::Role;

    #[test]
    fn test_conversation_template_has_assistant_turn() {
        let template = conversation_template().unwrap();
        let roles: Vec<Role> = template.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Human, Role::Assistant, Role::Human]);
    }

    #[tokio::test]
    async fn test_demo_conversation_runs_offline() {
        let config = Config::default();
        demo_conversation(false, &config).await.unwrap();
    }
}
