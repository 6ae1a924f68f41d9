//! Genie CLI - binary entry point.
//!
//! The binary is a thin consumer of [`genie_core::Orchestrator`]: it
//! maps arguments onto the settings mutators, drives the generation
//! flows, and prints results. Posts live for the life of the process,
//! so image generation and export happen in the same invocation as the
//! text flow that produced them.

use std::process::ExitCode;

use anyhow::{Result, bail};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use genie_config::{Credentials, GenerationSettings};
use genie_core::{ImageFlowOutcome, Orchestrator, TextFlowOutcome, export_post_as_text};
use genie_types::{OutputLength, PersonaList, Platform};

const USAGE: &str = "\
Usage: genie <command> [options]

Commands:
  plan        Print the settings snapshot, the total planned, and the
              next target
  generate    Generate post text for every planned target

Generate options:
  --one               Generate a single post, then stop
  --images            Request an image for every post whose text resolved
  --export            Print each post's export text after generation

Settings options (both commands):
  --objective <text>        Campaign objective
  --language <text>         Output language
  --persona <text>          Target persona; repeat for several (max 5)
  --platform <name>=<n>     Posts per platform, e.g. instagram=2; repeat
                            for several platforms (unset platforms are
                            deselected once the flag is used)
  --mix                     One post per slot across all personas
  --length <short|medium|long>
  --temperature <0.0..=1.0>
  --custom <text>           Extra instructions for the model
  --avoid <text>            Things the model must avoid
";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Plan,
    Generate {
        one: bool,
        images: bool,
        export: bool,
    },
}

#[derive(Debug, PartialEq)]
struct CliArgs {
    command: Command,
    objective: Option<String>,
    language: Option<String>,
    personas: Vec<String>,
    platforms: Vec<(Platform, u32)>,
    mix: bool,
    length: Option<OutputLength>,
    temperature: Option<f32>,
    custom: Option<String>,
    avoid: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut iter = args.iter();
    let command = match iter.next().map(String::as_str) {
        Some("plan") => Command::Plan,
        Some("generate") => Command::Generate {
            one: false,
            images: false,
            export: false,
        },
        Some(other) => bail!("unknown command: {other}"),
        None => bail!("missing command"),
    };

    let mut parsed = CliArgs {
        command,
        objective: None,
        language: None,
        personas: Vec::new(),
        platforms: Vec::new(),
        mix: false,
        length: None,
        temperature: None,
        custom: None,
        avoid: None,
    };

    let take_value = |flag: &str, iter: &mut std::slice::Iter<'_, String>| -> Result<String> {
        iter.next()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
    };

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--one" | "--images" | "--export" => {
                let Command::Generate {
                    one,
                    images,
                    export,
                } = &mut parsed.command
                else {
                    bail!("{arg} only applies to the generate command");
                };
                match arg.as_str() {
                    "--one" => *one = true,
                    "--images" => *images = true,
                    _ => *export = true,
                }
            }
            "--objective" => parsed.objective = Some(take_value(arg, &mut iter)?),
            "--language" => parsed.language = Some(take_value(arg, &mut iter)?),
            "--persona" => parsed.personas.push(take_value(arg, &mut iter)?),
            "--platform" => {
                let value = take_value(arg, &mut iter)?;
                parsed.platforms.push(parse_platform_count(&value)?);
            }
            "--mix" => parsed.mix = true,
            "--length" => {
                let value = take_value(arg, &mut iter)?;
                parsed.length = Some(
                    OutputLength::parse(&value)
                        .ok_or_else(|| anyhow::anyhow!("unknown length: {value}"))?,
                );
            }
            "--temperature" => {
                let value = take_value(arg, &mut iter)?;
                parsed.temperature = Some(value.parse()?);
            }
            "--custom" => parsed.custom = Some(take_value(arg, &mut iter)?),
            "--avoid" => parsed.avoid = Some(take_value(arg, &mut iter)?),
            other => bail!("unknown option: {other}"),
        }
    }

    Ok(parsed)
}

fn parse_platform_count(value: &str) -> Result<(Platform, u32)> {
    let Some((name, count)) = value.split_once('=') else {
        bail!("--platform expects <name>=<count>, got: {value}");
    };
    let platform =
        Platform::parse(name).ok_or_else(|| anyhow::anyhow!("unknown platform: {name}"))?;
    Ok((platform, count.trim().parse()?))
}

/// Fold parsed arguments into a settings snapshot. Any `--platform`
/// flag replaces the whole platform selection; any `--persona` flag
/// replaces the whole persona list.
fn apply_settings(args: &CliArgs, settings: &mut GenerationSettings) {
    if let Some(objective) = &args.objective {
        settings.objective = objective.clone();
    }
    if let Some(language) = &args.language {
        settings.language = language.clone();
    }
    if !args.personas.is_empty() {
        settings.personas = PersonaList::new(args.personas.clone());
    }
    if !args.platforms.is_empty() {
        for platform in Platform::ALL {
            settings.select_platform(platform, false);
        }
        for &(platform, count) in &args.platforms {
            settings.select_platform(platform, count > 0);
            settings.set_platform_count(platform, count);
        }
    }
    if args.mix {
        settings.mix_personas = true;
    }
    if let Some(length) = args.length {
        settings.output_length = length;
    }
    if let Some(temperature) = args.temperature {
        settings.set_temperature(temperature);
    }
    if let Some(custom) = &args.custom {
        settings.custom_instructions = Some(custom.clone());
    }
    if let Some(avoid) = &args.avoid {
        settings.avoidance_instructions = Some(avoid.clone());
    }
}

async fn run_plan(orchestrator: &Orchestrator) {
    let settings = orchestrator.settings().await;
    println!("Objective: {}", settings.objective);
    println!("Language:  {}", settings.language);
    let active = settings.personas.active();
    println!(
        "Personas:  {} active{}",
        active.len(),
        if settings.mix_personas { " (mixed)" } else { "" }
    );
    for persona in &active {
        println!("  - {persona}");
    }
    println!("Platforms:");
    for config in settings.platforms.iter().filter(|c| c.contributes()) {
        println!("  - {} x{}", config.platform, config.count);
    }
    println!("Planned posts: {}", orchestrator.total_planned().await);
    match orchestrator.plan_next_target().await {
        Some(target) => {
            let persona = target
                .persona_index
                .map_or_else(|| "mixed".to_string(), |i| format!("persona {}", i + 1));
            println!(
                "Next target:   {} slot {} ({persona})",
                target.platform,
                target.count_index + 1
            );
        }
        None => println!("Next target:   none (plan exhausted)"),
    }
}

async fn run_generate(
    orchestrator: &Orchestrator,
    one: bool,
    images: bool,
    export: bool,
) -> ExitCode {
    let planned = orchestrator.total_planned().await;
    tracing::info!(planned, one, "Starting text generation");
    let outcomes = if one {
        vec![orchestrator.generate_next_text().await]
    } else {
        orchestrator.generate_all_text().await
    };

    let mut failed = false;
    for outcome in &outcomes {
        match outcome {
            TextFlowOutcome::Completed(id) => println!("generated  {id}"),
            TextFlowOutcome::Degraded(id) => println!("degraded   {id}"),
            TextFlowOutcome::Failed(id) => {
                failed = true;
                let detail = orchestrator
                    .last_error()
                    .await
                    .unwrap_or_else(|| "unknown error".to_string());
                eprintln!("failed     {id}: {detail}");
            }
            TextFlowOutcome::Exhausted => println!("nothing to generate: plan exhausted"),
            TextFlowOutcome::Busy => {
                failed = true;
                eprintln!("another generation is already running");
            }
            TextFlowOutcome::Rejected(reason) => {
                failed = true;
                eprintln!("cannot generate: {reason}");
            }
        }
    }

    if images {
        for post in orchestrator.posts().await {
            if !post.text.is_ready() {
                continue;
            }
            match orchestrator.generate_image(&post.id).await {
                ImageFlowOutcome::Completed(id) => println!("image      {id}"),
                ImageFlowOutcome::Placeholder(id) => println!("image      {id} (placeholder)"),
                ImageFlowOutcome::Failed(id) => {
                    failed = true;
                    let detail = orchestrator
                        .last_error()
                        .await
                        .unwrap_or_else(|| "unknown error".to_string());
                    eprintln!("image fail {id}: {detail}");
                }
                ImageFlowOutcome::StalePost => {}
                ImageFlowOutcome::Rejected(reason) => {
                    failed = true;
                    eprintln!("cannot generate images: {reason}");
                    break;
                }
            }
        }
    }

    if export {
        for post in orchestrator.posts().await {
            println!("\n--------------------------------");
            print!("{}", export_post_as_text(&post));
            if let genie_types::ImageState::Ready(image) = &post.image {
                println!("\nImage:\n{}", image.url());
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = Orchestrator::new(&Credentials::from_env());
    let mut settings = orchestrator.settings().await;
    apply_settings(&args, &mut settings);
    orchestrator.update_settings(|current| *current = settings).await;
    tracing::debug!(command = ?args.command, "Arguments applied to settings");

    match args.command {
        Command::Plan => {
            run_plan(&orchestrator).await;
            ExitCode::SUCCESS
        }
        Command::Generate {
            one,
            images,
            export,
        } => run_generate(&orchestrator, one, images, export).await,
    }
}
