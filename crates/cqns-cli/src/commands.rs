use std::io::{Read, Write};

use anyhow::Context;
use colored::Colorize;

use cqns_core::{JsonTreeVisitor, NamespacePrefixRewriter, RewriteSummary};
use cqns_server::{CqnsServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Rewrite(args) => cmd_rewrite(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn cmd_rewrite(args: RewriteArgs) -> anyhow::Result<()> {
    let input = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };

    let (output, summary) = rewrite_document(&input, &args)?;

    match &args.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
    }

    eprintln!(
        "{} Namespaced {} of {} widget names under {}",
        "✓".green().bold(),
        summary.names_rewritten.to_string().bold(),
        summary.widgets_matched,
        args.namespace.yellow()
    );
    Ok(())
}

/// Parse, rewrite and re-serialize one document. The output ends with a newline.
fn rewrite_document(input: &str, args: &RewriteArgs) -> anyhow::Result<(String, RewriteSummary)> {
    let walker = JsonTreeVisitor::with_max_depth(args.max_depth);
    let mut document = walker.parse(input.as_bytes()).context("failed to read input document")?;

    let rule = NamespacePrefixRewriter::new(args.namespace.as_str())
        .with_type_field(args.type_field.as_str())
        .with_widget_type(args.widget_type.as_str());
    let summary = rule.apply_with(&walker, &mut document)?;

    let mut output = if args.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    output.push('\n');
    Ok((output, summary))
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = args.root {
        config.content_root = root;
    }

    eprintln!(
        "cqns server on {} (root: {})",
        config.bind_addr.to_string().bold(),
        config.content_root.display()
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(CqnsServer::new(config).serve())?;
    Ok(())
}
