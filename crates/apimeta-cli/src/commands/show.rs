//! Show one operation.

use nu_ansi_term::Color;

use crate::util::{GlobalArgs, find_operation};

#[derive(clap::Args)]
pub struct Args {
    /// Operation id
    pub operation: String,

    /// Nested description containing the operation
    #[arg(long = "in")]
    pub document: Option<String>,
}

pub fn run(global: &GlobalArgs, args: Args) -> anyhow::Result<()> {
    let registry = global.registry()?;
    let proxy = find_operation(&registry, &args.operation, args.document.as_deref())?;
    let op = proxy.operation();

    println!("{} {}", Color::Green.bold().paint(op.method.as_str()), op.path);
    println!("  base: {}", proxy.document().base_url());
    if let Some(summary) = &op.summary {
        println!("  {summary}");
    }

    if op.parameters.is_empty() {
        return Ok(());
    }
    println!();
    for param in &op.parameters {
        let location = format!("{:?}", param.location).to_lowercase();
        let required = if param.required {
            Color::Yellow.paint("required").to_string()
        } else {
            Color::DarkGray.paint("optional").to_string()
        };
        println!("  {:<24} {:<9} {}", param.name, location, required);
        if let Some(description) = &param.description {
            println!("      {description}");
        }
    }
    Ok(())
}
