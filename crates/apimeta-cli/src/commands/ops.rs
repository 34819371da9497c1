//! List the operations of a description.

use nu_ansi_term::Color;

use crate::util::GlobalArgs;

#[derive(clap::Args)]
pub struct Args {
    /// Nested description to list, by the root operation that references it
    pub document: Option<String>,

    /// Print operations as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(global: &GlobalArgs, args: Args) -> anyhow::Result<()> {
    let registry = global.registry()?;
    let document = match &args.document {
        Some(name) => registry.document(name)?.document,
        None => registry.root()?,
    };

    if args.json {
        let ops: Vec<_> = document.operations().collect();
        println!("{}", serde_json::to_string_pretty(&ops)?);
        return Ok(());
    }

    let marker = &registry.config().reference_marker;
    for op in document.operations() {
        let reference = args.document.is_none() && op.is_document_reference(marker);
        println!(
            "{:<7} {:<48} {}{}",
            op.method.as_str(),
            op.id,
            op.path,
            if reference {
                format!(" {}", Color::Cyan.paint("(description)"))
            } else {
                String::new()
            }
        );
    }
    println!("{} operations", document.len());
    Ok(())
}
