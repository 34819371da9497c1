//! Print the request an operation call would send.

use crate::util::{GlobalArgs, find_operation, parse_param};

#[derive(clap::Args)]
pub struct Args {
    /// Operation id
    pub operation: String,

    /// Nested description containing the operation
    #[arg(long = "in")]
    pub document: Option<String>,

    /// Parameter values as key=value
    #[arg(value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

pub fn run(global: &GlobalArgs, args: Args) -> anyhow::Result<()> {
    let registry = global.registry()?;
    let proxy = find_operation(&registry, &args.operation, args.document.as_deref())?;
    let request = proxy.request(args.params)?;

    println!("{} {}", request.method, request.url);
    for (name, value) in &request.headers {
        println!("{name}: {value}");
    }
    Ok(())
}
