use clap::Parser;
use color_eyre::eyre::eyre;
use nestegg::{Args, execute, init_logging, write_output};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    let output = execute(&args.command)?;
    write_output(&output.value, args.pretty, args.output.as_deref())?;

    if !output.success {
        let code = output.value["error_details"]["code"]
            .as_str()
            .unwrap_or("VALIDATION_ERROR");
        tracing::warn!(code, "run did not succeed");
        return Err(eyre!("simulation failed with {code}"));
    }
    Ok(())
}
