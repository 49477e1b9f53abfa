use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::debug;
use vc_core::api::{self, CompilationOptions};
use vc_core::ast::Program;

/// vcc - Jasmin code generator for checked VC programs
#[derive(Parser, Debug)]
#[command(name = "vcc")]
#[command(about = "Generate Jasmin assembly from a checked VC program", long_about = None)]
struct Args {
    /// Checked program in JSON form (e.g. `gcd.json`)
    input: PathBuf,

    /// Where to write the assembly (default: the input with a `.j` extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Class name (default: the input's file stem)
    #[arg(long)]
    class_name: Option<String>,

    /// Leave out the explanatory comments
    #[arg(long)]
    no_comments: bool,

    /// Print the assembly instead of writing a file
    #[arg(long)]
    stdout: bool,
}

fn load_program(path: &Path) -> Result<Program> {
    let text = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read `{}`", path.display()))?;
    parse_program(&text).wrap_err_with(|| format!("invalid program in `{}`", path.display()))
}

fn parse_program(text: &str) -> Result<Program> {
    serde_json::from_str(text).into_diagnostic()
}

fn compilation_options(args: &Args) -> CompilationOptions {
    let options = match &args.class_name {
        Some(name) => CompilationOptions::new(name.as_str()),
        None => CompilationOptions::for_source(&args.input),
    };
    options.with_comments(!args.no_comments)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use VC_LOG to control log level, default to WARN if not set
    let filter = EnvFilter::try_from_env("VC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let program = load_program(&args.input)?;
    let options = compilation_options(&args);
    debug!(input = %args.input.display(), class = %options.class_name, "loaded program");

    if args.stdout {
        let class = api::compile(&program, &options).into_diagnostic()?;
        let mut out = std::io::stdout().lock();
        class.code.write_to(&mut out).into_diagnostic()?;
        out.flush().into_diagnostic()?;
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| api::output_path(&args.input));
    api::compile_to_file(&program, &options, &output).into_diagnostic()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_program() {
        let program = parse_program(
            r#"{"decls":[{"Function":{"name":"main","ret":"Void","body":{}}}]}"#,
        )
        .unwrap();
        assert_eq!(program.functions().count(), 1);
        assert!(program.functions().all(|func| func.is_entry()));
    }

    #[test]
    fn test_parse_program_rejects_garbage() {
        assert!(parse_program(r#"{"decls":[{"Function":{}}]}"#).is_err());
    }

    #[test]
    fn test_options_from_args() {
        let args = Args::parse_from(["vcc", "dir/gcd.json"]);
        let options = compilation_options(&args);
        assert_eq!(options.class_name, "gcd");
        assert!(options.comments);

        let args = Args::parse_from(["vcc", "gcd.json", "--class-name", "Gcd", "--no-comments"]);
        let options = compilation_options(&args);
        assert_eq!(options.class_name, "Gcd");
        assert!(!options.comments);
    }
}
