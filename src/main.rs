use std::process::exit;

use clap::Parser;
use scriptc::chunk::Chunk;
use scriptc::compiler::compile_with_options;
use scriptc::config::CompilerOptions;
use scriptc::heap::Heap;

#[derive(Parser, Debug)]
struct Args {
    /// Path to the script to compile.
    script: String,
    /// Disassemble the compiled chunk to stdout after a successful compile.
    #[arg(long)]
    disassemble: bool,
}

fn main() {
    let args = Args::parse();
    let options = CompilerOptions::new().with_trace(args.disassemble);
    exit(run_file(&args.script, &options));
}

/// Compiles `path` and reports the outcome. Does not execute the resulting
/// chunk — running bytecode is the external VM's job. Returns the process
/// exit code the way the teacher's own `run_file` maps `InterpretResult` to
/// one.
fn run_file(path: &str, options: &CompilerOptions) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read {}: {}", path, err);
            return 74;
        }
    };

    let mut chunk = Chunk::new();
    let mut heap = Heap::new();
    let outcome = compile_with_options(&source, &mut chunk, &mut heap, options);

    if !outcome.success {
        return 65;
    }

    println!(
        "compiled {} bytes, {} constants",
        chunk.len(),
        chunk.constants.values.len()
    );
    0
}
