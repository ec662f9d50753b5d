use clap::Parser;
use serde::Serialize;
use std::io::Read;

use pashmak::program::Program;

#[derive(Parser)]
#[command(name = "pashmak")]
#[command(about = "The Pashmak scripting language")]
#[command(version)]
struct Cli {
    /// Execute the script from a command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Output the captured result as JSON (output, exitCode, error)
    #[arg(long = "json")]
    json: bool,

    /// Script file to execute
    #[arg()]
    script_file: Option<String>,

    /// Arguments passed to the script as argv
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

#[derive(Serialize)]
struct RunReport {
    output: String,
    #[serde(rename = "exitCode")]
    exit_code: i32,
    error: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let (source, file_path) = if let Some(code) = cli.script {
        (code, "<cmdline>".to_string())
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => (content, file.clone()),
            Err(e) => {
                eprintln!("error: cannot read script file {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!("error: no script provided; use -c 'script', a script file, or pipe via stdin");
            std::process::exit(1);
        }
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).unwrap_or_default();
        (buf, "<stdin>".to_string())
    };

    let mut prog = Program::new(cli.json, cli.args);
    if let Some(ref file) = cli.script_file {
        if let Ok(abs) = std::fs::canonicalize(file) {
            prog.main_filename = abs;
        }
    }

    let commands = match pashmak::lexer::parse(&source, &file_path) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("SyntaxError: {}", e);
            std::process::exit(1);
        }
    };

    prog.bootstrap_modules();
    if let Err(flow) = prog.set_commands(commands) {
        let code = report_or_exit_code(&prog, &flow);
        finish(&prog, cli.json, code);
    }
    let code = prog.start();
    finish(&prog, cli.json, code);
}

fn report_or_exit_code(prog: &Program, flow: &pashmak::Flow) -> i32 {
    match flow {
        pashmak::Flow::Exit(code) => *code,
        pashmak::Flow::Raise(e) => {
            eprintln!("{}", e);
            1
        }
        _ => {
            if let Some(ref e) = prog.runtime_error {
                eprintln!("{}", e);
            }
            1
        }
    }
}

fn finish(prog: &Program, json: bool, code: i32) -> ! {
    if json {
        let report = RunReport {
            output: prog.output.clone(),
            exit_code: code,
            error: prog.runtime_error.as_ref().map(|e| e.to_string()),
        };
        println!(
            "{}",
            serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string())
        );
    }
    std::process::exit(code);
}
