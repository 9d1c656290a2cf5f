use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lc3_isim::command::{Command, HELP};
use lc3_isim::errors::ExecutionError;
use lc3_isim::image::ProgramImage;
use lc3_isim::simulator::{RunOutcome, Simulator};
use tracing::error;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

/// Interactive instruction-level simulator for the LC-3.
#[derive(Parser)]
#[clap(version, about)]
struct Opt {
    /// Machine language program files, loaded in order.
    #[clap(required = true)]
    programs: Vec<PathBuf>,

    /// Append mdump/rdump output to this file as well.
    #[clap(long)]
    dump_file: Option<PathBuf>,

    /// Increase the level of verbosity. Can be used multiple times.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Opt {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "lc3_isim=debug,info",
            2..=u8::MAX => "trace",
        }
    }

    fn filter_layer(&self) -> EnvFilter {
        // env override first, verbosity flags otherwise
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.log_filter()))
            .unwrap_or_default()
    }
}

fn main() -> ExitCode {
    let opt = Opt::parse();
    tracing_subscriber::registry()
        .with(opt.filter_layer())
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match start(&opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn start(opt: &Opt) -> Result<(), Box<dyn std::error::Error>> {
    let mut simulator = Simulator::new();
    for path in &opt.programs {
        let image =
            ProgramImage::from_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
        simulator
            .load(&image)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        println!("Read {} words from {} into memory.\n", image.words.len(), path.display());
    }
    let mut dump_file = opt.dump_file.as_ref().map(File::create).transpose()?;
    shell(&mut simulator, dump_file.as_mut())
}

/// The read-eval loop around the engine; EOF behaves like `quit`.
fn shell(
    simulator: &mut Simulator,
    mut dump_file: Option<&mut File>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "LC-3-SIM> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Help) => print!("{HELP}"),
            Ok(Command::Quit) => {
                println!("Bye.");
                return Ok(());
            }
            Ok(Command::Go) => {
                println!("Simulating...\n");
                report(simulator.run(None));
            }
            Ok(Command::Run { cycles }) => {
                println!("Simulating for {cycles} cycles...\n");
                report(simulator.run(Some(cycles)));
            }
            Ok(Command::MemoryDump { low, high }) => {
                simulator.dump_memory(&mut stdout, low, high)?;
                if let Some(file) = dump_file.as_deref_mut() {
                    simulator.dump_memory(file, low, high)?;
                }
            }
            Ok(Command::RegisterDump) => {
                simulator.dump_registers(&mut stdout)?;
                if let Some(file) = dump_file.as_deref_mut() {
                    simulator.dump_registers(file)?;
                }
            }
            Err(e) => println!("{e}"),
        }
    }
}

fn report(outcome: Result<RunOutcome, ExecutionError>) {
    match outcome {
        Ok(RunOutcome::AlreadyHalted) => println!("Can't simulate, Simulator is halted\n"),
        Ok(RunOutcome::Halted { executed }) => {
            println!("Simulator halted after {executed} instructions\n");
        }
        Ok(RunOutcome::LimitReached { executed }) => {
            println!("Executed {executed} instructions\n");
        }
        Err(e) => println!("Execution aborted: {e}\n"),
    }
}
