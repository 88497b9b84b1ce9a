use vglaunch::commands;

fn output_header() -> &'static str {
    "vglaunch\nvglaunch is a terminal wizard for configuring and submitting geophysics jobs to a VGL portal."
}

fn print_header() {
    println!("{}\n", output_header());
}

fn run() -> Result<(), String> {
    print_header();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = commands::run_cli(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
