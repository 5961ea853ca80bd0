/* 📖 # What does the crossfs binary do?

It is a guided tour of the library rather than a tool: it prints the well-known
directories, builds a small scratch tree under the temp directory, reads and copies files
in it, lists it flat and recursively and finally removes it again. Every step goes through
the public `File` / `Directory` API, so running it on a new platform is a quick smoke test.

Exit codes:
- 0: the tour completed
- 1: a filesystem operation failed (the error and its context are printed)
*/

use std::process::ExitCode;

use clap::Parser;
use crossfs::{Directory, File};
use crossfs_base::tracing::init_tracing;
use crossfs_base::{CrossfsResult, FilePath, PalHandle, ResultExt};
use tracing::{debug, info};

/// Walks through the crossfs file and directory API in a scratch directory.
#[derive(Parser, Debug)]
#[command(name = "crossfs", version, about)]
struct Args {
    /// Name of the scratch directory created inside the temp directory
    #[arg(value_name = "NAME", default_value = "crossfs-demo")]
    name: String,

    /// Leave the scratch directory in place instead of removing it at the end
    #[arg(long)]
    keep: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_tracing() {
        eprintln!("Warning: {}", e);
    }
    debug!(?args, "starting");

    let result = FilePath::temp_directory().and_then(|temp| run(&args, &temp, PalHandle::real()));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            debug!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, temp: &FilePath, pal: PalHandle) -> CrossfsResult<()> {
    println!("crossfs filesystem tour");
    println!("=======================");

    println!("\nSystem directories:");
    println!("Current directory: {}", FilePath::current_directory_in(&*pal)?);
    match FilePath::home_directory_in(&*pal) {
        Ok(home) => println!("Home directory: {}", home),
        Err(e) => println!("Home directory: <{}>", e),
    }
    println!("Temp directory: {}", temp);
    println!("Path separator: '{}'", FilePath::separator());

    let scratch_path = temp.join(&args.name);
    let scratch = Directory::with_pal(scratch_path.clone(), pal.clone());
    println!("\nCreating scratch directory: {}", scratch_path);
    if scratch.exists() {
        println!("Directory already exists, removing it first...");
        scratch.remove(true).context("clearing previous scratch directory")?;
    }
    scratch.create()?;

    let first = File::with_pal(scratch_path.join("first.txt"), pal.clone());
    let second = File::with_pal(scratch_path.join("second.txt"), pal.clone());
    println!("\nCreating files:");
    println!("- {}", first.path());
    println!("- {}", second.path());
    first.write_text("Hello from crossfs!\nThis is a test file.")?;
    second.write_text("Another test file.\nWith multiple lines.")?;

    println!("\nReading {}:", first.path().filename());
    println!("{}", first.read_text()?);
    println!("File size: {} bytes", first.size()?);

    println!("\nDirectory contents:");
    print_entries(&scratch_path, &scratch.list(false), &pal);

    let copy_path = scratch_path.join("first-copy.txt");
    println!(
        "\nCopying {} to {}",
        first.path().filename(),
        copy_path.filename()
    );
    let copy = first.copy(copy_path)?;
    println!("Copy exists: {}", yes_no(copy.exists()));

    let nested = Directory::with_pal(scratch_path.join("nested"), pal.clone());
    println!("\nCreating subdirectory: {}", nested.path());
    nested.create()?;
    let moved = second.move_to(nested.path().join("second.txt"))?;
    println!("Moved {} into {}", moved.path().filename(), nested.path().filename());

    println!("\nDirectory contents (recursive):");
    print_entries(&scratch_path, &scratch.list(true), &pal);

    if args.keep {
        info!(path = %scratch_path, "keeping scratch directory");
        println!("\nKeeping {}", scratch_path);
    } else {
        println!("\nCleaning up scratch directory...");
        scratch.remove(true)?;
        println!("Scratch directory exists: {}", yes_no(scratch.exists()));
    }

    println!("\nTour completed successfully.");
    Ok(())
}

fn print_entries(root: &FilePath, entries: &[FilePath], pal: &PalHandle) {
    let prefix_len = root.as_str().len() + 1;
    for entry in entries {
        let kind = if entry.is_directory_in(&**pal) {
            "Directory"
        } else {
            "File"
        };
        let relative = entry.as_str().get(prefix_len..).unwrap_or(entry.filename());
        println!("- {} [{}]", relative, kind);
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
