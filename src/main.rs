//! Command line front-end for fitfs disk images.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::{Level, LevelFilter, Metadata, Record};

use fitfs::path::{child_name, resolve};
use fitfs::{DirEntry, Error, FileSystem, ImageFile, Layout, Result};

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => 31,
            Level::Warn => 93,
            Level::Info => 34,
            Level::Debug => 32,
            Level::Trace => 90,
        };
        eprintln!("\x1b[{}m[{:>5}] {}\x1b[0m", color, record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

pub fn main() {
    if let Err(e) = run() {
        eprintln!("fitfs: {}", e);
        std::process::exit(1);
    }
}

fn cli() -> App<'static, 'static> {
    let name_arg = Arg::with_name("name")
        .required(true)
        .takes_value(true)
        .help("Name of the entry on the image");
    let from_arg = Arg::with_name("from")
        .long("from")
        .takes_value(true)
        .help("Host file to take the data from (stdin otherwise)");

    App::new("fitfs")
        .about("Inspect and edit fitfs disk images")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("image")
                .short("i")
                .long("image")
                .takes_value(true)
                .default_value("disk.img")
                .help("Disk image, created and formatted if missing"),
        )
        .arg(
            Arg::with_name("partition")
                .short("p")
                .long("partition")
                .conflicts_with("offset")
                .help("Filesystem starts after the 15 MiB boot partition"),
        )
        .arg(
            Arg::with_name("offset")
                .long("offset")
                .takes_value(true)
                .help("Filesystem starts at this block of the image"),
        )
        .arg(
            Arg::with_name("cwd")
                .short("C")
                .long("cwd")
                .takes_value(true)
                .default_value("/")
                .help("Directory relative names are resolved against"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more (repeat for debug and trace)"),
        )
        .subcommand(SubCommand::with_name("format").about("Discard every entry on the image"))
        .subcommand(SubCommand::with_name("info").about("Dump the file index table"))
        .subcommand(
            SubCommand::with_name("ls")
                .about("List entries sorted by name")
                .arg(Arg::with_name("dir").takes_value(true).help("Only entries directly inside this directory"))
                .arg(Arg::with_name("all").short("a").long("all").help("List every entry, flat")),
        )
        .subcommand(SubCommand::with_name("cat").about("Print a file to stdout").arg(name_arg.clone()))
        .subcommand(
            SubCommand::with_name("put")
                .about("Store a new file")
                .arg(name_arg.clone())
                .arg(from_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("edit")
                .about("Replace a file, creating it if missing")
                .arg(name_arg.clone())
                .arg(from_arg),
        )
        .subcommand(
            SubCommand::with_name("import")
                .about("Store a host file under its base name")
                .arg(Arg::with_name("host").required(true).takes_value(true)),
        )
        .subcommand(SubCommand::with_name("mkdir").about("Create a directory entry").arg(name_arg.clone()))
        .subcommand(SubCommand::with_name("rm").about("Delete an entry").arg(name_arg))
}

fn layout_of(matches: &ArgMatches) -> Result<Layout> {
    if matches.is_present("partition") {
        return Ok(Layout::Partitioned);
    }
    match matches.value_of("offset") {
        Some(offset) => offset
            .parse::<u64>()
            .map(Layout::Custom)
            .map_err(|e| Error::InvalidArgument(format!("bad offset '{}': {}", offset, e))),
        None => Ok(Layout::WholeDisk),
    }
}

fn name_of(cwd: &str, matches: &ArgMatches) -> String {
    resolve(cwd, matches.value_of("name").unwrap_or_default())
}

fn data_of(matches: &ArgMatches) -> Result<Vec<u8>> {
    match matches.value_of("from") {
        Some(host) => Ok(fs::read(host)?),
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

fn print_entries(dir: Option<&str>, mut entries: Vec<DirEntry>) {
    if entries.is_empty() {
        println!("(No files found)");
        return;
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    println!("Type | Name                            | Size (Bytes)");
    println!("-----------------------------------------------------");
    for entry in &entries {
        let shown = dir
            .and_then(|dir| child_name(dir, &entry.name))
            .unwrap_or(entry.name.as_str());
        let kind = if entry.is_dir() { "[d]" } else { "[f]" };
        println!("{}  | {:<31} | {}", kind, shown, entry.size_bytes);
    }
}

fn run() -> Result<()> {
    let matches = cli().get_matches();
    init_logger(matches.occurrences_of("verbose"));

    let image = matches.value_of("image").unwrap_or("disk.img");
    let cwd = matches.value_of("cwd").unwrap_or("/");
    let mut fs_inst = FileSystem::<ImageFile>::open(image, layout_of(&matches)?)?;

    match matches.subcommand() {
        ("format", Some(_)) => {
            fs_inst.format()?;
            println!("Disk has been formatted.");
        }
        ("info", Some(_)) => print!("{}", fs_inst.dump()),
        ("ls", Some(sub)) => {
            if sub.is_present("all") {
                print_entries(None, fs_inst.list());
            } else {
                let dir = sub.value_of("dir").map_or_else(|| cwd.to_string(), |dir| resolve(cwd, dir));
                print_entries(Some(&dir), fs_inst.read_dir(&dir));
            }
        }
        ("cat", Some(sub)) => {
            let data = fs_inst.read(&name_of(cwd, sub))?;
            io::stdout().write_all(&data)?;
        }
        ("put", Some(sub)) => {
            let data = data_of(sub)?;
            fs_inst.write(&name_of(cwd, sub), &data)?;
        }
        ("edit", Some(sub)) => {
            let data = data_of(sub)?;
            fs_inst.replace(&name_of(cwd, sub), &data)?;
        }
        ("import", Some(sub)) => {
            let host = Path::new(sub.value_of("host").unwrap_or_default());
            let name = host
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| Error::InvalidArgument(format!("no usable file name in '{}'", host.display())))?;
            let name = resolve(cwd, name);
            let data = fs::read(host)?;
            fs_inst.write(&name, &data)?;
            println!("File '{}' added to disk image.", name);
        }
        ("mkdir", Some(sub)) => fs_inst.create_dir(&name_of(cwd, sub))?,
        ("rm", Some(sub)) => fs_inst.delete(&name_of(cwd, sub))?,
        _ => eprintln!("{}", matches.usage()),
    }
    Ok(())
}
