use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("pttcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pttcrawl Contributors")
        .about("Crawl PTT boards into JSON files")
        .arg(clap::arg!(-b --board <BOARD> "Board name, e.g. Gossiping").required(true))
        .arg(
            clap::arg!(-i --index <PAGES> "Crawl listing pages START through END (END -1 = last page)")
                .num_args(2)
                .value_names(["START", "END"])
                .allow_negative_numbers(true)
                .conflicts_with("article"),
        )
        .arg(clap::arg!(-a --article <ID> "Crawl a single article, e.g. M.1419434423.A.DF0"))
        .arg(
            clap::arg!(-o --"output-dir" <DIR> "Directory output files are written to")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("3"))
        .arg(clap::arg!(--"delay-ms" <MS> "Pause after every listing page, in milliseconds").default_value("100"))
        .arg(clap::arg!(--insecure "Skip TLS certificate verification"))
        .arg(
            clap::arg!(--skip <URL> "Article URL to leave out of a range crawl (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "pttcrawl", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "pttcrawl", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "pttcrawl", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "pttcrawl", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
